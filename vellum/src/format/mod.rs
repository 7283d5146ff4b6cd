//! Output formats and auto-escaping.
mod combined;
mod markup;
mod standard;

pub use combined::CombinedFormat;
pub use markup::MarkupModel;
pub use standard::{
    HtmlFormat, PlainTextFormat, RtfFormat, UndefinedFormat, XhtmlFormat, XmlFormat,
};

use crate::cache::BoundedCache;
use crate::write::TemplWrite;
use crate::{Error, Result};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

/// An output format, the target language of rendering.
pub trait OutputFormat: Send + Sync {
    /// Name used in configuration and in combined format names.
    fn name(&self) -> &str;

    fn mime_type(&self) -> Option<&str>;
}

/// An output format that distinguishes markup from plain text, and so can
/// auto-escape.
pub trait MarkupFormat: OutputFormat {
    /// Escapes plain text into this format's markup.
    fn escape<'a>(&self, plain: &'a str) -> Cow<'a, str>;

    /// Escapes plain text directly into a sink.
    fn escape_to(&self, plain: &str, out: &mut dyn TemplWrite) -> Result<()>;

    fn is_auto_escaped_by_default(&self) -> bool {
        true
    }
}

/// A format handle as stored in the registry.
///
/// Markup formats carry the full escaping interface; text formats only
/// the name and MIME type.
#[derive(Clone)]
pub enum Format {
    Markup(Arc<dyn MarkupFormat>),
    Text(Arc<dyn OutputFormat>),
}

impl Format {
    pub fn name(&self) -> &str {
        match self {
            Format::Markup(format) => format.name(),
            Format::Text(format) => format.name(),
        }
    }

    pub fn mime_type(&self) -> Option<&str> {
        match self {
            Format::Markup(format) => format.mime_type(),
            Format::Text(format) => format.mime_type(),
        }
    }

    pub fn as_markup(&self) -> Option<&Arc<dyn MarkupFormat>> {
        match self {
            Format::Markup(format) => Some(format),
            Format::Text(_) => None,
        }
    }
}

/// Known output formats by name.
///
/// Combined names like `HTML{RTF}` are synthesized on lookup and kept in
/// a bounded cache, since templates can produce such names dynamically.
pub struct FormatRegistry {
    by_name: HashMap<String, Format>,
    combined: BoundedCache<String, Format>,
}

const COMBINED_CACHE_LEN: usize = 128;

impl FormatRegistry {
    /// A registry with the standard formats registered.
    pub fn new() -> Self {
        let mut registry = FormatRegistry {
            by_name: HashMap::new(),
            combined: BoundedCache::new(COMBINED_CACHE_LEN),
        };
        registry.register(Format::Markup(Arc::new(HtmlFormat)));
        registry.register(Format::Markup(Arc::new(XhtmlFormat)));
        registry.register(Format::Markup(Arc::new(XmlFormat)));
        registry.register(Format::Markup(Arc::new(RtfFormat)));
        registry.register(Format::Text(Arc::new(PlainTextFormat)));
        registry.register(Format::Text(Arc::new(UndefinedFormat)));
        registry
    }

    pub fn register(&mut self, format: Format) {
        self.by_name.insert(format.name().to_string(), format);
    }

    /// Resolves a format name, synthesizing `Outer{Inner}` combinations.
    pub fn get(&self, name: &str) -> Result<Format> {
        if let Some(format) = self.by_name.get(name) {
            return Ok(format.clone());
        }

        let has_brace = name.contains('{');
        if !has_brace && !name.ends_with('}') {
            return Err(Error::UnknownFormat { name: name.to_string() });
        }
        if !has_brace || !name.ends_with('}') {
            return Err(Error::InvalidFormatName { name: name.to_string() });
        }
        if let Some(format) = self.combined.get(name) {
            return Ok(format);
        }

        // name[..brace] has no brace itself, so this recursion only goes
        // through the inner part
        let brace = name.find('{').unwrap_or(0);
        let outer_name = &name[..brace];
        let inner_name = &name[brace + 1..name.len() - 1];
        if outer_name.is_empty() || inner_name.is_empty() {
            return Err(Error::InvalidFormatName { name: name.to_string() });
        }

        let outer = self.require_markup(outer_name)?;
        let inner = self.require_markup(inner_name)?;
        let format = Format::Markup(Arc::new(CombinedFormat::new(outer, inner)));
        self.combined.insert(name.to_string(), format.clone());
        Ok(format)
    }

    fn require_markup(&self, name: &str) -> Result<Arc<dyn MarkupFormat>> {
        let format = self.get(name)?;
        match format.as_markup() {
            Some(markup) => Ok(markup.clone()),
            None => Err(Error::NotMarkupFormat { name: name.to_string() }),
        }
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn standard_lookup() {
        let registry = FormatRegistry::new();
        assert_eq!(registry.get("HTML").unwrap().name(), "HTML");
        assert_eq!(
            registry.get("plainText").unwrap().mime_type(),
            Some("text/plain"),
        );
        assert!(registry.get("undefined").unwrap().as_markup().is_none());
        assert!(matches!(
            registry.get("nope"),
            Err(Error::UnknownFormat { .. }),
        ));
    }

    #[test]
    fn combined_lookup() {
        let registry = FormatRegistry::new();
        let format = registry.get("HTML{RTF}").unwrap();
        assert_eq!(format.name(), "HTML{RTF}");
        assert!(format.as_markup().is_some());

        let nested = registry.get("XML{HTML{RTF}}").unwrap();
        assert_eq!(nested.name(), "XML{HTML{RTF}}");
    }

    #[test]
    fn combined_is_cached() {
        let registry = FormatRegistry::new();
        let a = registry.get("HTML{RTF}").unwrap();
        let b = registry.get("HTML{RTF}").unwrap();
        let (Some(a), Some(b)) = (a.as_markup(), b.as_markup()) else {
            panic!("not markup")
        };
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn combined_errors() {
        let registry = FormatRegistry::new();
        assert!(matches!(
            registry.get("HTML{plainText}"),
            Err(Error::NotMarkupFormat { .. }),
        ));
        assert!(matches!(
            registry.get("HTML{"),
            Err(Error::InvalidFormatName { .. }),
        ));
        assert!(matches!(
            registry.get("{RTF}"),
            Err(Error::InvalidFormatName { .. }),
        ));
        assert!(matches!(
            registry.get("HTML{nope}"),
            Err(Error::UnknownFormat { .. }),
        ));
    }
}
