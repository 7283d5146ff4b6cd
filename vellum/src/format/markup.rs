//! Markup-carrying values.
use super::MarkupFormat;
use crate::write::TemplWrite;
use crate::{Error, Result};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// A piece of output that already belongs to a markup format.
///
/// Exactly one of the plain and the markup side is given at
/// construction. A plain-sourced model derives its markup lazily on
/// first use and caches it; the derivation is pure, so a racing second
/// writer computes the same string. The plain side is never synthesized
/// from markup, as unescaping is not generally possible.
pub struct MarkupModel {
    format: Arc<dyn MarkupFormat>,
    plain: Option<String>,
    markup: OnceLock<String>,
}

impl MarkupModel {
    /// A model whose markup is the escaped form of `plain`.
    pub fn from_plain(format: Arc<dyn MarkupFormat>, plain: impl Into<String>) -> Self {
        MarkupModel {
            format,
            plain: Some(plain.into()),
            markup: OnceLock::new(),
        }
    }

    /// A model that holds finished markup verbatim.
    pub fn from_markup(format: Arc<dyn MarkupFormat>, markup: impl Into<String>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(markup.into());
        MarkupModel {
            format,
            plain: None,
            markup: cell,
        }
    }

    pub fn format(&self) -> &Arc<dyn MarkupFormat> {
        &self.format
    }

    pub fn format_name(&self) -> &str {
        self.format.name()
    }

    /// The plain source, when the model was built from one.
    pub fn plain(&self) -> Option<&str> {
        self.plain.as_deref()
    }

    /// The markup, deriving and caching it when only plain is stored.
    pub fn markup(&self) -> &str {
        self.markup.get_or_init(|| match &self.plain {
            Some(plain) => self.format.escape(plain).into_owned(),
            None => unreachable!("markup model with neither side"),
        })
    }

    /// Emptiness of whichever side the model was built from.
    pub fn is_empty(&self) -> bool {
        match &self.plain {
            Some(plain) => plain.is_empty(),
            None => self.markup().is_empty(),
        }
    }

    /// Joins two models of the same format.
    ///
    /// When both sides are plain-sourced and neither has derived its
    /// markup yet, the result stays plain, so escaping is still a single
    /// pass later. Otherwise both resolve to markup.
    pub fn concat(&self, other: &MarkupModel) -> Result<MarkupModel> {
        if self.format_name() != other.format_name() {
            return Err(Error::FormatMismatch {
                expected: self.format_name().to_string(),
                actual: other.format_name().to_string(),
            });
        }
        match (&self.plain, &other.plain) {
            (Some(left), Some(right))
                if self.markup.get().is_none() && other.markup.get().is_none() =>
            {
                let mut plain = String::with_capacity(left.len() + right.len());
                plain.push_str(left);
                plain.push_str(right);
                Ok(MarkupModel::from_plain(self.format.clone(), plain))
            }
            _ => {
                let left = self.markup();
                let right = other.markup();
                let mut markup = String::with_capacity(left.len() + right.len());
                markup.push_str(left);
                markup.push_str(right);
                Ok(MarkupModel::from_markup(self.format.clone(), markup))
            }
        }
    }

    /// Writes the model, escaping plain lazily, passing markup through.
    pub fn write_to(&self, out: &mut dyn TemplWrite) -> Result<()> {
        match (self.markup.get(), &self.plain) {
            (Some(markup), _) => out.write_str(markup),
            (None, Some(plain)) => self.format.escape_to(plain, out),
            (None, None) => unreachable!("markup model with neither side"),
        }
    }
}

impl fmt::Debug for MarkupModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkupModel")
            .field("format", &self.format.name())
            .field("plain", &self.plain)
            .field("markup", &self.markup.get())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::format::HtmlFormat;
    use crate::format::RtfFormat;

    fn html() -> Arc<dyn MarkupFormat> {
        Arc::new(HtmlFormat)
    }

    #[test]
    fn plain_derives_markup_once() {
        let model = MarkupModel::from_plain(html(), "a < b");
        assert_eq!(model.plain(), Some("a < b"));
        assert_eq!(model.markup(), "a &lt; b");
        // second call hits the cache
        assert_eq!(model.markup(), "a &lt; b");
    }

    #[test]
    fn markup_has_no_plain() {
        let model = MarkupModel::from_markup(html(), "<b>hi</b>");
        assert_eq!(model.plain(), None);
        assert_eq!(model.markup(), "<b>hi</b>");
    }

    #[test]
    fn emptiness() {
        assert!(MarkupModel::from_plain(html(), "").is_empty());
        assert!(!MarkupModel::from_plain(html(), "x").is_empty());
        assert!(MarkupModel::from_markup(html(), "").is_empty());
    }

    #[test]
    fn concat_plain_stays_plain() {
        let left = MarkupModel::from_plain(html(), "a < ");
        let right = MarkupModel::from_plain(html(), "b");
        let joined = left.concat(&right).unwrap();
        assert_eq!(joined.plain(), Some("a < b"));
        assert_eq!(joined.markup(), "a &lt; b");
    }

    #[test]
    fn concat_resolves_markup_when_cached() {
        let left = MarkupModel::from_plain(html(), "a < ");
        let _ = left.markup();
        let right = MarkupModel::from_plain(html(), "b");
        let joined = left.concat(&right).unwrap();
        assert_eq!(joined.plain(), None);
        assert_eq!(joined.markup(), "a &lt; b");
    }

    #[test]
    fn concat_mixed_sides() {
        let left = MarkupModel::from_markup(html(), "<i>");
        let right = MarkupModel::from_plain(html(), "a < b");
        let joined = left.concat(&right).unwrap();
        assert_eq!(joined.markup(), "<i>a &lt; b");
    }

    #[test]
    fn concat_format_mismatch() {
        let left = MarkupModel::from_plain(html(), "a");
        let right = MarkupModel::from_plain(Arc::new(RtfFormat), "b");
        assert!(matches!(
            left.concat(&right),
            Err(Error::FormatMismatch { .. }),
        ));
    }

    #[test]
    fn write_to_escapes_plain_and_passes_markup() {
        let mut out = String::new();
        MarkupModel::from_plain(html(), "a < b").write_to(&mut out).unwrap();
        assert_eq!(out, "a &lt; b");

        let mut out = String::new();
        MarkupModel::from_markup(html(), "<b>x</b>").write_to(&mut out).unwrap();
        assert_eq!(out, "<b>x</b>");
    }
}
