//! Two markup formats stacked on each other.
use super::{MarkupFormat, OutputFormat};
use crate::write::TemplWrite;
use crate::Result;
use std::borrow::Cow;
use std::sync::Arc;

/// An outer format applied over an inner one, named `Outer{Inner}`.
///
/// Escaping plain text runs the inner escaper first, then the outer one
/// over its result, so the text survives both decoding steps. Finished
/// markup is already in the combined language and passes through
/// untouched, like in any other format.
pub struct CombinedFormat {
    name: String,
    outer: Arc<dyn MarkupFormat>,
    inner: Arc<dyn MarkupFormat>,
}

impl CombinedFormat {
    pub fn new(outer: Arc<dyn MarkupFormat>, inner: Arc<dyn MarkupFormat>) -> Self {
        CombinedFormat {
            name: format!("{}{{{}}}", outer.name(), inner.name()),
            outer,
            inner,
        }
    }

    pub fn outer(&self) -> &Arc<dyn MarkupFormat> {
        &self.outer
    }

    pub fn inner(&self) -> &Arc<dyn MarkupFormat> {
        &self.inner
    }
}

impl OutputFormat for CombinedFormat {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> Option<&str> {
        None
    }
}

impl MarkupFormat for CombinedFormat {
    fn escape<'a>(&self, plain: &'a str) -> Cow<'a, str> {
        match self.inner.escape(plain) {
            Cow::Borrowed(same) => self.outer.escape(same),
            Cow::Owned(inner) => Cow::Owned(self.outer.escape(&inner).into_owned()),
        }
    }

    fn escape_to(&self, plain: &str, out: &mut dyn TemplWrite) -> Result<()> {
        let inner = self.inner.escape(plain);
        self.outer.escape_to(&inner, out)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::format::{HtmlFormat, MarkupModel, RtfFormat};

    fn html_rtf() -> Arc<dyn MarkupFormat> {
        Arc::new(CombinedFormat::new(Arc::new(HtmlFormat), Arc::new(RtfFormat)))
    }

    #[test]
    fn escapes_inner_then_outer() {
        let format = html_rtf();
        assert_eq!(format.name(), "HTML{RTF}");
        // RTF turns { into \{, then HTML turns < into &lt;
        assert_eq!(format.escape("<a{"), "&lt;a\\{");
        let mut out = String::new();
        format.escape_to("<a{", &mut out).unwrap();
        assert_eq!(out, "&lt;a\\{");
    }

    #[test]
    fn markup_passes_through_untouched() {
        let model = MarkupModel::from_markup(html_rtf(), "&lt;b&gt;\\{x\\}");
        let mut out = String::new();
        model.write_to(&mut out).unwrap();
        assert_eq!(out, "&lt;b&gt;\\{x\\}");
    }

    #[test]
    fn plain_model_defers_combined_escaping() {
        let model = MarkupModel::from_plain(html_rtf(), "<a{");
        assert_eq!(model.plain(), Some("<a{"));
        assert_eq!(model.markup(), "&lt;a\\{");
    }
}
