//! The stock output formats.
use super::{MarkupFormat, OutputFormat};
use crate::write::{TemplWrite, TemplWriteFmt};
use crate::Result;
use std::borrow::Cow;
use vellum_core::escape;

/// `text/html`; escaping covers `'` as `&#39;` so the result also works
/// in single quoted attributes.
pub struct HtmlFormat;

impl OutputFormat for HtmlFormat {
    fn name(&self) -> &str {
        "HTML"
    }

    fn mime_type(&self) -> Option<&str> {
        Some("text/html")
    }
}

impl MarkupFormat for HtmlFormat {
    fn escape<'a>(&self, plain: &'a str) -> Cow<'a, str> {
        escape::xhtml(plain)
    }

    fn escape_to(&self, plain: &str, out: &mut dyn TemplWrite) -> Result<()> {
        escape::xhtml_to(plain, &mut TemplWriteFmt(out))?;
        Ok(())
    }
}

/// `application/xhtml+xml`; same escaping as [`HtmlFormat`].
pub struct XhtmlFormat;

impl OutputFormat for XhtmlFormat {
    fn name(&self) -> &str {
        "XHTML"
    }

    fn mime_type(&self) -> Option<&str> {
        Some("application/xhtml+xml")
    }
}

impl MarkupFormat for XhtmlFormat {
    fn escape<'a>(&self, plain: &'a str) -> Cow<'a, str> {
        escape::xhtml(plain)
    }

    fn escape_to(&self, plain: &str, out: &mut dyn TemplWrite) -> Result<()> {
        escape::xhtml_to(plain, &mut TemplWriteFmt(out))?;
        Ok(())
    }
}

/// `application/xml`; apostrophes become `&apos;`.
pub struct XmlFormat;

impl OutputFormat for XmlFormat {
    fn name(&self) -> &str {
        "XML"
    }

    fn mime_type(&self) -> Option<&str> {
        Some("application/xml")
    }
}

impl MarkupFormat for XmlFormat {
    fn escape<'a>(&self, plain: &'a str) -> Cow<'a, str> {
        escape::xml(plain)
    }

    fn escape_to(&self, plain: &str, out: &mut dyn TemplWrite) -> Result<()> {
        escape::xml_to(plain, &mut TemplWriteFmt(out))?;
        Ok(())
    }
}

/// `application/rtf`.
pub struct RtfFormat;

impl OutputFormat for RtfFormat {
    fn name(&self) -> &str {
        "RTF"
    }

    fn mime_type(&self) -> Option<&str> {
        Some("application/rtf")
    }
}

impl MarkupFormat for RtfFormat {
    fn escape<'a>(&self, plain: &'a str) -> Cow<'a, str> {
        escape::rtf(plain)
    }

    fn escape_to(&self, plain: &str, out: &mut dyn TemplWrite) -> Result<()> {
        escape::rtf_to(plain, &mut TemplWriteFmt(out))?;
        Ok(())
    }
}

/// `text/plain`; no escaping exists, so values can't carry markup in it.
pub struct PlainTextFormat;

impl OutputFormat for PlainTextFormat {
    fn name(&self) -> &str {
        "plainText"
    }

    fn mime_type(&self) -> Option<&str> {
        Some("text/plain")
    }
}

/// The format in effect before any format was chosen.
pub struct UndefinedFormat;

impl OutputFormat for UndefinedFormat {
    fn name(&self) -> &str {
        "undefined"
    }

    fn mime_type(&self) -> Option<&str> {
        None
    }
}
