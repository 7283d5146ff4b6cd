//! The evaluation environment.
use crate::format::{Format, UndefinedFormat};
use crate::interrupt::InterruptionFlag;
use crate::truncate::TruncateAlgorithm;
use crate::write::TemplWrite;
use crate::Result;
use std::sync::Arc;

/// The per-render configuration the directives and built-ins consult.
pub struct Environment {
    format: Format,
    truncate: Arc<TruncateAlgorithm>,
    interruption: InterruptionFlag,
    number_format: String,
    datetime_format: String,
    locale: String,
    #[cfg(feature = "time")]
    utc_offset: time::UtcOffset,
}

impl Environment {
    /// An environment rendering into `format`.
    pub fn new(format: Format) -> Self {
        Environment {
            format,
            truncate: TruncateAlgorithm::ascii().clone(),
            interruption: InterruptionFlag::new(),
            number_format: "number".to_string(),
            datetime_format: "medium".to_string(),
            locale: "en_US".to_string(),
            #[cfg(feature = "time")]
            utc_offset: time::UtcOffset::UTC,
        }
    }

    pub fn with_truncate_algorithm(mut self, algorithm: Arc<TruncateAlgorithm>) -> Self {
        self.truncate = algorithm;
        self
    }

    pub fn with_interruption_flag(mut self, flag: InterruptionFlag) -> Self {
        self.interruption = flag;
        self
    }

    pub fn with_number_format(mut self, format: impl Into<String>) -> Self {
        self.number_format = format.into();
        self
    }

    pub fn with_datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_format = format.into();
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    #[cfg(feature = "time")]
    pub fn with_utc_offset(mut self, offset: time::UtcOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    /// The active output format.
    pub fn format(&self) -> &Format {
        &self.format
    }

    pub fn truncate_algorithm(&self) -> &Arc<TruncateAlgorithm> {
        &self.truncate
    }

    pub fn interruption_flag(&self) -> &InterruptionFlag {
        &self.interruption
    }

    /// Fails with the recovery-bypassing error when the render was
    /// interrupted.
    pub fn check_interrupted(&self) -> Result<()> {
        self.interruption.check()
    }

    pub fn number_format(&self) -> &str {
        &self.number_format
    }

    pub fn datetime_format(&self) -> &str {
        &self.datetime_format
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    #[cfg(feature = "time")]
    pub fn utc_offset(&self) -> time::UtcOffset {
        self.utc_offset
    }

    /// Writes plain text, escaped when the active format auto-escapes.
    pub fn output_plain(&self, text: &str, out: &mut dyn TemplWrite) -> Result<()> {
        match self.format.as_markup() {
            Some(markup) if markup.is_auto_escaped_by_default() => {
                markup.escape_to(text, out)
            }
            _ => out.write_str(text),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new(Format::Text(Arc::new(UndefinedFormat)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::format::FormatRegistry;

    #[test]
    fn defaults() {
        let env = Environment::default();
        assert_eq!(env.format().name(), "undefined");
        assert_eq!(env.number_format(), "number");
        assert_eq!(env.locale(), "en_US");
        env.check_interrupted().unwrap();
    }

    #[test]
    fn output_escapes_under_markup_formats() {
        let registry = FormatRegistry::new();
        let env = Environment::new(registry.get("HTML").unwrap());

        let mut out = String::new();
        env.output_plain("a < b", &mut out).unwrap();
        assert_eq!(out, "a &lt; b");

        let env = Environment::default();
        let mut out = String::new();
        env.output_plain("a < b", &mut out).unwrap();
        assert_eq!(out, "a < b");
    }

    #[test]
    fn interruption_reaches_the_environment() {
        let flag = InterruptionFlag::new();
        let env = Environment::default().with_interruption_flag(flag.clone());
        flag.interrupt();
        assert!(env.check_interrupted().is_err());
    }
}
