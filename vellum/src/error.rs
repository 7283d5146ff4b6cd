use std::{fmt, io};
use vellum_core::escape::tquote;
use vellum_core::{DuplicateKeyError, NumberError};

/// [`Result`][std::result::Result] alias for [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// How an argument is referred to in messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgRef {
    /// Zero based position; rendered as a one based ordinal.
    Positional(usize),
    Named(String),
    PositionalVarargs,
    NamedVarargs,
    /// For callables without a declared layout.
    Varargs,
}

impl fmt::Display for ArgRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgRef::Positional(index) => {
                write!(f, "The {} argument", Ordinal(index + 1))
            }
            ArgRef::Named(name) => write!(f, "The {} argument", tquote(name)),
            ArgRef::PositionalVarargs => f.write_str("The positional varargs argument"),
            ArgRef::NamedVarargs => f.write_str("The named varargs argument"),
            ArgRef::Varargs => f.write_str("The varargs argument"),
        }
    }
}

/// How the called value is referred to in messages, by its name and by
/// whether it was called as a function or as a directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallableRef {
    Function(String),
    Directive(String),
}

impl fmt::Display for CallableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallableRef::Function(name) => write!(f, "function {}", tquote(name)),
            CallableRef::Directive(name) => write!(f, "directive {}", tquote(name)),
        }
    }
}

/// An error that can occur during template evaluation.
///
/// Variants carry structured fields only; the human readable message is
/// assembled in the [`fmt::Display`] impl, so errors that get recovered
/// from never pay for message formatting.
#[derive(Debug)]
pub enum Error {
    /// Wrong number of arguments for a callable.
    ArgumentCount {
        callable: Option<CallableRef>,
        actual: usize,
        min: usize,
        /// `None` means unlimited.
        max: Option<usize>,
        /// Parameter names to suggest, when passing by name was likely
        /// meant.
        supported_names: Vec<String>,
    },
    /// A by-name argument the callable doesn't declare.
    UnknownParameter {
        callable: Option<CallableRef>,
        name: String,
        supported_names: Vec<String>,
    },
    /// An argument of the wrong type.
    ArgumentType {
        callable: Option<CallableRef>,
        arg: ArgRef,
        expected: &'static str,
        actual: String,
    },
    /// A required argument that was omitted or null.
    MissingArgument {
        callable: Option<CallableRef>,
        arg: ArgRef,
    },
    Number(NumberError),
    DuplicateKey(DuplicateKeyError),
    /// A value no unwrapping rule applies to, in strict mode.
    CannotUnwrap { type_description: String },
    /// A non-hash value where a hash union source was expected.
    NotAHash { type_description: String },
    /// A value is in one output format where another was required.
    FormatMismatch { expected: String, actual: String },
    /// An output format name that is not registered.
    UnknownFormat { name: String },
    /// A combined output format name with broken `{...}` nesting.
    InvalidFormatName { name: String },
    /// A format that can't take part where markup is required.
    NotMarkupFormat { name: String },
    /// The evaluation was stopped from another thread.
    Interrupted,
    Io(io::Error),
}

impl Error {
    /// Whether template level error recovery must rethrow this error
    /// instead of swallowing it. True only for [`Error::Interrupted`].
    pub fn bypasses_recovery(&self) -> bool {
        matches!(self, Error::Interrupted)
    }

    /// Attaches the callable identity to the argument errors that name
    /// the called value in their message. Errors already carrying one,
    /// and errors of other kinds, are left alone.
    pub fn for_callable(mut self, id: &CallableRef) -> Error {
        match &mut self {
            Error::ArgumentCount { callable, .. }
            | Error::UnknownParameter { callable, .. }
            | Error::ArgumentType { callable, .. }
            | Error::MissingArgument { callable, .. } => {
                if callable.is_none() {
                    *callable = Some(id.clone());
                }
            }
            _ => {}
        }
        self
    }

    /// Convert error to [`io::Error`].
    pub fn into_io(self) -> io::Error {
        match self {
            Error::Io(error) => error,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ArgumentCount { callable, actual, min, max, supported_names } => {
                write_calling_prefix(f, callable)?;
                f.write_str("Expected ")?;
                match max {
                    Some(max) if min == max => {
                        if *max == 0 {
                            f.write_str("no")?;
                        } else {
                            write!(f, "{max}")?;
                        }
                    }
                    Some(max) if max - min == 1 => write!(f, "{min} or {max}")?,
                    Some(max) => write!(f, "{min} to {max}")?,
                    None => write!(f, "{min} or more (unlimited)")?,
                }
                f.write_str(" argument")?;
                if *max != Some(1) {
                    f.write_str("s")?;
                }
                f.write_str(" but has received ")?;
                if *actual == 0 {
                    f.write_str("none.")?;
                } else {
                    write!(f, "{actual}.")?;
                }
                if !supported_names.is_empty() {
                    f.write_str(" Supported parameter names, for passing arguments by name: ")?;
                    write_name_list(f, supported_names)?;
                }
                Ok(())
            }
            Error::UnknownParameter { callable, name, supported_names } => {
                write_calling_prefix(f, callable)?;
                write!(
                    f,
                    "This callable has no parameter that's passed by name and is called {}.",
                    tquote(name),
                )?;
                if !supported_names.is_empty() {
                    f.write_str(" The supported parameter names are: ")?;
                    write_name_list(f, supported_names)?;
                }
                Ok(())
            }
            Error::ArgumentType { callable, arg, expected, actual } => {
                write_calling_prefix(f, callable)?;
                write!(
                    f,
                    "{arg} should be {} {expected}, but was {} {actual}.",
                    article(expected),
                    article(actual),
                )
            }
            Error::MissingArgument { callable, arg } => {
                write_calling_prefix(f, callable)?;
                write!(f, "{arg} can't be omitted or null.")
            }
            Error::Number(error) => error.fmt(f),
            Error::DuplicateKey(error) => error.fmt(f),
            Error::CannotUnwrap { type_description } => {
                write!(
                    f,
                    "Cannot deep-unwrap {} {type_description}.",
                    article(type_description),
                )
            }
            Error::NotAHash { type_description } => {
                write!(
                    f,
                    "Expected a hash, but got {} {type_description}.",
                    article(type_description),
                )
            }
            Error::FormatMismatch { expected, actual } => {
                write!(
                    f,
                    "The value is in {} format, while {} was expected.",
                    tquote(actual),
                    tquote(expected),
                )
            }
            Error::UnknownFormat { name } => {
                write!(f, "Unregistered output format name, {}.", tquote(name))
            }
            Error::InvalidFormatName { name } => {
                write!(f, "Malformed output format name, {}.", tquote(name))
            }
            Error::NotMarkupFormat { name } => {
                write!(
                    f,
                    "The {} output format can't take part in a combined format, \
                    as it's not a markup format.",
                    tquote(name),
                )
            }
            Error::Interrupted => f.write_str("Template processing was interrupted."),
            Error::Io(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for Error {}

impl From<NumberError> for Error {
    fn from(value: NumberError) -> Self {
        Self::Number(value)
    }
}

impl From<DuplicateKeyError> for Error {
    fn from(value: DuplicateKeyError) -> Self {
        Self::DuplicateKey(value)
    }
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<fmt::Error> for Error {
    fn from(_: fmt::Error) -> Self {
        Self::Io(io::ErrorKind::Other.into())
    }
}

fn write_calling_prefix(
    f: &mut fmt::Formatter<'_>,
    callable: &Option<CallableRef>,
) -> fmt::Result {
    match callable {
        Some(callable) => write!(f, "When calling {callable}: "),
        None => Ok(()),
    }
}

fn write_name_list(f: &mut fmt::Formatter<'_>, names: &[String]) -> fmt::Result {
    for (i, name) in names.iter().enumerate() {
        if i != 0 {
            f.write_str(", ")?;
        }
        f.write_str(&tquote(name))?;
    }
    Ok(())
}

/// "a" or "an", by the first letter of the following word.
fn article(word: &str) -> &'static str {
    match word.bytes().next() {
        Some(b'a' | b'e' | b'i' | b'o' | b'u' | b'A' | b'E' | b'I' | b'O' | b'U') => "an",
        _ => "a",
    }
}

/// Renders `1` as `1st`, `2` as `2nd`, and so on.
struct Ordinal(usize);

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0;
        let suffix = match (n % 10, n % 100) {
            (_, 11..=13) => "th",
            (1, _) => "st",
            (2, _) => "nd",
            (3, _) => "rd",
            _ => "th",
        };
        write!(f, "{n}{suffix}")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn argument_count_messages() {
        let msg = Error::ArgumentCount {
            callable: None,
            actual: 1,
            min: 2,
            max: Some(3),
            supported_names: Vec::new(),
        }
        .to_string();
        assert_eq!(msg, "Expected 2 or 3 arguments but has received 1.");

        let msg = Error::ArgumentCount {
            callable: None,
            actual: 2,
            min: 0,
            max: Some(0),
            supported_names: Vec::new(),
        }
        .to_string();
        assert_eq!(msg, "Expected no arguments but has received 2.");

        let msg = Error::ArgumentCount {
            callable: None,
            actual: 0,
            min: 1,
            max: Some(1),
            supported_names: Vec::new(),
        }
        .to_string();
        assert_eq!(msg, "Expected 1 argument but has received none.");

        let msg = Error::ArgumentCount {
            callable: None,
            actual: 9,
            min: 1,
            max: Some(4),
            supported_names: Vec::new(),
        }
        .to_string();
        assert_eq!(msg, "Expected 1 to 4 arguments but has received 9.");

        let msg = Error::ArgumentCount {
            callable: None,
            actual: 0,
            min: 2,
            max: None,
            supported_names: Vec::new(),
        }
        .to_string();
        assert_eq!(msg, "Expected 2 or more (unlimited) arguments but has received none.");
    }

    #[test]
    fn argument_ref_messages() {
        let msg = Error::MissingArgument { callable: None, arg: ArgRef::Positional(1) }
            .to_string();
        assert_eq!(msg, "The 2nd argument can't be omitted or null.");

        let msg = Error::MissingArgument {
            callable: None,
            arg: ArgRef::Named("x".into()),
        }
        .to_string();
        assert_eq!(msg, "The \"x\" argument can't be omitted or null.");

        let msg = Error::ArgumentType {
            callable: None,
            arg: ArgRef::Positional(0),
            expected: "string",
            actual: "number".into(),
        }
        .to_string();
        assert_eq!(msg, "The 1st argument should be a string, but was a number.");

        let msg = Error::MissingArgument { callable: None, arg: ArgRef::PositionalVarargs }
            .to_string();
        assert_eq!(msg, "The positional varargs argument can't be omitted or null.");
    }

    #[test]
    fn unknown_parameter_message() {
        let msg = Error::UnknownParameter {
            callable: None,
            name: "colr".into(),
            supported_names: vec!["color".into(), "size".into()],
        }
        .to_string();
        assert_eq!(
            msg,
            "This callable has no parameter that's passed by name and is called \"colr\". \
            The supported parameter names are: \"color\", \"size\"",
        );
    }

    #[test]
    fn callable_identity_in_messages() {
        let msg = Error::ArgumentCount {
            callable: Some(CallableRef::Function("pad".into())),
            actual: 1,
            min: 2,
            max: Some(3),
            supported_names: Vec::new(),
        }
        .to_string();
        assert_eq!(
            msg,
            "When calling function \"pad\": Expected 2 or 3 arguments but has received 1.",
        );

        let msg = Error::MissingArgument {
            callable: Some(CallableRef::Directive("list".into())),
            arg: ArgRef::Positional(0),
        }
        .to_string();
        assert_eq!(
            msg,
            "When calling directive \"list\": The 1st argument can't be omitted or null.",
        );
    }

    #[test]
    fn for_callable_attaches_once() {
        let id = CallableRef::Function("pad".into());
        let err = Error::MissingArgument { callable: None, arg: ArgRef::Varargs }
            .for_callable(&id);
        let Error::MissingArgument { callable, .. } = &err else { panic!("wrong kind") };
        assert_eq!(callable.as_ref(), Some(&id));

        // an identity set closer to the call site wins
        let outer = CallableRef::Function("outer".into());
        let err = err.for_callable(&outer);
        let Error::MissingArgument { callable, .. } = &err else { panic!("wrong kind") };
        assert_eq!(callable.as_ref(), Some(&id));

        // other kinds pass through untouched
        assert!(matches!(
            Error::Interrupted.for_callable(&id),
            Error::Interrupted,
        ));
    }

    #[test]
    fn ordinals() {
        let ords: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 101]
            .iter()
            .map(|n| Ordinal(*n).to_string())
            .collect();
        assert_eq!(
            ords,
            ["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "101st"],
        );
    }

    #[test]
    fn articles() {
        assert_eq!(article("string"), "a");
        assert_eq!(article("extended hash"), "an");
    }

    #[test]
    fn recovery_bypass() {
        assert!(Error::Interrupted.bypasses_recovery());
        assert!(!Error::MissingArgument { callable: None, arg: ArgRef::Varargs }
            .bypasses_recovery());
    }
}
