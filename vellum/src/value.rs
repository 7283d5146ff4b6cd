//! The template value model.
use crate::args::{Callable, Directive};
use crate::format::MarkupModel;
use crate::unwrap::Unwrapped;
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, OnceLock};
use vellum_core::Number;

/// Insertion ordered key-value pairs, the in-memory shape of a hash.
pub type Pairs = Vec<(String, Value)>;

/// A template value.
///
/// Compound values sit behind an [`Arc`], so cloning a `Value` is always
/// cheap. The closed variants cover everything templates produce
/// themselves; [`Value::Object`] is the escape hatch for adapted host
/// values, which may claim several capabilities at once.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    Str(Arc<str>),
    #[cfg(feature = "time")]
    DateTime(time::OffsetDateTime),
    Seq(Arc<[Value]>),
    Hash(Arc<Pairs>),
    Markup(Arc<MarkupModel>),
    Function(Arc<dyn Callable>),
    Directive(Arc<dyn Directive>),
    Object(Arc<dyn ObjectValue>),
}

/// What a value can act as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Scalar,
    Number,
    Bool,
    Date,
    Sequence,
    /// Values by index but no known length, only iteration.
    Iterable,
    /// Values by key.
    Hash,
    /// A hash that can also enumerate its entries.
    EnumerableHash,
    Markup,
    Function,
    Directive,
}

/// An adapted host value.
///
/// Implementations opt into capabilities by overriding the accessors;
/// [`ObjectValue::has_capability`] must agree with what the accessors
/// actually return.
pub trait ObjectValue: Send + Sync {
    fn has_capability(&self, capability: Capability) -> bool;

    /// Type name for diagnostics, like `"string+hash"`.
    fn type_description(&self) -> String;

    /// The native value an adapter stands for, handed back verbatim by
    /// deep unwrapping.
    fn as_native(&self) -> Option<Unwrapped> {
        None
    }

    fn as_str(&self) -> Option<Cow<'_, str>> {
        None
    }

    fn as_number(&self) -> Option<Number> {
        None
    }

    fn as_bool(&self) -> Option<bool> {
        None
    }

    #[cfg(feature = "time")]
    fn as_datetime(&self) -> Option<time::OffsetDateTime> {
        None
    }

    /// Indexed access, for the `Sequence` capability.
    fn as_seq(&self) -> Option<Vec<Value>> {
        None
    }

    /// Iteration without index access, for the `Iterable` capability.
    fn as_iterable(&self) -> Option<Vec<Value>> {
        None
    }

    /// Keyed lookup, for the `Hash` capability.
    fn get(&self, key: &str) -> Option<Value> {
        let _ = key;
        None
    }

    /// Entry enumeration, for the `EnumerableHash` capability.
    fn entries(&self) -> Option<Pairs> {
        None
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(_) => capability == Capability::Bool,
            Value::Number(_) => capability == Capability::Number,
            Value::Str(_) => capability == Capability::Scalar,
            #[cfg(feature = "time")]
            Value::DateTime(_) => capability == Capability::Date,
            Value::Seq(_) => {
                matches!(capability, Capability::Sequence | Capability::Iterable)
            }
            Value::Hash(_) => {
                matches!(capability, Capability::Hash | Capability::EnumerableHash)
            }
            Value::Markup(_) => capability == Capability::Markup,
            Value::Function(_) => capability == Capability::Function,
            Value::Directive(_) => capability == Capability::Directive,
            Value::Object(object) => object.has_capability(capability),
        }
    }

    /// Type name for diagnostics, like `"string"` or `"extended hash"`.
    pub fn type_description(&self) -> String {
        match self {
            Value::Null => "null".into(),
            Value::Bool(_) => "boolean".into(),
            Value::Number(_) => "number".into(),
            Value::Str(_) => "string".into(),
            #[cfg(feature = "time")]
            Value::DateTime(_) => "date-time".into(),
            Value::Seq(_) => "sequence".into(),
            Value::Hash(_) => "extended hash".into(),
            Value::Markup(model) => format!("markup output ({})", model.format_name()),
            Value::Function(_) => "function".into(),
            Value::Directive(_) => "directive".into(),
            Value::Object(object) => object.type_description(),
        }
    }

    /// String content, honoring the `Scalar` capability of objects.
    pub fn as_str(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Str(s) => Some(Cow::Borrowed(s)),
            Value::Object(object) => object.as_str(),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(n.clone()),
            Value::Object(object) => object.as_number(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Object(object) => object.as_bool(),
            _ => None,
        }
    }

    #[cfg(feature = "time")]
    pub fn as_datetime(&self) -> Option<time::OffsetDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            Value::Object(object) => object.as_datetime(),
            _ => None,
        }
    }

    /// Keyed lookup on hashes and hash-capable objects.
    pub fn get_key(&self, key: &str) -> Option<Value> {
        match self {
            Value::Hash(pairs) => {
                pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
            }
            Value::Object(object) => object.get(key),
            _ => None,
        }
    }

    /// Shared empty sequence.
    pub fn empty_seq() -> Value {
        static EMPTY: OnceLock<Arc<[Value]>> = OnceLock::new();
        Value::Seq(EMPTY.get_or_init(|| Vec::new().into()).clone())
    }

    /// Shared empty hash.
    pub fn empty_hash() -> Value {
        static EMPTY: OnceLock<Arc<Pairs>> = OnceLock::new();
        Value::Hash(EMPTY.get_or_init(|| Arc::new(Vec::new())).clone())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            #[cfg(feature = "time")]
            Value::DateTime(dt) => f.debug_tuple("DateTime").field(dt).finish(),
            Value::Seq(items) => f.debug_tuple("Seq").field(items).finish(),
            Value::Hash(pairs) => f.debug_tuple("Hash").field(pairs).finish(),
            Value::Markup(model) => f.debug_tuple("Markup").field(model).finish(),
            Value::Function(_) => f.write_str("Function(..)"),
            Value::Directive(_) => f.write_str("Directive(..)"),
            Value::Object(object) => {
                write!(f, "Object({})", object.type_description())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value.into())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(Number::Int(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::Long(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::Double(value))
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Seq(value.into())
    }
}

impl From<Pairs> for Value {
    fn from(value: Pairs) -> Self {
        Value::Hash(Arc::new(value))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn capabilities() {
        assert!(Value::from("x").has_capability(Capability::Scalar));
        assert!(!Value::from("x").has_capability(Capability::Number));
        assert!(Value::from(1).has_capability(Capability::Number));
        assert!(Value::from(vec![Value::Null]).has_capability(Capability::Iterable));
        assert!(Value::from(vec![("a".to_string(), Value::Null)])
            .has_capability(Capability::EnumerableHash));
        assert!(!Value::Null.has_capability(Capability::Scalar));
    }

    #[test]
    fn keyed_lookup() {
        let hash = Value::from(vec![
            ("a".to_string(), Value::from(1)),
            ("b".to_string(), Value::from(2)),
        ]);
        assert!(matches!(hash.get_key("b"), Some(Value::Number(Number::Int(2)))));
        assert!(hash.get_key("c").is_none());
        assert!(Value::from(1).get_key("a").is_none());
    }

    #[test]
    fn type_descriptions() {
        assert_eq!(Value::from("x").type_description(), "string");
        assert_eq!(Value::Null.type_description(), "null");
        assert_eq!(Value::empty_hash().type_description(), "extended hash");
    }

    #[test]
    fn shared_empties() {
        let (Value::Seq(a), Value::Seq(b)) = (Value::empty_seq(), Value::empty_seq())
        else {
            panic!("not a seq")
        };
        assert!(Arc::ptr_eq(&a, &b));
    }
}
