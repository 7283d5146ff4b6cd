//! Deep unwrapping and hash unions.
use crate::value::{Capability, ObjectValue, Pairs, Value};
use crate::{Error, Result};
use std::sync::{Arc, OnceLock};
use vellum_core::Number;

/// The native form of a deeply unwrapped [`Value`].
#[derive(Debug, Clone)]
pub enum Unwrapped {
    Null,
    Bool(bool),
    Number(Number),
    Str(String),
    #[cfg(feature = "time")]
    DateTime(time::OffsetDateTime),
    Seq(Vec<Unwrapped>),
    Map(Vec<(String, Unwrapped)>),
    /// A value no rule applied to, handed back as-is (permissive mode
    /// only).
    Value(Value),
}

/// Recursively converts a value into its native form.
///
/// Values nothing applies to come back as [`Unwrapped::Value`]; see
/// [`deep_unwrap_strict`] for the failing variant.
pub fn deep_unwrap(value: &Value) -> Result<Unwrapped> {
    unwrap_value(value, true)
}

/// Like [`deep_unwrap`], but a value no rule applies to is an error.
pub fn deep_unwrap_strict(value: &Value) -> Result<Unwrapped> {
    unwrap_value(value, false)
}

// The capability checks run in a fixed order, so a value claiming
// several capabilities unwraps predictably: native object, null, string,
// number, date, boolean, sequence, iterable, enumerable hash.
fn unwrap_value(value: &Value, permissive: bool) -> Result<Unwrapped> {
    if let Value::Object(object) = value {
        if let Some(native) = object.as_native() {
            return Ok(native);
        }
    }
    if value.is_null() {
        return Ok(Unwrapped::Null);
    }
    if let Some(content) = value.as_str() {
        return Ok(Unwrapped::Str(content.into_owned()));
    }
    if let Some(number) = value.as_number() {
        return Ok(Unwrapped::Number(number));
    }
    #[cfg(feature = "time")]
    if let Some(datetime) = value.as_datetime() {
        return Ok(Unwrapped::DateTime(datetime));
    }
    if let Some(flag) = value.as_bool() {
        return Ok(Unwrapped::Bool(flag));
    }
    match value {
        Value::Seq(items) => return unwrap_seq(items, permissive),
        Value::Hash(pairs) => return unwrap_map(pairs.iter().cloned(), permissive),
        Value::Object(object) => {
            if let Some(items) = object.as_seq() {
                return unwrap_seq(&items, permissive);
            }
            if let Some(items) = object.as_iterable() {
                return unwrap_seq(&items, permissive);
            }
            if let Some(entries) = object.entries() {
                return unwrap_map(entries.into_iter(), permissive);
            }
        }
        _ => {}
    }
    if permissive {
        Ok(Unwrapped::Value(value.clone()))
    } else {
        Err(Error::CannotUnwrap { type_description: value.type_description() })
    }
}

fn unwrap_seq(items: &[Value], permissive: bool) -> Result<Unwrapped> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(unwrap_value(item, permissive)?);
    }
    Ok(Unwrapped::Seq(out))
}

fn unwrap_map(
    entries: impl Iterator<Item = (String, Value)>,
    permissive: bool,
) -> Result<Unwrapped> {
    let mut out = Vec::new();
    for (key, value) in entries {
        out.push((key, unwrap_value(&value, permissive)?));
    }
    Ok(Unwrapped::Map(out))
}

/// Joins hash values into one view where later sources win.
///
/// Null sources are skipped; a non-hash source fails. No sources give
/// the shared empty hash, a single source is returned as-is. The union
/// enumerates entries only when every source can; the joined entry list
/// keeps the position of a key's first appearance with its last value,
/// and is computed lazily once.
pub fn hash_union(sources: Vec<Value>) -> Result<Value> {
    let mut hashes = Vec::with_capacity(sources.len());
    for source in sources {
        if source.is_null() {
            continue;
        }
        if !source.has_capability(Capability::Hash) {
            return Err(Error::NotAHash {
                type_description: source.type_description(),
            });
        }
        hashes.push(source);
    }
    match hashes.len() {
        0 => Ok(Value::empty_hash()),
        1 => Ok(hashes.swap_remove(0)),
        _ => Ok(Value::Object(Arc::new(HashUnion {
            sources: hashes,
            joined: OnceLock::new(),
        }))),
    }
}

struct HashUnion {
    sources: Vec<Value>,
    /// `None` inside means some source can't enumerate.
    joined: OnceLock<Option<Pairs>>,
}

impl HashUnion {
    fn joined(&self) -> Option<&Pairs> {
        self.joined.get_or_init(|| self.join()).as_ref()
    }

    fn join(&self) -> Option<Pairs> {
        let mut out: Pairs = Vec::new();
        for source in &self.sources {
            let entries = match source {
                Value::Hash(pairs) => (**pairs).clone(),
                Value::Object(object) => object.entries()?,
                _ => return None,
            };
            for (key, value) in entries {
                match out.iter_mut().find(|(existing, _)| *existing == key) {
                    Some(slot) => slot.1 = value,
                    None => out.push((key, value)),
                }
            }
        }
        Some(out)
    }
}

impl ObjectValue for HashUnion {
    fn has_capability(&self, capability: Capability) -> bool {
        match capability {
            Capability::Hash => true,
            Capability::EnumerableHash => self
                .sources
                .iter()
                .all(|source| source.has_capability(Capability::EnumerableHash)),
            _ => false,
        }
    }

    fn type_description(&self) -> String {
        "hash union".to_string()
    }

    fn get(&self, key: &str) -> Option<Value> {
        // a null entry doesn't shadow earlier sources
        self.sources
            .iter()
            .rev()
            .find_map(|source| source.get_key(key).filter(|value| !value.is_null()))
    }

    fn entries(&self) -> Option<Pairs> {
        self.joined().cloned()
    }
}
