//! Callables and their argument passing.
use crate::error::{ArgRef, CallableRef};
use crate::value::{Pairs, Value};
use crate::write::TemplWrite;
use crate::{Error, Result};
use std::borrow::Cow;
use std::sync::OnceLock;
use vellum_core::{KeyedIndexMap, Number};

/// How a callable's arguments are laid out in the argument array.
///
/// The array starts with the predefined positional slots, then the
/// predefined named slots, then the positional varargs slot and the
/// named varargs slot when the callable has them. Each slot index is
/// used by exactly one of those roles.
#[derive(Debug, Clone)]
pub struct ArgumentArrayLayout {
    predefined_positional_count: usize,
    positional_varargs_index: Option<usize>,
    named: KeyedIndexMap,
    named_varargs_index: Option<usize>,
    total_len: usize,
}

impl ArgumentArrayLayout {
    /// Builds a layout from a ready named-argument map.
    ///
    /// The map's indices must fill the range right after the positional
    /// slots; a map built for another layout shape panics here.
    pub fn new(
        predefined_positional_count: usize,
        has_positional_varargs: bool,
        named: KeyedIndexMap,
        has_named_varargs: bool,
    ) -> Self {
        named.check_index_range(predefined_positional_count as i32);
        let mut total_len = predefined_positional_count + named.len();
        let positional_varargs_index = has_positional_varargs.then(|| {
            total_len += 1;
            total_len - 1
        });
        let named_varargs_index = has_named_varargs.then(|| {
            total_len += 1;
            total_len - 1
        });
        ArgumentArrayLayout {
            predefined_positional_count,
            positional_varargs_index,
            named,
            named_varargs_index,
            total_len,
        }
    }

    /// Builds a layout where the named slots follow `names` in order.
    pub fn with_names(
        predefined_positional_count: usize,
        has_positional_varargs: bool,
        names: &[&str],
        has_named_varargs: bool,
    ) -> Result<Self> {
        let named = KeyedIndexMap::of(names.iter().enumerate().map(|(i, name)| {
            (*name, (predefined_positional_count + i) as i32)
        }))?;
        Ok(Self::new(
            predefined_positional_count,
            has_positional_varargs,
            named,
            has_named_varargs,
        ))
    }

    /// The shared layout of callables that take nothing.
    pub fn parameterless() -> &'static ArgumentArrayLayout {
        static LAYOUT: OnceLock<ArgumentArrayLayout> = OnceLock::new();
        LAYOUT.get_or_init(|| {
            ArgumentArrayLayout::new(0, false, KeyedIndexMap::empty(), false)
        })
    }

    /// The shared layout of callables with one positional parameter.
    pub fn single_positional() -> &'static ArgumentArrayLayout {
        static LAYOUT: OnceLock<ArgumentArrayLayout> = OnceLock::new();
        LAYOUT.get_or_init(|| {
            ArgumentArrayLayout::new(1, false, KeyedIndexMap::empty(), false)
        })
    }

    pub fn predefined_positional_count(&self) -> usize {
        self.predefined_positional_count
    }

    pub fn positional_varargs_index(&self) -> Option<usize> {
        self.positional_varargs_index
    }

    pub fn named_varargs_index(&self) -> Option<usize> {
        self.named_varargs_index
    }

    pub fn named(&self) -> &KeyedIndexMap {
        &self.named
    }

    /// Length of the argument array [`bind`] produces.
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    /// How slot `index` is referred to in messages.
    pub fn arg_ref(&self, index: usize) -> ArgRef {
        if index < self.predefined_positional_count {
            ArgRef::Positional(index)
        } else if self.positional_varargs_index == Some(index) {
            ArgRef::PositionalVarargs
        } else if self.named_varargs_index == Some(index) {
            ArgRef::NamedVarargs
        } else {
            match self.named.key_of_value(index as i32) {
                Some(name) => ArgRef::Named(name.to_string()),
                None => ArgRef::Varargs,
            }
        }
    }
}

/// A value callable from expressions.
pub trait Callable: Send + Sync {
    fn layout(&self) -> &ArgumentArrayLayout;

    /// How argument errors name this callable; `None` leaves them
    /// without the "When calling ...:" prefix.
    fn identity(&self) -> Option<CallableRef> {
        None
    }

    /// `args` is laid out per [`Callable::layout`]; omitted arguments
    /// are `None`.
    fn call(&self, args: &[Option<Value>]) -> Result<Value>;
}

/// A value callable as a block directive, writing output itself.
pub trait Directive: Send + Sync {
    fn layout(&self) -> &ArgumentArrayLayout;

    /// See [`Callable::identity`].
    fn identity(&self) -> Option<CallableRef> {
        None
    }

    fn execute(&self, args: &[Option<Value>], out: &mut dyn TemplWrite) -> Result<()>;
}

/// Binds call-site arguments into a layout-shaped argument array.
///
/// Positional arguments past the predefined slots overflow into the
/// positional varargs sequence; named arguments the layout doesn't know
/// overflow into the named varargs hash. Either overflow without the
/// matching varargs slot is an error. Varargs slots that receive
/// nothing get the shared empty sequence or hash, never `None`.
pub fn bind(
    layout: &ArgumentArrayLayout,
    positional: Vec<Value>,
    named: Pairs,
) -> Result<Vec<Option<Value>>> {
    let predefined = layout.predefined_positional_count;
    if positional.len() > predefined && layout.positional_varargs_index.is_none() {
        return Err(Error::ArgumentCount {
            callable: None,
            actual: positional.len(),
            min: predefined,
            max: Some(predefined),
            supported_names: layout.named.keys().to_vec(),
        });
    }

    let mut args = vec![None; layout.total_len];
    let mut positional = positional.into_iter();
    for slot in args.iter_mut().take(predefined) {
        let Some(value) = positional.next() else { break };
        *slot = Some(value);
    }
    if let Some(index) = layout.positional_varargs_index {
        let rest: Vec<Value> = positional.collect();
        args[index] = Some(if rest.is_empty() {
            Value::empty_seq()
        } else {
            Value::Seq(rest.into())
        });
    }

    let mut named_varargs: Option<Pairs> = None;
    for (name, value) in named {
        let index = layout.named.get(&name);
        if index != -1 {
            args[index as usize] = Some(value);
        } else if layout.named_varargs_index.is_some() {
            named_varargs.get_or_insert_with(Vec::new).push((name, value));
        } else {
            return Err(Error::UnknownParameter {
                callable: None,
                name,
                supported_names: layout.named.keys().to_vec(),
            });
        }
    }
    if let Some(index) = layout.named_varargs_index {
        args[index] = Some(match named_varargs {
            Some(pairs) => Value::from(pairs),
            None => Value::empty_hash(),
        });
    }

    Ok(args)
}

/// Binds and invokes in one step; argument errors get the callable's
/// identity attached.
pub fn call(callable: &dyn Callable, positional: Vec<Value>, named: Pairs) -> Result<Value> {
    let out = bind(callable.layout(), positional, named)
        .and_then(|args| callable.call(&args));
    match (out, callable.identity()) {
        (Err(err), Some(id)) => Err(err.for_callable(&id)),
        (out, _) => out,
    }
}

/// Fails unless `actual` falls into `min ..= max` (`None` max meaning
/// unlimited), naming `callable` in the message when given.
pub fn check_argument_count(
    actual: usize,
    min: usize,
    max: Option<usize>,
    callable: Option<&CallableRef>,
) -> Result<()> {
    if actual >= min && max.is_none_or(|max| actual <= max) {
        Ok(())
    } else {
        Err(Error::ArgumentCount {
            callable: callable.cloned(),
            actual,
            min,
            max,
            supported_names: Vec::new(),
        })
    }
}

fn present<'a>(args: &'a [Option<Value>], index: usize) -> Option<&'a Value> {
    match args.get(index).and_then(Option::as_ref) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value),
    }
}

/// The string content of a required argument.
pub fn get_string_argument<'a>(
    args: &'a [Option<Value>],
    index: usize,
    layout: &ArgumentArrayLayout,
) -> Result<Cow<'a, str>> {
    match get_optional_string_argument(args, index, layout)? {
        Some(value) => Ok(value),
        None => Err(Error::MissingArgument { callable: None, arg: layout.arg_ref(index) }),
    }
}

/// The string content of an argument, `None` when omitted or null.
pub fn get_optional_string_argument<'a>(
    args: &'a [Option<Value>],
    index: usize,
    layout: &ArgumentArrayLayout,
) -> Result<Option<Cow<'a, str>>> {
    let Some(value) = present(args, index) else {
        return Ok(None);
    };
    match value.as_str() {
        Some(content) => Ok(Some(content)),
        None => Err(Error::ArgumentType {
            callable: None,
            arg: layout.arg_ref(index),
            expected: "string",
            actual: value.type_description(),
        }),
    }
}

/// The numeric content of a required argument.
pub fn get_number_argument(
    args: &[Option<Value>],
    index: usize,
    layout: &ArgumentArrayLayout,
) -> Result<Number> {
    match get_optional_number_argument(args, index, layout)? {
        Some(value) => Ok(value),
        None => Err(Error::MissingArgument { callable: None, arg: layout.arg_ref(index) }),
    }
}

/// The numeric content of an argument, `None` when omitted or null.
pub fn get_optional_number_argument(
    args: &[Option<Value>],
    index: usize,
    layout: &ArgumentArrayLayout,
) -> Result<Option<Number>> {
    let Some(value) = present(args, index) else {
        return Ok(None);
    };
    match value.as_number() {
        Some(number) => Ok(Some(number)),
        None => Err(Error::ArgumentType {
            callable: None,
            arg: layout.arg_ref(index),
            expected: "number",
            actual: value.type_description(),
        }),
    }
}

/// A required argument narrowed to `i32` without loss.
pub fn get_int_argument(
    args: &[Option<Value>],
    index: usize,
    layout: &ArgumentArrayLayout,
) -> Result<i32> {
    let number = get_number_argument(args, index, layout)?;
    Ok(number.to_i32_exact()?)
}

/// Like [`get_int_argument`], `None` when omitted or null.
pub fn get_optional_int_argument(
    args: &[Option<Value>],
    index: usize,
    layout: &ArgumentArrayLayout,
) -> Result<Option<i32>> {
    match get_optional_number_argument(args, index, layout)? {
        Some(number) => Ok(Some(number.to_i32_exact()?)),
        None => Ok(None),
    }
}

/// The boolean content of a required argument.
pub fn get_bool_argument(
    args: &[Option<Value>],
    index: usize,
    layout: &ArgumentArrayLayout,
) -> Result<bool> {
    match get_optional_bool_argument(args, index, layout)? {
        Some(value) => Ok(value),
        None => Err(Error::MissingArgument { callable: None, arg: layout.arg_ref(index) }),
    }
}

/// The boolean content of an argument, `None` when omitted or null.
pub fn get_optional_bool_argument(
    args: &[Option<Value>],
    index: usize,
    layout: &ArgumentArrayLayout,
) -> Result<Option<bool>> {
    let Some(value) = present(args, index) else {
        return Ok(None);
    };
    match value.as_bool() {
        Some(content) => Ok(Some(content)),
        None => Err(Error::ArgumentType {
            callable: None,
            arg: layout.arg_ref(index),
            expected: "boolean",
            actual: value.type_description(),
        }),
    }
}
