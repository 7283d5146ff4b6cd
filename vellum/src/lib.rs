//! vellum template runtime
mod args;
mod cache;
mod env;
mod error;
mod interrupt;
mod truncate;
mod unwrap;
mod value;
mod write;

pub mod format;

pub use args::{
    bind, call, check_argument_count, get_bool_argument, get_int_argument,
    get_number_argument, get_optional_bool_argument, get_optional_int_argument,
    get_optional_number_argument, get_optional_string_argument, get_string_argument,
    ArgumentArrayLayout, Callable, Directive,
};
pub use cache::BoundedCache;
pub use env::Environment;
pub use error::{ArgRef, CallableRef, Error, Result};
pub use interrupt::InterruptionFlag;
pub use truncate::{Terminator, TruncateAlgorithm, Truncated};
pub use unwrap::{deep_unwrap, deep_unwrap_strict, hash_union, Unwrapped};
pub use value::{Capability, ObjectValue, Pairs, Value};
pub use write::{FmtTemplWrite, TemplWrite, TemplWriteFmt};

pub use vellum_core::{
    escape, escape_identifier, safe_template_name, DuplicateKeyError, KeyedIndexMap,
    Number, NumberError,
};
