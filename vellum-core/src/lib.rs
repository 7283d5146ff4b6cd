//! # Vellum Core
//!
//! Leaf utilities of the vellum template engine:
//!
//! - [`escape`], markup and literal escaping
//! - [`number`], numeric kinds and coercions
//! - [`KeyedIndexMap`], string keys to array indices
//! - [`safe_template_name`], template name checks
pub mod escape;
pub mod number;

mod keyed;
mod names;

pub use keyed::{DuplicateKeyError, KeyedIndexMap};
pub use names::{escape_identifier, safe_template_name};
pub use number::{Number, NumberError};
