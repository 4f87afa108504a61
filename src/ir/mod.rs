//! Low-level typed IR carried between the managed front end and the native
//! code generator.
//!
//! The algebra is a closed set of value types ([`Type`]) plus the small
//! slice of constants and instructions the layout helpers emit. Layout
//! questions (store size, alloc size, alignment) are answered by
//! [`DataLayout`] for a fixed target triple.

pub mod data_layout;
pub mod function;
pub mod types;
pub mod value;

pub use data_layout::DataLayout;
pub use function::{FunctionBuilder, Inst, Variable};
pub use types::{FunctionType, StructRegistry, StructType, Type};
pub use value::{Constant, Value};
