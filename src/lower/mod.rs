//! Managed-to-IR lowering.
//!
//! Maps class-file descriptors onto IR types, lays managed classes out as
//! physical structures for a target, and builds the function signatures of
//! compiled methods.

pub mod consts;
pub mod layout;
pub mod signatures;
pub mod types;
pub mod wellknown;

pub use consts::{field_ptr, offset_of, size_of};
pub use layout::{class_type, instance_fields, instance_type, static_fields, SortedField};
pub use signatures::{function_type, native_function_type};
pub use types::{
    descriptor_of, field_alignment, field_size, is_unsigned, local_type, storage_type,
};
