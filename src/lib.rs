#![deny(warnings)]
#![deny(clippy::all, clippy::pedantic, clippy::perf, clippy::suspicious)] // Catch correctness + perf + suspicious patterns early.
#![deny(clippy::unwrap_used, clippy::expect_used)]

//! Type-and-layout core of the kiln ahead-of-time compiler.
//!
//! The front end hands this crate descriptors and a read-only class view;
//! the crate answers with IR structure layouts that are bit-exact for the
//! requested target, function types for every method reference, and the
//! ordered trampoline set that forms the linkage contract between
//! translation units.

pub mod classes;
pub mod descriptor;
pub mod error;
pub mod ir;
pub mod logging;
pub mod lower;
pub mod target;
pub mod trampoline;

pub use error::{Error, Result};
pub use target::Target;
