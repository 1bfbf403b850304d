#![warn(nonstandard_style, rust_2018_idioms, future_incompatible)]
//! C entry points for a fission kernel.
//!
//! `generate_glue!(MyKernel)` in the plugin crate exports every symbol the
//! host shim links against.
pub mod detail;

pub use fission_kernel;
pub use libc;
