//! Utility types and functions used by the `csbind` generator
//! that don't depend on libclang.

#![forbid(unsafe_code)]

pub mod errors;
pub mod file_utils;
pub mod string_utils;
pub mod target;
pub mod utils;

pub use toml;

#[cfg(test)]
mod tests;
