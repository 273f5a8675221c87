//! Generator of C# interop bindings that parses C headers
//! with libclang and emits constants, enums, handle types,
//! struct layouts and function imports.

pub mod c_data;
pub mod c_parser;
pub mod c_type;
pub mod cli;
pub mod code_writer;
pub mod config;
pub mod cs_generator;
pub mod lib_configs;
pub mod overrides;
pub mod type_map;

#[cfg(test)]
mod tests;
