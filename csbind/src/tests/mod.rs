use crate::c_data::{CDeclaration, CHeaderData, CTypedef};
use crate::c_type::{CBuiltInNumericType, CType};
use crate::config::GeneratorOptions;
use crate::cs_generator::Generator;
use csbind_common::errors::Error;
use lazy_static::lazy_static;
use std::sync::{Mutex, MutexGuard};

mod c_parser;
mod commands;
mod enums;
mod type_map;

lazy_static! {
    /// Only one libclang instance may exist at a time.
    static ref CLANG_LOCK: Mutex<()> = Mutex::new(());
}

fn lock_clang() -> MutexGuard<'static, ()> {
    CLANG_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Returns true if `err` means that libclang is not installed.
fn is_clang_unavailable(err: &Error) -> bool {
    let unavailable = err.to_string().contains("failed to initialize libclang");
    if unavailable {
        eprintln!("libclang is not available, skipping test: {}", err);
    }
    unavailable
}

fn test_options() -> GeneratorOptions {
    GeneratorOptions::new("lib", "Lib")
}

fn numeric(t: CBuiltInNumericType) -> CType {
    CType::BuiltInNumeric(t)
}

fn typedef(name: &str, target: CType) -> CType {
    CType::new_typedef(name, target)
}

/// `typedef struct {name}Impl* {name};`
fn handle_declaration(name: &str) -> CDeclaration {
    CDeclaration::Typedef(CTypedef {
        name: name.to_string(),
        target: CType::new_pointer(
            false,
            CType::Record {
                name: format!("{}Impl", name),
            },
        ),
    })
}

fn header_data(declarations: Vec<CDeclaration>) -> CHeaderData {
    CHeaderData { declarations }
}

/// Generates all files and returns content of `file_name`.
fn generated_file(options: &GeneratorOptions, data: &CHeaderData, file_name: &str) -> String {
    let generator = Generator::new(options, data).unwrap();
    generator
        .generate_files()
        .unwrap()
        .into_iter()
        .find(|file| file.file_name == file_name)
        .unwrap_or_else(|| panic!("{} is not generated", file_name))
        .content
}
