//! C# code generator.
//!
//! Emits one file per declaration kind: `Constants.cs`, `Enums.cs`,
//! `Handles.cs`, `Structs.cs`, `Commands.cs` and, if a library loader
//! is requested, `Library.cs`. All type renames are registered in
//! the `TypeMap` before any file is written, so references resolve
//! the same way regardless of declaration order.

use crate::c_data::{CHeaderData, CRecord, CTypedef, CVariable};
use crate::c_type::{CFunctionPointerType, CType};
use crate::code_writer::FileHeader;
use crate::config::GeneratorOptions;
use crate::overrides::has_bitmask_suffix;
use crate::type_map::TypeMap;
use csbind_common::errors::{Result, ResultExt};
use csbind_common::file_utils::{create_dir_all, save_if_changed};
use csbind_common::string_utils::capitalize;
use csbind_common::utils::{group_in_order, MapIfOk};
use itertools::Itertools;
use log::{debug, info, trace};
use std::collections::HashSet;
use std::path::Path;

mod commands;
mod constants;
mod enums;
mod handles;
mod library;
mod structs;

pub use self::commands::normalize_parameter_name;
pub use self::constants::ConstantInference;
pub use self::enums::{common_item_prefix, enum_item_name, render_expression};

/// A generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub file_name: &'static str,
    pub content: String,
}

/// Removes `prefix` from `name` and capitalizes the rest.
/// Returns `None` if `name` doesn't start with `prefix`
/// or nothing is left after it.
fn remap_prefix(name: &str, prefix: Option<&str>) -> Option<String> {
    let prefix = prefix.filter(|p| !p.is_empty())?;
    let rest = name.strip_prefix(prefix)?;
    if rest.is_empty() {
        None
    } else {
        Some(capitalize(rest))
    }
}

/// Binding emitter for one target library.
pub struct Generator<'a> {
    options: &'a GeneratorOptions,
    data: &'a CHeaderData,
    type_map: TypeMap,
}

impl<'a> Generator<'a> {
    /// Creates a generator and registers names of all types
    /// that will be emitted.
    pub fn new(options: &'a GeneratorOptions, data: &'a CHeaderData) -> Result<Self> {
        let mut generator = Generator {
            options,
            data,
            type_map: TypeMap::new(),
        };
        generator.register_declarations()?;
        Ok(generator)
    }

    pub fn type_map(&self) -> &TypeMap {
        &self.type_map
    }

    fn register_declarations(&mut self) -> Result<()> {
        let data = self.data;
        for (c_name, cs_name) in self.options.type_name_mappings() {
            self.type_map.add_mapping(c_name.as_str(), cs_name.as_str());
        }
        for name in self.options.hand_written_types() {
            self.type_map.declare(name.as_str());
        }

        for (type_name, _) in self.flag_enum_groups() {
            let cs_name = self.enum_cs_name(&type_name)?;
            if cs_name != type_name {
                self.type_map.add_mapping(type_name.as_str(), cs_name.as_str());
            }
            self.type_map.declare(type_name);
            self.type_map.declare(cs_name);
        }

        let mut emitted_enums = HashSet::new();
        for c_enum in data.enums() {
            if c_enum.name.is_empty() {
                continue;
            }
            let cs_name = self.enum_cs_name(&c_enum.name)?;
            if cs_name != c_enum.name {
                self.type_map.add_mapping(c_enum.name.as_str(), cs_name.as_str());
            }
            self.type_map.declare(c_enum.name.as_str());
            self.type_map.declare(cs_name.as_str());
            emitted_enums.insert(c_enum.name.clone());
            emitted_enums.insert(cs_name);
        }

        let flags_typedefs = data
            .typedefs()
            .filter(|typedef| self.is_flags_alias(typedef, &emitted_enums))
            .map(|typedef| typedef.name.clone())
            .collect_vec();
        for name in flags_typedefs {
            if let Some(enum_name) = name.strip_suffix("Flags") {
                self.type_map.add_mapping(name.as_str(), enum_name);
            }
        }

        let handles = self
            .handle_typedefs()
            .map(|typedef| typedef.name.clone())
            .collect_vec();
        for name in handles {
            self.type_map.declare(name);
        }

        let records = self
            .emitted_records()
            .map(|record| record.name.clone())
            .collect_vec();
        for name in records {
            let cs_name = self.struct_cs_name(&name);
            if cs_name != name {
                self.type_map.add_mapping(name.as_str(), cs_name.as_str());
            }
            self.type_map.declare(name);
            self.type_map.declare(cs_name);
        }

        let callbacks = self
            .callback_typedefs()
            .map(|typedef| typedef.name.clone())
            .collect_vec();
        for name in callbacks {
            self.type_map.declare(name);
        }
        debug!("registered declarations of {}", self.options.name());
        Ok(())
    }

    /// `typedef ... XFlags` aliases mapped to the enum `X`.
    fn is_flags_alias(&self, typedef: &CTypedef, emitted_enums: &HashSet<String>) -> bool {
        let name = &typedef.name;
        if !name.ends_with("Flags") {
            return false;
        }
        if let Some(base) = self.options.flags_base_typedef() {
            if name.eq_ignore_ascii_case(base) {
                return false;
            }
        }
        if !typedef.target.is_primitive()
            || emitted_enums.contains(name)
            || self.type_map.is_declared(name)
            || self.type_map.has_mapping(name)
        {
            return false;
        }
        name.len() > "Flags".len()
    }

    /// C# name of enum `c_name`.
    fn enum_cs_name(&self, c_name: &str) -> Result<String> {
        let clean = self.type_map.resolve_name(c_name)?;
        Ok(remap_prefix(&clean, self.options.enum_prefix_remap()).unwrap_or(clean))
    }

    /// C# name of struct `c_name`.
    fn struct_cs_name(&self, c_name: &str) -> String {
        remap_prefix(c_name, self.options.struct_prefix_remap())
            .unwrap_or_else(|| c_name.to_string())
    }

    /// C# name of function `c_name`.
    fn function_cs_name(&self, c_name: &str) -> String {
        remap_prefix(c_name, self.options.function_prefix_remap())
            .unwrap_or_else(|| c_name.to_string())
    }

    /// Returns true if enum or flag type `name` is a bitmask.
    fn is_bitmask(&self, name: &str) -> bool {
        self.options.bitmask_enums().contains(name) || has_bitmask_suffix(name)
    }

    /// `static const` flag values grouped by their type name,
    /// in order of first appearance.
    fn flag_enum_groups(&self) -> Vec<(String, Vec<&'a CVariable>)> {
        let data = self.data;
        let variables = data
            .variables()
            .filter_map(|variable| match &variable.variable_type {
                CType::Typedef { name, .. } if self.is_bitmask(name) => {
                    Some((name.clone(), variable))
                }
                _ => None,
            })
            .collect_vec();
        group_in_order(variables, |(name, _)| name.clone())
            .into_iter()
            .map(|(name, items)| (name, items.into_iter().map(|(_, v)| v).collect_vec()))
            .collect()
    }

    /// Typedefs of pointers to records that are never defined.
    fn handle_typedefs(&self) -> impl Iterator<Item = &'a CTypedef> + '_ {
        let data = self.data;
        data.typedefs().filter(move |typedef| match &typedef.target {
            CType::Pointer { target, .. } => match target.without_typedefs() {
                CType::Record { name } => !name.is_empty() && data.find_record(name).is_none(),
                _ => false,
            },
            _ => false,
        })
    }

    /// `*Callback` typedefs of function pointers, except excluded ones.
    fn callback_typedefs(&self) -> impl Iterator<Item = &'a CTypedef> + '_ {
        let options = self.options;
        self.data.typedefs().filter(move |typedef| {
            typedef.name.ends_with("Callback")
                && !options.exclude_callbacks().contains(&typedef.name)
                && typedef.target.without_typedefs().is_function_pointer()
        })
    }

    /// Records emitted as structs, without duplicates.
    fn emitted_records(&self) -> impl Iterator<Item = &'a CRecord> + '_ {
        let options = self.options;
        let mut seen = HashSet::new();
        self.data.records().filter(move |record| {
            if record.name.is_empty() || record.size == 0 || record.name.ends_with("_T") {
                trace!("skipping record: {:?}", record.name);
                return false;
            }
            if options.exclude_structs().contains(&record.name) {
                trace!("skipping excluded record: {}", record.name);
                return false;
            }
            seen.insert(record.name.clone())
        })
    }

    /// Signature of an unmanaged function pointer of type `function`.
    fn callback_signature(&self, function: &CFunctionPointerType) -> Result<String> {
        let substitute = |cs_type: String| -> String {
            self.options
                .callback_type_substitutions()
                .get(&cs_type)
                .cloned()
                .unwrap_or(cs_type)
        };
        let mut types = function
            .arguments
            .iter()
            .map_if_ok(|argument| self.type_map.cs_type_name(&argument.parameter_type))?
            .into_iter()
            .map(&substitute)
            .collect_vec();
        types.push(substitute(
            self.type_map.cs_type_name(&function.return_type)?,
        ));
        Ok(format!("delegate* unmanaged<{}>", types.join(", ")))
    }

    fn file_header<'h>(&'h self, usings: &'h [&'h str]) -> FileHeader<'h> {
        FileHeader {
            namespace: self.options.namespace(),
            usings,
            enable_nullable: false,
            pragma: None,
        }
    }

    /// Generates content of all files.
    pub fn generate_files(&self) -> Result<Vec<GeneratedFile>> {
        let mut files = vec![
            GeneratedFile {
                file_name: "Constants.cs",
                content: self.generate_constants()?.finish(),
            },
            GeneratedFile {
                file_name: "Enums.cs",
                content: self.generate_enums()?.finish(),
            },
            GeneratedFile {
                file_name: "Handles.cs",
                content: self.generate_handles()?.finish(),
            },
            GeneratedFile {
                file_name: "Structs.cs",
                content: self.generate_structs()?.finish(),
            },
            GeneratedFile {
                file_name: "Commands.cs",
                content: self.generate_commands()?.finish(),
            },
        ];
        if self.options.generate_library_loader() {
            files.push(GeneratedFile {
                file_name: "Library.cs",
                content: self.generate_library()?.finish(),
            });
        }
        Ok(files)
    }

    /// Writes all files to `output_dir`. Files with unchanged content are
    /// not rewritten. Returns the number of written files.
    pub fn generate(&self, output_dir: &Path) -> Result<usize> {
        info!(
            "Generating bindings for {} in {}",
            self.options.name(),
            output_dir.display()
        );
        create_dir_all(output_dir)?;
        let mut written = 0;
        for file in self.generate_files()? {
            let path = output_dir.join(file.file_name);
            if save_if_changed(&path, &file.content)
                .with_context(|_| format!("failed to save {}", path.display()))?
            {
                info!("Generated: {}", path.display());
                written += 1;
            } else {
                debug!("Unchanged: {}", path.display());
            }
        }
        info!("{}: {} file(s) written", self.options.name(), written);
        Ok(written)
    }
}
