//! Translation of C type names to C# type names.

use crate::c_type::CType;
use crate::overrides::KNOWN_TYPE_NAME_MAPPINGS;
use csbind_common::errors::{bail, Result};
use itertools::Itertools;
use log::trace;
use std::collections::{HashMap, HashSet};

/// Mapping table of one generator run.
///
/// Entries may point to other entries (`WGPUTextureUsageFlags` ->
/// `WGPUTextureUsage` -> `TextureUsage`). Names declared with `declare`
/// are emitted by the generator or written by hand and are used
/// as is instead of being resolved through their typedef.
#[derive(Debug, Clone)]
pub struct TypeMap {
    mappings: HashMap<String, String>,
    declared: HashSet<String>,
}

impl Default for TypeMap {
    fn default() -> Self {
        TypeMap::new()
    }
}

impl TypeMap {
    /// Creates a table with the built-in mappings only.
    pub fn new() -> Self {
        TypeMap {
            mappings: KNOWN_TYPE_NAME_MAPPINGS
                .iter()
                .map(|&(c_name, cs_name)| (c_name.to_string(), cs_name.to_string()))
                .collect(),
            declared: HashSet::new(),
        }
    }

    /// Maps `c_name` to `cs_name`, replacing any previous mapping.
    pub fn add_mapping<S1: Into<String>, S2: Into<String>>(&mut self, c_name: S1, cs_name: S2) {
        let c_name = c_name.into();
        let cs_name = cs_name.into();
        trace!("type mapping: {} -> {}", c_name, cs_name);
        self.mappings.insert(c_name, cs_name);
    }

    pub fn has_mapping(&self, c_name: &str) -> bool {
        self.mappings.contains_key(c_name)
    }

    /// Marks `name` as a type that exists in the C# output.
    pub fn declare<S: Into<String>>(&mut self, name: S) {
        self.declared.insert(name.into());
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.declared.contains(name)
    }

    /// Follows the mapping chain starting at `name` and returns its end.
    /// `PFN*` names resolve to `nint`.
    pub fn resolve_name(&self, name: &str) -> Result<String> {
        let mut chain = vec![name];
        let mut visited = HashSet::new();
        let mut current = name;
        loop {
            if !visited.insert(current) {
                bail!("type name mapping cycle: {}", chain.iter().join(" -> "));
            }
            match self.mappings.get(current) {
                Some(next) if next != current => {
                    chain.push(next.as_str());
                    current = next.as_str();
                }
                Some(_) => return Ok(current.to_string()),
                None => break,
            }
        }
        if current.starts_with("PFN") {
            return Ok("nint".to_string());
        }
        Ok(current.to_string())
    }

    /// Returns C# type name of `c_type`.
    pub fn cs_type_name(&self, c_type: &CType) -> Result<String> {
        Ok(match c_type {
            CType::Void => "void".to_string(),
            CType::BuiltInNumeric(t) => t.to_cs_code().to_string(),
            CType::Typedef { name, target } => {
                if self.has_mapping(name) || self.is_declared(name) {
                    self.resolve_name(name)?
                } else {
                    self.cs_type_name(target)?
                }
            }
            CType::Enum { name } => self.resolve_name(name)?,
            CType::Record { name } => {
                if name.is_empty() {
                    bail!("anonymous record types are not supported");
                }
                self.resolve_name(name)?
            }
            CType::Pointer { target, .. } => {
                let target = self.cs_type_name(target)?;
                if target == "nint" {
                    target
                } else {
                    format!("{}*", target)
                }
            }
            CType::Array { element, .. } => format!("{}*", self.cs_type_name(element)?),
            CType::FunctionPointer(_) => "nint".to_string(),
        })
    }
}
