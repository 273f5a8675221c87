//! Interface for configuring the generator.

use csbind_common::errors::{bail, Result};
use csbind_common::file_utils::load_toml;
use serde_derive::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Default value of a parameter of matching functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDefault {
    /// Applies to functions whose name ends with this suffix
    pub function_suffix: String,
    /// Parameter name after normalization (`pOffset` is `offset`)
    pub parameter: String,
    /// C# expression of the default value
    pub value: String,
}

impl ParameterDefault {
    pub fn new(function_suffix: &str, parameter: &str, value: &str) -> Self {
        ParameterDefault {
            function_suffix: function_suffix.to_string(),
            parameter: parameter.to_string(),
            value: value.to_string(),
        }
    }
}

/// Emitted form of a constant whose macro value can't be
/// translated from its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantOverride {
    /// `const` or `static readonly`
    #[serde(default = "default_constant_modifier")]
    pub modifier: String,
    pub cs_type: String,
    pub value: String,
}

fn default_constant_modifier() -> String {
    "const".to_string()
}

impl ConstantOverride {
    pub fn new(cs_type: &str, value: &str) -> Self {
        ConstantOverride {
            modifier: default_constant_modifier(),
            cs_type: cs_type.to_string(),
            value: value.to_string(),
        }
    }

    pub fn static_readonly(cs_type: &str, value: &str) -> Self {
        ConstantOverride {
            modifier: "static readonly".to_string(),
            cs_type: cs_type.to_string(),
            value: value.to_string(),
        }
    }
}

/// Options of generation for one native library.
///
/// Options are constructed once per library and stay read-only
/// while the bindings are emitted. They can be built in code
/// (see `lib_configs`) or loaded from a `[[library]]` table of a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Name of the target. Output goes to `Generated/<name>`.
    name: String,
    /// Headers to parse. Relative paths are resolved against the headers directory.
    headers: Vec<PathBuf>,
    /// Extra include directories
    include_paths: Vec<PathBuf>,
    /// Extra arguments passed to clang
    parser_arguments: Vec<String>,
    /// Directory of the emitted files
    output_path: PathBuf,
    /// Name of the static class holding constants and functions
    class_name: String,
    /// File-scoped namespace of the emitted files
    namespace: Option<String>,
    public_visibility: bool,
    generate_size_of_structs: bool,
    /// Name of the native library used in `LibraryImport` attributes
    library_name: Option<String>,
    /// Emit `Library.cs` with the native library resolver
    generate_library_loader: bool,

    enum_prefix_remap: Option<String>,
    struct_prefix_remap: Option<String>,
    function_prefix_remap: Option<String>,
    /// Keep C names of enumerators
    skip_enum_item_remap: bool,

    exclude_constants: BTreeSet<String>,
    exclude_functions: BTreeSet<String>,
    exclude_structs: BTreeSet<String>,
    exclude_callbacks: BTreeSet<String>,
    /// Functions that get an extra overload with `out` parameters
    out_return_functions: BTreeSet<String>,

    type_name_mappings: BTreeMap<String, String>,
    /// `function::parameter` to C# type
    function_parameters_remap: BTreeMap<String, String>,
    /// Extra names of bitmask enums
    bitmask_enums: BTreeSet<String>,
    /// Typedef all `*Flags` typedefs are based on
    flags_base_typedef: Option<String>,
    /// Types maintained by hand in C#, referenced by name
    hand_written_types: BTreeSet<String>,
    /// C type of length-delimited strings
    string_view_type: Option<String>,
    /// Functions with these suffixes get label overloads
    label_function_suffixes: Vec<String>,

    parameter_defaults: Vec<ParameterDefault>,
    constant_overrides: BTreeMap<String, ConstantOverride>,
    /// Field name (case-insensitive) to C# type
    field_type_overrides: BTreeMap<String, String>,
    /// Enumerator name after stripping to final name
    enum_item_renames: BTreeMap<String, String>,
    /// Types replaced in callback signatures
    callback_type_substitutions: BTreeMap<String, String>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            name: String::new(),
            headers: Vec::new(),
            include_paths: Vec::new(),
            parser_arguments: Vec::new(),
            output_path: PathBuf::new(),
            class_name: String::new(),
            namespace: None,
            public_visibility: true,
            generate_size_of_structs: false,
            library_name: None,
            generate_library_loader: false,
            enum_prefix_remap: None,
            struct_prefix_remap: None,
            function_prefix_remap: None,
            skip_enum_item_remap: false,
            exclude_constants: BTreeSet::new(),
            exclude_functions: BTreeSet::new(),
            exclude_structs: BTreeSet::new(),
            exclude_callbacks: BTreeSet::new(),
            out_return_functions: BTreeSet::new(),
            type_name_mappings: BTreeMap::new(),
            function_parameters_remap: BTreeMap::new(),
            bitmask_enums: BTreeSet::new(),
            flags_base_typedef: None,
            hand_written_types: BTreeSet::new(),
            string_view_type: None,
            label_function_suffixes: Vec::new(),
            parameter_defaults: Vec::new(),
            constant_overrides: BTreeMap::new(),
            field_type_overrides: BTreeMap::new(),
            enum_item_renames: BTreeMap::new(),
            callback_type_substitutions: BTreeMap::new(),
        }
    }
}

fn into_strings<I, S>(items: I) -> impl Iterator<Item = String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into)
}

impl GeneratorOptions {
    /// Creates options for target `name` with all other options set to defaults.
    /// `class_name` is also used as the namespace.
    pub fn new<S1: Into<String>, S2: Into<String>>(name: S1, class_name: S2) -> Self {
        let class_name = class_name.into();
        GeneratorOptions {
            name: name.into(),
            namespace: Some(class_name.clone()),
            class_name,
            ..GeneratorOptions::default()
        }
    }

    /// Checks that the options are complete.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            bail!("target name is not set");
        }
        if self.class_name.is_empty() {
            bail!("class name is not set for {}", self.name);
        }
        if self.headers.is_empty() {
            bail!("no headers specified for {}", self.name);
        }
        if self.generate_library_loader && self.library_name.is_none() {
            bail!(
                "library loader is requested for {} but library name is not set",
                self.name
            );
        }
        Ok(())
    }

    /// Makes relative header and include paths absolute using `headers_dir`.
    /// If no include paths are set, directories of the headers are used.
    pub fn resolve_paths(&mut self, headers_dir: &Path) {
        for header in &mut self.headers {
            if header.is_relative() {
                *header = headers_dir.join(&header);
            }
        }
        for path in &mut self.include_paths {
            if path.is_relative() {
                *path = headers_dir.join(&path);
            }
        }
        if self.include_paths.is_empty() {
            for header in &self.headers {
                if let Some(parent) = header.parent() {
                    let parent = parent.to_path_buf();
                    if !self.include_paths.contains(&parent) {
                        self.include_paths.push(parent);
                    }
                }
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[PathBuf] {
        &self.headers
    }
    pub fn add_header<P: Into<PathBuf>>(&mut self, path: P) {
        self.headers.push(path.into());
    }

    pub fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }
    pub fn add_include_path<P: Into<PathBuf>>(&mut self, path: P) {
        self.include_paths.push(path.into());
    }

    pub fn parser_arguments(&self) -> &[String] {
        &self.parser_arguments
    }
    pub fn add_parser_arguments<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parser_arguments.extend(into_strings(args));
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
    pub fn set_output_path<P: Into<PathBuf>>(&mut self, path: P) {
        self.output_path = path.into();
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_ref().map(String::as_str)
    }
    pub fn set_namespace(&mut self, namespace: Option<&str>) {
        self.namespace = namespace.map(str::to_string);
    }

    pub fn public_visibility(&self) -> bool {
        self.public_visibility
    }
    pub fn set_public_visibility(&mut self, value: bool) {
        self.public_visibility = value;
    }
    /// `public` or `internal`
    pub fn visibility(&self) -> &'static str {
        if self.public_visibility {
            "public"
        } else {
            "internal"
        }
    }

    pub fn generate_size_of_structs(&self) -> bool {
        self.generate_size_of_structs
    }
    pub fn set_generate_size_of_structs(&mut self, value: bool) {
        self.generate_size_of_structs = value;
    }

    pub fn library_name(&self) -> Option<&str> {
        self.library_name.as_ref().map(String::as_str)
    }
    pub fn set_library_name(&mut self, name: &str) {
        self.library_name = Some(name.to_string());
    }

    pub fn generate_library_loader(&self) -> bool {
        self.generate_library_loader
    }
    pub fn set_generate_library_loader(&mut self, value: bool) {
        self.generate_library_loader = value;
    }

    pub fn enum_prefix_remap(&self) -> Option<&str> {
        self.enum_prefix_remap.as_ref().map(String::as_str)
    }
    pub fn set_enum_prefix_remap(&mut self, prefix: &str) {
        self.enum_prefix_remap = Some(prefix.to_string());
    }

    pub fn struct_prefix_remap(&self) -> Option<&str> {
        self.struct_prefix_remap.as_ref().map(String::as_str)
    }
    pub fn set_struct_prefix_remap(&mut self, prefix: &str) {
        self.struct_prefix_remap = Some(prefix.to_string());
    }

    pub fn function_prefix_remap(&self) -> Option<&str> {
        self.function_prefix_remap.as_ref().map(String::as_str)
    }
    pub fn set_function_prefix_remap(&mut self, prefix: &str) {
        self.function_prefix_remap = Some(prefix.to_string());
    }

    pub fn skip_enum_item_remap(&self) -> bool {
        self.skip_enum_item_remap
    }
    pub fn set_skip_enum_item_remap(&mut self, value: bool) {
        self.skip_enum_item_remap = value;
    }

    pub fn exclude_constants(&self) -> &BTreeSet<String> {
        &self.exclude_constants
    }
    pub fn add_exclude_constants<I: IntoIterator<Item = S>, S: Into<String>>(&mut self, items: I) {
        self.exclude_constants.extend(into_strings(items));
    }

    pub fn exclude_functions(&self) -> &BTreeSet<String> {
        &self.exclude_functions
    }
    pub fn add_exclude_functions<I: IntoIterator<Item = S>, S: Into<String>>(&mut self, items: I) {
        self.exclude_functions.extend(into_strings(items));
    }

    pub fn exclude_structs(&self) -> &BTreeSet<String> {
        &self.exclude_structs
    }
    pub fn add_exclude_structs<I: IntoIterator<Item = S>, S: Into<String>>(&mut self, items: I) {
        self.exclude_structs.extend(into_strings(items));
    }

    pub fn exclude_callbacks(&self) -> &BTreeSet<String> {
        &self.exclude_callbacks
    }
    pub fn add_exclude_callbacks<I: IntoIterator<Item = S>, S: Into<String>>(&mut self, items: I) {
        self.exclude_callbacks.extend(into_strings(items));
    }

    pub fn out_return_functions(&self) -> &BTreeSet<String> {
        &self.out_return_functions
    }
    pub fn add_out_return_functions<I: IntoIterator<Item = S>, S: Into<String>>(
        &mut self,
        items: I,
    ) {
        self.out_return_functions.extend(into_strings(items));
    }

    pub fn type_name_mappings(&self) -> &BTreeMap<String, String> {
        &self.type_name_mappings
    }
    pub fn add_type_name_mapping(&mut self, c_name: &str, cs_name: &str) {
        self.type_name_mappings
            .insert(c_name.to_string(), cs_name.to_string());
    }

    pub fn function_parameters_remap(&self) -> &BTreeMap<String, String> {
        &self.function_parameters_remap
    }
    /// Sets C# type of parameter `parameter` of function `function`.
    pub fn add_function_parameter_remap(&mut self, function: &str, parameter: &str, cs_type: &str) {
        self.function_parameters_remap
            .insert(format!("{}::{}", function, parameter), cs_type.to_string());
    }

    pub fn bitmask_enums(&self) -> &BTreeSet<String> {
        &self.bitmask_enums
    }
    pub fn add_bitmask_enums<I: IntoIterator<Item = S>, S: Into<String>>(&mut self, items: I) {
        self.bitmask_enums.extend(into_strings(items));
    }

    pub fn flags_base_typedef(&self) -> Option<&str> {
        self.flags_base_typedef.as_ref().map(String::as_str)
    }
    pub fn set_flags_base_typedef(&mut self, name: &str) {
        self.flags_base_typedef = Some(name.to_string());
    }

    pub fn hand_written_types(&self) -> &BTreeSet<String> {
        &self.hand_written_types
    }
    pub fn add_hand_written_types<I: IntoIterator<Item = S>, S: Into<String>>(
        &mut self,
        items: I,
    ) {
        self.hand_written_types.extend(into_strings(items));
    }

    pub fn string_view_type(&self) -> Option<&str> {
        self.string_view_type.as_ref().map(String::as_str)
    }
    pub fn set_string_view_type(&mut self, name: &str) {
        self.string_view_type = Some(name.to_string());
    }

    pub fn label_function_suffixes(&self) -> &[String] {
        &self.label_function_suffixes
    }
    pub fn add_label_function_suffixes<I: IntoIterator<Item = S>, S: Into<String>>(
        &mut self,
        items: I,
    ) {
        self.label_function_suffixes.extend(into_strings(items));
    }

    pub fn parameter_defaults(&self) -> &[ParameterDefault] {
        &self.parameter_defaults
    }
    pub fn add_parameter_default(&mut self, function_suffix: &str, parameter: &str, value: &str) {
        self.parameter_defaults
            .push(ParameterDefault::new(function_suffix, parameter, value));
    }
    /// Returns default value of `parameter` of function `function_name`, if any.
    pub fn parameter_default(&self, function_name: &str, parameter: &str) -> Option<&str> {
        self.parameter_defaults
            .iter()
            .find(|d| d.parameter == parameter && function_name.ends_with(&d.function_suffix))
            .map(|d| d.value.as_str())
    }

    pub fn constant_overrides(&self) -> &BTreeMap<String, ConstantOverride> {
        &self.constant_overrides
    }
    pub fn add_constant_override(&mut self, name: &str, value: ConstantOverride) {
        self.constant_overrides.insert(name.to_string(), value);
    }

    pub fn field_type_overrides(&self) -> &BTreeMap<String, String> {
        &self.field_type_overrides
    }
    pub fn add_field_type_override(&mut self, field_name: &str, cs_type: &str) {
        self.field_type_overrides
            .insert(field_name.to_string(), cs_type.to_string());
    }
    /// Returns C# type forced for fields named `field_name` (case-insensitive).
    pub fn field_type_override(&self, field_name: &str) -> Option<&str> {
        self.field_type_overrides
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(field_name))
            .map(|(_, cs_type)| cs_type.as_str())
    }

    pub fn enum_item_renames(&self) -> &BTreeMap<String, String> {
        &self.enum_item_renames
    }
    pub fn add_enum_item_rename(&mut self, name: &str, new_name: &str) {
        self.enum_item_renames
            .insert(name.to_string(), new_name.to_string());
    }

    pub fn callback_type_substitutions(&self) -> &BTreeMap<String, String> {
        &self.callback_type_substitutions
    }
    pub fn add_callback_type_substitution(&mut self, cs_type: &str, replacement: &str) {
        self.callback_type_substitutions
            .insert(cs_type.to_string(), replacement.to_string());
    }
}

/// Content of a TOML configuration file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub library: Vec<GeneratorOptions>,
}

/// Loads options of all targets from TOML file `path`.
pub fn load_config_file(path: &Path) -> Result<Vec<GeneratorOptions>> {
    let file: ConfigFile = load_toml(path)?;
    if file.library.is_empty() {
        bail!("no [[library]] tables in {}", path.display());
    }
    for options in &file.library {
        options.validate()?;
    }
    Ok(file.library)
}
