//! Callback delegates and function imports.

use super::Generator;
use crate::c_data::{CFunction, CTypedef};
use crate::c_type::{CBuiltInNumericType, CFunctionPointerType, CParameter, CType};
use crate::code_writer::{CodeWriter, FileHeader};
use crate::overrides::escape_keyword;
use csbind_common::errors::{causes, Result};
use csbind_common::string_utils::capitalize;
use itertools::Itertools;
use log::{trace, warn};
use std::collections::HashSet;

/// Removes `p` prefixes of pointer parameters: `pDescriptor` is `descriptor`,
/// `ppData` is left unchanged.
fn strip_pointer_prefix(name: &str) -> String {
    let mut chars = name.chars();
    if let (Some('p'), Some(second)) = (chars.next(), chars.next()) {
        if second.is_ascii_uppercase() {
            return strip_pointer_prefix(&format!(
                "{}{}",
                second.to_ascii_lowercase(),
                chars.as_str()
            ));
        }
    }
    name.to_string()
}

/// C# name of a parameter named `name` in C.
pub fn normalize_parameter_name(name: &str) -> String {
    escape_keyword(&strip_pointer_prefix(name))
}

/// A parameter of an emitted method or delegate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsParameter {
    pub cs_type: String,
    pub name: String,
    pub is_out: bool,
    pub default: Option<String>,
}

impl CsParameter {
    fn to_cs_code(&self, marshal_bools: bool) -> String {
        let mut code = String::new();
        if marshal_bools && self.cs_type == "bool" {
            code.push_str("[MarshalAs(UnmanagedType.U1)] ");
        }
        if self.is_out {
            code.push_str("out ");
        }
        code.push_str(&self.cs_type);
        code.push(' ');
        code.push_str(&self.name);
        if let Some(default) = &self.default {
            code.push_str(" = ");
            code.push_str(default);
        }
        code
    }
}

fn parameter_list(parameters: &[CsParameter], marshal_bools: bool) -> String {
    parameters
        .iter()
        .map(|parameter| parameter.to_cs_code(marshal_bools))
        .join(", ")
}

/// Type of the last parameter of a function that gets label overloads.
enum LabelKind {
    /// Length-delimited string struct with the given C# name
    StringView(String),
    /// Null-terminated `const char*`
    CString,
}

impl Generator<'_> {
    /// Type a parameter of type `c_type` has as an `out` parameter, if it can be one.
    fn output_type(&self, c_type: &CType) -> Result<Option<String>> {
        if let CType::Pointer {
            is_const: false,
            target,
        } = c_type
        {
            let usable = match &**target {
                CType::Typedef { .. } | CType::Enum { .. } => true,
                CType::Record { name } => self
                    .data
                    .find_record(name)
                    .map_or(false, |record| record.size > 0),
                _ => false,
            };
            if usable {
                return Ok(Some(self.type_map.cs_type_name(target)?));
            }
        }
        Ok(None)
    }

    fn parameter_cs_type(&self, function_name: &str, parameter: &CParameter) -> Result<String> {
        let key = format!("{}::{}", function_name, parameter.name);
        if let Some(cs_type) = self.options.function_parameters_remap().get(&key) {
            return Ok(cs_type.clone());
        }
        if let Some(function) = parameter.parameter_type.typedef_function_pointer() {
            return self.callback_signature(function);
        }
        self.type_map.cs_type_name(&parameter.parameter_type)
    }

    /// Converts `parameters` of function `function_name`. Pointer parameters
    /// become `out` parameters if `use_out` is set.
    fn cs_parameters(
        &self,
        function_name: &str,
        parameters: &[CParameter],
        use_out: bool,
    ) -> Result<Vec<CsParameter>> {
        let mut result = Vec::new();
        for parameter in parameters {
            let output_type = if use_out {
                self.output_type(&parameter.parameter_type)?
            } else {
                None
            };
            result.push(CsParameter {
                is_out: output_type.is_some(),
                cs_type: match output_type {
                    Some(cs_type) => cs_type,
                    None => self.parameter_cs_type(function_name, parameter)?,
                },
                name: normalize_parameter_name(&parameter.name),
                default: None,
            });
        }
        Ok(result)
    }

    /// Sets default values of parameters of function `function_name`.
    /// Only a trailing run of parameters that all have defaults gets them.
    fn apply_defaults(&self, function_name: &str, parameters: &mut [CsParameter]) {
        let mut trailing = true;
        for parameter in parameters.iter_mut().rev() {
            let default = if parameter.is_out {
                None
            } else if parameter.cs_type == "nint" && parameter.name == "userdata" {
                Some("0".to_string())
            } else {
                self.options
                    .parameter_default(function_name, &parameter.name)
                    .map(str::to_string)
            };
            match default {
                Some(value) if trailing => parameter.default = Some(value),
                _ => trailing = false,
            }
        }
    }

    fn write_callback(
        &self,
        writer: &mut CodeWriter,
        typedef: &CTypedef,
        function: &CFunctionPointerType,
    ) -> Result<()> {
        let return_type = self.type_map.cs_type_name(&function.return_type)?;
        let parameters = self.cs_parameters(&typedef.name, &function.arguments, false)?;
        writer.write_line("[UnmanagedFunctionPointer(CallingConvention.Cdecl)]");
        writer.write_line(&format!(
            "{} unsafe delegate {} {}({});",
            self.options.visibility(),
            return_type,
            typedef.name,
            parameter_list(&parameters, false)
        ));
        Ok(())
    }

    fn label_kind(&self, function: &CFunction) -> Result<Option<LabelKind>> {
        if !function.return_type.is_void() {
            return Ok(None);
        }
        let last = match function.parameters.last() {
            Some(parameter) => parameter,
            None => return Ok(None),
        };
        let is_label = last.name.to_lowercase().ends_with("label")
            || self
                .options
                .label_function_suffixes()
                .iter()
                .any(|suffix| function.name.ends_with(suffix.as_str()));
        if !is_label {
            return Ok(None);
        }
        if let Some(string_view) = self.options.string_view_type() {
            let is_string_view = match &last.parameter_type {
                CType::Typedef { name, .. } | CType::Record { name } => name == string_view,
                _ => false,
            };
            if is_string_view {
                let cs_type = self.type_map.cs_type_name(&last.parameter_type)?;
                return Ok(Some(LabelKind::StringView(cs_type)));
            }
        }
        if let CType::Pointer {
            is_const: true,
            target,
        } = &last.parameter_type
        {
            if *target.without_typedefs() == CType::BuiltInNumeric(CBuiltInNumericType::Char) {
                return Ok(Some(LabelKind::CString));
            }
        }
        Ok(None)
    }

    /// Writes overloads taking the label as `ReadOnlySpan<byte>` and as `string?`.
    fn write_label_overloads(
        &self,
        writer: &mut CodeWriter,
        cs_name: &str,
        parameters: &[CsParameter],
        kind: &LabelKind,
    ) -> Result<()> {
        let (label, leading) = match parameters.split_last() {
            Some(split) => split,
            None => return Ok(()),
        };
        let leading = leading
            .iter()
            .map(|parameter| CsParameter {
                default: None,
                ..parameter.clone()
            })
            .collect_vec();
        let label_name = &label.name;
        let pointer_name = format!("p{}", capitalize(label_name.trim_start_matches('@')));
        let arguments = |last: String| -> String {
            leading
                .iter()
                .map(|parameter| parameter.name.clone())
                .chain(Some(last))
                .join(", ")
        };
        let with_label = |label: CsParameter| -> String {
            let mut all = leading.clone();
            all.push(label);
            parameter_list(&all, false)
        };

        let span_header = format!(
            "public static void {}({})",
            cs_name,
            with_label(CsParameter {
                cs_type: "ReadOnlySpan<byte>".to_string(),
                name: label_name.clone(),
                is_out: false,
                default: None,
            })
        );
        writer.block(&span_header, |writer| {
            writer.block(
                &format!("fixed (byte* {} = {})", pointer_name, label_name),
                |writer| {
                    let value = match kind {
                        LabelKind::StringView(cs_type) => {
                            format!("new {}({}, {}.Length)", cs_type, pointer_name, label_name)
                        }
                        LabelKind::CString => pointer_name.clone(),
                    };
                    writer.write_line(&format!("{}({});", cs_name, arguments(value)));
                    Ok(())
                },
            )
        })?;
        writer.empty_line();

        let string_header = format!(
            "public static void {}({})",
            cs_name,
            with_label(CsParameter {
                cs_type: "string?".to_string(),
                name: label_name.clone(),
                is_out: false,
                default: Some("default".to_string()),
            })
        );
        writer.block(&string_header, |writer| {
            let value = match kind {
                LabelKind::StringView(_) => {
                    format!("Encoding.UTF8.GetBytes({} ?? string.Empty)", label_name)
                }
                LabelKind::CString => format!(
                    "{0} is null ? ReadOnlySpan<byte>.Empty : Encoding.UTF8.GetBytes({0} + \"\\0\")",
                    label_name
                ),
            };
            writer.write_line(&format!("{}({});", cs_name, arguments(value)));
            Ok(())
        })
    }

    fn write_import(
        &self,
        writer: &mut CodeWriter,
        function: &CFunction,
        cs_name: &str,
        return_type: &str,
        parameters: &[CsParameter],
    ) {
        writer.write_line(&format!(
            "[LibraryImport(LibraryName, EntryPoint = \"{}\")]",
            function.name
        ));
        if return_type == "bool" {
            writer.write_line("[return: MarshalAs(UnmanagedType.U1)]");
        }
        writer.write_line(&format!(
            "public static partial {} {}({});",
            return_type,
            cs_name,
            parameter_list(parameters, true)
        ));
    }

    /// Writes the import of `function` and its overloads to a new writer.
    fn write_function(&self, function: &CFunction) -> Result<CodeWriter> {
        let mut writer = CodeWriter::fragment();
        let cs_name = self.function_cs_name(&function.name);
        let return_type = self.type_map.cs_type_name(&function.return_type)?;

        let mut parameters = self.cs_parameters(&function.name, &function.parameters, false)?;
        self.apply_defaults(&function.name, &mut parameters);
        self.write_import(&mut writer, function, &cs_name, &return_type, &parameters);

        if self.options.out_return_functions().contains(&function.name) {
            let mut out_parameters =
                self.cs_parameters(&function.name, &function.parameters, true)?;
            if out_parameters.iter().any(|parameter| parameter.is_out) {
                self.apply_defaults(&function.name, &mut out_parameters);
                writer.empty_line();
                self.write_import(&mut writer, function, &cs_name, &return_type, &out_parameters);
            } else {
                trace!("no out parameters in {}", function.name);
            }
        }

        if let Some(kind) = self.label_kind(function)? {
            writer.empty_line();
            self.write_label_overloads(&mut writer, &cs_name, &parameters, &kind)?;
        }
        Ok(writer)
    }

    pub(super) fn generate_commands(&self) -> Result<CodeWriter> {
        let mut writer = CodeWriter::new(&FileHeader {
            enable_nullable: true,
            ..self.file_header(&["System", "System.Runtime.InteropServices", "System.Text"])
        });

        for typedef in self.callback_typedefs() {
            let function = match typedef.target.without_typedefs() {
                CType::FunctionPointer(function) => function,
                _ => continue,
            };
            let mut fragment = CodeWriter::fragment();
            match self.write_callback(&mut fragment, typedef, function) {
                Ok(()) => {
                    writer.append(fragment);
                    writer.empty_line();
                }
                Err(err) => warn!(
                    "skipping callback {}: {}",
                    typedef.name,
                    causes(&err).join(": ")
                ),
            }
        }

        let header = format!(
            "{} static unsafe partial class {}",
            self.options.visibility(),
            self.options.class_name()
        );
        writer.block(&header, |writer| {
            let mut seen = HashSet::new();
            for function in self.data.functions() {
                if function.is_inline {
                    trace!("skipping inline function: {}", function.name);
                    continue;
                }
                if self.options.exclude_functions().contains(&function.name) {
                    trace!("skipping excluded function: {}", function.name);
                    continue;
                }
                if function.is_variadic {
                    warn!("skipping variadic function: {}", function.name);
                    continue;
                }
                if !seen.insert(function.name.as_str()) {
                    continue;
                }
                match self.write_function(function) {
                    Ok(fragment) => {
                        writer.append(fragment);
                        writer.empty_line();
                    }
                    Err(err) => warn!(
                        "skipping function {}: {}",
                        function.name,
                        causes(&err).join(": ")
                    ),
                }
            }
            Ok(())
        })?;
        Ok(writer)
    }
}
