//! Enums from C enums and from `static const` flag values.

use super::Generator;
use crate::c_data::{CEnum, CEnumItem, CExpression, CVariable};
use crate::code_writer::CodeWriter;
use crate::overrides::is_range_marker;
use csbind_common::errors::{Result, ResultExt};
use csbind_common::string_utils::{capitalize, is_screaming, CaseOperations};
use itertools::Itertools;
use log::{trace, warn};
use regex::{Captures, Regex};
use std::collections::{HashMap, HashSet};

/// Longest `_`-terminated prefix shared by all `names`.
/// Returns `None` if there are fewer than two names.
pub fn common_item_prefix(names: &[&str]) -> Option<String> {
    if names.len() < 2 {
        return None;
    }
    let first = names[0];
    let mut prefix_len = 0;
    for (index, c) in first.char_indices() {
        if c != '_' {
            continue;
        }
        let candidate = &first[..=index];
        if names.iter().all(|name| name.starts_with(candidate)) {
            prefix_len = index + 1;
        } else {
            break;
        }
    }
    if prefix_len == 0 {
        None
    } else {
        Some(first[..prefix_len].to_string())
    }
}

fn strip_item_prefix<'a>(enum_name: &str, item_name: &'a str, common_prefix: Option<&str>) -> &'a str {
    if let Some(rest) = item_name
        .strip_prefix(enum_name)
        .and_then(|rest| rest.strip_prefix('_'))
    {
        return rest;
    }
    let screaming = format!("{}_", enum_name.to_screaming_snake_case());
    if let Some(head) = item_name.get(..screaming.len()) {
        if head.eq_ignore_ascii_case(&screaming) {
            return &item_name[screaming.len()..];
        }
    }
    if let Some(rest) = common_prefix.and_then(|prefix| item_name.strip_prefix(prefix)) {
        return rest;
    }
    match item_name.find('_') {
        Some(index) => &item_name[index + 1..],
        None => item_name,
    }
}

/// Returns C# name of enumerator `item_name` of enum `enum_name`.
///
/// The library prefix is removed and the rest is converted to
/// PascalCase: `LIB_COLOR_RED` of `LIB_Color` is `Red`,
/// `WGPUTextureFormat_RGBA8Unorm` of `WGPUTextureFormat` is `RGBA8Unorm`.
/// `common_prefix` is the prefix shared by all items of the enum, if any
/// (see `common_item_prefix`). Returns an empty string if nothing is left
/// after the prefix.
pub fn enum_item_name(enum_name: &str, item_name: &str, common_prefix: Option<&str>) -> String {
    let stripped = strip_item_prefix(enum_name, item_name, common_prefix);
    let screaming = is_screaming(stripped);
    let name: String = stripped
        .split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if screaming && segment.starts_with(|c: char| c.is_ascii_alphabetic()) {
                capitalize(&segment.to_lowercase())
            } else {
                capitalize(segment)
            }
        })
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", name)
    } else {
        name
    }
}

fn strip_integer_suffix(literal: &str) -> &str {
    if literal.starts_with(|c: char| c.is_ascii_digit()) && !literal.contains('.') {
        literal.trim_end_matches(|c| c == 'u' || c == 'U' || c == 'l' || c == 'L')
    } else {
        literal
    }
}

/// Renders value expression of an enumerator.
///
/// References to enumerators in `item_names` (C name to C# name) are
/// replaced with their C# names. Returns `None` if the expression refers
/// to anything else.
pub fn render_expression(
    expression: &CExpression,
    item_names: &HashMap<String, String>,
) -> Option<String> {
    Some(match expression {
        CExpression::Literal(text) => strip_integer_suffix(text).to_string(),
        CExpression::Reference(name) => item_names.get(name)?.clone(),
        CExpression::Unary { operator, operand } => {
            format!("{}{}", operator, render_expression(operand, item_names)?)
        }
        CExpression::Binary {
            operator,
            left,
            right,
        } => format!(
            "{} {} {}",
            render_expression(left, item_names)?,
            operator,
            render_expression(right, item_names)?
        ),
        CExpression::Paren(inner) => format!("({})", render_expression(inner, item_names)?),
        CExpression::Raw(_) => return None,
    })
}

fn fits_in_int(value: i64) -> bool {
    value >= i64::from(i32::MIN) && value <= i64::from(i32::MAX)
}

/// Underlying type needed for `values`, or `None` if `int` is enough.
fn underlying_type<I: IntoIterator<Item = i64>>(values: I) -> Option<&'static str> {
    let (min, max) = values
        .into_iter()
        .fold((0, 0), |(min, max), value| (min.min(value), max.max(value)));
    if fits_in_int(min) && fits_in_int(max) {
        None
    } else if min >= 0 && max <= i64::from(u32::MAX) {
        Some("uint")
    } else {
        Some("long")
    }
}

fn enum_item_value(item: &CEnumItem, item_names: &HashMap<String, String>) -> String {
    if !fits_in_int(item.value) {
        return if item.value >= 0 {
            format!("0x{:x}", item.value)
        } else {
            item.value.to_string()
        };
    }
    item.expression
        .as_ref()
        .and_then(|expression| render_expression(expression, item_names))
        .unwrap_or_else(|| item.value.to_string())
}

/// Rewrites initializers of `static const` flag values.
struct FlagValueRewriter {
    literal_suffix: Regex,
    identifier: Regex,
}

impl FlagValueRewriter {
    fn new() -> Result<Self> {
        Ok(FlagValueRewriter {
            literal_suffix: Regex::new(r"\b(0[xX][0-9a-fA-F]+|[0-9]+)[uUlL]+\b")
                .with_context(|_| "invalid regex")?,
            identifier: Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b")
                .with_context(|_| "invalid regex")?,
        })
    }

    fn rewrite(&self, init: &str, item_names: &HashMap<String, String>) -> String {
        let value = self.literal_suffix.replace_all(init.trim(), "$1");
        self.identifier
            .replace_all(&value, |captures: &Captures<'_>| {
                let name = &captures[0];
                item_names
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| name.to_string())
            })
            .into_owned()
    }
}

impl Generator<'_> {
    /// C# names of enumerators `items` of enum `enum_name`, keyed by C name.
    /// Items left without a name are not included.
    fn enum_item_names(&self, enum_name: &str, items: &[&str]) -> HashMap<String, String> {
        let common_prefix = common_item_prefix(items);
        items
            .iter()
            .filter_map(|&item| {
                let name = if self.options.skip_enum_item_remap() {
                    item.to_string()
                } else {
                    enum_item_name(enum_name, item, common_prefix.as_deref())
                };
                if name.is_empty() {
                    trace!("skipping enumerator without name: {}", item);
                    return None;
                }
                let name = self
                    .options
                    .enum_item_renames()
                    .get(&name)
                    .cloned()
                    .unwrap_or(name);
                Some((item.to_string(), name))
            })
            .collect()
    }

    fn write_flag_enum(
        &self,
        writer: &mut CodeWriter,
        type_name: &str,
        variables: &[&CVariable],
        rewriter: &FlagValueRewriter,
    ) -> Result<()> {
        let cs_name = self.type_map.resolve_name(type_name)?;
        let c_names = variables.iter().map(|v| v.name.as_str()).collect_vec();
        let item_names = self.enum_item_names(type_name, &c_names);
        writer.write_line("[Flags]");
        let header = format!("{} enum {} : ulong", self.options.visibility(), cs_name);
        writer.block(&header, |writer| {
            writer.write_line("None = 0,");
            let mut written = HashSet::new();
            for variable in variables {
                let name = match item_names.get(&variable.name) {
                    Some(name) if name != "None" => name,
                    _ => continue,
                };
                let init = match &variable.init {
                    Some(init) => init,
                    None => {
                        warn!("flag value without initializer: {}", variable.name);
                        continue;
                    }
                };
                if !written.insert(name.clone()) {
                    warn!("duplicate enumerator {}.{} skipped", cs_name, name);
                    continue;
                }
                writer.write_line(&format!("{} = {},", name, rewriter.rewrite(init, &item_names)));
            }
            Ok(())
        })
    }

    fn write_enum(&self, writer: &mut CodeWriter, c_enum: &CEnum) -> Result<()> {
        let cs_name = self.type_map.resolve_name(&c_enum.name)?;
        let is_bitmask = self.is_bitmask(&c_enum.name) || self.is_bitmask(&cs_name);
        let items = c_enum
            .items
            .iter()
            .filter(|item| {
                let marker = is_range_marker(&item.name);
                if marker {
                    trace!("skipping range marker: {}", item.name);
                }
                !marker
            })
            .collect_vec();
        let c_names = items.iter().map(|item| item.name.as_str()).collect_vec();
        let all_names = self.enum_item_names(&c_enum.name, &c_names);

        // items that are emitted and names that references may use
        let mut emitted = Vec::new();
        let mut item_names = HashMap::new();
        let mut written = HashSet::new();
        if is_bitmask {
            written.insert("None".to_string());
        }
        for item in items {
            let name = match all_names.get(&item.name) {
                Some(name) => name,
                None => continue,
            };
            if name == "Default" {
                trace!("skipping enumerator: {}", item.name);
                continue;
            }
            if is_bitmask && name == "None" {
                item_names.insert(item.name.clone(), name.clone());
                continue;
            }
            if !written.insert(name.clone()) {
                warn!("duplicate enumerator {}.{} skipped", cs_name, name);
                continue;
            }
            item_names.insert(item.name.clone(), name.clone());
            emitted.push((item, name.clone()));
        }

        if is_bitmask {
            writer.write_line("[Flags]");
        }
        let header = match underlying_type(emitted.iter().map(|(item, _)| item.value)) {
            Some(underlying) => format!(
                "{} enum {} : {}",
                self.options.visibility(),
                cs_name,
                underlying
            ),
            None => format!("{} enum {}", self.options.visibility(), cs_name),
        };
        writer.block(&header, |writer| {
            if is_bitmask {
                writer.write_line("None = 0,");
            }
            for (item, name) in &emitted {
                writer.write_line(&format!("{} = {},", name, enum_item_value(item, &item_names)));
            }
            Ok(())
        })
    }

    pub(super) fn generate_enums(&self) -> Result<CodeWriter> {
        let rewriter = FlagValueRewriter::new()?;
        let mut writer = CodeWriter::new(&self.file_header(&["System"]));
        for (type_name, variables) in self.flag_enum_groups() {
            self.write_flag_enum(&mut writer, &type_name, &variables, &rewriter)?;
            writer.empty_line();
        }
        for c_enum in self.data.enums() {
            if c_enum.name.is_empty() {
                trace!("skipping anonymous enum");
                continue;
            }
            self.write_enum(&mut writer, c_enum)?;
            writer.empty_line();
        }
        Ok(writer)
    }
}
