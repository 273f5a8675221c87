//! Constants from object-like macros.

use super::Generator;
use crate::code_writer::CodeWriter;
use crate::config::ConstantOverride;
use crate::overrides::sentinel_constant;
use csbind_common::errors::{Result, ResultExt};
use log::trace;
use regex::Regex;
use std::collections::BTreeMap;

/// Removes parentheses enclosing the whole `value`.
fn strip_outer_parens(value: &str) -> &str {
    let mut value = value.trim();
    while value.starts_with('(') && value.ends_with(')') {
        let mut depth = 0;
        let mut closes_at_end = true;
        for (index, c) in value.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 && index != value.len() - 1 {
                        closes_at_end = false;
                        break;
                    }
                }
                _ => {}
            }
        }
        if !closes_at_end {
            break;
        }
        value = value[1..value.len() - 1].trim();
    }
    value
}

/// Number in `digits` lower-cased, or `None` if it doesn't fit in 64 bits.
fn parse_integer(digits: &str) -> Option<(String, u64)> {
    let lower = digits.to_lowercase();
    let number = if let Some(hex) = lower.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()?
    } else {
        lower.parse::<u64>().ok()?
    };
    Some((lower, number))
}

fn infer_integer(negative: bool, digits: &str, suffix: &str) -> Option<ConstantOverride> {
    let (digits, number) = parse_integer(digits)?;
    let cs_type = match suffix.to_uppercase().as_str() {
        "ULL" | "LLU" => "ulong",
        "LL" => "long",
        "UL" | "LU" | "U" => "uint",
        "L" => "int",
        _ if negative => {
            if number <= 1 << 31 {
                "int"
            } else {
                "long"
            }
        }
        _ => {
            if number <= u64::from(u32::MAX) {
                "uint"
            } else {
                "ulong"
            }
        }
    };
    // A negated unsigned literal wraps around in C.
    let value = match (negative, cs_type) {
        (true, "uint") => format!("{:#x}", (number as u32).wrapping_neg()),
        (true, "ulong") => format!("{:#x}", number.wrapping_neg()),
        (true, _) => format!("-{}", digits),
        (false, _) => digits,
    };
    Some(ConstantOverride::new(cs_type, &value))
}

/// Translates macro values to C# constants.
pub struct ConstantInference {
    integer_literal: Regex,
    float_literal: Regex,
}

impl ConstantInference {
    pub fn new() -> Result<Self> {
        Ok(ConstantInference {
            integer_literal: Regex::new(r"^(-)?(0[xX][0-9a-fA-F]+|[0-9]+)([uUlL]*)$")
                .with_context(|_| "invalid regex")?,
            float_literal: Regex::new(
                r"^-?([0-9]+\.[0-9]*|\.[0-9]+|[0-9]+)([eE][+-]?[0-9]+)?([fF])?$",
            )
            .with_context(|_| "invalid regex")?,
        })
    }

    /// Infers C# type and value of a macro from the spelling of `value`.
    fn infer(&self, value: &str) -> ConstantOverride {
        if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
            return ConstantOverride::new("string", value);
        }
        if let Some(captures) = self.integer_literal.captures(value) {
            let negative = captures.get(1).is_some();
            let digits = captures.get(2).map_or("", |m| m.as_str());
            let suffix = captures.get(3).map_or("", |m| m.as_str());
            if let Some(constant) = infer_integer(negative, digits, suffix) {
                return constant;
            }
        }
        if let Some(captures) = self.float_literal.captures(value) {
            if captures.get(3).is_some() {
                let number = value.trim_end_matches(|c| c == 'f' || c == 'F');
                return ConstantOverride::new("float", &format!("{}f", number));
            }
            if value.contains('.') || captures.get(2).is_some() {
                return ConstantOverride::new("double", value);
            }
        }
        ConstantOverride::new("uint", value)
    }

    /// Returns the emitted form of macro `name` with body `value`.
    ///
    /// Configured overrides come first, then known sentinel expressions,
    /// then the type is inferred from the literal.
    pub fn constant_value(
        &self,
        name: &str,
        value: &str,
        overrides: &BTreeMap<String, ConstantOverride>,
    ) -> ConstantOverride {
        if let Some(constant) = overrides.get(name) {
            return constant.clone();
        }
        let value = strip_outer_parens(value);
        if let Some(constant) = sentinel_constant(value) {
            return constant;
        }
        self.infer(value)
    }
}

impl Generator<'_> {
    pub(super) fn generate_constants(&self) -> Result<CodeWriter> {
        let inference = ConstantInference::new()?;
        let mut writer = CodeWriter::new(&self.file_header(&[]));
        let header = format!(
            "{} static partial class {}",
            self.options.visibility(),
            self.options.class_name()
        );
        writer.block(&header, |writer| {
            for c_macro in self.data.macros() {
                if c_macro.value.is_empty() || c_macro.is_function_like {
                    continue;
                }
                if self.options.exclude_constants().contains(&c_macro.name)
                    || c_macro.name.to_uppercase().ends_with("_H_")
                {
                    trace!("skipping macro: {}", c_macro.name);
                    continue;
                }
                let constant = inference.constant_value(
                    &c_macro.name,
                    &c_macro.value,
                    self.options.constant_overrides(),
                );
                writer.write_line(&format!("/// <unmanaged>{}</unmanaged>", c_macro.name));
                writer.write_line(&format!(
                    "public {} {} {} = {};",
                    constant.modifier, constant.cs_type, c_macro.name, constant.value
                ));
            }
            Ok(())
        })?;
        Ok(writer)
    }
}
