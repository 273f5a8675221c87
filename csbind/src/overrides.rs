//! Fixed tables of special cases applied by the emitter.

use crate::config::ConstantOverride;

/// C type names with a fixed C# equivalent.
pub const KNOWN_TYPE_NAME_MAPPINGS: &[(&str, &str)] = &[
    ("bool", "bool"),
    ("uint8_t", "byte"),
    ("uint16_t", "ushort"),
    ("uint32_t", "uint"),
    ("uint64_t", "ulong"),
    ("int8_t", "sbyte"),
    ("int16_t", "short"),
    ("int32_t", "int"),
    ("int64_t", "long"),
    ("char", "byte"),
    ("size_t", "nuint"),
    ("intptr_t", "nint"),
    ("uintptr_t", "nuint"),
];

/// Macro values written with preprocessor tricks, as
/// (value, C# type, C# value, is static readonly).
const SENTINEL_EXPRESSIONS: &[(&str, &str, &str, bool)] = &[
    ("~0ULL", "ulong", "0xffffffffffffffff", false),
    ("~0ull", "ulong", "0xffffffffffffffff", false),
    ("~0u", "uint", "0xffffffffu", false),
    ("~0U", "uint", "0xffffffffu", false),
    ("~0", "uint", "0xffffffffu", false),
    ("UINT32_MAX", "uint", "uint.MaxValue", false),
    ("UINT64_MAX", "ulong", "ulong.MaxValue", false),
    ("SIZE_MAX", "nuint", "nuint.MaxValue", true),
];

/// Returns the emitted form of a macro whose value (with outer
/// parentheses removed) is a known sentinel expression.
pub fn sentinel_constant(value: &str) -> Option<ConstantOverride> {
    SENTINEL_EXPRESSIONS
        .iter()
        .find(|(expression, ..)| *expression == value)
        .map(|&(_, cs_type, cs_value, is_static)| {
            if is_static {
                ConstantOverride::static_readonly(cs_type, cs_value)
            } else {
                ConstantOverride::new(cs_type, cs_value)
            }
        })
}

/// Enumerators with these suffixes only mark value ranges.
pub const RANGE_MARKER_SUFFIXES: &[&str] = &[
    "_BEGIN_RANGE",
    "_END_RANGE",
    "_RANGE_SIZE",
    "_Force32",
    "_MAX_ENUM",
];

pub fn is_range_marker(item_name: &str) -> bool {
    RANGE_MARKER_SUFFIXES
        .iter()
        .any(|suffix| item_name.ends_with(suffix))
}

/// Field types with a platform-dependent definition, by C spelling.
const ABI_POINTER_TYPES: &[&str] = &["ANativeWindow*", "CAMetalLayer*", "const CAMetalLayer*"];

/// Returns the C# type of a field whose C type is spelled `c_spelling`,
/// if it is an opaque platform pointer.
pub fn abi_field_type(c_spelling: &str) -> Option<&'static str> {
    if ABI_POINTER_TYPES.contains(&c_spelling) {
        Some("nint")
    } else {
        None
    }
}

/// C# keywords that can appear as C identifiers.
const CS_KEYWORDS: &[&str] = &[
    "as", "base", "checked", "class", "decimal", "default", "delegate", "event", "explicit",
    "fixed", "implicit", "in", "internal", "is", "lock", "namespace", "new", "null", "object",
    "operator", "out", "override", "params", "private", "protected", "public", "readonly", "ref",
    "sealed", "string", "this", "throw", "typeof", "ulong", "ushort", "uint", "int", "virtual",
];

/// Escapes `name` with `@` if it is a C# keyword.
pub fn escape_keyword(name: &str) -> String {
    if CS_KEYWORDS.contains(&name) {
        format!("@{}", name)
    } else {
        name.to_string()
    }
}

/// Suffixes of the bitmask enum names, in addition to configured names.
pub const BITMASK_SUFFIXES: &[&str] = &["Flag", "Flags"];

pub fn has_bitmask_suffix(name: &str) -> bool {
    BITMASK_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}
