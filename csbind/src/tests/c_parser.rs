use super::{is_clang_unavailable, lock_clang};
use crate::c_data::{CExpression, CParseResult, CRecordKind};
use crate::c_parser;
use crate::c_type::CBuiltInNumericType::*;
use crate::c_type::CType;
use crate::config::GeneratorOptions;
use std::fs;
use std::path::Path;

const TEST_HEADER: &str = r#"
#ifndef LIB_H
#define LIB_H

#include "../dep/dep.h"

#define LIB_WHOLE_SIZE (0xffffffffffffffffULL)
#define LIB_SQUARE(x) ((x) * (x))

typedef enum LIB_Color {
    LIB_Color_Red = 0,
    LIB_Color_Green = 1 << 2,
    LIB_Color_Blue = LIB_Color_Green | 1,
    LIB_Color_Force32 = 0x7FFFFFFF
} LIB_Color;

typedef struct LIB_TextureImpl* LIB_Texture;

typedef struct LIB_Extent {
    float values[4];
    const char* label;
    LIB_Texture texture;
} LIB_Extent;

typedef union LIB_Value {
    int i;
    double d;
} LIB_Value;

typedef struct {
    int x;
    int y;
} LIB_Point;

typedef void (*LIB_RequestCallback)(LIB_Color status, void* userdata);

typedef unsigned int LIB_Flags;
typedef LIB_Flags LIB_Usage;
static const LIB_Usage LIB_Usage_Vertex = 0x0001;

void lib_set_label(LIB_Texture texture, const char* label);
int lib_sum(int count, ...);

#ifdef LIB_ENABLE_EXTRA
void lib_extra(void);
#endif

#endif
"#;

const DEP_HEADER: &str = "typedef int dep_int;\nvoid dep_function(dep_int value);\n";

/// Writes `content` to `lib/lib.h` in `dir` and parses it.
/// Returns `None` if libclang is not available.
fn parse_header(dir: &Path, content: &str) -> Option<CParseResult> {
    let lib_dir = dir.join("lib");
    let dep_dir = dir.join("dep");
    fs::create_dir_all(&lib_dir).unwrap();
    fs::create_dir_all(&dep_dir).unwrap();
    fs::write(dep_dir.join("dep.h"), DEP_HEADER).unwrap();
    let header = lib_dir.join("lib.h");
    fs::write(&header, content).unwrap();

    let mut options = GeneratorOptions::new("lib", "Lib");
    options.add_header(header);
    options.add_parser_arguments(vec!["-DLIB_ENABLE_EXTRA"]);
    match c_parser::parse(&options) {
        Ok(result) => Some(result),
        Err(err) => {
            if is_clang_unavailable(&err) {
                None
            } else {
                panic!("parse failed: {}", err)
            }
        }
    }
}

#[test]
fn declarations() {
    let _lock = lock_clang();
    let dir = tempdir::TempDir::new("csbind_c_parser").unwrap();
    let result = match parse_header(dir.path(), TEST_HEADER) {
        Some(result) => result,
        None => return,
    };
    assert!(!result.has_errors(), "{:?}", result.errors());
    let data = &result.header;

    let whole_size = data.macros().find(|m| m.name == "LIB_WHOLE_SIZE").unwrap();
    assert_eq!(whole_size.value, "(0xffffffffffffffffULL)");
    assert!(!whole_size.is_function_like);
    let square = data.macros().find(|m| m.name == "LIB_SQUARE").unwrap();
    assert!(square.is_function_like);
    assert!(data.macros().any(|m| m.name == "LIB_H" && m.value.is_empty()));

    let color = data.find_enum("LIB_Color").unwrap();
    let items = color
        .items
        .iter()
        .map(|item| (item.name.as_str(), item.value))
        .collect::<Vec<_>>();
    assert_eq!(
        items,
        vec![
            ("LIB_Color_Red", 0),
            ("LIB_Color_Green", 4),
            ("LIB_Color_Blue", 5),
            ("LIB_Color_Force32", 0x7FFF_FFFF),
        ]
    );
    assert_eq!(
        color.items[0].expression,
        Some(CExpression::Literal("0".to_string()))
    );
    assert_eq!(
        color.items[1].expression,
        Some(CExpression::binary(
            "<<",
            CExpression::Literal("1".to_string()),
            CExpression::Literal("2".to_string())
        ))
    );
    assert_eq!(
        color.items[2].expression,
        Some(CExpression::binary(
            "|",
            CExpression::Reference("LIB_Color_Green".to_string()),
            CExpression::Literal("1".to_string())
        ))
    );
    assert_eq!(data.enums().filter(|e| e.name == "LIB_Color").count(), 1);

    let texture = data.typedefs().find(|t| t.name == "LIB_Texture").unwrap();
    assert_eq!(
        texture.target,
        CType::new_pointer(
            false,
            CType::Record {
                name: "LIB_TextureImpl".to_string()
            }
        )
    );
    assert!(data.find_record("LIB_TextureImpl").is_none());

    let extent = data.find_record("LIB_Extent").unwrap();
    assert_eq!(extent.kind, CRecordKind::Struct);
    assert!(extent.size > 0);
    let fields = extent
        .fields
        .iter()
        .map(|field| field.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(fields, vec!["values", "label", "texture"]);
    assert_eq!(
        extent.fields[0].field_type,
        CType::new_array(CType::BuiltInNumeric(Float), 4)
    );
    assert_eq!(
        extent.fields[1].field_type,
        CType::new_pointer(true, CType::BuiltInNumeric(Char))
    );
    match &extent.fields[2].field_type {
        CType::Typedef { name, .. } => assert_eq!(name, "LIB_Texture"),
        other => panic!("unexpected type: {:?}", other),
    }

    let value = data.find_record("LIB_Value").unwrap();
    assert_eq!(value.kind, CRecordKind::Union);
    assert_eq!(value.fields.len(), 2);

    let point = data.find_record("LIB_Point").unwrap();
    assert_eq!(point.fields.len(), 2);
    assert!(point.size > 0);
    assert!(data.records().all(|r| !r.name.is_empty()));

    let callback = data
        .typedefs()
        .find(|t| t.name == "LIB_RequestCallback")
        .unwrap();
    match &callback.target {
        CType::FunctionPointer(function) => {
            assert_eq!(*function.return_type, CType::Void);
            let names = function
                .arguments
                .iter()
                .map(|argument| argument.name.as_str())
                .collect::<Vec<_>>();
            assert_eq!(names, vec!["status", "userdata"]);
            assert_eq!(
                function.arguments[1].parameter_type,
                CType::new_pointer(false, CType::Void)
            );
        }
        other => panic!("unexpected type: {:?}", other),
    }

    let usage = data
        .variables()
        .find(|v| v.name == "LIB_Usage_Vertex")
        .unwrap();
    assert_eq!(usage.init.as_ref().map(String::as_str), Some("0x0001"));
    match &usage.variable_type {
        CType::Typedef { name, .. } => assert_eq!(name, "LIB_Usage"),
        other => panic!("unexpected type: {:?}", other),
    }

    let set_label = data
        .functions()
        .find(|f| f.name == "lib_set_label")
        .unwrap();
    assert_eq!(set_label.return_type, CType::Void);
    assert!(!set_label.is_variadic);
    assert_eq!(set_label.parameters.len(), 2);
    assert_eq!(set_label.parameters[1].name, "label");
    let sum = data.functions().find(|f| f.name == "lib_sum").unwrap();
    assert!(sum.is_variadic);
    assert_eq!(sum.parameters.len(), 1);

    let extra = data.functions().find(|f| f.name == "lib_extra").unwrap();
    assert!(extra.parameters.is_empty());

    assert!(data.functions().all(|f| f.name != "dep_function"));
    assert!(data.typedefs().all(|t| t.name != "dep_int"));
}

#[test]
fn syntax_errors() {
    let _lock = lock_clang();
    let dir = tempdir::TempDir::new("csbind_c_parser").unwrap();
    let result = match parse_header(dir.path(), "int lib_broken(;\n") {
        Some(result) => result,
        None => return,
    };
    assert!(result.has_errors());
    assert!(!result.errors().is_empty());
    assert!(result.errors()[0].to_string().starts_with("error: "));
}

#[test]
fn no_headers() {
    let options = GeneratorOptions::new("lib", "Lib");
    let err = c_parser::parse(&options).unwrap_err();
    assert_eq!(err.to_string(), "no headers specified for lib");
}
