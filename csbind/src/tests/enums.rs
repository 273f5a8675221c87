use super::{generated_file, header_data, numeric, test_options, typedef};
use crate::c_data::{CDeclaration, CEnum, CEnumItem, CExpression, CTypedef, CVariable};
use crate::c_type::CBuiltInNumericType::*;
use crate::cs_generator::{common_item_prefix, enum_item_name, render_expression};
use std::collections::{HashMap, HashSet};

fn literal(text: &str) -> CExpression {
    CExpression::Literal(text.to_string())
}

fn reference(name: &str) -> CExpression {
    CExpression::Reference(name.to_string())
}

fn item(name: &str, value: i64, expression: Option<CExpression>) -> CEnumItem {
    CEnumItem {
        name: name.to_string(),
        value,
        expression,
    }
}

fn enum_declaration(name: &str, items: Vec<CEnumItem>) -> CDeclaration {
    CDeclaration::Enum(CEnum {
        name: name.to_string(),
        items,
    })
}

#[test]
fn item_names() {
    assert_eq!(enum_item_name("LIB_Color", "LIB_COLOR_RED", None), "Red");
    assert_eq!(
        enum_item_name("LIB_Color", "LIB_COLOR_LIGHT_BLUE", None),
        "LightBlue"
    );
    assert_eq!(
        enum_item_name("WGPUTextureFormat", "WGPUTextureFormat_RGBA8Unorm", None),
        "RGBA8Unorm"
    );
    assert_eq!(
        enum_item_name("WGPUTextureDimension", "WGPUTextureDimension_2D", None),
        "_2D"
    );
    assert_eq!(
        enum_item_name("cgltf_file_type", "cgltf_file_type_invalid", None),
        "Invalid"
    );
    assert_eq!(
        enum_item_name("b2ShapeType", "b2_circleShape", Some("b2_")),
        "CircleShape"
    );
    assert_eq!(
        enum_item_name("LIB_Mode", "MODE_FAST_PATH", Some("MODE_")),
        "FastPath"
    );
}

#[test]
fn common_prefix() {
    assert_eq!(
        common_item_prefix(&["B2_SHAPE_CIRCLE", "B2_SHAPE_POLYGON"]),
        Some("B2_SHAPE_".to_string())
    );
    assert_eq!(
        common_item_prefix(&["B2_SHAPE_CIRCLE", "B2_SHAPE_CAPSULE"]),
        Some("B2_SHAPE_".to_string())
    );
    assert_eq!(common_item_prefix(&["B2_SHAPE_CIRCLE"]), None);
    assert_eq!(common_item_prefix(&["RED", "GREEN"]), None);
}

#[test]
fn prefixed_item_names_are_bijective() {
    let items = [
        "WGPUBlendFactor_Undefined",
        "WGPUBlendFactor_Zero",
        "WGPUBlendFactor_One",
        "WGPUBlendFactor_Src",
        "WGPUBlendFactor_OneMinusSrc",
        "WGPUBlendFactor_SrcAlpha",
        "WGPUBlendFactor_OneMinusSrcAlpha",
        "WGPUBlendFactor_Dst",
        "WGPUBlendFactor_OneMinusDst",
        "WGPUBlendFactor_Src1",
    ];
    let prefix = common_item_prefix(&items);
    let names = items
        .iter()
        .map(|item| enum_item_name("WGPUBlendFactor", item, prefix.as_deref()))
        .collect::<HashSet<_>>();
    assert_eq!(names.len(), items.len());
    assert!(names.contains("OneMinusSrcAlpha"));
    assert!(names.contains("Src1"));
}

#[test]
fn expressions() {
    let mut names = HashMap::new();
    names.insert("LIB_A".to_string(), "A".to_string());
    let shift = CExpression::binary("<<", literal("1"), literal("3"));
    assert_eq!(render_expression(&shift, &names).unwrap(), "1 << 3");
    let or = CExpression::Paren(Box::new(CExpression::binary(
        "|",
        reference("LIB_A"),
        literal("0x10u"),
    )));
    assert_eq!(render_expression(&or, &names).unwrap(), "(A | 0x10)");
    let negative = CExpression::unary("-", literal("1"));
    assert_eq!(render_expression(&negative, &names).unwrap(), "-1");
    assert_eq!(render_expression(&reference("LIB_OTHER"), &names), None);
    assert_eq!(
        render_expression(&CExpression::Raw("sizeof(int)".to_string()), &names),
        None
    );
}

#[test]
fn plain_enum() {
    let data = header_data(vec![enum_declaration(
        "LIB_Color",
        vec![
            item("LIB_COLOR_RED", 0, Some(literal("0"))),
            item("LIB_COLOR_GREEN", 1, Some(literal("1"))),
            item("LIB_COLOR_MAX_ENUM", 0x7FFF_FFFF, Some(literal("0x7FFFFFFF"))),
        ],
    )]);
    let content = generated_file(&test_options(), &data, "Enums.cs");
    assert!(content.contains("using System;"));
    assert!(content.contains("public enum LIB_Color\n{\n    Red = 0,\n    Green = 1,\n}\n"));
    assert!(!content.contains("[Flags]"));
}

#[test]
fn bitmask_enum_has_one_none_member() {
    let mut options = test_options();
    options.add_bitmask_enums(vec!["LIB_BufferUsage"]);
    let data = header_data(vec![
        enum_declaration(
            "LIB_BufferUsage",
            vec![
                item("LIB_BufferUsage_None", 0, Some(literal("0"))),
                item("LIB_BufferUsage_MapRead", 1, Some(literal("0x0001"))),
                item(
                    "LIB_BufferUsage_CopySrc",
                    8,
                    Some(CExpression::binary("<<", literal("1"), literal("3"))),
                ),
                item(
                    "LIB_BufferUsage_ReadCopy",
                    9,
                    Some(CExpression::binary(
                        "|",
                        reference("LIB_BufferUsage_MapRead"),
                        reference("LIB_BufferUsage_CopySrc"),
                    )),
                ),
                item("LIB_BufferUsage_Force32", 0x7FFF_FFFF, None),
            ],
        ),
        enum_declaration(
            "LIB_StageFlags",
            vec![
                item("LIB_STAGE_EMPTY", 0, None),
                item("LIB_STAGE_VERTEX", 1, None),
                item("LIB_STAGE_FRAGMENT", 2, None),
            ],
        ),
    ]);
    let content = generated_file(&options, &data, "Enums.cs");
    assert!(content.contains(
        "[Flags]\npublic enum LIB_BufferUsage\n{\n    None = 0,\n    MapRead = 0x0001,\n    CopySrc = 1 << 3,\n    ReadCopy = MapRead | CopySrc,\n}\n"
    ));
    assert!(content.contains(
        "[Flags]\npublic enum LIB_StageFlags\n{\n    None = 0,\n    Empty = 0,\n    Vertex = 1,\n    Fragment = 2,\n}\n"
    ));
    assert_eq!(content.matches("None = 0,").count(), 2);
}

#[test]
fn large_values_and_unknown_references() {
    let data = header_data(vec![enum_declaration(
        "LIB_Limit",
        vec![
            item("LIB_LIMIT_SMALL", 1, Some(reference("LIB_SOME_MACRO"))),
            item("LIB_LIMIT_LARGE", 0xFFFF_FFFF, Some(literal("0xFFFFFFFFu"))),
        ],
    )]);
    let content = generated_file(&test_options(), &data, "Enums.cs");
    assert!(content.contains(
        "public enum LIB_Limit : uint\n{\n    Small = 1,\n    Large = 0xffffffff,\n}\n"
    ));
}

#[test]
fn enum_prefix_remap_and_renames() {
    let mut options = test_options();
    options.set_enum_prefix_remap("meshopt_");
    options.add_enum_item_rename("EncodeExpShared", "Shared");
    let data = header_data(vec![enum_declaration(
        "meshopt_EncodeExpMode",
        vec![
            item("meshopt_EncodeExpSeparate", 0, None),
            item("meshopt_EncodeExpShared", 1, None),
            item("meshopt_Default", 2, None),
        ],
    )]);
    let content = generated_file(&options, &data, "Enums.cs");
    assert!(content.contains(
        "public enum EncodeExpMode\n{\n    EncodeExpSeparate = 0,\n    Shared = 1,\n}\n"
    ));
}

#[test]
fn flag_enums_from_static_constants() {
    let mut options = test_options();
    options.add_bitmask_enums(vec!["LIB_TextureUsage"]);
    let flags = typedef("LIB_Flags", numeric(ULongLong));
    let usage = typedef("LIB_TextureUsage", flags.clone());
    let variable = |name: &str, init: &str| {
        CDeclaration::Variable(CVariable {
            name: name.to_string(),
            variable_type: usage.clone(),
            init: Some(init.to_string()),
        })
    };
    let data = header_data(vec![
        CDeclaration::Typedef(CTypedef {
            name: "LIB_Flags".to_string(),
            target: numeric(ULongLong),
        }),
        CDeclaration::Typedef(CTypedef {
            name: "LIB_TextureUsage".to_string(),
            target: flags,
        }),
        variable("LIB_TextureUsage_None", "0x0000000000000000"),
        variable("LIB_TextureUsage_CopySrc", "0x0000000000000001"),
        variable("LIB_TextureUsage_RenderAttachment", "0x0000000000000010ULL"),
        variable(
            "LIB_TextureUsage_Both",
            "LIB_TextureUsage_CopySrc | LIB_TextureUsage_RenderAttachment",
        ),
    ]);
    let content = generated_file(&options, &data, "Enums.cs");
    assert!(content.contains(
        "[Flags]\npublic enum LIB_TextureUsage : ulong\n{\n    None = 0,\n    CopySrc = 0x0000000000000001,\n    RenderAttachment = 0x0000000000000010,\n    Both = CopySrc | RenderAttachment,\n}\n"
    ));
}

#[test]
fn item_names_kept_without_remap() {
    let mut options = test_options();
    options.set_skip_enum_item_remap(true);
    let data = header_data(vec![enum_declaration(
        "LIB_Color",
        vec![
            item("LIB_COLOR_RED", 0, Some(literal("0"))),
            item("LIB_COLOR_GREEN", 1, Some(literal("1"))),
            item("LIB_COLOR_MAX_ENUM", 0x7FFF_FFFF, Some(literal("0x7FFFFFFF"))),
        ],
    )]);
    let content = generated_file(&options, &data, "Enums.cs");
    assert!(content.contains(
        "public enum LIB_Color\n{\n    LIB_COLOR_RED = 0,\n    LIB_COLOR_GREEN = 1,\n}\n"
    ));
}
