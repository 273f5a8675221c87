use super::{generated_file, handle_declaration, header_data, numeric, test_options, typedef};
use crate::c_data::{CDeclaration, CField, CFunction, CRecord, CRecordKind, CTypedef};
use crate::c_type::CBuiltInNumericType::*;
use crate::c_type::{CFunctionPointerType, CParameter, CType};
use crate::cs_generator::{normalize_parameter_name, Generator};

fn parameter(name: &str, parameter_type: CType) -> CParameter {
    CParameter {
        name: name.to_string(),
        parameter_type,
    }
}

fn function(name: &str, return_type: CType, parameters: Vec<CParameter>) -> CFunction {
    CFunction {
        name: name.to_string(),
        return_type,
        parameters,
        is_inline: false,
        is_variadic: false,
    }
}

fn handle(name: &str) -> CType {
    typedef(
        name,
        CType::new_pointer(
            false,
            CType::Record {
                name: format!("{}Impl", name),
            },
        ),
    )
}

fn c_string() -> CType {
    CType::new_pointer(true, numeric(Char))
}

#[test]
fn parameter_names() {
    assert_eq!(normalize_parameter_name("pDescriptor"), "descriptor");
    assert_eq!(normalize_parameter_name("pNext"), "next");
    assert_eq!(normalize_parameter_name("ppData"), "ppData");
    assert_eq!(normalize_parameter_name("pass"), "pass");
    assert_eq!(normalize_parameter_name("object"), "@object");
    assert_eq!(normalize_parameter_name("pIn"), "@in");
}

#[test]
fn imports() {
    let data = header_data(vec![
        handle_declaration("LIB_Texture"),
        CDeclaration::Function(function(
            "lib_texture_get_width",
            typedef("uint32_t", numeric(UInt)),
            vec![parameter("texture", handle("LIB_Texture"))],
        )),
        CDeclaration::Function(function(
            "lib_texture_get_width",
            typedef("uint32_t", numeric(UInt)),
            vec![parameter("texture", handle("LIB_Texture"))],
        )),
        CDeclaration::Function(function(
            "lib_texture_is_valid",
            numeric(Bool),
            vec![
                parameter("texture", handle("LIB_Texture")),
                parameter("strict", numeric(Bool)),
            ],
        )),
        CDeclaration::Function(CFunction {
            is_inline: true,
            ..function("lib_inline_helper", CType::Void, Vec::new())
        }),
        CDeclaration::Function(CFunction {
            is_variadic: true,
            ..function("lib_printf", numeric(Int), vec![parameter("format", c_string())])
        }),
    ]);
    let content = generated_file(&test_options(), &data, "Commands.cs");
    assert!(content.contains("using System.Text;"));
    assert!(content.contains("public static unsafe partial class Lib\n{\n"));
    assert_eq!(
        content
            .matches("    [LibraryImport(LibraryName, EntryPoint = \"lib_texture_get_width\")]\n    public static partial uint lib_texture_get_width(LIB_Texture texture);\n")
            .count(),
        1
    );
    assert!(content.contains(
        "    [LibraryImport(LibraryName, EntryPoint = \"lib_texture_is_valid\")]\n    [return: MarshalAs(UnmanagedType.U1)]\n    public static partial bool lib_texture_is_valid(LIB_Texture texture, [MarshalAs(UnmanagedType.U1)] bool strict);\n"
    ));
    assert!(!content.contains("lib_inline_helper"));
    assert!(!content.contains("lib_printf"));
}

#[test]
fn function_prefix_remap_keeps_entry_point() {
    let mut options = test_options();
    options.set_function_prefix_remap("meshopt_");
    let data = header_data(vec![CDeclaration::Function(function(
        "meshopt_generateVertexRemap",
        typedef("size_t", numeric(ULong)),
        vec![
            parameter("destination", CType::new_pointer(false, numeric(UInt))),
            parameter("indices", CType::new_pointer(true, numeric(UInt))),
        ],
    ))]);
    let content = generated_file(&options, &data, "Commands.cs");
    assert!(content.contains(
        "    [LibraryImport(LibraryName, EntryPoint = \"meshopt_generateVertexRemap\")]\n    public static partial nuint GenerateVertexRemap(uint* destination, uint* indices);\n"
    ));
}

#[test]
fn label_overloads() {
    let mut options = test_options();
    options.set_string_view_type("LIB_StringView");
    options.add_hand_written_types(vec!["LIB_StringView"]);
    options.add_label_function_suffixes(vec!["PushDebugGroup"]);
    let string_view = typedef(
        "LIB_StringView",
        CType::Record {
            name: "LIB_StringView".to_string(),
        },
    );
    let data = header_data(vec![
        handle_declaration("LIB_Texture"),
        CDeclaration::Function(function(
            "lib_set_label",
            CType::Void,
            vec![
                parameter("texture", handle("LIB_Texture")),
                parameter("label", c_string()),
            ],
        )),
        CDeclaration::Function(function(
            "lib_texture_set_label",
            CType::Void,
            vec![
                parameter("texture", handle("LIB_Texture")),
                parameter("label", string_view.clone()),
            ],
        )),
        CDeclaration::Function(function(
            "libEncoderPushDebugGroup",
            CType::Void,
            vec![
                parameter("encoder", handle("LIB_Texture")),
                parameter("groupName", string_view),
            ],
        )),
        CDeclaration::Function(function(
            "lib_get_label",
            c_string(),
            vec![parameter("label", c_string())],
        )),
    ]);
    let content = generated_file(&options, &data, "Commands.cs");

    assert_eq!(content.matches("lib_set_label(").count(), 5);
    assert_eq!(
        content
            .matches("public static void lib_set_label(")
            .count(),
        2
    );
    assert!(content.contains(
        "    public static partial void lib_set_label(LIB_Texture texture, byte* label);\n"
    ));
    assert!(content.contains(
        "    public static void lib_set_label(LIB_Texture texture, ReadOnlySpan<byte> label)\n    {\n        fixed (byte* pLabel = label)\n        {\n            lib_set_label(texture, pLabel);\n        }\n    }\n"
    ));
    assert!(content.contains(
        "    public static void lib_set_label(LIB_Texture texture, string? label = default)\n    {\n        lib_set_label(texture, label is null ? ReadOnlySpan<byte>.Empty : Encoding.UTF8.GetBytes(label + \"\\0\"));\n    }\n"
    ));

    assert!(content.contains(
        "            lib_texture_set_label(texture, new LIB_StringView(pLabel, label.Length));\n"
    ));
    assert!(content.contains(
        "        lib_texture_set_label(texture, Encoding.UTF8.GetBytes(label ?? string.Empty));\n"
    ));
    assert!(content.contains(
        "    public static void libEncoderPushDebugGroup(LIB_Texture encoder, string? groupName = default)\n"
    ));
    assert!(content.contains("        fixed (byte* pGroupName = groupName)\n"));
    assert_eq!(
        content
            .matches("public static void lib_get_label(")
            .count(),
        0
    );
}

#[test]
fn out_overloads() {
    let mut options = test_options();
    options.add_out_return_functions(vec!["lib_device_get_limits", "lib_device_get_name"]);
    let data = header_data(vec![
        handle_declaration("LIB_Device"),
        CDeclaration::Record(CRecord {
            name: "LIB_Limits".to_string(),
            kind: CRecordKind::Struct,
            size: 8,
            fields: vec![CField {
                name: "maxTextures".to_string(),
                field_type: numeric(UInt),
            }],
        }),
        CDeclaration::Function(function(
            "lib_device_get_limits",
            CType::Enum {
                name: "LIB_Status".to_string(),
            },
            vec![
                parameter("device", handle("LIB_Device")),
                parameter(
                    "limits",
                    CType::new_pointer(
                        false,
                        CType::Record {
                            name: "LIB_Limits".to_string(),
                        },
                    ),
                ),
            ],
        )),
        CDeclaration::Function(function(
            "lib_device_get_name",
            CType::Void,
            vec![
                parameter("device", handle("LIB_Device")),
                parameter("name", c_string()),
            ],
        )),
    ]);
    let content = generated_file(&options, &data, "Commands.cs");
    assert!(content.contains(
        "    public static partial LIB_Status lib_device_get_limits(LIB_Device device, LIB_Limits* limits);\n"
    ));
    assert!(content.contains(
        "    public static partial LIB_Status lib_device_get_limits(LIB_Device device, out LIB_Limits limits);\n"
    ));
    assert_eq!(
        content
            .matches("public static partial void lib_device_get_name(")
            .count(),
        1
    );
}

#[test]
fn callbacks_and_defaults() {
    let mut options = test_options();
    options.add_parameter_default("SetVertexBuffer", "offset", "0");
    options.add_parameter_default("SetVertexBuffer", "size", "LIB_WHOLE_SIZE");
    options.add_parameter_default("Draw", "instanceCount", "1");
    options.add_exclude_callbacks(vec!["LIB_ExcludedCallback"]);
    options.add_callback_type_substitution("bool", "byte");
    let callback_type = CType::FunctionPointer(CFunctionPointerType {
        return_type: Box::new(CType::Void),
        arguments: vec![
            parameter(
                "status",
                CType::Enum {
                    name: "LIB_Status".to_string(),
                },
            ),
            parameter("done", numeric(Bool)),
            parameter("userdata", CType::new_pointer(false, CType::Void)),
        ],
    });
    let callback = typedef("LIB_RequestCallback", callback_type.clone());
    let u32_type = typedef("uint32_t", numeric(UInt));
    let u64_type = typedef("uint64_t", numeric(ULongLong));
    let data = header_data(vec![
        handle_declaration("LIB_Pass"),
        CDeclaration::Typedef(CTypedef {
            name: "LIB_RequestCallback".to_string(),
            target: callback_type.clone(),
        }),
        CDeclaration::Typedef(CTypedef {
            name: "LIB_ExcludedCallback".to_string(),
            target: callback_type,
        }),
        CDeclaration::Function(function(
            "lib_request",
            CType::Void,
            vec![
                parameter("callback", callback),
                parameter("userdata", typedef("intptr_t", numeric(Long))),
            ],
        )),
        CDeclaration::Function(function(
            "libPassSetVertexBuffer",
            CType::Void,
            vec![
                parameter("pass", handle("LIB_Pass")),
                parameter("slot", u32_type.clone()),
                parameter("offset", u64_type.clone()),
                parameter("size", u64_type),
            ],
        )),
        CDeclaration::Function(function(
            "libPassDraw",
            CType::Void,
            vec![
                parameter("pass", handle("LIB_Pass")),
                parameter("instanceCount", u32_type.clone()),
                parameter("vertexCount", u32_type),
            ],
        )),
    ]);
    let content = generated_file(&options, &data, "Commands.cs");
    assert!(content.contains(
        "[UnmanagedFunctionPointer(CallingConvention.Cdecl)]\npublic unsafe delegate void LIB_RequestCallback(LIB_Status status, bool done, void* userdata);\n"
    ));
    assert!(!content.contains("LIB_ExcludedCallback"));
    assert!(content.contains(
        "    public static partial void lib_request(delegate* unmanaged<LIB_Status, byte, void*, void> callback, nint userdata = 0);\n"
    ));
    assert!(content.contains(
        "    public static partial void libPassSetVertexBuffer(LIB_Pass pass, uint slot, ulong offset = 0, ulong size = LIB_WHOLE_SIZE);\n"
    ));
    assert!(content.contains(
        "    public static partial void libPassDraw(LIB_Pass pass, uint instanceCount, uint vertexCount);\n"
    ));
}

#[test]
fn library_loader() {
    let mut options = test_options();
    options.set_library_name("lib");
    options.set_generate_library_loader(true);
    let data = header_data(Vec::new());
    let content = generated_file(&options, &data, "Library.cs");
    assert!(content.contains("namespace Lib;\n"));
    assert!(content.contains("    public const string LibraryName = \"lib\";\n"));
    assert!(content.contains("    private const string LibraryNameAlternate = \"liblib\";\n"));
    assert!(content.contains(
        "        NativeLibrary.SetDllImportResolver(typeof(Lib).Assembly, OnDllImport);\n"
    ));
    assert!(content.contains("    public static event DllImportResolver? ResolveLibrary;\n"));
    assert!(content.contains("        return 0;\n"));

    let without_loader = Generator::new(&test_options(), &data)
        .unwrap()
        .generate_files()
        .unwrap();
    assert!(without_loader
        .iter()
        .all(|file| file.file_name != "Library.cs"));
}

#[test]
fn library_loader_requires_library_name() {
    let mut options = test_options();
    options.set_generate_library_loader(true);
    let data = header_data(Vec::new());
    let generator = Generator::new(&options, &data).unwrap();
    let err = generator.generate_files().unwrap_err();
    assert_eq!(err.to_string(), "library name is not set for lib");
}

#[test]
fn excluded_functions_and_parameter_remaps() {
    let mut options = test_options();
    options.set_public_visibility(false);
    options.add_exclude_functions(vec!["lib_internal"]);
    options.add_function_parameter_remap("lib_write", "data", "void*");
    let data = header_data(vec![
        CDeclaration::Function(function("lib_internal", CType::Void, Vec::new())),
        CDeclaration::Function(function(
            "lib_write",
            CType::Void,
            vec![
                parameter("data", CType::new_pointer(true, numeric(UChar))),
                parameter("size", typedef("size_t", numeric(ULong))),
            ],
        )),
    ]);
    let content = generated_file(&options, &data, "Commands.cs");
    assert!(content.contains("internal static unsafe partial class Lib\n"));
    assert!(!content.contains("lib_internal"));
    assert!(content.contains("    public static partial void lib_write(void* data, nuint size);\n"));
}
