//! Generator configurations specific for each native library.

use crate::config::{ConstantOverride, GeneratorOptions};

/// wgpu-native (`webgpu.h` and `wgpu.h`) specific configuration.
pub fn webgpu() -> GeneratorOptions {
    let mut options = GeneratorOptions::new("webgpu", "WebGPU");
    options.add_header("webgpu/wgpu.h");
    options.set_library_name("wgpu_native");
    // the resolver of this library is maintained in WebGPU.cs
    options.set_generate_library_loader(false);

    options.add_exclude_constants(vec![
        "WGPU_EXPORT",
        "WGPU_SHARED_LIBRARY",
        "WGPU_IMPLEMENTATION",
        "_wgpu_COMMA",
        "_wgpu_MAKE_INIT_STRUCT",
        "WGPU_STRING_VIEW_INIT",
        "WGPU_STRLEN",
    ]);
    options.add_constant_override(
        "WGPU_WHOLE_MAP_SIZE",
        ConstantOverride::static_readonly("nuint", "nuint.MaxValue"),
    );
    for name in &["WGPU_WHOLE_SIZE", "WGPU_LIMIT_U64_UNDEFINED"] {
        options.add_constant_override(name, ConstantOverride::new("ulong", "0xffffffffffffffff"));
    }
    for name in &[
        "WGPU_ARRAY_LAYER_COUNT_UNDEFINED",
        "WGPU_COPY_STRIDE_UNDEFINED",
        "WGPU_DEPTH_SLICE_UNDEFINED",
        "WGPU_LIMIT_U32_UNDEFINED",
        "WGPU_MIP_LEVEL_COUNT_UNDEFINED",
        "WGPU_QUERY_SET_INDEX_UNDEFINED",
    ] {
        options.add_constant_override(name, ConstantOverride::new("uint", "0xffffffff"));
    }

    options.add_type_name_mapping("WGPUSubmissionIndex", "ulong");
    options.add_type_name_mapping("WGPUProc", "nint");
    options.set_flags_base_typedef("WGPUFlags");
    options.add_bitmask_enums(vec![
        "WGPUBufferUsage",
        "WGPUTextureUsage",
        "WGPUShaderStage",
        "WGPUColorWriteMask",
        "WGPUMapMode",
        "WGPUInstanceBackend",
        "WGPUInstanceFlags",
    ]);
    options.add_exclude_callbacks(vec!["WGPUProc", "WGPULogCallback", "WGPUErrorCallback"]);
    options.add_out_return_functions(vec![
        "wgpuAdapterGetLimits",
        "wgpuAdapterGetInfo",
        "wgpuDeviceGetLimits",
        "wgpuSurfaceGetCapabilities",
        "wgpuSurfaceGetCurrentTexture",
    ]);

    let hand_written = vec![
        "WGPUBool",
        "WGPUStringView",
        "WGPUColor",
        "WGPUExtent3D",
        "WGPUOrigin3D",
        "WGPULimits",
        "WGPUVertexAttribute",
    ];
    options.add_exclude_structs(hand_written.clone());
    options.add_hand_written_types(hand_written);
    options.set_string_view_type("WGPUStringView");
    options.add_label_function_suffixes(vec!["SetLabel", "InsertDebugMarker", "PushDebugGroup"]);
    options.add_callback_type_substitution("WGPUBool", "uint");

    options.add_parameter_default("SetVertexBuffer", "offset", "0");
    options.add_parameter_default("SetVertexBuffer", "size", "WGPU_WHOLE_SIZE");
    options.add_parameter_default("SetIndexBuffer", "offset", "0");
    options.add_parameter_default("SetIndexBuffer", "size", "WGPU_WHOLE_SIZE");
    for function in &["Draw", "DrawIndexed"] {
        options.add_parameter_default(function, "instanceCount", "1");
        options.add_parameter_default(function, "firstInstance", "0");
    }
    options.add_parameter_default("Draw", "firstVertex", "0");
    options.add_parameter_default("DrawIndexed", "firstIndex", "0");
    options.add_parameter_default("DrawIndexed", "baseVertex", "0");
    options
}

/// Box2D v3 specific configuration.
pub fn box2d() -> GeneratorOptions {
    let mut options = GeneratorOptions::new("box2d", "Box2D");
    options.set_namespace(None);
    options.add_header("box2d/box2d.h");
    options.set_library_name("box2d");
    options.set_generate_library_loader(true);
    options.add_exclude_constants(vec!["B2_API", "B2_INLINE", "B2_ZERO_INIT", "B2_LITERAL"]);
    options
}

/// cgltf specific configuration.
pub fn cgltf() -> GeneratorOptions {
    let mut options = GeneratorOptions::new("cgltf", "Cgltf");
    options.set_namespace(None);
    options.add_header("cgltf/cgltf.h");
    options.set_library_name("cgltf");
    options.set_generate_library_loader(true);
    options.add_type_name_mapping("cgltf_bool", "CgltfBool");
    options.add_hand_written_types(vec!["CgltfBool"]);
    options
}

/// meshoptimizer specific configuration.
pub fn meshoptimizer() -> GeneratorOptions {
    let mut options = GeneratorOptions::new("meshoptimizer", "Meshopt");
    options.set_namespace(Some("MeshOptimizer"));
    options.add_header("meshoptimizer/meshoptimizer.h");
    options.set_library_name("meshoptimizer");
    options.set_generate_library_loader(true);
    options.set_function_prefix_remap("meshopt_");
    options.set_struct_prefix_remap("meshopt_");
    options.set_enum_prefix_remap("meshopt_");
    options.add_exclude_constants(vec!["MESHOPTIMIZER_API", "MESHOPTIMIZER_EXPERIMENTAL"]);
    // maintained in Stream.cs
    options.add_exclude_structs(vec!["meshopt_Stream"]);
    options.add_hand_written_types(vec!["meshopt_Stream"]);
    options.add_type_name_mapping("meshopt_Stream", "Stream");
    options
}

/// Configurations of all supported libraries.
pub fn all_targets() -> Vec<GeneratorOptions> {
    vec![webgpu(), box2d(), cgltf(), meshoptimizer()]
}
