use super::{numeric, typedef};
use crate::c_type::CBuiltInNumericType::*;
use crate::c_type::{CFunctionPointerType, CType};
use crate::type_map::TypeMap;

#[test]
fn built_in_mappings() {
    let map = TypeMap::new();
    assert_eq!(map.cs_type_name(&numeric(Int)).unwrap(), "int");
    assert_eq!(map.cs_type_name(&numeric(ULongLong)).unwrap(), "ulong");
    assert_eq!(
        map.cs_type_name(&typedef("uint32_t", numeric(UInt))).unwrap(),
        "uint"
    );
    assert_eq!(
        map.cs_type_name(&typedef("size_t", numeric(ULong))).unwrap(),
        "nuint"
    );
    assert_eq!(
        map.cs_type_name(&CType::new_pointer(true, numeric(Char)))
            .unwrap(),
        "byte*"
    );
    assert_eq!(
        map.cs_type_name(&CType::new_pointer(false, CType::Void))
            .unwrap(),
        "void*"
    );
}

#[test]
fn typedefs_resolve_to_underlying_type_unless_declared() {
    let mut map = TypeMap::new();
    let lib_int = typedef("LIB_Int", numeric(Int));
    assert_eq!(map.cs_type_name(&lib_int).unwrap(), "int");

    let handle = typedef(
        "LIB_Texture",
        CType::new_pointer(
            false,
            CType::Record {
                name: "LIB_TextureImpl".to_string(),
            },
        ),
    );
    assert_eq!(map.cs_type_name(&handle).unwrap(), "LIB_TextureImpl*");
    map.declare("LIB_Texture");
    assert_eq!(map.cs_type_name(&handle).unwrap(), "LIB_Texture");
    assert_eq!(
        map.cs_type_name(&CType::new_pointer(false, handle)).unwrap(),
        "LIB_Texture*"
    );
}

#[test]
fn renames_follow_chains() {
    let mut map = TypeMap::new();
    map.add_mapping("WGPUTextureUsageFlags", "WGPUTextureUsage");
    map.add_mapping("WGPUTextureUsage", "TextureUsage");
    assert_eq!(
        map.resolve_name("WGPUTextureUsageFlags").unwrap(),
        "TextureUsage"
    );
    let record = CType::Record {
        name: "WGPUTextureUsage".to_string(),
    };
    assert_eq!(map.cs_type_name(&record).unwrap(), "TextureUsage");
    assert_eq!(
        map.cs_type_name(&CType::new_array(record, 4)).unwrap(),
        "TextureUsage*"
    );
    assert_eq!(map.resolve_name("LIB_Unknown").unwrap(), "LIB_Unknown");
}

#[test]
fn mapping_cycle_is_an_error() {
    let mut map = TypeMap::new();
    map.add_mapping("A", "B");
    map.add_mapping("B", "A");
    let err = map.resolve_name("A").unwrap_err();
    assert!(err.to_string().contains("A -> B -> A"), "{}", err);
    assert!(map
        .cs_type_name(&CType::Enum {
            name: "B".to_string()
        })
        .is_err());
}

#[test]
fn function_pointers() {
    let map = TypeMap::new();
    assert_eq!(map.resolve_name("PFN_vkVoidFunction").unwrap(), "nint");
    let function = CType::FunctionPointer(CFunctionPointerType {
        return_type: Box::new(CType::Void),
        arguments: Vec::new(),
    });
    assert_eq!(map.cs_type_name(&function).unwrap(), "nint");
    assert_eq!(
        map.cs_type_name(&typedef("LIB_Proc", function)).unwrap(),
        "nint"
    );
}

#[test]
fn anonymous_records_are_not_supported() {
    let map = TypeMap::new();
    let record = CType::Record {
        name: String::new(),
    };
    assert!(map.cs_type_name(&record).is_err());
}
