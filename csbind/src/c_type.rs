//! Types for handling information about C types.

use itertools::Itertools;
use serde_derive::{Deserialize, Serialize};

/// Available built-in C numeric types.
/// All these types have corresponding
/// `clang::TypeKind` values (except for `CharS` and `CharU`
/// which map to `CBuiltInNumericType::Char`)
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum CBuiltInNumericType {
    Bool,
    Char,
    SChar,
    UChar,
    WChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Float,
    Double,
    LongDouble,
}

impl CBuiltInNumericType {
    /// Returns C code representing this type.
    pub fn to_c_code(self) -> &'static str {
        use self::CBuiltInNumericType::*;
        match self {
            Bool => "bool",
            Char => "char",
            SChar => "signed char",
            UChar => "unsigned char",
            WChar => "wchar_t",
            Short => "short",
            UShort => "unsigned short",
            Int => "int",
            UInt => "unsigned int",
            Long => "long",
            ULong => "unsigned long",
            LongLong => "long long",
            ULongLong => "unsigned long long",
            Float => "float",
            Double => "double",
            LongDouble => "long double",
        }
    }

    /// Returns C# name of the type with the same representation.
    ///
    /// `long` and `unsigned long` are mapped to 32-bit types, matching
    /// the Windows ABI of the native libraries.
    pub fn to_cs_code(self) -> &'static str {
        use self::CBuiltInNumericType::*;
        match self {
            Bool => "bool",
            Char | UChar => "byte",
            SChar => "sbyte",
            WChar => "char",
            Short => "short",
            UShort => "ushort",
            Int | Long => "int",
            UInt | ULong => "uint",
            LongLong => "long",
            ULongLong => "ulong",
            Float => "float",
            Double | LongDouble => "double",
        }
    }
}

/// A named argument of a function or function pointer.
#[derive(Debug, PartialEq, Eq, Clone, Hash, Serialize, Deserialize)]
pub struct CParameter {
    /// Name of the argument. Unnamed arguments get `argN` names.
    pub name: String,
    pub parameter_type: CType,
}

/// Information about a C function pointer type
#[derive(Debug, PartialEq, Eq, Clone, Hash, Serialize, Deserialize)]
pub struct CFunctionPointerType {
    /// Return type of the function
    pub return_type: Box<CType>,
    /// Arguments of the function
    pub arguments: Vec<CParameter>,
}

/// A C type as it is spelled in the header, with typedef
/// names preserved.
#[derive(Debug, PartialEq, Eq, Clone, Hash, Serialize, Deserialize)]
pub enum CType {
    /// Void
    Void,
    /// Built-in C primitive type, like int
    BuiltInNumeric(CBuiltInNumericType),
    /// Typedef name and the type it stands for
    Typedef { name: String, target: Box<CType> },
    /// Enum type
    Enum { name: String },
    /// Struct or union type. Name is empty for anonymous records.
    Record { name: String },
    /// Pointer. `is_const` is the constness of the pointee.
    Pointer { is_const: bool, target: Box<CType> },
    /// Fixed size array
    Array { element: Box<CType>, size: usize },
    /// Pointer to a function
    FunctionPointer(CFunctionPointerType),
}

impl CType {
    pub fn new_pointer(is_const: bool, target: CType) -> Self {
        CType::Pointer {
            is_const,
            target: Box::new(target),
        }
    }

    pub fn new_typedef<S: Into<String>>(name: S, target: CType) -> Self {
        CType::Typedef {
            name: name.into(),
            target: Box::new(target),
        }
    }

    pub fn new_array(element: CType, size: usize) -> Self {
        CType::Array {
            element: Box::new(element),
            size,
        }
    }

    pub fn is_void(&self) -> bool {
        *self == CType::Void
    }

    pub fn is_pointer(&self) -> bool {
        match self {
            CType::Pointer { .. } => true,
            _ => false,
        }
    }

    pub fn is_function_pointer(&self) -> bool {
        match self {
            CType::FunctionPointer(_) => true,
            _ => false,
        }
    }

    /// Returns the type with all typedefs at the top level removed.
    pub fn without_typedefs(&self) -> &CType {
        let mut current = self;
        while let CType::Typedef { target, .. } = current {
            current = target;
        }
        current
    }

    /// Returns true if the type is a built-in numeric type
    /// or a typedef of one.
    pub fn is_primitive(&self) -> bool {
        match self.without_typedefs() {
            CType::BuiltInNumeric(_) => true,
            _ => false,
        }
    }

    /// Returns the function pointer type this typedef stands for, if any.
    /// Bare function pointer types (not behind a typedef) are not matched.
    pub fn typedef_function_pointer(&self) -> Option<&CFunctionPointerType> {
        if let CType::Typedef { .. } = self {
            if let CType::FunctionPointer(function) = self.without_typedefs() {
                return Some(function);
            }
        }
        None
    }

    /// Returns C code representing this type.
    pub fn to_c_code(&self) -> String {
        match self {
            CType::Void => "void".to_string(),
            CType::BuiltInNumeric(t) => t.to_c_code().to_string(),
            CType::Typedef { name, .. } | CType::Enum { name } | CType::Record { name } => {
                name.clone()
            }
            CType::Pointer { is_const, target } => format!(
                "{}{}*",
                if *is_const { "const " } else { "" },
                target.to_c_code()
            ),
            CType::Array { element, size } => format!("{}[{}]", element.to_c_code(), size),
            CType::FunctionPointer(function) => format!(
                "{} (*)({})",
                function.return_type.to_c_code(),
                function
                    .arguments
                    .iter()
                    .map(|arg| arg.parameter_type.to_c_code())
                    .join(", ")
            ),
        }
    }
}
