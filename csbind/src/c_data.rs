//! Declarations extracted from C headers.

use crate::c_type::{CParameter, CType};
use itertools::Itertools;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// An object-like or function-like preprocessor macro.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct CMacro {
    pub name: String,
    /// Tokens of the macro body
    pub value: String,
    pub is_function_like: bool,
}

/// Expression tree of an enumerator value.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CExpression {
    /// Number, character or string literal as spelled in the header
    Literal(String),
    /// Name of another enumerator or constant
    Reference(String),
    Unary {
        operator: String,
        operand: Box<CExpression>,
    },
    Binary {
        operator: String,
        left: Box<CExpression>,
        right: Box<CExpression>,
    },
    Paren(Box<CExpression>),
    /// Unsupported expression, kept as source text
    Raw(String),
}

impl CExpression {
    pub fn binary<S: Into<String>>(operator: S, left: CExpression, right: CExpression) -> Self {
        CExpression::Binary {
            operator: operator.into(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary<S: Into<String>>(operator: S, operand: CExpression) -> Self {
        CExpression::Unary {
            operator: operator.into(),
            operand: Box::new(operand),
        }
    }

    /// Returns C code of the expression.
    pub fn to_c_code(&self) -> String {
        match self {
            CExpression::Literal(text) | CExpression::Reference(text) | CExpression::Raw(text) => {
                text.clone()
            }
            CExpression::Unary { operator, operand } => {
                format!("{}{}", operator, operand.to_c_code())
            }
            CExpression::Binary {
                operator,
                left,
                right,
            } => format!("{} {} {}", left.to_c_code(), operator, right.to_c_code()),
            CExpression::Paren(inner) => format!("({})", inner.to_c_code()),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct CEnumItem {
    pub name: String,
    /// Value computed by the compiler
    pub value: i64,
    /// Value as written in the header, if it was written
    pub expression: Option<CExpression>,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct CEnum {
    pub name: String,
    pub items: Vec<CEnumItem>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum CRecordKind {
    Struct,
    Union,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct CField {
    pub name: String,
    pub field_type: CType,
}

/// A struct or union definition.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct CRecord {
    /// Name of the record. Empty for anonymous records.
    pub name: String,
    pub kind: CRecordKind,
    /// Size in bytes
    pub size: usize,
    pub fields: Vec<CField>,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct CTypedef {
    pub name: String,
    pub target: CType,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct CFunction {
    pub name: String,
    pub return_type: CType,
    pub parameters: Vec<CParameter>,
    pub is_inline: bool,
    pub is_variadic: bool,
}

/// A file-scope variable, typically a `static const` flag value.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct CVariable {
    pub name: String,
    pub variable_type: CType,
    /// Initializer as spelled in the header
    pub init: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CDeclaration {
    Macro(CMacro),
    Enum(CEnum),
    Record(CRecord),
    Typedef(CTypedef),
    Function(CFunction),
    Variable(CVariable),
}

impl CDeclaration {
    pub fn name(&self) -> &str {
        match self {
            CDeclaration::Macro(x) => &x.name,
            CDeclaration::Enum(x) => &x.name,
            CDeclaration::Record(x) => &x.name,
            CDeclaration::Typedef(x) => &x.name,
            CDeclaration::Function(x) => &x.name,
            CDeclaration::Variable(x) => &x.name,
        }
    }
}

/// All declarations of a set of headers in source order.
#[derive(Debug, PartialEq, Eq, Clone, Default, Serialize, Deserialize)]
pub struct CHeaderData {
    pub declarations: Vec<CDeclaration>,
}

impl CHeaderData {
    pub fn add(&mut self, declaration: CDeclaration) {
        self.declarations.push(declaration);
    }

    pub fn macros(&self) -> impl Iterator<Item = &CMacro> {
        self.declarations.iter().filter_map(|d| match d {
            CDeclaration::Macro(x) => Some(x),
            _ => None,
        })
    }

    pub fn enums(&self) -> impl Iterator<Item = &CEnum> {
        self.declarations.iter().filter_map(|d| match d {
            CDeclaration::Enum(x) => Some(x),
            _ => None,
        })
    }

    pub fn records(&self) -> impl Iterator<Item = &CRecord> {
        self.declarations.iter().filter_map(|d| match d {
            CDeclaration::Record(x) => Some(x),
            _ => None,
        })
    }

    pub fn typedefs(&self) -> impl Iterator<Item = &CTypedef> {
        self.declarations.iter().filter_map(|d| match d {
            CDeclaration::Typedef(x) => Some(x),
            _ => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &CFunction> {
        self.declarations.iter().filter_map(|d| match d {
            CDeclaration::Function(x) => Some(x),
            _ => None,
        })
    }

    pub fn variables(&self) -> impl Iterator<Item = &CVariable> {
        self.declarations.iter().filter_map(|d| match d {
            CDeclaration::Variable(x) => Some(x),
            _ => None,
        })
    }

    /// Returns the definition of the struct or union `name`, if the headers have one.
    pub fn find_record(&self, name: &str) -> Option<&CRecord> {
        self.records().find(|r| r.name == name)
    }

    pub fn find_enum(&self, name: &str) -> Option<&CEnum> {
        self.enums().find(|e| e.name == name)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum CDiagnosticSeverity {
    Ignored,
    Note,
    Warning,
    Error,
    Fatal,
}

/// A message reported by the C parser.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct CDiagnostic {
    pub severity: CDiagnosticSeverity,
    /// Message, prefixed with the location when it is known
    pub text: String,
}

impl CDiagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == CDiagnosticSeverity::Error || self.severity == CDiagnosticSeverity::Fatal
    }
}

impl fmt::Display for CDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            CDiagnosticSeverity::Ignored => "ignored",
            CDiagnosticSeverity::Note => "note",
            CDiagnosticSeverity::Warning => "warning",
            CDiagnosticSeverity::Error => "error",
            CDiagnosticSeverity::Fatal => "fatal error",
        };
        write!(f, "{}: {}", severity, self.text)
    }
}

/// Output of one parser run.
#[derive(Debug, Clone, Default)]
pub struct CParseResult {
    pub header: CHeaderData,
    pub diagnostics: Vec<CDiagnostic>,
}

impl CParseResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(CDiagnostic::is_error)
    }

    pub fn errors(&self) -> Vec<&CDiagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error()).collect_vec()
    }
}
