//! C parser based on libclang.
//!
//! All headers of a target are included into one in-memory
//! translation unit. Declarations located outside of the target's
//! header directories (system headers, dependencies) are ignored.

use crate::c_data::{
    CDeclaration, CDiagnostic, CDiagnosticSeverity, CEnum, CEnumItem, CExpression, CField,
    CFunction, CHeaderData, CMacro, CParseResult, CRecord, CRecordKind, CTypedef, CVariable,
};
use crate::c_type::{CBuiltInNumericType, CFunctionPointerType, CParameter, CType};
use crate::config::GeneratorOptions;
use clang::diagnostic::Severity;
use clang::token::{Token, TokenKind};
use clang::{Clang, Entity, EntityKind, Index, Type, TypeKind, Unsaved};
use csbind_common::errors::{bail, causes, format_err, Result};
use csbind_common::file_utils::path_to_str;
use log::{debug, info, trace, warn};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the in-memory file including all headers.
const UMBRELLA_FILE_NAME: &str = "csbind_umbrella.c";

fn convert_type_kind(kind: TypeKind) -> Option<CBuiltInNumericType> {
    use crate::c_type::CBuiltInNumericType::*;
    Some(match kind {
        TypeKind::Bool => Bool,
        TypeKind::CharS | TypeKind::CharU => Char,
        TypeKind::SChar => SChar,
        TypeKind::UChar => UChar,
        TypeKind::WChar => WChar,
        TypeKind::Short => Short,
        TypeKind::UShort => UShort,
        TypeKind::Int => Int,
        TypeKind::UInt => UInt,
        TypeKind::Long => Long,
        TypeKind::ULong => ULong,
        TypeKind::LongLong => LongLong,
        TypeKind::ULongLong => ULongLong,
        TypeKind::Float => Float,
        TypeKind::Double => Double,
        TypeKind::LongDouble => LongDouble,
        _ => return None,
    })
}

fn convert_severity(severity: Severity) -> CDiagnosticSeverity {
    match severity {
        Severity::Ignored => CDiagnosticSeverity::Ignored,
        Severity::Note => CDiagnosticSeverity::Note,
        Severity::Warning => CDiagnosticSeverity::Warning,
        Severity::Error => CDiagnosticSeverity::Error,
        Severity::Fatal => CDiagnosticSeverity::Fatal,
    }
}

/// Name of `entity`, or `None` if it is anonymous.
/// Newer libclang versions spell anonymous records as `struct (unnamed at ...)`.
fn entity_name(entity: Entity<'_>) -> Option<String> {
    entity
        .get_name()
        .filter(|name| !name.is_empty() && !name.contains("(unnamed") && !name.contains("(anonymous"))
}

/// Joins spellings of `tokens`, separating only adjacent words.
fn join_tokens(tokens: &[Token<'_>]) -> String {
    let mut text = String::new();
    let mut previous_is_word = false;
    for token in tokens {
        let is_word = match token.get_kind() {
            TokenKind::Comment => continue,
            TokenKind::Identifier | TokenKind::Keyword | TokenKind::Literal => true,
            TokenKind::Punctuation => false,
        };
        if is_word && previous_is_word {
            text.push(' ');
        }
        text.push_str(&token.get_spelling());
        previous_is_word = is_word;
    }
    text
}

fn entity_tokens(entity: Entity<'_>) -> Vec<Token<'_>> {
    entity
        .get_range()
        .map(|range| range.tokenize())
        .unwrap_or_default()
}

fn entity_text(entity: Entity<'_>) -> String {
    join_tokens(&entity_tokens(entity))
}

/// Converts an enumerator value expression.
fn parse_expression(entity: Entity<'_>) -> CExpression {
    let children = entity.get_children();
    match entity.get_kind() {
        EntityKind::IntegerLiteral
        | EntityKind::FloatingLiteral
        | EntityKind::CharacterLiteral
        | EntityKind::StringLiteral => {
            let text = entity_text(entity);
            // literals expanded from macros are spelled as the macro name
            if text.starts_with(|c: char| c.is_ascii_digit() || c == '\'' || c == '"') {
                CExpression::Literal(text)
            } else {
                CExpression::Raw(text)
            }
        }
        EntityKind::DeclRefExpr => match entity.get_name() {
            Some(name) => CExpression::Reference(name),
            None => CExpression::Raw(entity_text(entity)),
        },
        EntityKind::ParenExpr if children.len() == 1 => {
            CExpression::Paren(Box::new(parse_expression(children[0])))
        }
        EntityKind::UnaryOperator if children.len() == 1 => {
            match entity_tokens(entity).first() {
                Some(token) => {
                    CExpression::unary(token.get_spelling(), parse_expression(children[0]))
                }
                None => CExpression::Raw(entity_text(entity)),
            }
        }
        EntityKind::BinaryOperator if children.len() == 2 => {
            let left_tokens = entity_tokens(children[0]).len();
            match entity_tokens(entity).get(left_tokens) {
                Some(token) => CExpression::binary(
                    token.get_spelling(),
                    parse_expression(children[0]),
                    parse_expression(children[1]),
                ),
                None => CExpression::Raw(entity_text(entity)),
            }
        }
        EntityKind::UnexposedExpr if children.len() == 1 => parse_expression(children[0]),
        _ => CExpression::Raw(entity_text(entity)),
    }
}

/// Declaration of an anonymous struct, union or enum defined
/// directly in a typedef (`typedef struct { ... } Name;`).
fn anonymous_definition(clang_type: Type<'_>) -> Option<Entity<'_>> {
    let clang_type = match clang_type.get_kind() {
        TypeKind::Elaborated => clang_type.get_elaborated_type()?,
        _ => clang_type,
    };
    match clang_type.get_kind() {
        TypeKind::Record | TypeKind::Enum => {
            let declaration = clang_type.get_declaration()?;
            if entity_name(declaration).is_none() && declaration.is_definition() {
                Some(declaration)
            } else {
                None
            }
        }
        _ => None,
    }
}

struct CParser {
    /// Declarations in files under these directories are parsed
    header_dirs: Vec<PathBuf>,
    data: CHeaderData,
}

impl CParser {
    fn is_in_target_headers(&self, entity: Entity<'_>) -> bool {
        if entity.is_in_system_header() {
            return false;
        }
        let file = match entity
            .get_location()
            .and_then(|location| location.get_file_location().file)
        {
            Some(file) => file,
            None => return false,
        };
        let path = file.get_path();
        self.header_dirs.iter().any(|dir| path.starts_with(dir))
    }

    fn parse_function_type(
        &self,
        clang_type: Type<'_>,
        context: Option<Entity<'_>>,
    ) -> Result<CFunctionPointerType> {
        let result_type = clang_type
            .get_result_type()
            .ok_or_else(|| format_err!("no result type: {}", clang_type.get_display_name()))?;
        let names = context
            .map(|entity| {
                entity
                    .get_children()
                    .into_iter()
                    .filter(|child| child.get_kind() == EntityKind::ParmDecl)
                    .map(entity_name)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        let mut arguments = Vec::new();
        for (index, argument_type) in clang_type
            .get_argument_types()
            .unwrap_or_default()
            .into_iter()
            .enumerate()
        {
            arguments.push(CParameter {
                name: names
                    .get(index)
                    .cloned()
                    .flatten()
                    .unwrap_or_else(|| format!("arg{}", index)),
                parameter_type: self.parse_type(argument_type, None)?,
            });
        }
        Ok(CFunctionPointerType {
            return_type: Box::new(self.parse_type(result_type, None)?),
            arguments,
        })
    }

    /// Converts `clang_type`. `context` is the declaration the type
    /// belongs to; it provides parameter names of function pointers.
    fn parse_type(&self, clang_type: Type<'_>, context: Option<Entity<'_>>) -> Result<CType> {
        let display_name = clang_type.get_display_name();
        let kind = clang_type.get_kind();
        if let Some(numeric) = convert_type_kind(kind) {
            return Ok(CType::BuiltInNumeric(numeric));
        }
        match kind {
            TypeKind::Void => Ok(CType::Void),
            TypeKind::Elaborated => {
                let named = clang_type
                    .get_elaborated_type()
                    .ok_or_else(|| format_err!("no named type: {}", display_name))?;
                self.parse_type(named, context)
            }
            TypeKind::Typedef => {
                let declaration = clang_type
                    .get_declaration()
                    .ok_or_else(|| format_err!("no typedef declaration: {}", display_name))?;
                let name = entity_name(declaration)
                    .ok_or_else(|| format_err!("typedef without name: {}", display_name))?;
                let underlying = declaration
                    .get_typedef_underlying_type()
                    .ok_or_else(|| format_err!("no underlying type: {}", name))?;
                let target = self.parse_type(underlying, Some(declaration))?;
                Ok(CType::new_typedef(name, target))
            }
            TypeKind::Enum => Ok(CType::Enum {
                name: clang_type
                    .get_declaration()
                    .and_then(entity_name)
                    .unwrap_or_default(),
            }),
            TypeKind::Record => Ok(CType::Record {
                name: clang_type
                    .get_declaration()
                    .and_then(entity_name)
                    .unwrap_or_default(),
            }),
            TypeKind::Pointer => {
                let pointee = clang_type
                    .get_pointee_type()
                    .ok_or_else(|| format_err!("no pointee type: {}", display_name))?;
                match pointee.get_kind() {
                    TypeKind::FunctionPrototype | TypeKind::FunctionNoPrototype => Ok(
                        CType::FunctionPointer(self.parse_function_type(pointee, context)?),
                    ),
                    _ => Ok(CType::new_pointer(
                        pointee.is_const_qualified(),
                        self.parse_type(pointee, None)?,
                    )),
                }
            }
            TypeKind::ConstantArray => {
                let element = clang_type
                    .get_element_type()
                    .ok_or_else(|| format_err!("no element type: {}", display_name))?;
                let size = clang_type
                    .get_size()
                    .ok_or_else(|| format_err!("no array size: {}", display_name))?;
                Ok(CType::new_array(self.parse_type(element, None)?, size))
            }
            TypeKind::IncompleteArray => {
                let element = clang_type
                    .get_element_type()
                    .ok_or_else(|| format_err!("no element type: {}", display_name))?;
                Ok(CType::new_pointer(
                    element.is_const_qualified(),
                    self.parse_type(element, None)?,
                ))
            }
            _ => bail!("unsupported type: {} ({:?})", display_name, kind),
        }
    }

    fn parse_macro(&mut self, entity: Entity<'_>, name: String) {
        let tokens = entity_tokens(entity);
        // the first token is the name of the macro
        let value = if tokens.len() > 1 {
            join_tokens(&tokens[1..])
        } else {
            String::new()
        };
        self.data.add(CDeclaration::Macro(CMacro {
            name,
            value,
            is_function_like: entity.is_function_like_macro(),
        }));
    }

    fn parse_enum(&mut self, entity: Entity<'_>, name: String) -> Result<()> {
        let mut items = Vec::new();
        for child in entity.get_children() {
            if child.get_kind() != EntityKind::EnumConstantDecl {
                continue;
            }
            let item_name =
                entity_name(child).ok_or_else(|| format_err!("enumerator without name"))?;
            let (value, _) = child
                .get_enum_constant_value()
                .ok_or_else(|| format_err!("failed to get value of {}", item_name))?;
            items.push(CEnumItem {
                name: item_name,
                value,
                expression: child.get_children().into_iter().next().map(parse_expression),
            });
        }
        self.data.add(CDeclaration::Enum(CEnum { name, items }));
        Ok(())
    }

    fn parse_record(&mut self, entity: Entity<'_>, name: String) -> Result<()> {
        let kind = if entity.get_kind() == EntityKind::UnionDecl {
            CRecordKind::Union
        } else {
            CRecordKind::Struct
        };
        let size = entity
            .get_type()
            .and_then(|record_type| record_type.get_sizeof().ok())
            .unwrap_or(0);
        let mut fields = Vec::new();
        for child in entity.get_children() {
            match child.get_kind() {
                EntityKind::FieldDecl => {
                    let field_name = entity_name(child).unwrap_or_default();
                    if child.is_bit_field() {
                        bail!("bit field {} is not supported", field_name);
                    }
                    let field_type = child
                        .get_type()
                        .ok_or_else(|| format_err!("failed to get type of {}", field_name))?;
                    fields.push(CField {
                        field_type: self.parse_type(field_type, Some(child))?,
                        name: field_name,
                    });
                }
                EntityKind::StructDecl | EntityKind::UnionDecl | EntityKind::EnumDecl => {
                    self.parse_entity(child)?;
                }
                _ => {}
            }
        }
        self.data.add(CDeclaration::Record(CRecord {
            name,
            kind,
            size,
            fields,
        }));
        Ok(())
    }

    fn parse_typedef(&mut self, entity: Entity<'_>, name: String) -> Result<()> {
        let underlying = entity
            .get_typedef_underlying_type()
            .ok_or_else(|| format_err!("no underlying type"))?;
        if let Some(declaration) = anonymous_definition(underlying) {
            if declaration.get_kind() == EntityKind::EnumDecl {
                self.parse_enum(declaration, name.clone())?;
            } else {
                self.parse_record(declaration, name.clone())?;
            }
        }
        let target = self.parse_type(underlying, Some(entity))?;
        self.data.add(CDeclaration::Typedef(CTypedef { name, target }));
        Ok(())
    }

    fn parse_function(&mut self, entity: Entity<'_>, name: String) -> Result<()> {
        let result_type = entity
            .get_result_type()
            .ok_or_else(|| format_err!("failed to get return type"))?;
        let mut parameters = Vec::new();
        for (index, argument) in entity
            .get_arguments()
            .unwrap_or_default()
            .into_iter()
            .enumerate()
        {
            let argument_type = argument
                .get_type()
                .ok_or_else(|| format_err!("failed to get type of argument {}", index))?;
            parameters.push(CParameter {
                name: entity_name(argument).unwrap_or_else(|| format!("arg{}", index)),
                parameter_type: self.parse_type(argument_type, Some(argument))?,
            });
        }
        self.data.add(CDeclaration::Function(CFunction {
            name,
            return_type: self.parse_type(result_type, None)?,
            parameters,
            is_inline: entity.is_inline_function(),
            is_variadic: entity.is_variadic(),
        }));
        Ok(())
    }

    fn parse_variable(&mut self, entity: Entity<'_>, name: String) -> Result<()> {
        let variable_type = entity
            .get_type()
            .ok_or_else(|| format_err!("failed to get type"))?;
        let tokens = entity_tokens(entity);
        let init = tokens
            .iter()
            .position(|token| {
                token.get_kind() == TokenKind::Punctuation && token.get_spelling() == "="
            })
            .map(|position| join_tokens(&tokens[position + 1..]))
            .filter(|init| !init.is_empty());
        self.data.add(CDeclaration::Variable(CVariable {
            name,
            variable_type: self.parse_type(variable_type, Some(entity))?,
            init,
        }));
        Ok(())
    }

    fn parse_entity(&mut self, entity: Entity<'_>) -> Result<()> {
        if !self.is_in_target_headers(entity) {
            return Ok(());
        }
        let name = match entity_name(entity) {
            Some(name) => name,
            None => {
                trace!("skipping anonymous entity: {:?}", entity.get_kind());
                return Ok(());
            }
        };
        match entity.get_kind() {
            EntityKind::MacroDefinition => self.parse_macro(entity, name),
            EntityKind::EnumDecl if entity.is_definition() => self.parse_enum(entity, name)?,
            EntityKind::StructDecl | EntityKind::UnionDecl if entity.is_definition() => {
                self.parse_record(entity, name)?
            }
            EntityKind::TypedefDecl => self.parse_typedef(entity, name)?,
            EntityKind::FunctionDecl => self.parse_function(entity, name)?,
            EntityKind::VarDecl => self.parse_variable(entity, name)?,
            _ => {}
        }
        Ok(())
    }
}

/// Returns clang arguments for `options`.
fn clang_arguments(options: &GeneratorOptions) -> Result<Vec<String>> {
    let mut args = vec!["-x".to_string(), "c".to_string(), "-std=c11".to_string()];
    for dir in options.include_paths() {
        args.push("-I".to_string());
        args.push(path_to_str(dir)?.to_string());
    }
    if let Ok(path) = env::var("CLANG_SYSTEM_INCLUDE_PATH") {
        if !Path::new(&path).exists() {
            warn!(
                "CLANG_SYSTEM_INCLUDE_PATH environment variable is set to \"{}\" \
                 but this path does not exist",
                path
            );
        }
        args.push("-isystem".to_string());
        args.push(path);
    } else {
        debug!("CLANG_SYSTEM_INCLUDE_PATH environment variable is not set");
    }
    args.extend(options.parser_arguments().iter().cloned());
    Ok(args)
}

/// Parses headers of `options` and returns their declarations
/// and the diagnostics reported by clang.
pub fn parse(options: &GeneratorOptions) -> Result<CParseResult> {
    let first_header = match options.headers().first() {
        Some(header) => header,
        None => bail!("no headers specified for {}", options.name()),
    };
    let clang =
        Clang::new().map_err(|err| format_err!("failed to initialize libclang: {}", err))?;
    debug!("{}", clang::get_version());
    let index = Index::new(&clang, false, false);

    let mut umbrella = String::new();
    for header in options.headers() {
        umbrella.push_str(&format!("#include \"{}\"\n", path_to_str(header)?));
    }
    let umbrella_path = first_header
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(UMBRELLA_FILE_NAME);
    let args = clang_arguments(options)?;
    debug!("clang arguments: {:?}", args);

    info!("Parsing headers of {}", options.name());
    let tu = index
        .parser(&umbrella_path)
        .arguments(&args)
        .detailed_preprocessing_record(true)
        .skip_function_bodies(true)
        .unsaved(&[Unsaved::new(&umbrella_path, &umbrella)])
        .parse()
        .map_err(|err| format_err!("clang parse failed: {}", err))?;

    let diagnostics = tu
        .get_diagnostics()
        .into_iter()
        .map(|diagnostic| CDiagnostic {
            severity: convert_severity(diagnostic.get_severity()),
            text: diagnostic.to_string(),
        })
        .collect::<Vec<_>>();
    for diagnostic in &diagnostics {
        debug!("{}", diagnostic);
    }

    let mut header_dirs = options.include_paths().to_vec();
    for header in options.headers() {
        if let Some(parent) = header.parent() {
            if !header_dirs.iter().any(|dir| dir == parent) {
                header_dirs.push(parent.to_path_buf());
            }
        }
    }
    let mut parser = CParser {
        header_dirs,
        data: CHeaderData::default(),
    };
    for entity in tu.get_entity().get_children() {
        if let Err(err) = parser.parse_entity(entity) {
            warn!(
                "skipping {}: {}",
                entity.get_name().unwrap_or_else(|| "?".to_string()),
                causes(&err).join(": ")
            );
        }
    }
    info!(
        "{}: {} declarations parsed",
        options.name(),
        parser.data.declarations.len()
    );
    Ok(CParseResult {
        header: parser.data,
        diagnostics,
    })
}
