//! Struct and union layouts.

use super::Generator;
use crate::c_data::{CField, CRecord, CRecordKind};
use crate::c_type::CType;
use crate::code_writer::{CodeWriter, FileHeader};
use crate::overrides::{abi_field_type, escape_keyword};
use csbind_common::errors::{bail, causes, Result, ResultExt};
use log::{trace, warn};

/// C# types allowed as elements of `fixed` buffers.
const FIXED_BUFFER_TYPES: &[&str] = &[
    "bool", "byte", "char", "short", "int", "long", "sbyte", "ushort", "uint", "ulong", "float",
    "double",
];

fn is_fixed_buffer_type(cs_type: &str) -> bool {
    FIXED_BUFFER_TYPES.contains(&cs_type)
}

/// Writes `{name}__FixedBuffer` wrapper of an array of `size` elements
/// of type `cs_type`.
fn write_fixed_buffer(writer: &mut CodeWriter, buffer_name: &str, cs_type: &str, size: usize) -> Result<()> {
    let is_pointer = cs_type.ends_with('*');
    writer.block(&format!("public unsafe struct {}", buffer_name), |writer| {
        for index in 0..size {
            writer.write_line(&format!("public {} e{};", cs_type, index));
        }
        writer.empty_line();
        writer.write_line("[UnscopedRef]");
        writer.block(&format!("public ref {} this[int index]", cs_type), |writer| {
            writer.write_line("[MethodImpl(MethodImplOptions.AggressiveInlining)]");
            writer.block("get", |writer| {
                if is_pointer {
                    writer.write_line(&format!(
                        "if ((uint)index >= {}) throw new IndexOutOfRangeException();",
                        size
                    ));
                    writer.block(&format!("fixed ({}* pThis = &e0)", cs_type), |writer| {
                        writer.write_line("return ref pThis[index];");
                        Ok(())
                    })
                } else {
                    writer.write_line("return ref AsSpan()[index];");
                    Ok(())
                }
            })
        })?;
        if !is_pointer {
            writer.empty_line();
            writer.write_line("[UnscopedRef]");
            writer.write_line("[MethodImpl(MethodImplOptions.AggressiveInlining)]");
            writer.block(&format!("public Span<{}> AsSpan()", cs_type), |writer| {
                writer.write_line(&format!("return MemoryMarshal.CreateSpan(ref e0, {});", size));
                Ok(())
            })?;
        }
        Ok(())
    })
}

impl Generator<'_> {
    fn write_array_field(
        &self,
        writer: &mut CodeWriter,
        field_name: &str,
        element: &CType,
        size: usize,
    ) -> Result<()> {
        let name = escape_keyword(field_name);
        if let CType::Array {
            element: inner,
            size: inner_size,
        } = element.without_typedefs()
        {
            let cs_type = self.type_map.cs_type_name(inner)?;
            if !is_fixed_buffer_type(&cs_type) {
                bail!("unsupported two-dimensional array of {}", cs_type);
            }
            writer.write_line(&format!(
                "public unsafe fixed {} {}[{} * {}];",
                cs_type, name, size, inner_size
            ));
            return Ok(());
        }

        let cs_type = self.type_map.cs_type_name(element)?;
        if is_fixed_buffer_type(&cs_type) {
            writer.write_line(&format!("public unsafe fixed {} {}[{}];", cs_type, name, size));
            return Ok(());
        }
        let buffer_name = format!("{}__FixedBuffer", field_name);
        writer.write_line(&format!("public {} {};", buffer_name, name));
        writer.empty_line();
        write_fixed_buffer(writer, &buffer_name, &cs_type, size)
    }

    fn write_field(&self, writer: &mut CodeWriter, field: &CField, is_union: bool) -> Result<()> {
        if field.name.is_empty() {
            bail!("unnamed field of type {}", field.field_type.to_c_code());
        }
        if is_union {
            writer.write_line("[FieldOffset(0)]");
        }
        let name = escape_keyword(&field.name);
        if let Some(cs_type) = self.options.field_type_override(&field.name) {
            writer.write_line(&format!("public {} {};", cs_type, name));
            return Ok(());
        }
        if let CType::Array { element, size } = &field.field_type {
            return self.write_array_field(writer, &field.name, element, *size);
        }
        if let CType::FunctionPointer(function) = field.field_type.without_typedefs() {
            let signature = self.callback_signature(function)?;
            writer.write_line(&format!("public unsafe {} {};", signature, name));
            return Ok(());
        }
        let cs_type = match abi_field_type(&field.field_type.to_c_code()) {
            Some(cs_type) => cs_type.to_string(),
            None => self.type_map.cs_type_name(&field.field_type)?,
        };
        let modifier = if cs_type.ends_with('*') { "unsafe " } else { "" };
        writer.write_line(&format!("public {}{} {};", modifier, cs_type, name));
        Ok(())
    }

    /// Writes the record to a separate writer so that a field
    /// that can't be translated drops the whole record.
    fn write_record(&self, record: &CRecord) -> Result<CodeWriter> {
        let cs_name = self.type_map.resolve_name(&record.name)?;
        let is_union = record.kind == CRecordKind::Union;
        let mut writer = CodeWriter::fragment();
        if is_union {
            writer.write_line("[StructLayout(LayoutKind.Explicit)]");
        }
        let header = format!("{} partial struct {}", self.options.visibility(), cs_name);
        writer.block(&header, |writer| {
            if self.options.generate_size_of_structs() {
                writer.write_line("/// <summary>");
                writer.write_line(&format!(
                    "/// The size of the <see cref=\"{}\"/> type, in bytes.",
                    cs_name
                ));
                writer.write_line("/// </summary>");
                writer.write_line(&format!(
                    "public static readonly int SizeInBytes = {};",
                    record.size
                ));
                writer.empty_line();
            }
            for field in &record.fields {
                self.write_field(writer, field, is_union)
                    .with_context(|_| format!("field {}", field.name))?;
            }
            Ok(())
        })?;
        Ok(writer)
    }

    pub(super) fn generate_structs(&self) -> Result<CodeWriter> {
        let mut writer = CodeWriter::new(&FileHeader {
            pragma: Some("#pragma warning disable CS0649"),
            ..self.file_header(&[
                "System",
                "System.Runtime.InteropServices",
                "System.Runtime.CompilerServices",
                "System.Diagnostics.CodeAnalysis",
            ])
        });
        for record in self.emitted_records() {
            if self.options.hand_written_types().contains(&record.name) {
                trace!("skipping hand-written struct: {}", record.name);
                continue;
            }
            match self.write_record(record) {
                Ok(fragment) => {
                    writer.append(fragment);
                    writer.empty_line();
                }
                Err(err) => warn!(
                    "skipping struct {}: {}",
                    record.name,
                    causes(&err).join(": ")
                ),
            }
        }
        Ok(writer)
    }
}
