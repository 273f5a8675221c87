//! Wrapper structs of opaque handles.

use super::Generator;
use crate::code_writer::{CodeWriter, FileHeader};
use csbind_common::errors::Result;
use log::trace;
use std::collections::HashSet;

impl Generator<'_> {
    fn write_handle(&self, writer: &mut CodeWriter, name: &str) -> Result<()> {
        writer.write_line("[DebuggerDisplay(\"{DebuggerDisplay,nq}\")]");
        let header = format!(
            "{} readonly partial struct {}(nint handle) : IEquatable<{}>",
            self.options.visibility(),
            name,
            name
        );
        writer.block(&header, |writer| {
            writer.write_line("public nint Handle { get; } = handle;");
            writer.write_line("public bool IsNull => Handle == 0;");
            writer.write_line("public bool IsNotNull => Handle != 0;");
            writer.empty_line();
            writer.write_line(&format!("public static {} Null => new(0);", name));
            writer.empty_line();
            writer.write_line(&format!(
                "public static implicit operator nint({} value) => value.Handle;",
                name
            ));
            writer.write_line(&format!(
                "public static implicit operator {}(nint value) => new(value);",
                name
            ));
            writer.empty_line();
            for operator in &["==", "!="] {
                writer.write_line(&format!(
                    "public static bool operator {op}({name} left, {name} right) => left.Handle {op} right.Handle;",
                    op = operator,
                    name = name
                ));
                writer.write_line(&format!(
                    "public static bool operator {op}({name} left, nint right) => left.Handle {op} right;",
                    op = operator,
                    name = name
                ));
            }
            writer.empty_line();
            writer.write_line(&format!(
                "public bool Equals({} other) => Handle == other.Handle;",
                name
            ));
            writer.empty_line();
            writer.write_line("/// <inheritdoc/>");
            writer.write_line(&format!(
                "public override bool Equals(object? obj) => obj is {} other && Equals(other);",
                name
            ));
            writer.empty_line();
            writer.write_line("/// <inheritdoc/>");
            writer.write_line("public override int GetHashCode() => Handle.GetHashCode();");
            writer.empty_line();
            writer.write_line(&format!(
                "private string DebuggerDisplay => $\"{{nameof({})}} [0x{{Handle.ToString(\"X\")}}]\";",
                name
            ));
            Ok(())
        })
    }

    pub(super) fn generate_handles(&self) -> Result<CodeWriter> {
        let mut writer = CodeWriter::new(&FileHeader {
            enable_nullable: true,
            ..self.file_header(&["System", "System.Diagnostics"])
        });
        let mut seen = HashSet::new();
        for typedef in self.handle_typedefs() {
            if self.options.hand_written_types().contains(&typedef.name) {
                trace!("skipping hand-written handle: {}", typedef.name);
                continue;
            }
            if !seen.insert(typedef.name.as_str()) {
                continue;
            }
            self.write_handle(&mut writer, &typedef.name)?;
            writer.empty_line();
        }
        Ok(writer)
    }
}
