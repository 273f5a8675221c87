//! Resolver of the native library.

use super::Generator;
use crate::code_writer::{CodeWriter, FileHeader};
use csbind_common::errors::{format_err, Result};
use csbind_common::target::{OS, SUPPORTED_ARCHES, SUPPORTED_OSES};

const SEARCH_PATH: &str = "DllImportSearchPath.ApplicationDirectory \
                           | DllImportSearchPath.UserDirectories \
                           | DllImportSearchPath.UseDllDirectoryForDependencies";

/// Name of the constant holding file name of the library on `os`.
fn file_name_constant(os: OS) -> String {
    format!("LibraryName{:?}", os)
}

fn write_try_load(writer: &mut CodeWriter, load_arguments: &str) -> Result<()> {
    writer.block(
        &format!("if (NativeLibrary.TryLoad({}, out nativeLibrary))", load_arguments),
        |writer| {
            writer.write_line("return nativeLibrary;");
            Ok(())
        },
    )
}

impl Generator<'_> {
    pub(super) fn generate_library(&self) -> Result<CodeWriter> {
        let library_name = self.options.library_name().ok_or_else(|| {
            format_err!("library name is not set for {}", self.options.name())
        })?;
        let class_name = self.options.class_name();
        let mut writer = CodeWriter::new(&FileHeader {
            enable_nullable: true,
            ..self.file_header(&[
                "System",
                "System.IO",
                "System.Reflection",
                "System.Runtime.InteropServices",
            ])
        });

        let header = format!(
            "{} static unsafe partial class {}",
            self.options.visibility(),
            class_name
        );
        writer.block(&header, |writer| {
            writer.write_line(&format!(
                "private const DllImportSearchPath DefaultDllImportSearchPath = {};",
                SEARCH_PATH
            ));
            writer.empty_line();
            writer.write_line(&format!(
                "public const string LibraryName = \"{}\";",
                library_name
            ));
            writer.write_line(&format!(
                "private const string LibraryNameAlternate = \"lib{}\";",
                library_name
            ));
            for &os in SUPPORTED_OSES {
                writer.write_line(&format!(
                    "private const string {} = \"{}\";",
                    file_name_constant(os),
                    os.shared_library_file_name(library_name)
                ));
            }
            writer.empty_line();
            writer.write_line("public static event DllImportResolver? ResolveLibrary;");
            writer.empty_line();

            writer.block(&format!("static {}()", class_name), |writer| {
                writer.write_line(&format!(
                    "NativeLibrary.SetDllImportResolver(typeof({}).Assembly, OnDllImport);",
                    class_name
                ));
                Ok(())
            })?;
            writer.empty_line();

            writer.block(
                "private static nint OnDllImport(string libraryName, Assembly assembly, DllImportSearchPath? searchPath)",
                |writer| {
                    writer.write_line("if (libraryName != LibraryName)");
                    writer.write_line("    return 0;");
                    writer.empty_line();
                    writer.write_line("nint nativeLibrary;");
                    writer.write_line("DllImportResolver? resolver = ResolveLibrary;");
                    writer.block("if (resolver != null)", |writer| {
                        writer.write_line("nativeLibrary = resolver(libraryName, assembly, searchPath);");
                        writer.write_line("if (nativeLibrary != 0)");
                        writer.write_line("    return nativeLibrary;");
                        Ok(())
                    })?;
                    writer.empty_line();
                    writer.write_line("string fileName = PlatformFileName();");
                    write_try_load(
                        writer,
                        "fileName, assembly, DefaultDllImportSearchPath",
                    )?;
                    writer.empty_line();
                    writer.write_line("string? runtimeIdentifier = RuntimeIdentifier();");
                    writer.block("if (runtimeIdentifier != null)", |writer| {
                        writer.write_line(
                            "string path = Path.Combine(AppContext.BaseDirectory, \"runtimes\", runtimeIdentifier, \"native\", fileName);",
                        );
                        write_try_load(writer, "path")
                    })?;
                    writer.empty_line();
                    write_try_load(
                        writer,
                        "LibraryName, assembly, DefaultDllImportSearchPath",
                    )?;
                    write_try_load(
                        writer,
                        "LibraryNameAlternate, assembly, DefaultDllImportSearchPath",
                    )?;
                    writer.write_line("return 0;");
                    Ok(())
                },
            )?;
            writer.empty_line();

            writer.block("private static string PlatformFileName()", |writer| {
                for &os in SUPPORTED_OSES {
                    if let Some(check) = os.dotnet_check() {
                        writer.write_line(&format!("if ({})", check));
                        writer.write_line(&format!("    return {};", file_name_constant(os)));
                    }
                }
                writer.write_line("return LibraryName;");
                Ok(())
            })?;
            writer.empty_line();

            writer.block("private static string? RuntimeIdentifier()", |writer| {
                writer.write_line("string? os = null;");
                for &os in SUPPORTED_OSES {
                    if let (Some(check), Some(name)) = (os.dotnet_check(), os.runtime_name()) {
                        writer.write_line(&format!("if ({})", check));
                        writer.write_line(&format!("    os = \"{}\";", name));
                    }
                }
                writer.write_line("if (os == null)");
                writer.write_line("    return null;");
                writer.empty_line();
                writer.write_line("string? arch = RuntimeInformation.ProcessArchitecture switch");
                writer.write_line("{");
                for &arch in SUPPORTED_ARCHES {
                    if let (Some(dotnet_name), Some(name)) = (arch.dotnet_name(), arch.runtime_name()) {
                        writer.write_line(&format!(
                            "    Architecture.{} => \"{}\",",
                            dotnet_name, name
                        ));
                    }
                }
                writer.write_line("    _ => null,");
                writer.write_line("};");
                writer.write_line("return arch == null ? null : $\"{os}-{arch}\";");
                Ok(())
            })
        })?;
        Ok(writer)
    }
}
