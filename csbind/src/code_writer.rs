//! Indentation-aware writer of C# source files.

use csbind_common::errors::Result;

const INDENT: &str = "    ";

const AUTO_GENERATED_HEADER: &[&str] = &[
    "// ------------------------------------------------------------------------------",
    "// <auto-generated>",
    "//     This code was generated by a tool.",
    "//",
    "//     Changes to this file may cause incorrect behavior and will be lost if",
    "//     the code is regenerated.",
    "// </auto-generated>",
    "// ------------------------------------------------------------------------------",
];

/// Preamble of a generated file.
#[derive(Debug, Default, Clone)]
pub struct FileHeader<'a> {
    pub namespace: Option<&'a str>,
    pub usings: &'a [&'a str],
    pub enable_nullable: bool,
    pub pragma: Option<&'a str>,
}

/// Accumulates text of one C# file.
#[derive(Debug)]
pub struct CodeWriter {
    text: String,
    indent_level: usize,
    at_line_start: bool,
}

impl CodeWriter {
    pub fn new(header: &FileHeader<'_>) -> Self {
        let mut writer = CodeWriter::fragment();
        for line in AUTO_GENERATED_HEADER {
            writer.write_line(line);
        }
        writer.empty_line();
        if header.enable_nullable {
            writer.write_line("#nullable enable");
            writer.empty_line();
        }
        if !header.usings.is_empty() {
            for using in header.usings {
                writer.write_line(&format!("using {};", using));
            }
            writer.empty_line();
        }
        if let Some(namespace) = header.namespace {
            writer.write_line(&format!("namespace {};", namespace));
            writer.empty_line();
        }
        if let Some(pragma) = header.pragma {
            writer.write_line(pragma);
            writer.empty_line();
        }
        writer
    }

    /// Creates a writer without file preamble. Its content
    /// can be added to another writer with `append`.
    pub fn fragment() -> Self {
        CodeWriter {
            text: String::new(),
            indent_level: 0,
            at_line_start: true,
        }
    }

    /// Writes all lines of `fragment` at the current indentation.
    pub fn append(&mut self, fragment: CodeWriter) {
        for line in fragment.text.lines() {
            if line.is_empty() {
                self.text.push('\n');
                self.at_line_start = true;
            } else {
                self.write_line(line);
            }
        }
    }

    /// Writes `text` without a line break. Indentation is added
    /// if `text` starts a new line.
    pub fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.at_line_start {
            for _ in 0..self.indent_level {
                self.text.push_str(INDENT);
            }
            self.at_line_start = false;
        }
        self.text.push_str(text);
    }

    pub fn write_line(&mut self, line: &str) {
        self.write(line);
        self.text.push('\n');
        self.at_line_start = true;
    }

    /// Writes an empty line unless the previous line is already empty
    /// or opens a block.
    pub fn empty_line(&mut self) {
        if !self.at_line_start {
            self.text.push('\n');
            self.at_line_start = true;
        }
        if self.text.is_empty() || self.text.ends_with("\n\n") || self.text.ends_with("{\n") {
            return;
        }
        self.text.push('\n');
    }

    /// Writes `header`, an opening brace and increases indentation.
    pub fn push_block(&mut self, header: &str) {
        self.write_line(header);
        self.write_line("{");
        self.indent_level += 1;
    }

    /// Decreases indentation and writes a closing brace.
    pub fn pop_block(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
        // no empty lines before a closing brace
        while self.text.ends_with("\n\n") {
            self.text.pop();
        }
        self.write_line("}");
    }

    /// Writes a block with content produced by `f`.
    pub fn block<F>(&mut self, header: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut CodeWriter) -> Result<()>,
    {
        self.push_block(header);
        f(self)?;
        self.pop_block();
        Ok(())
    }

    /// Returns the text with exactly one trailing line break.
    pub fn finish(mut self) -> String {
        while self.text.ends_with("\n\n") {
            self.text.pop();
        }
        if !self.text.ends_with('\n') {
            self.text.push('\n');
        }
        self.text
    }
}
