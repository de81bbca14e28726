//! C output buffers
//!
//! Collects the translated program in two parts: a header (includes, the
//! opening of `main` and variable declarations) and a body (statements).
//! The final output is the header followed by the body.

use crate::error::Result;
use std::fs;
use std::path::Path;

/// Accumulates emitted C source text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Emitter {
    header: String,
    code: String,
}

impl Emitter {
    /// Create an empty emitter
    pub fn new() -> Self {
        Self {
            header: String::new(),
            code: String::new(),
        }
    }

    /// Append text to the body without ending the line
    pub fn emit(&mut self, code: &str) {
        self.code.push_str(code);
    }

    /// Append text to the body and end the line
    pub fn emit_line(&mut self, code: &str) {
        self.code.push_str(code);
        self.code.push('\n');
    }

    /// Append a complete line to the header
    pub fn header_line(&mut self, code: &str) {
        self.header.push_str(code);
        self.header.push('\n');
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Render the translated program: header first, then body
    pub fn output(&self) -> String {
        let mut out = String::with_capacity(self.header.len() + self.code.len());
        out.push_str(&self.header);
        out.push_str(&self.code);
        out
    }

    /// Write the rendered program to `path`
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), bytes = self.header.len() + self.code.len(), "writing output");
        fs::write(path, self.output())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_emitter() {
        let emitter = Emitter::new();
        assert_eq!(emitter.output(), "");
        assert_eq!(emitter, Emitter::default());
    }

    #[test]
    fn test_emit_joins_fragments_on_one_line() {
        let mut emitter = Emitter::new();
        emitter.emit("a = ");
        emitter.emit("1");
        emitter.emit("+");
        emitter.emit_line("2;");
        assert_eq!(emitter.code(), "a = 1+2;\n");
    }

    #[test]
    fn test_header_comes_before_body() {
        let mut emitter = Emitter::new();
        emitter.emit_line("return 0;");
        emitter.header_line("#include <stdio.h>");
        emitter.header_line("float a;");
        assert_eq!(emitter.header(), "#include <stdio.h>\nfloat a;\n");
        assert_eq!(emitter.output(), "#include <stdio.h>\nfloat a;\nreturn 0;\n");
    }

    #[test]
    fn test_write_file_to_missing_directory_fails() {
        let emitter = Emitter::new();
        let err = emitter
            .write_file("/nonexistent-teeny-dir/out.c")
            .unwrap_err();
        assert!(matches!(err, crate::error::TeenyError::Io(_)));
    }
}
