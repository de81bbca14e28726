//! Teeny Tiny Compiler
//!
//! A single-pass translator from the Teeny Tiny language (PRINT, INPUT, LET,
//! IF/ENDIF, WHILE/ENDWHILE, LABEL and GOTO) into C source text. The parser
//! recognizes the token stream, checks variables and labels, and drives the
//! emitter directly; no syntax tree is built.

pub mod emitter;
pub mod parser;
pub mod tokenizer;

// Re-export core types for convenience
pub use crate::error::{Result, SemanticError, SyntaxError, TeenyError};
pub use emitter::Emitter;
pub use parser::Parser;
pub use tokenizer::{Lexer, Token, TokenKind, TokenSource};

/// Translate a complete Teeny Tiny program into C source text.
pub fn compile(source: &str) -> Result<String> {
    let mut parser = Parser::new(Lexer::new(source), Emitter::new())?;
    parser.program()?;
    Ok(parser.into_emitter().output())
}

/// Core error handling types for the compiler
pub mod error {
    use crate::tokenizer::TokenKind;
    use std::fmt;

    /// Result type for compiler operations
    pub type Result<T> = std::result::Result<T, TeenyError>;

    /// Token stream did not match the grammar
    #[derive(Debug, Clone, PartialEq)]
    pub enum SyntaxError {
        /// `expect` saw the wrong token kind
        Expected {
            expected: TokenKind,
            found: TokenKind,
            text: String,
        },
        /// No statement starts with this token
        InvalidStatement { found: TokenKind, text: String },
        /// A comparison had no comparison operator
        ExpectedComparison { text: String },
        /// Neither a number nor an identifier where an operand was needed
        UnexpectedToken { found: TokenKind, text: String },
    }

    /// Well-formed input that breaks a variable or label rule
    #[derive(Debug, Clone, PartialEq)]
    pub enum SemanticError {
        DuplicateLabel(String),
        UndefinedVariable(String),
        UndeclaredLabel(String),
    }

    /// Every way a compilation can fail
    #[derive(Debug, Clone, PartialEq)]
    pub enum TeenyError {
        Lex { message: String, line: usize },
        Syntax { error: SyntaxError, line: usize },
        /// `line` is `None` for checks that run after the whole input is read
        Semantic {
            error: SemanticError,
            line: Option<usize>,
        },
        Io(String),
    }

    impl TeenyError {
        pub fn is_syntax(&self) -> bool {
            matches!(self, TeenyError::Syntax { .. })
        }

        pub fn is_semantic(&self) -> bool {
            matches!(self, TeenyError::Semantic { .. })
        }
    }

    impl fmt::Display for SyntaxError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                SyntaxError::Expected {
                    expected,
                    found,
                    text,
                } => write!(f, "Expected {}, got {} ({:?})", expected, found, text),
                SyntaxError::InvalidStatement { found, text } => {
                    write!(f, "Invalid statement at {:?} ({})", text, found)
                }
                SyntaxError::ExpectedComparison { text } => {
                    write!(f, "Expected comparison operator at: {:?}", text)
                }
                SyntaxError::UnexpectedToken { found, text } => {
                    write!(f, "Unexpected token at {:?} ({})", text, found)
                }
            }
        }
    }

    impl fmt::Display for SemanticError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                SemanticError::DuplicateLabel(name) => write!(f, "Label already exists: {}", name),
                SemanticError::UndefinedVariable(name) => {
                    write!(f, "Referencing variable before assignment: {}", name)
                }
                SemanticError::UndeclaredLabel(name) => {
                    write!(f, "Attempting to GOTO to undeclared label: {}", name)
                }
            }
        }
    }

    impl fmt::Display for TeenyError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                TeenyError::Lex { message, line } => {
                    write!(f, "Lexing error at line {}: {}", line, message)
                }
                TeenyError::Syntax { error, line } => {
                    write!(f, "Syntax error at line {}: {}", line, error)
                }
                TeenyError::Semantic { error, line } => {
                    if let Some(line_num) = line {
                        write!(f, "Semantic error at line {}: {}", line_num, error)
                    } else {
                        write!(f, "Semantic error: {}", error)
                    }
                }
                TeenyError::Io(msg) => write!(f, "I/O error: {}", msg),
            }
        }
    }

    impl std::error::Error for TeenyError {}

    impl From<std::io::Error> for TeenyError {
        fn from(err: std::io::Error) -> Self {
            TeenyError::Io(err.to_string())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_syntax_error_message() {
            let err = TeenyError::Syntax {
                error: SyntaxError::Expected {
                    expected: TokenKind::Endif,
                    found: TokenKind::Eof,
                    text: String::new(),
                },
                line: 3,
            };
            assert_eq!(
                err.to_string(),
                "Syntax error at line 3: Expected ENDIF, got EOF (\"\")"
            );
            assert!(err.is_syntax());
            assert!(!err.is_semantic());
        }

        #[test]
        fn test_semantic_error_without_line() {
            let err = TeenyError::Semantic {
                error: SemanticError::UndeclaredLabel("missing".to_string()),
                line: None,
            };
            assert_eq!(
                err.to_string(),
                "Semantic error: Attempting to GOTO to undeclared label: missing"
            );
            assert!(err.is_semantic());
        }

        #[test]
        fn test_io_error_conversion() {
            let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
            let err: TeenyError = io.into();
            assert_eq!(err, TeenyError::Io("no such file".to_string()));
        }
    }
}
