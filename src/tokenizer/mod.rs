//! Tokenizer for Teeny Tiny source code
//!
//! Converts Teeny Tiny source text into tokens one at a time, on demand. The
//! parser pulls tokens through the [`TokenSource`] trait, so the whole source
//! is never tokenized up front.

use crate::error::{Result, TeenyError};
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// Every kind of token in Teeny Tiny
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    Newline,
    Number,
    Ident,
    String,

    // Keywords
    Label,
    Goto,
    Print,
    Input,
    Let,
    If,
    Then,
    Endif,
    While,
    Repeat,
    Endwhile,

    // Operators
    Eq,
    Plus,
    Minus,
    Asterisk,
    Slash,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl TokenKind {
    /// Upper-case name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Eof => "EOF",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Number => "NUMBER",
            TokenKind::Ident => "IDENT",
            TokenKind::String => "STRING",
            TokenKind::Label => "LABEL",
            TokenKind::Goto => "GOTO",
            TokenKind::Print => "PRINT",
            TokenKind::Input => "INPUT",
            TokenKind::Let => "LET",
            TokenKind::If => "IF",
            TokenKind::Then => "THEN",
            TokenKind::Endif => "ENDIF",
            TokenKind::While => "WHILE",
            TokenKind::Repeat => "REPEAT",
            TokenKind::Endwhile => "ENDWHILE",
            TokenKind::Eq => "EQ",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Asterisk => "ASTERISK",
            TokenKind::Slash => "SLASH",
            TokenKind::EqEq => "EQEQ",
            TokenKind::NotEq => "NOTEQ",
            TokenKind::Lt => "LT",
            TokenKind::LtEq => "LTEQ",
            TokenKind::Gt => "GT",
            TokenKind::GtEq => "GTEQ",
        }
    }

    /// Check if this kind is one of the six comparison operators
    pub fn is_comparison_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Gt
                | TokenKind::GtEq
                | TokenKind::Lt
                | TokenKind::LtEq
                | TokenKind::EqEq
                | TokenKind::NotEq
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single token: its kind, its literal text and the line it starts on
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
}

impl Token {
    /// Create a new token
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
        }
    }

    /// Create an end-of-input token
    pub fn eof(line: usize) -> Self {
        Self::new(TokenKind::Eof, "", line)
    }
}

/// Anything the parser can pull tokens from.
///
/// Implementations must keep returning `Eof` once the input is exhausted.
pub trait TokenSource {
    fn next_token(&mut self) -> Result<Token>;
}

// Keyword spellings. Keywords are upper case only; `print` is an identifier.
const KEYWORDS: &[(&str, TokenKind)] = &[
    ("LABEL", TokenKind::Label),
    ("GOTO", TokenKind::Goto),
    ("PRINT", TokenKind::Print),
    ("INPUT", TokenKind::Input),
    ("LET", TokenKind::Let),
    ("IF", TokenKind::If),
    ("THEN", TokenKind::Then),
    ("ENDIF", TokenKind::Endif),
    ("WHILE", TokenKind::While),
    ("REPEAT", TokenKind::Repeat),
    ("ENDWHILE", TokenKind::Endwhile),
];

/// Create keyword lookup table for tokenization
pub fn create_keyword_map() -> HashMap<&'static str, TokenKind> {
    KEYWORDS.iter().copied().collect()
}

/// On-demand scanner over a source string
#[derive(Debug)]
pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    last_line: usize,
    keywords: HashMap<&'static str, TokenKind>,
}

impl Lexer {
    /// Create a lexer. A trailing newline is appended so the last statement
    /// is always terminated.
    pub fn new(source: &str) -> Self {
        let mut chars: Vec<char> = source.chars().collect();
        // Line of the last character actually in the source
        let mut last_line = 1 + chars.iter().filter(|&&c| c == '\n').count();
        if chars.last() == Some(&'\n') {
            last_line -= 1;
        }
        chars.push('\n');
        Self {
            source: chars,
            pos: 0,
            line: 1,
            last_line,
            keywords: create_keyword_map(),
        }
    }

    fn current_char(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    // The appended newline and Eof report the last real line
    fn line(&self) -> usize {
        self.line.min(self.last_line)
    }

    fn error(&self, message: impl Into<String>) -> TeenyError {
        TeenyError::Lex {
            message: message.into(),
            line: self.line(),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current_char(), Some(' ' | '\t' | '\r')) {
            self.pos += 1;
        }
    }

    // '#' runs to the end of the line; the newline itself is still a token
    fn skip_comment(&mut self) {
        if self.current_char() == Some('#') {
            while matches!(self.current_char(), Some(c) if c != '\n') {
                self.pos += 1;
            }
        }
    }

    fn take(&mut self, kind: TokenKind, len: usize) -> Token {
        let text: String = self.source[self.pos..self.pos + len].iter().collect();
        self.pos += len;
        Token::new(kind, text, self.line())
    }

    fn one_or_two(&mut self, single: TokenKind, double: TokenKind) -> Token {
        if self.peek_char() == Some('=') {
            self.take(double, 2)
        } else {
            self.take(single, 1)
        }
    }

    fn string(&mut self) -> Result<Token> {
        let line = self.line();
        self.pos += 1; // opening quote
        let start = self.pos;
        loop {
            match self.current_char() {
                Some('"') => break,
                // The text ends up inside a C format string
                Some('\r' | '\n' | '\t' | '\\' | '%') => {
                    return Err(self.error("Illegal character in string."))
                }
                Some(_) => self.pos += 1,
                None => return Err(self.error("Unterminated string.")),
            }
        }
        let text: String = self.source[start..self.pos].iter().collect();
        self.pos += 1; // closing quote
        Ok(Token::new(TokenKind::String, text, line))
    }

    fn number(&mut self) -> Result<Token> {
        let start = self.pos;
        while matches!(self.current_char(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.current_char() == Some('.') {
            self.pos += 1;
            if !matches!(self.current_char(), Some(c) if c.is_ascii_digit()) {
                return Err(self.error("Illegal character in number."));
            }
            while matches!(self.current_char(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        let text: String = self.source[start..self.pos].iter().collect();
        Ok(Token::new(TokenKind::Number, text, self.line()))
    }

    fn word(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.current_char(), Some(c) if c.is_ascii_alphanumeric()) {
            self.pos += 1;
        }
        let text: String = self.source[start..self.pos].iter().collect();
        let kind = self
            .keywords
            .get(text.as_str())
            .copied()
            .unwrap_or(TokenKind::Ident);
        Token::new(kind, text, self.line())
    }

    /// Scan the whole input, including the final `Eof` token
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }
}

impl TokenSource for Lexer {
    fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();
        self.skip_comment();

        let c = match self.current_char() {
            Some(c) => c,
            None => return Ok(Token::eof(self.line())),
        };

        let token = match c {
            '+' => self.take(TokenKind::Plus, 1),
            '-' => self.take(TokenKind::Minus, 1),
            '*' => self.take(TokenKind::Asterisk, 1),
            '/' => self.take(TokenKind::Slash, 1),
            '=' => self.one_or_two(TokenKind::Eq, TokenKind::EqEq),
            '>' => self.one_or_two(TokenKind::Gt, TokenKind::GtEq),
            '<' => self.one_or_two(TokenKind::Lt, TokenKind::LtEq),
            '!' => {
                if self.peek_char() == Some('=') {
                    self.take(TokenKind::NotEq, 2)
                } else {
                    let next = self.peek_char().map(String::from).unwrap_or_default();
                    return Err(self.error(format!("Expected !=, got !{}", next)));
                }
            }
            '"' => self.string()?,
            '\n' => {
                let token = self.take(TokenKind::Newline, 1);
                self.line += 1;
                token
            }
            c if c.is_ascii_digit() => self.number()?,
            c if c.is_ascii_alphabetic() => self.word(),
            c => return Err(self.error(format!("Unknown token: {:?}", c))),
        };

        Ok(token)
    }
}

/// Tokenize a complete Teeny Tiny source text
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).tokenize()
}

/// A token source over tokens that were scanned ahead of time
#[derive(Debug, Clone, Default)]
pub struct TokenQueue {
    tokens: VecDeque<Token>,
    last_line: usize,
}

impl TokenQueue {
    pub fn new(tokens: Vec<Token>) -> Self {
        let last_line = tokens.last().map(|t| t.line).unwrap_or(1);
        Self {
            tokens: tokens.into(),
            last_line,
        }
    }
}

impl TokenSource for TokenQueue {
    fn next_token(&mut self) -> Result<Token> {
        Ok(self
            .tokens
            .pop_front()
            .unwrap_or_else(|| Token::eof(self.last_line)))
    }
}
