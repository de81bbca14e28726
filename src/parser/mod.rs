//! Parser for Teeny Tiny statements and expressions
//!
//! A recursive-descent recognizer with a two-token lookahead window. While it
//! checks the token stream against the grammar it also checks that variables
//! are assigned before use and that labels are declared once, and it emits C
//! through the [`Emitter`] as each construct is recognized.
//!
//! ```text
//! program    ::= {statement}
//! statement  ::= "PRINT" (expression | string) nl
//!              | "IF" comparison "THEN" nl {statement} "ENDIF" nl
//!              | "WHILE" comparison "REPEAT" nl {statement} "ENDWHILE" nl
//!              | "LABEL" ident nl
//!              | "GOTO" ident nl
//!              | "LET" ident "=" expression nl
//!              | "INPUT" ident nl
//! comparison ::= expression (("==" | "!=" | ">" | ">=" | "<" | "<=") expression)+
//! expression ::= term {( "-" | "+" ) term}
//! term       ::= unary {( "/" | "*" ) unary}
//! unary      ::= ["+" | "-"] primary
//! primary    ::= number | ident
//! nl         ::= '\n'+
//! ```

use crate::emitter::Emitter;
use crate::error::{Result, SemanticError, SyntaxError, TeenyError};
use crate::tokenizer::{Token, TokenKind, TokenSource};
use std::collections::HashSet;
use std::mem;
use tracing::trace;

/// C spelling of a Teeny Tiny variable or label. Source identifiers never
/// contain `_`, so prefixed names cannot clash with each other, C keywords or
/// libc names.
pub fn c_name(name: &str) -> String {
    format!("v_{}", name)
}

/// Single-pass recognizer and C emitter
#[derive(Debug)]
pub struct Parser<S: TokenSource> {
    source: S,
    emitter: Emitter,

    symbols: HashSet<String>,
    labels_declared: HashSet<String>,
    labels_gotoed: HashSet<String>,

    current: Token,
    peek: Token,
}

impl<S: TokenSource> Parser<S> {
    /// Create a parser and fill the lookahead window with two tokens
    pub fn new(mut source: S, emitter: Emitter) -> Result<Self> {
        let current = source.next_token()?;
        let peek = source.next_token()?;
        Ok(Self {
            source,
            emitter,
            symbols: HashSet::new(),
            labels_declared: HashSet::new(),
            labels_gotoed: HashSet::new(),
            current,
            peek,
        })
    }

    /// Variables assigned so far by LET or INPUT
    pub fn symbols(&self) -> &HashSet<String> {
        &self.symbols
    }

    pub fn labels_declared(&self) -> &HashSet<String> {
        &self.labels_declared
    }

    pub fn labels_gotoed(&self) -> &HashSet<String> {
        &self.labels_gotoed
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    /// Give up the parser and keep what it emitted
    pub fn into_emitter(self) -> Emitter {
        self.emitter
    }

    // ---------------------------------------------------------------------
    // Lookahead window
    // ---------------------------------------------------------------------

    /// Shift the window by one token, returning the token that left it
    pub fn advance(&mut self) -> Result<Token> {
        let next = self.source.next_token()?;
        let old_peek = mem::replace(&mut self.peek, next);
        Ok(mem::replace(&mut self.current, old_peek))
    }

    pub fn check_token(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    pub fn check_peek(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    /// Consume the current token if it has the given kind
    pub fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if !self.check_token(kind) {
            return Err(self.syntax_error(SyntaxError::Expected {
                expected: kind,
                found: self.current.kind,
                text: self.current.text.clone(),
            }));
        }
        self.advance()
    }

    fn syntax_error(&self, error: SyntaxError) -> TeenyError {
        TeenyError::Syntax {
            error,
            line: self.current.line,
        }
    }

    fn semantic_error(&self, error: SemanticError) -> TeenyError {
        TeenyError::Semantic {
            error,
            line: Some(self.current.line),
        }
    }

    // ---------------------------------------------------------------------
    // Productions
    // ---------------------------------------------------------------------

    /// program ::= {statement}
    pub fn program(&mut self) -> Result<()> {
        trace!("program");
        self.emitter.header_line("#include <stdio.h>");
        self.emitter.header_line("int main(void){");

        // Blank lines before the first statement
        while self.check_token(TokenKind::Newline) {
            self.advance()?;
        }

        while !self.check_token(TokenKind::Eof) {
            self.statement()?;
        }

        self.emitter.emit_line("return 0;");
        self.emitter.emit_line("}");

        self.check_labels()
    }

    /// Every GOTO target must be declared somewhere in the program. Runs once
    /// the whole input is consumed, so forward jumps are allowed.
    pub fn check_labels(&self) -> Result<()> {
        // Sorted so the reported label does not depend on hash order
        let mut gotoed: Vec<&String> = self.labels_gotoed.iter().collect();
        gotoed.sort();

        match gotoed
            .into_iter()
            .find(|label| !self.labels_declared.contains(*label))
        {
            Some(label) => Err(TeenyError::Semantic {
                error: SemanticError::UndeclaredLabel(label.clone()),
                line: None,
            }),
            None => Ok(()),
        }
    }

    /// Dispatch on the first token of a statement
    pub fn statement(&mut self) -> Result<()> {
        match self.current.kind {
            TokenKind::Print => self.print_statement()?,
            TokenKind::If => self.if_statement()?,
            TokenKind::While => self.while_statement()?,
            TokenKind::Label => self.label_statement()?,
            TokenKind::Goto => self.goto_statement()?,
            TokenKind::Let => self.let_statement()?,
            TokenKind::Input => self.input_statement()?,

            TokenKind::Eof
            | TokenKind::Newline
            | TokenKind::Number
            | TokenKind::Ident
            | TokenKind::String
            | TokenKind::Then
            | TokenKind::Endif
            | TokenKind::Repeat
            | TokenKind::Endwhile
            | TokenKind::Eq
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Asterisk
            | TokenKind::Slash
            | TokenKind::EqEq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq => {
                return Err(self.syntax_error(SyntaxError::InvalidStatement {
                    found: self.current.kind,
                    text: self.current.text.clone(),
                }))
            }
        }

        self.nl()
    }

    /// PRINT (expression | string)
    fn print_statement(&mut self) -> Result<()> {
        trace!("statement-print");
        self.advance()?;

        if self.check_token(TokenKind::String) {
            let text = self.advance()?.text;
            self.emitter.emit_line(&format!("printf(\"{}\\n\");", text));
        } else {
            self.emitter.emit("printf(\"%.2f\\n\", (float)(");
            self.expression()?;
            self.emitter.emit_line("));");
        }
        Ok(())
    }

    /// IF comparison THEN nl {statement} ENDIF
    fn if_statement(&mut self) -> Result<()> {
        trace!("statement-if");
        self.advance()?;
        self.emitter.emit("if(");
        self.comparison()?;

        self.expect(TokenKind::Then)?;
        self.nl()?;
        self.emitter.emit_line("){");

        self.block(TokenKind::Endif)?;
        self.emitter.emit_line("}");
        Ok(())
    }

    /// WHILE comparison REPEAT nl {statement} ENDWHILE
    fn while_statement(&mut self) -> Result<()> {
        trace!("statement-while");
        self.advance()?;
        self.emitter.emit("while(");
        self.comparison()?;

        self.expect(TokenKind::Repeat)?;
        self.nl()?;
        self.emitter.emit_line("){");

        self.block(TokenKind::Endwhile)?;
        self.emitter.emit_line("}");
        Ok(())
    }

    // Statements up to and including the closing keyword. Hitting the end of
    // input first reports the missing keyword.
    fn block(&mut self, end: TokenKind) -> Result<()> {
        while !self.check_token(end) && !self.check_token(TokenKind::Eof) {
            self.statement()?;
        }
        self.expect(end)?;
        Ok(())
    }

    /// LABEL ident
    fn label_statement(&mut self) -> Result<()> {
        trace!("statement-label");
        self.advance()?;

        if self.check_token(TokenKind::Ident) && self.labels_declared.contains(&self.current.text) {
            return Err(
                self.semantic_error(SemanticError::DuplicateLabel(self.current.text.clone()))
            );
        }
        let label = self.expect(TokenKind::Ident)?.text;
        // The null statement keeps a label legal at the end of a block
        self.emitter.emit_line(&format!("{}:;", c_name(&label)));
        self.labels_declared.insert(label);
        Ok(())
    }

    /// GOTO ident
    fn goto_statement(&mut self) -> Result<()> {
        trace!("statement-goto");
        self.advance()?;

        let label = self.expect(TokenKind::Ident)?.text;
        self.emitter.emit_line(&format!("goto {};", c_name(&label)));
        self.labels_gotoed.insert(label);
        Ok(())
    }

    /// LET ident = expression
    fn let_statement(&mut self) -> Result<()> {
        trace!("statement-let");
        self.advance()?;

        let name = self.expect(TokenKind::Ident)?.text;
        self.declare(&name);
        self.emitter.emit(&format!("{} = ", c_name(&name)));

        self.expect(TokenKind::Eq)?;
        self.expression()?;
        self.emitter.emit_line(";");
        Ok(())
    }

    /// INPUT ident
    fn input_statement(&mut self) -> Result<()> {
        trace!("statement-input");
        self.advance()?;

        let name = self.expect(TokenKind::Ident)?.text;
        self.declare(&name);
        let name = c_name(&name);

        // Bad input stores 0 and discards the offending word
        self.emitter
            .emit_line(&format!("if(0 == scanf(\"%f\", &{})) {{", name));
        self.emitter.emit_line(&format!("{} = 0;", name));
        self.emitter.emit_line("scanf(\"%*s\");");
        self.emitter.emit_line("}");
        Ok(())
    }

    // First assignment of a variable also declares it in the header
    fn declare(&mut self, name: &str) {
        if self.symbols.insert(name.to_string()) {
            self.emitter.header_line(&format!("float {};", c_name(name)));
        }
    }

    /// comparison ::= expression (compop expression)+
    fn comparison(&mut self) -> Result<()> {
        trace!(token = %self.current.text, "comparison");
        self.expression()?;

        if !self.current.kind.is_comparison_operator() {
            return Err(self.syntax_error(SyntaxError::ExpectedComparison {
                text: self.current.text.clone(),
            }));
        }
        while self.current.kind.is_comparison_operator() {
            let op = self.advance()?;
            self.emit_operator(&op.text);
            self.expression()?;
        }
        Ok(())
    }

    /// expression ::= term {( "-" | "+" ) term}
    fn expression(&mut self) -> Result<()> {
        trace!(token = %self.current.text, "expression");
        self.term()?;
        while self.check_token(TokenKind::Plus) || self.check_token(TokenKind::Minus) {
            let op = self.advance()?;
            self.emit_operator(&op.text);
            self.term()?;
        }
        Ok(())
    }

    /// term ::= unary {( "/" | "*" ) unary}
    fn term(&mut self) -> Result<()> {
        trace!(token = %self.current.text, "term");
        self.unary()?;
        while self.check_token(TokenKind::Asterisk) || self.check_token(TokenKind::Slash) {
            let op = self.advance()?;
            self.emit_operator(&op.text);
            self.unary()?;
        }
        Ok(())
    }

    /// unary ::= ["+" | "-"] primary
    fn unary(&mut self) -> Result<()> {
        trace!(token = %self.current.text, "unary");
        if self.check_token(TokenKind::Plus) || self.check_token(TokenKind::Minus) {
            let sign = self.advance()?;
            self.emitter.emit(&sign.text);
        }
        self.primary()
    }

    /// primary ::= number | ident
    fn primary(&mut self) -> Result<()> {
        trace!(token = %self.current.text, "primary");
        match self.current.kind {
            TokenKind::Number => {
                let number = self.advance()?;
                self.emitter.emit(&number.text);
                Ok(())
            }
            TokenKind::Ident => {
                if !self.symbols.contains(&self.current.text) {
                    return Err(self.semantic_error(SemanticError::UndefinedVariable(
                        self.current.text.clone(),
                    )));
                }
                let ident = self.advance()?;
                self.emitter.emit(&c_name(&ident.text));
                Ok(())
            }
            found => Err(self.syntax_error(SyntaxError::UnexpectedToken {
                found,
                text: self.current.text.clone(),
            })),
        }
    }

    // A sign after a spaced operator cannot fuse into `++` or `--`
    fn emit_operator(&mut self, op: &str) {
        self.emitter.emit(&format!(" {} ", op));
    }

    /// nl ::= '\n'+
    fn nl(&mut self) -> Result<()> {
        trace!("newline");
        self.expect(TokenKind::Newline)?;
        while self.check_token(TokenKind::Newline) {
            self.advance()?;
        }
        Ok(())
    }
}
