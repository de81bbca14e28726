use teeny_tiny_compiler::{
    compile, Emitter, Lexer, Parser, SemanticError, SyntaxError, TeenyError, TokenKind,
};

/// Helper to run a program through a parser we can inspect afterwards
fn parse(source: &str) -> (Result<(), TeenyError>, Parser<Lexer>) {
    let mut parser = Parser::new(Lexer::new(source), Emitter::new()).unwrap();
    let result = parser.program();
    (result, parser)
}

#[test]
fn test_print_string_has_no_side_effects() {
    let (result, parser) = parse("PRINT \"HELLO\"\n");
    result.unwrap();
    assert!(parser.symbols().is_empty());
    assert!(parser.labels_declared().is_empty());
    assert!(parser.labels_gotoed().is_empty());
}

#[test]
fn test_variable_defined_before_use() {
    let output = compile("LET a = 5\nPRINT a\n").unwrap();
    assert_eq!(
        output,
        "#include <stdio.h>\n\
         int main(void){\n\
         float v_a;\n\
         v_a = 5;\n\
         printf(\"%.2f\\n\", (float)(v_a));\n\
         return 0;\n\
         }\n"
    );
}

#[test]
fn test_variable_used_before_definition() {
    let err = compile("PRINT a\n").unwrap_err();
    assert_eq!(
        err,
        TeenyError::Semantic {
            error: SemanticError::UndefinedVariable("a".to_string()),
            line: Some(1),
        }
    );
    assert_eq!(
        err.to_string(),
        "Semantic error at line 1: Referencing variable before assignment: a"
    );
}

#[test]
fn test_goto_to_missing_label() {
    let err = compile("LABEL loop\nGOTO loop\nGOTO missing\n").unwrap_err();
    assert_eq!(
        err,
        TeenyError::Semantic {
            error: SemanticError::UndeclaredLabel("missing".to_string()),
            line: None,
        }
    );
}

#[test]
fn test_if_without_endif() {
    let err = compile("IF 1 > 2 THEN\nPRINT \"x\"\n").unwrap_err();
    assert_eq!(
        err,
        TeenyError::Syntax {
            error: SyntaxError::Expected {
                expected: TokenKind::Endif,
                found: TokenKind::Eof,
                text: String::new(),
            },
            line: 2,
        }
    );
}

#[test]
fn test_while_without_endwhile() {
    let err = compile("WHILE 1 > 2 REPEAT\nPRINT 1\n").unwrap_err();
    assert!(matches!(
        err,
        TeenyError::Syntax {
            error: SyntaxError::Expected {
                expected: TokenKind::Endwhile,
                found: TokenKind::Eof,
                ..
            },
            ..
        }
    ));
}

#[test]
fn test_dangling_operator() {
    let err = compile("LET a = 1 + \n").unwrap_err();
    assert_eq!(
        err,
        TeenyError::Syntax {
            error: SyntaxError::UnexpectedToken {
                found: TokenKind::Newline,
                text: "\n".to_string(),
            },
            line: 1,
        }
    );
}

#[test]
fn test_forward_goto_is_allowed() {
    let output = compile("GOTO done\nPRINT \"skipped\"\nLABEL done\n").unwrap();
    assert!(output.contains("goto v_done;\nprintf(\"skipped\\n\");\nv_done:;\n"));
}

#[test]
fn test_lex_errors_surface_from_compile() {
    let err = compile("PRINT \"100%\"\n").unwrap_err();
    assert!(matches!(err, TeenyError::Lex { line: 1, .. }));
}

#[test]
fn test_fibonacci_program() {
    let source = r#"# Prints the first n Fibonacci numbers
PRINT "How many fibonacci numbers do you want?"
INPUT nums
PRINT ""

LET a = 0
LET b = 1
WHILE nums > 0 REPEAT
    PRINT a
    LET c = a + b
    LET a = b
    LET b = c
    LET nums = nums - 1
ENDWHILE
"#;
    let output = compile(source).unwrap();

    let header_end = output.find("if(0 == scanf").unwrap();
    let header = &output[..header_end];
    for decl in ["float v_nums;", "float v_a;", "float v_b;", "float v_c;"] {
        assert_eq!(header.matches(decl).count(), 1, "{} declared once", decl);
    }
    assert!(output.contains("while(v_nums > 0){\n"));
    assert!(output.contains("v_nums = v_nums - 1;\n"));
    assert!(output.ends_with("}\nreturn 0;\n}\n"));
}

#[test]
fn test_nested_blocks_and_labels() {
    let source = "\
LET i = 0
LABEL top
IF i < 10 THEN
    WHILE i >= 5 REPEAT
        LET i = i * 2 / 2 + 1
    ENDWHILE
    LET i = -i + +1
    GOTO top
ENDIF
";
    let (result, parser) = parse(source);
    result.unwrap();
    assert!(parser.labels_declared().contains("top"));
    assert!(parser.labels_gotoed().contains("top"));
    assert!(parser.emitter().code().contains("v_i = v_i * 2 / 2 + 1;\n"));
    assert!(parser.emitter().code().contains("v_i = -v_i + +1;\n"));
}

#[test]
fn test_negative_operand_after_minus() {
    let output = compile("LET a = 5 - -1\nPRINT a - -a + +a\n").unwrap();
    assert!(output.contains("v_a = 5 - -1;\n"));
    assert!(output.contains("(float)(v_a - -v_a + +v_a)"));
    assert!(!output.contains("--"));
    assert!(!output.contains("++"));
}

#[test]
fn test_label_closing_a_block() {
    let output = compile("LET a = 1\nWHILE a > 0 REPEAT\nLET a = a - 1\nLABEL x\nENDWHILE\n").unwrap();
    assert!(output.contains("v_x:;\n}\n"));
}

#[test]
fn test_c_reserved_names_are_usable() {
    let output = compile("LET int = 1\nLET printf = int\nPRINT printf\n").unwrap();
    assert!(output.contains("float v_int;\nfloat v_printf;\n"));
    assert!(output.contains("v_printf = v_int;\n"));
    assert!(output.contains("printf(\"%.2f\\n\", (float)(v_printf));"));
}
