//! Unit tests for the parser module.
//!
//! This module contains tests for parsing various language constructs including:
//! - Variable and constant declarations
//! - Function declarations and calls
//! - Operator precedence
//! - Control flow statements
//! - Syntax errors

use std::rc::Rc;

use super::parser::parse;
use crate::{
    ast::{
        ast::Program,
        expressions::{BinaryOperator, ExprKind, Literal, UnaryOperator},
        statements::StmtKind,
    },
    errors::errors::Error,
    lexer::lexer::tokenize,
};

fn parse_source(source: &str) -> Result<Program, Error> {
    let tokens = tokenize(source.to_string(), Some("test.pulse".to_string()))?;
    parse(tokens, Rc::new("test.pulse".to_string()))
}

#[test]
fn test_parse_variable_declaration() {
    let program = parse_source("var x int <- 42;").unwrap();

    assert_eq!(program.len(), 1);
    match &program.body[0].kind {
        StmtKind::VarDecl {
            name,
            data_type,
            value,
        } => {
            assert_eq!(name, "x");
            assert_eq!(data_type.name, "int");
            let value = value.as_ref().unwrap();
            assert_eq!(value.kind, ExprKind::Literal(Literal::Int(42)));
        }
        other => panic!("expected a var declaration, got {:?}", other),
    }
}

#[test]
fn test_parse_variable_without_initializer() {
    let program = parse_source("var f float;").unwrap();

    match &program.body[0].kind {
        StmtKind::VarDecl { value, .. } => assert!(value.is_none()),
        other => panic!("expected a var declaration, got {:?}", other),
    }
}

#[test]
fn test_parse_const_declaration() {
    let program = parse_source("const pi <- 3.14;").unwrap();

    match &program.body[0].kind {
        StmtKind::ConstDecl { name, value } => {
            assert_eq!(name, "pi");
            assert_eq!(value.kind, ExprKind::Literal(Literal::Float(3.14)));
        }
        other => panic!("expected a const declaration, got {:?}", other),
    }
}

#[test]
fn test_parse_const_requires_initializer() {
    let result = parse_source("const pi;");

    assert_eq!(result.err().unwrap().get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_parse_literals() {
    let program = parse_source("print('a'); print(true); print(0x10);").unwrap();

    let values: Vec<ExprKind> = program
        .iter()
        .map(|stmt| match &stmt.kind {
            StmtKind::Print(value) => value.kind.clone(),
            other => panic!("expected print, got {:?}", other),
        })
        .collect();

    assert_eq!(values[0], ExprKind::Literal(Literal::Char(b'a')));
    assert_eq!(values[1], ExprKind::Literal(Literal::Bool(true)));
    assert_eq!(values[2], ExprKind::Literal(Literal::Int(16)));
}

#[test]
fn test_parse_integer_overflow() {
    let result = parse_source("var x int <- 2147483648;");

    assert_eq!(result.err().unwrap().get_error_name(), "NumberParseError");
}

#[test]
fn test_parse_operator_precedence() {
    let program = parse_source("print(1 + 2 * 3 < 10 && !false);").unwrap();

    let StmtKind::Print(value) = &program.body[0].kind else {
        panic!("expected print");
    };

    // ((1 + (2 * 3)) < 10) && (!false)
    let ExprKind::Binary {
        operator,
        left,
        right,
    } = &value.kind
    else {
        panic!("expected binary expression");
    };
    assert_eq!(*operator, BinaryOperator::And);
    assert!(matches!(
        right.kind,
        ExprKind::Unary {
            operator: UnaryOperator::Not,
            ..
        }
    ));

    let ExprKind::Binary {
        operator, left, ..
    } = &left.kind
    else {
        panic!("expected comparison");
    };
    assert_eq!(*operator, BinaryOperator::Less);

    let ExprKind::Binary {
        operator, right, ..
    } = &left.kind
    else {
        panic!("expected addition");
    };
    assert_eq!(*operator, BinaryOperator::Add);
    assert!(matches!(
        right.kind,
        ExprKind::Binary {
            operator: BinaryOperator::Multiply,
            ..
        }
    ));
}

#[test]
fn test_parse_left_associativity() {
    let program = parse_source("print(10 - 4 - 3);").unwrap();

    let StmtKind::Print(value) = &program.body[0].kind else {
        panic!("expected print");
    };
    let ExprKind::Binary { left, right, .. } = &value.kind else {
        panic!("expected binary expression");
    };

    assert!(matches!(left.kind, ExprKind::Binary { .. }));
    assert_eq!(right.kind, ExprKind::Literal(Literal::Int(3)));
}

#[test]
fn test_parse_unary_binds_tighter_than_binary() {
    let program = parse_source("print(-x + 1);").unwrap();

    let StmtKind::Print(value) = &program.body[0].kind else {
        panic!("expected print");
    };
    let ExprKind::Binary { operator, left, .. } = &value.kind else {
        panic!("expected binary expression");
    };

    assert_eq!(*operator, BinaryOperator::Add);
    assert!(matches!(
        left.kind,
        ExprKind::Unary {
            operator: UnaryOperator::Minus,
            ..
        }
    ));
}

#[test]
fn test_parse_grouping() {
    let program = parse_source("print((1 + 2) * 3);").unwrap();

    let StmtKind::Print(value) = &program.body[0].kind else {
        panic!("expected print");
    };
    let ExprKind::Binary { operator, left, .. } = &value.kind else {
        panic!("expected binary expression");
    };

    assert_eq!(*operator, BinaryOperator::Multiply);
    assert!(matches!(
        left.kind,
        ExprKind::Binary {
            operator: BinaryOperator::Add,
            ..
        }
    ));
}

#[test]
fn test_parse_function_declaration() {
    let program = parse_source("function add(a int, b int) int { return a + b; }").unwrap();

    let StmtKind::FnDecl(function) = &program.body[0].kind else {
        panic!("expected function declaration");
    };

    assert_eq!(function.name, "add");
    assert_eq!(function.params.len(), 2);
    assert_eq!(function.params[0].name, "a");
    assert_eq!(function.params[1].data_type.name, "int");
    assert_eq!(function.return_type.name, "int");
    assert!(matches!(function.body[0].kind, StmtKind::Return(_)));
}

#[test]
fn test_parse_function_without_parameters() {
    let program = parse_source("function main() int { return 0; }").unwrap();

    let StmtKind::FnDecl(function) = &program.body[0].kind else {
        panic!("expected function declaration");
    };
    assert!(function.params.is_empty());
}

#[test]
fn test_parse_call_expression() {
    let program = parse_source("x <- add(1, f(2));").unwrap();

    let StmtKind::Write { name, value } = &program.body[0].kind else {
        panic!("expected write");
    };
    assert_eq!(name, "x");

    let ExprKind::Call { name, arguments } = &value.kind else {
        panic!("expected call");
    };
    assert_eq!(name, "add");
    assert_eq!(arguments.len(), 2);
    assert!(matches!(&arguments[1].kind, ExprKind::Call { name, .. } if name == "f"));
}

#[test]
fn test_parse_if_statement() {
    let program = parse_source("if x > 0 { print(x); }").unwrap();

    let StmtKind::If {
        true_block,
        false_block,
        ..
    } = &program.body[0].kind
    else {
        panic!("expected if");
    };

    assert_eq!(true_block.len(), 1);
    // A missing else still yields an (empty) false block
    assert!(false_block.is_empty());
}

#[test]
fn test_parse_if_else_statement() {
    let program = parse_source("if x > 0 { print(1); } else { print(2); print(3); }").unwrap();

    let StmtKind::If { false_block, .. } = &program.body[0].kind else {
        panic!("expected if");
    };
    assert_eq!(false_block.len(), 2);
}

#[test]
fn test_parse_while_loop() {
    let program = parse_source("while x < 10 { x <- x + 1; }").unwrap();

    let StmtKind::While { condition, body } = &program.body[0].kind else {
        panic!("expected while");
    };
    assert!(matches!(
        condition.kind,
        ExprKind::Binary {
            operator: BinaryOperator::Less,
            ..
        }
    ));
    assert_eq!(body.len(), 1);
}

#[test]
fn test_parse_statement_lines() {
    let program = parse_source("var x int;\n\nwhile x < 3 {\n  x <- x + 1;\n}").unwrap();

    assert_eq!(program.body[0].line(), 1);
    assert_eq!(program.body[1].line(), 3);

    let StmtKind::While { body, .. } = &program.body[1].kind else {
        panic!("expected while");
    };
    assert_eq!(body[0].line(), 4);
}

#[test]
fn test_parse_missing_semicolon() {
    let result = parse_source("var x int <- 1 print(x);");

    let error = result.err().unwrap();
    assert_eq!(error.get_error_name(), "UnexpectedToken");
}

#[test]
fn test_parse_unclosed_block() {
    let result = parse_source("while true { print(1);");

    assert!(result.is_err());
}

#[test]
fn test_parse_expression_statement_is_rejected() {
    let result = parse_source("1 + 2;");

    assert_eq!(result.err().unwrap().get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_parse_empty_program() {
    let program = parse_source("// nothing here\n").unwrap();

    assert!(program.is_empty());
}
