//! Unit tests for error handling.
//!
//! This module contains tests for syntax errors, semantic error kinds and
//! the diagnostics sink.

use std::rc::Rc;

use crate::errors::{
    diagnostics::Diagnostics,
    errors::{Error, ErrorImpl, ErrorKind, ErrorTip, SemanticError},
};
use crate::{format_error, Position};

fn position(offset: u32, line: u32) -> Position {
    Position::new(offset, line, Rc::new("test.pulse".to_string()))
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        position(10, 1),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_kind(), ErrorKind::Syntax);
    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "identifier".to_string(),
        },
        position(42, 3),
    );

    assert_eq!(error.get_position().offset, 42);
    assert_eq!(error.get_position().line, 3);
    assert_eq!(error.to_string(), "test.pulse:3: unexpected token: \"identifier\"");
}

#[test]
fn test_number_parse_error_tip() {
    let error = Error::new(
        ErrorImpl::NumberParseError {
            token: "99999999999".to_string(),
        },
        position(0, 1),
    );

    match error.get_tip() {
        ErrorTip::Suggestion(tip) => assert!(tip.contains("99999999999")),
        ErrorTip::None => panic!("expected a suggestion"),
    }
}

#[test]
fn test_format_error_points_at_offset() {
    let source = "var a int <- 1;\n    var b int <- #;\n";
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "#".to_string(),
        },
        position(33, 2),
    );

    let rendered = format_error(&error, source);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines[0], "Error: UnrecognisedToken");
    assert_eq!(lines[1], "-> test.pulse:2");
    assert_eq!(lines[3], "2 | var b int <- #;");
    assert!(lines[4].ends_with("-------------^"));
}

#[test]
fn test_semantic_error_kinds() {
    let undefined = SemanticError::UndefinedName {
        name: "x".to_string(),
    };
    let mismatch = SemanticError::AssignmentMismatch {
        name: "x".to_string(),
        expected: "int".to_string(),
        received: "float".to_string(),
    };
    let nested = SemanticError::NestedFunction {
        name: "inner".to_string(),
    };

    assert_eq!(undefined.kind(), ErrorKind::Name);
    assert_eq!(mismatch.kind(), ErrorKind::Type);
    assert_eq!(nested.kind(), ErrorKind::Structural);
    assert_eq!(ErrorKind::Structural.to_string(), "StructuralError");
}

#[test]
fn test_semantic_error_messages() {
    let error = SemanticError::AlreadyDefined {
        name: "x".to_string(),
        previous_line: 4,
    };
    assert_eq!(error.to_string(), "Name 'x' has already been defined at line 4");

    let error = SemanticError::UnsupportedBinaryOperation {
        operator: "+".to_string(),
        left: "int".to_string(),
        right: "float".to_string(),
    };
    assert_eq!(error.to_string(), "Binary operation 'int + float' not supported");
}

#[test]
fn test_diagnostics_sink() {
    let mut diagnostics = Diagnostics::new(Some(Rc::new("test.pulse".to_string())));
    assert!(!diagnostics.has_errors());
    assert_eq!(diagnostics.count(), 0);

    diagnostics.report(
        7,
        SemanticError::WriteToConstant {
            name: "pi".to_string(),
        },
    );
    diagnostics.report(9, SemanticError::ReturnOutsideFunction);

    assert!(diagnostics.has_errors());
    assert_eq!(diagnostics.count(), 2);

    let rendered: Vec<String> = diagnostics.iter().map(|d| d.to_string()).collect();
    assert_eq!(rendered[0], "test.pulse:7: Cannot write to constant 'pi'");
    assert_eq!(rendered[1], "test.pulse:9: Return statement must be within a function");
}

#[test]
fn test_diagnostic_without_unit_name() {
    let mut diagnostics = Diagnostics::default();
    diagnostics.report(
        2,
        SemanticError::UndeclaredFunction {
            name: "f".to_string(),
        },
    );

    let diagnostic = &diagnostics.entries()[0];
    assert_eq!(diagnostic.kind(), ErrorKind::Structural);
    assert_eq!(diagnostic.to_string(), "2: Function 'f' is not declared");
}
