//! Type annotation parsing.
//!
//! Pulse only has named scalar types, so a type annotation is a single
//! identifier. Whether the name denotes a real type is decided later by the
//! type checker, which reports unknown names as semantic errors.

use crate::{ast::statements::DataType, errors::errors::Error, lexer::tokens::TokenKind};

use super::parser::Parser;

pub fn parse_type(parser: &mut Parser) -> Result<DataType, Error> {
    let error = parser.unexpected_detailed("expected a type name");
    let token = parser.expect_error(TokenKind::Identifier, Some(error))?;

    Ok(DataType {
        name: token.value,
        span: token.span,
    })
}
