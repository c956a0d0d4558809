use crate::{
    ast::statements::{FnDecl, Param, Stmt, StmtKind},
    errors::errors::Error,
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{parser::Parser, types::parse_type};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let handler = parser
        .get_stmt_lookup()
        .get(&parser.current_token_kind())
        .copied();

    match handler {
        Some(handler) => handler(parser),
        None => Err(parser.unexpected_detailed("expected a statement")),
    }
}

/// Parses `{ statement* }`.
pub fn parse_block(parser: &mut Parser) -> Result<Vec<Stmt>, Error> {
    let error = parser.unexpected_detailed("expected `{` to open a block");
    parser.expect_error(TokenKind::OpenCurly, Some(error))?;

    let mut statements = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseCurly && parser.has_tokens() {
        statements.push(parse_stmt(parser)?);
    }

    let error = parser.unexpected_detailed("expected `}` to close the block");
    parser.expect_error(TokenKind::CloseCurly, Some(error))?;

    Ok(statements)
}

fn expect_semicolon(parser: &mut Parser) -> Result<(), Error> {
    parser.expect(TokenKind::Semicolon)?;
    Ok(())
}

fn expect_identifier(parser: &mut Parser, message: &str) -> Result<String, Error> {
    let error = parser.unexpected_detailed(message);
    Ok(parser.expect_error(TokenKind::Identifier, Some(error))?.value)
}

pub fn parse_print_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    parser.expect(TokenKind::OpenParen)?;
    let value = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;
    expect_semicolon(parser)?;

    Ok(Stmt::new(StmtKind::Print(value), parser.span_from(start)))
}

pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let name = expect_identifier(parser, "expected identifier during variable declaration")?;
    let data_type = parse_type(parser)?;

    let value = if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    expect_semicolon(parser)?;

    Ok(Stmt::new(
        StmtKind::VarDecl {
            name,
            data_type,
            value,
        },
        parser.span_from(start),
    ))
}

pub fn parse_const_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let name = expect_identifier(parser, "expected identifier during constant declaration")?;

    let error = parser.unexpected_detailed("expected `<-` in constant definition");
    parser.expect_error(TokenKind::Assignment, Some(error))?;
    let value = parse_expr(parser, BindingPower::Default)?;

    expect_semicolon(parser)?;

    Ok(Stmt::new(
        StmtKind::ConstDecl { name, value },
        parser.span_from(start),
    ))
}

pub fn parse_write_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let target = parser.advance().clone();

    let error = parser.unexpected_detailed("expected `<-` after assignment target");
    parser.expect_error(TokenKind::Assignment, Some(error))?;
    let value = parse_expr(parser, BindingPower::Default)?;

    expect_semicolon(parser)?;

    Ok(Stmt::new(
        StmtKind::Write {
            name: target.value,
            value,
        },
        parser.span_from(target.span.start),
    ))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let true_block = parse_block(parser)?;

    let false_block = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        parse_block(parser)?
    } else {
        vec![]
    };

    Ok(Stmt::new(
        StmtKind::If {
            condition,
            true_block,
            false_block,
        },
        parser.span_from(start),
    ))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;

    Ok(Stmt::new(
        StmtKind::While { condition, body },
        parser.span_from(start),
    ))
}

/// Parses `function name(param type, ...) type { ... }`.
///
/// # Returns
///
/// A `FnDecl` statement. Parameter and return type names are kept as written
/// and resolved by the type checker.
pub fn parse_fn_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let name = expect_identifier(parser, "expected function name")?;

    parser.expect(TokenKind::OpenParen)?;

    let mut params = Vec::new();
    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            let param_start = parser.get_position();
            let param_name = expect_identifier(parser, "expected parameter name")?;
            let data_type = parse_type(parser)?;

            params.push(Param {
                name: param_name,
                data_type,
                span: parser.span_from(param_start),
            });

            if parser.current_token_kind() != TokenKind::Comma {
                break;
            }
            parser.advance();
        }
    }

    let error = parser.unexpected_detailed("expected `,` or `)` in parameter list");
    parser.expect_error(TokenKind::CloseParen, Some(error))?;

    let return_type = parse_type(parser)?;
    let body = parse_block(parser)?;

    Ok(Stmt::new(
        StmtKind::FnDecl(FnDecl {
            name,
            params,
            return_type,
            body,
        }),
        parser.span_from(start),
    ))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let value = parse_expr(parser, BindingPower::Default)?;
    expect_semicolon(parser)?;

    Ok(Stmt::new(StmtKind::Return(value), parser.span_from(start)))
}
