use crate::{
    ast::expressions::{BinaryOperator, Expr, ExprKind, Literal, UnaryOperator},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Span,
};

use super::{lookups::BindingPower, parser::Parser};

/// Parses an expression whose operators bind tighter than `bp`.
///
/// # Arguments
///
/// * `parser` - The parser, positioned on the first token of the expression
/// * `bp` - Binding power of the operator on the left, `Default` at the top
pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => return Err(parser.unexpected_detailed("expected an expression")),
    };

    let mut left = nud(parser)?;

    // While the next operator binds tighter than `bp`, keep extending the lhs
    while parser.current_bp() > bp {
        let token_kind = parser.current_token_kind();
        let led = match parser.get_led_lookup().get(&token_kind) {
            Some(led) => *led,
            None => return Err(parser.unexpected()),
        };

        let operator_bp = parser.current_bp();
        left = led(parser, left, operator_bp)?;
    }

    Ok(left)
}

fn parse_integer(token: &Token) -> Result<i32, Error> {
    let text = token.value.as_str();
    let result = if let Some(digits) = text.strip_prefix("0x") {
        i32::from_str_radix(digits, 16)
    } else if let Some(digits) = text.strip_prefix("0b") {
        i32::from_str_radix(digits, 2)
    } else if let Some(digits) = text.strip_prefix("0o") {
        i32::from_str_radix(digits, 8)
    } else {
        text.parse()
    };

    result.map_err(|_| {
        Error::new(
            ErrorImpl::NumberParseError {
                token: token.value.clone(),
            },
            token.span.start.clone(),
        )
    })
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.current_token().clone();

    let kind = match token.kind {
        TokenKind::Integer => ExprKind::Literal(Literal::Int(parse_integer(&token)?)),
        TokenKind::Float => {
            let value = token.value.parse::<f64>().map_err(|_| {
                Error::new(
                    ErrorImpl::NumberParseError {
                        token: token.value.clone(),
                    },
                    token.span.start.clone(),
                )
            })?;
            ExprKind::Literal(Literal::Float(value))
        }
        TokenKind::Char => {
            // The lexer already decoded escapes and rejected wide characters
            let code = token.value.chars().next().map(|c| c as u32).unwrap_or(0);
            ExprKind::Literal(Literal::Char(code as u8))
        }
        TokenKind::Bool => ExprKind::Literal(Literal::Bool(token.value == "true")),
        TokenKind::Identifier => ExprKind::Read {
            name: token.value.clone(),
        },
        _ => return Err(parser.unexpected()),
    };

    parser.advance();
    Ok(Expr::new(kind, token.span))
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let operator = BinaryOperator::from_token(operator_token.kind).ok_or_else(|| {
        Error::new(
            ErrorImpl::UnexpectedToken {
                token: operator_token.value.clone(),
            },
            operator_token.span.start.clone(),
        )
    })?;

    let right = parse_expr(parser, bp)?;
    let span = Span {
        start: left.span.start.clone(),
        end: right.span.end.clone(),
    };

    Ok(Expr::new(
        ExprKind::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    ))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let operator = UnaryOperator::from_token(operator_token.kind).ok_or_else(|| {
        Error::new(
            ErrorImpl::UnexpectedToken {
                token: operator_token.value.clone(),
            },
            operator_token.span.start.clone(),
        )
    })?;

    let operand = parse_expr(parser, BindingPower::Unary)?;
    let end = operand.span.end.clone();

    Ok(Expr::new(
        ExprKind::Unary {
            operator,
            operand: Box::new(operand),
        },
        Span {
            start: operator_token.span.start,
            end,
        },
    ))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect_error(
        TokenKind::CloseParen,
        Some(parser.unexpected_detailed("expected `)` to close the group")),
    )?;

    Ok(expr)
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    let name = match left.kind {
        ExprKind::Read { name } => name,
        _ => return Err(parser.unexpected_detailed("only named functions can be called")),
    };

    parser.advance();

    let mut arguments = vec![];

    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            arguments.push(parse_expr(parser, BindingPower::Default)?);

            if parser.current_token_kind() != TokenKind::Comma {
                break;
            }
            parser.advance();
        }
    }

    parser.expect_error(
        TokenKind::CloseParen,
        Some(parser.unexpected_detailed("expected `,` or `)` in call arguments")),
    )?;

    Ok(Expr::new(
        ExprKind::Call { name, arguments },
        parser.span_from(left.span.start),
    ))
}
