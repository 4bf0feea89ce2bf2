use std::rc::Rc;

use super::error::ParseError;
use crate::ast::{Expression, Identifier, InfixOperationKind, PrefixOperationKind};
use crate::lexer::{Token, TokenKind};
use crate::parser::Parser;

#[derive(PartialOrd, PartialEq, Debug, Clone, Copy)]
pub enum Precedence {
    Lowest = 0,
    Or,
    And,
    Comparison,
    Sum,
    Product,
    Prefix,
}

pub fn precedence_of(kind: &TokenKind) -> Precedence {
    match kind {
        TokenKind::Or | TokenKind::OrWord => Precedence::Or,
        TokenKind::And => Precedence::And,
        TokenKind::Equal
        | TokenKind::NotEqual
        | TokenKind::GreaterThan
        | TokenKind::LessThan
        | TokenKind::GreaterEqual
        | TokenKind::LessEqual => Precedence::Comparison,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk | TokenKind::Slash | TokenKind::Percent => Precedence::Product,
        _ => Precedence::Lowest,
    }
}

fn infix_kind(kind: &TokenKind) -> Option<InfixOperationKind> {
    use InfixOperationKind::*;
    Some(match kind {
        TokenKind::Plus => Plus,
        TokenKind::Minus => Minus,
        TokenKind::Asterisk => Multiply,
        TokenKind::Slash => Divide,
        TokenKind::Percent => Modulo,
        TokenKind::Equal => Equal,
        TokenKind::NotEqual => NotEqual,
        TokenKind::GreaterThan => GreaterThan,
        TokenKind::LessThan => LessThan,
        TokenKind::GreaterEqual => GreaterEqual,
        TokenKind::LessEqual => LessEqual,
        TokenKind::And => And,
        TokenKind::Or | TokenKind::OrWord => Or,
        _ => return None,
    })
}

/// Precedence-climbing grammar for standalone expressions. The bare word
/// `or` is plain logical OR at this level; the sequencing reading only
/// exists inside definitions.
pub fn parse_expression(
    parser: &mut Parser,
    precedence: Precedence,
) -> Result<Expression, ParseError> {
    let Some(token) = parser.iter.next() else {
        return Err(ParseError::premature_end_expected_expression());
    };
    let mut left = prefix_parsing(token, parser)?;

    loop {
        let Some(next) = parser.iter.peek() else {
            break;
        };
        if precedence >= precedence_of(&next.kind) {
            break;
        }

        let Some(token) = parser.iter.next() else {
            break;
        };
        let Some(kind) = infix_kind(&token.kind) else {
            break;
        };
        let right = parse_expression(parser, precedence_of(&token.kind))?;
        left = Expression::InfixOperation(kind, Box::new(left), Box::new(right));
    }

    Ok(left)
}

fn prefix_parsing(token: Token, parser: &mut Parser) -> Result<Expression, ParseError> {
    match token.kind {
        TokenKind::Int(val) => Ok(Expression::IntegerLiteral(val.parse()?)),
        TokenKind::True => Ok(Expression::BooleanLiteral(true)),
        TokenKind::False => Ok(Expression::BooleanLiteral(false)),
        TokenKind::Ident(name) => {
            let name: Rc<str> = name.into();
            if parser
                .iter
                .next_if(|token| token.kind == TokenKind::LParen)
                .is_some()
            {
                let arguments = parse_call_arguments(parser)?;
                Ok(Expression::Call { name, arguments })
            } else if parser.functions.is_defined(&name) {
                // Defined names take precedence over bindings and must be
                // called.
                Err(ParseError::unexpected_token(
                    TokenKind::LParen,
                    parser.iter.next(),
                ))
            } else {
                Ok(Expression::Identifier(Identifier { name }))
            }
        }
        TokenKind::Bang => Ok(Expression::PrefixOperation(
            PrefixOperationKind::Bang,
            Box::new(parse_expression(parser, Precedence::Prefix)?),
        )),
        TokenKind::Minus => Ok(Expression::PrefixOperation(
            PrefixOperationKind::Minus,
            Box::new(parse_expression(parser, Precedence::Prefix)?),
        )),
        TokenKind::LParen => {
            let expression = parse_expression(parser, Precedence::Lowest)?;
            parser.expect_token(TokenKind::RParen)?;
            Ok(expression)
        }
        TokenKind::Illegal(value) => Err(ParseError::IllegalCharacter(value)),
        _ => Err(ParseError::NoPrefixFunction(token)),
    }
}

fn parse_call_arguments(parser: &mut Parser) -> Result<Vec<Expression>, ParseError> {
    let mut arguments = vec![parse_expression(parser, Precedence::Lowest)?];
    while parser
        .iter
        .next_if(|token| token.kind == TokenKind::Comma)
        .is_some()
    {
        arguments.push(parse_expression(parser, Precedence::Lowest)?);
    }
    parser.expect_token(TokenKind::RParen)?;
    Ok(arguments)
}

/// Flat grammar used inside definition inputs: one factor followed by a
/// greedy left-associated fold of any binary operator, with no precedence
/// tiers. `enclosing` is the name of the definition being parsed, so that
/// its own name is read as a self-call before it exists in the table.
pub fn parse_flat_expression(
    parser: &mut Parser,
    enclosing: Option<&str>,
) -> Result<Expression, ParseError> {
    let left = parse_flat_term(parser, enclosing)?;

    // A trailing `, factor` after a call is the two-argument chain of the
    // sequencing idiom, not a second statement.
    if matches!(left, Expression::Call { .. })
        && parser
            .iter
            .next_if(|token| token.kind == TokenKind::Comma)
            .is_some()
    {
        let right = parse_flat_factor(parser, enclosing)?;
        return Ok(Expression::ArgumentChain {
            left: Box::new(left),
            right: Box::new(right),
        });
    }

    Ok(left)
}

fn parse_flat_term(parser: &mut Parser, enclosing: Option<&str>) -> Result<Expression, ParseError> {
    let mut left = parse_flat_factor(parser, enclosing)?;

    loop {
        let Some(next) = parser.iter.peek() else {
            break;
        };
        if next.kind == TokenKind::OrWord {
            parser.iter.next();
            let right = parse_flat_factor(parser, enclosing)?;
            left = Expression::OrSequence {
                left: Box::new(left),
                right: Box::new(right),
            };
        } else if let Some(kind) = infix_kind(&next.kind) {
            parser.iter.next();
            let right = parse_flat_factor(parser, enclosing)?;
            left = Expression::InfixOperation(kind, Box::new(left), Box::new(right));
        } else {
            break;
        }
    }

    Ok(left)
}

fn parse_flat_factor(
    parser: &mut Parser,
    enclosing: Option<&str>,
) -> Result<Expression, ParseError> {
    let Some(token) = parser.iter.next() else {
        return Err(ParseError::premature_end_expected_expression());
    };
    match token.kind {
        TokenKind::Lambda => parse_lambda_tail(parser),
        TokenKind::Int(val) => Ok(Expression::IntegerLiteral(val.parse()?)),
        TokenKind::True => Ok(Expression::BooleanLiteral(true)),
        TokenKind::False => Ok(Expression::BooleanLiteral(false)),
        TokenKind::Ident(name) => {
            let name: Rc<str> = name.into();
            if parser.functions.is_defined(&name) || enclosing == Some(name.as_ref()) {
                parser.expect_token(TokenKind::LParen)?;
                // Arguments never see the enclosing name; a self-call in
                // argument position reads as a binding, as in `f(f(x))`.
                let arguments = parse_flat_call_arguments(parser)?;
                Ok(Expression::Call { name, arguments })
            } else {
                Ok(Expression::Identifier(Identifier { name }))
            }
        }
        TokenKind::LParen => {
            if parser
                .iter
                .next_if(|token| token.kind == TokenKind::Minus)
                .is_some()
            {
                // Negative literals are only written as `(-N)` here.
                let value = parser.parse_int()?;
                parser.expect_token(TokenKind::RParen)?;
                Ok(Expression::IntegerLiteral(-value))
            } else {
                let expression = parse_flat_expression(parser, enclosing)?;
                parser.expect_token(TokenKind::RParen)?;
                Ok(expression)
            }
        }
        TokenKind::Bang => Ok(Expression::PrefixOperation(
            PrefixOperationKind::Bang,
            Box::new(parse_flat_factor(parser, enclosing)?),
        )),
        TokenKind::Illegal(value) => Err(ParseError::IllegalCharacter(value)),
        _ => Err(ParseError::NoPrefixFunction(token)),
    }
}

pub(crate) fn parse_flat_call_arguments(parser: &mut Parser) -> Result<Vec<Expression>, ParseError> {
    let mut arguments = vec![parse_flat_expression(parser, None)?];
    while parser
        .iter
        .next_if(|token| token.kind == TokenKind::Comma)
        .is_some()
    {
        arguments.push(parse_flat_expression(parser, None)?);
    }
    parser.expect_token(TokenKind::RParen)?;
    Ok(arguments)
}

pub fn parse_lambda(parser: &mut Parser) -> Result<Expression, ParseError> {
    parser.expect_token(TokenKind::Lambda)?;
    parse_lambda_tail(parser)
}

fn parse_lambda_tail(parser: &mut Parser) -> Result<Expression, ParseError> {
    parser.expect_punctuation()?;
    let parameters = parse_parameters(parser)?;
    parser.expect_punctuation()?;
    parser.expect_punctuation()?;
    let body = parse_flat_expression(parser, None)?;
    parser.expect_punctuation()?;
    Ok(Expression::Lambda {
        parameters,
        body: Box::new(body),
    })
}

pub(crate) fn parse_parameters(parser: &mut Parser) -> Result<Vec<Rc<str>>, ParseError> {
    let mut parameters = Vec::new();
    while matches!(
        parser.iter.peek(),
        Some(Token {
            kind: TokenKind::Ident(_),
            ..
        })
    ) {
        parameters.push(parser.parse_ident()?);
        parser
            .iter
            .next_if(|token| token.kind == TokenKind::Comma);
    }
    Ok(parameters)
}
