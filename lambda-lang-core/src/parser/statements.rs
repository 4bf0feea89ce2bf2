use crate::ast::{Expression, FunctionDefinition, Statement};
use crate::lexer::TokenKind;
use crate::parser::expressions::{
    parse_flat_call_arguments, parse_flat_expression, parse_lambda, parse_parameters,
};
use crate::parser::{ParseError, Parser};

pub fn parse_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let token = parser.iter.peek();
    match token.map(|t| &t.kind) {
        Some(TokenKind::Defun) => Ok(Statement::FunctionDefinition(parse_function_definition(
            parser,
        )?)),
        Some(TokenKind::Lambda) => Ok(Statement::Expression(parse_lambda(parser)?)),
        Some(TokenKind::Ident(_)) => Ok(Statement::Expression(parse_top_level_call(parser)?)),
        _ => Ok(Statement::Expression(parse_flat_expression(parser, None)?)),
    }
}

fn parse_function_definition(parser: &mut Parser) -> Result<FunctionDefinition, ParseError> {
    parser.expect_token(TokenKind::Defun)?;
    // The delimiters around the header only have to be punctuation, so
    // `Defun (Add,a,b)` and `Defun {Add,a,b}` both parse.
    parser.expect_punctuation()?;
    let name = parser.parse_ident()?;
    parser.expect_punctuation()?;
    let parameters = parse_parameters(parser)?;
    parser.expect_punctuation()?;
    let body = parse_flat_expression(parser, Some(&name))?;
    Ok(FunctionDefinition {
        name,
        parameters,
        body,
    })
}

// A leading identifier in statement position is always a call, whether or
// not the name is defined yet; this is what lets one input define a
// function and call it after a `;`.
fn parse_top_level_call(parser: &mut Parser) -> Result<Expression, ParseError> {
    let name = parser.parse_ident()?;
    parser.expect_token(TokenKind::LParen)?;
    let arguments = parse_flat_call_arguments(parser)?;
    Ok(Expression::Call { name, arguments })
}
