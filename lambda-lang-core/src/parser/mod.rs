pub mod error;
pub mod expressions;
pub mod statements;

use std::rc::Rc;

use crate::ast::{Expression, Program, Statement};
use crate::lexer::{Token, TokenKind};
pub use error::ParseError;
use expressions::{parse_expression, Precedence};
use statements::parse_statement;

/// Read-only view of the defined function names, used to decide whether an
/// identifier is a call or a local binding.
pub trait FunctionLookup {
    fn is_defined(&self, name: &str) -> bool;
}

impl FunctionLookup for std::collections::HashSet<Rc<str>> {
    fn is_defined(&self, name: &str) -> bool {
        self.contains(name)
    }
}

pub struct Parser<'a> {
    pub iter: std::iter::Peekable<crate::lexer::Tokenizer<'a>>,
    pub(crate) functions: &'a dyn FunctionLookup,
    bare_expression: bool,
}

impl<'a> Parser<'a> {
    pub fn new(tokenizer: crate::lexer::Tokenizer<'a>, functions: &'a dyn FunctionLookup) -> Self {
        let bare_expression = tokenizer.is_bare_expression();
        let iter = tokenizer.peekable();
        Self {
            iter,
            functions,
            bare_expression,
        }
    }

    pub(crate) fn parse_ident(&mut self) -> Result<Rc<str>, ParseError> {
        let token = self.iter.next();
        match token {
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => Ok(name.into()),
            _ => Err(ParseError::unexpected_other(
                error::Expected::Identifier,
                token,
            )),
        }
    }

    pub(crate) fn parse_int(&mut self) -> Result<i64, ParseError> {
        let token = self.iter.next();
        match token {
            Some(Token {
                kind: TokenKind::Int(value),
                ..
            }) => Ok(value.parse()?),
            _ => Err(ParseError::unexpected_other(
                error::Expected::Integer,
                token,
            )),
        }
    }

    pub(crate) fn expect_token(&mut self, token_kind: TokenKind) -> Result<(), ParseError> {
        let token = self.iter.next();
        match token {
            Some(Token { kind, .. }) if kind == token_kind => Ok(()),
            _ => Err(ParseError::unexpected_token(token_kind, token)),
        }
    }

    // The original grammar only distinguishes punctuation as a class, so
    // any of the six punctuation tokens is accepted where one is expected.
    pub(crate) fn expect_punctuation(&mut self) -> Result<(), ParseError> {
        let token = self.iter.next();
        match token {
            Some(Token {
                kind:
                    TokenKind::Comma
                    | TokenKind::SemiColon
                    | TokenKind::LParen
                    | TokenKind::RParen
                    | TokenKind::LBrace
                    | TokenKind::RBrace,
                ..
            }) => Ok(()),
            _ => Err(ParseError::unexpected_other(
                error::Expected::Punctuation,
                token,
            )),
        }
    }

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        if self.bare_expression {
            self.parse_bare_expression()
        } else {
            let mut statements = Vec::new();
            while self.iter.peek().is_some() {
                statements.push(parse_statement(self)?);
                self.iter
                    .next_if(|token| token.kind == TokenKind::SemiColon);
            }
            Ok(Program { statements })
        }
    }

    fn parse_bare_expression(&mut self) -> Result<Program, ParseError> {
        let expression = parse_expression(self, Precedence::Lowest)?;
        // A lone binding reference makes no sense outside a function body;
        // the name would have to be a call.
        if matches!(expression, Expression::Identifier(_)) {
            return Err(ParseError::unexpected_token(
                TokenKind::LParen,
                self.iter.next(),
            ));
        }
        match self.iter.next() {
            None => Ok(Program {
                statements: vec![Statement::Expression(expression)],
            }),
            Some(token) => Err(ParseError::UnexpectedToken {
                expected: error::Expected::EndOfInput,
                got: token,
            }),
        }
    }
}
