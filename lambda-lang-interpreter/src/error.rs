use std::rc::Rc;

use lambda_lang_core::ast::{InfixOperationKind, PrefixOperationKind};

use thiserror::Error;

use crate::value::Value;

#[derive(Debug, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Modulo by zero")]
    ModuloByZero,
    #[error("Integer overflow")]
    IntegerOverflow,
    #[error("Function {0} is not defined")]
    UndefinedFunction(Rc<str>),
    #[error("Function {name} expects {expected} arguments, got {actual}")]
    WrongArgumentCount {
        name: Rc<str>,
        expected: usize,
        actual: usize,
    },
    #[error("Logical operator '{operator}' requires boolean operands")]
    NonBooleanLogicOperand { operator: InfixOperationKind },
    #[error("Recursion limit exceeded")]
    RecursionLimitExceeded,
}

#[derive(Debug, PartialEq, Error)]
pub enum TypeError {
    #[error("Operator '{operator}' requires integer operands, got {left} and {right}")]
    NonIntegerOperands {
        operator: InfixOperationKind,
        left: Value,
        right: Value,
    },
    #[error("Cannot order {left} against {right}")]
    IncomparableOperands { left: Value, right: Value },
    #[error("Unary operator '{operator}' cannot be applied to {value}")]
    InvalidUnaryOperand {
        operator: PrefixOperationKind,
        value: Value,
    },
}

#[derive(Debug, PartialEq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Type(#[from] TypeError),
}
