use std::rc::Rc;

use lambda_lang_core::ast::{
    Expression, InfixOperationKind, PrefixOperationKind, Program, Statement,
};

use crate::environment::{Bindings, Function, FunctionTable};
use crate::error::{EvalError, RuntimeError, TypeError};
use crate::value::{StatementResult, Value};

// One interpreter frame per user-level call; bounded well below the host
// stack so runaway recursion reports instead of aborting.
const RECURSION_LIMIT: usize = 256;

pub struct Interpreter {
    functions: FunctionTable,
    depth: usize,
    steps: Vec<Value>,
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter {
            functions: FunctionTable::new(),
            depth: 0,
            steps: Vec::new(),
        }
    }

    /// View of the function table for the parser.
    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// Drains the values emitted by the sequencing idiom's per-iteration
    /// combinator since the last call.
    pub fn take_steps(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.steps)
    }

    pub fn interpret(&mut self, program: &Program) -> Result<Vec<StatementResult>, EvalError> {
        let mut results = Vec::new();
        for statement in &program.statements {
            results.push(self.eval_statement(statement)?);
        }
        Ok(results)
    }

    fn eval_statement(&mut self, statement: &Statement) -> Result<StatementResult, EvalError> {
        match statement {
            Statement::FunctionDefinition(definition) => {
                self.functions.define(
                    definition.name.clone(),
                    Function {
                        parameters: definition.parameters.clone(),
                        body: definition.body.clone(),
                    },
                );
                Ok(StatementResult::Defined)
            }
            Statement::Expression(expression) => {
                let locals = Bindings::new();
                self.eval_expression(expression, &locals)
                    .map(StatementResult::Value)
            }
        }
    }

    fn eval_expression(
        &mut self,
        expression: &Expression,
        locals: &Bindings,
    ) -> Result<Value, EvalError> {
        match expression {
            Expression::IntegerLiteral(value) => Ok(Value::Integer(*value)),
            Expression::BooleanLiteral(value) => Ok(Value::Boolean(*value)),
            Expression::Identifier(identifier) => {
                Ok(locals.get(&identifier.name).unwrap_or(Value::Absent))
            }
            Expression::PrefixOperation(kind, operand) => {
                let value = self.eval_expression(operand, locals)?;
                eval_prefix_operation(*kind, value)
            }
            Expression::InfixOperation(kind, left, right) => {
                let left = self.eval_expression(left, locals)?;
                let right = self.eval_expression(right, locals)?;
                eval_infix_operation(*kind, left, right)
            }
            // A lambda body reads whatever is bound where it appears; its
            // parameter list is declarative only.
            Expression::Lambda { body, .. } => self.eval_expression(body, locals),
            Expression::Call { name, arguments } => self.eval_call(name, arguments, locals),
            // A chain only means something as a call argument or on the
            // right of `or`; on its own it carries no value.
            Expression::ArgumentChain { .. } => Ok(Value::Absent),
            Expression::OrSequence { left, right } => self.eval_or_sequence(left, right, locals),
        }
    }

    fn eval_call(
        &mut self,
        name: &Rc<str>,
        arguments: &[Expression],
        locals: &Bindings,
    ) -> Result<Value, EvalError> {
        let Some(function) = self.functions.get(name).cloned() else {
            return Err(RuntimeError::UndefinedFunction(name.clone()).into());
        };
        let callee_locals = self.bind_arguments(name, &function, arguments, locals)?;

        if self.depth >= RECURSION_LIMIT {
            return Err(RuntimeError::RecursionLimitExceeded.into());
        }
        self.depth += 1;
        let result = self.eval_expression(&function.body, &callee_locals);
        self.depth -= 1;
        result
    }

    // Arguments evaluate under the caller's bindings, never the callee's.
    fn bind_arguments(
        &mut self,
        name: &Rc<str>,
        function: &Function,
        arguments: &[Expression],
        locals: &Bindings,
    ) -> Result<Bindings, EvalError> {
        let mut bindings = Bindings::new();
        if let [Expression::ArgumentChain { left, right }] = arguments {
            // The two sides of a chained argument feed the first two
            // parameters positionally.
            if function.parameters.len() < 2 {
                return Err(RuntimeError::WrongArgumentCount {
                    name: name.clone(),
                    expected: function.parameters.len(),
                    actual: 2,
                }
                .into());
            }
            let left = self.eval_expression(left, locals)?;
            bindings.bind(function.parameters[0].clone(), left);
            let right = self.eval_expression(right, locals)?;
            bindings.bind(function.parameters[1].clone(), right);
        } else {
            if arguments.len() != function.parameters.len() {
                return Err(RuntimeError::WrongArgumentCount {
                    name: name.clone(),
                    expected: function.parameters.len(),
                    actual: arguments.len(),
                }
                .into());
            }
            for (parameter, argument) in function.parameters.iter().zip(arguments) {
                let value = self.eval_expression(argument, locals)?;
                bindings.bind(parameter.clone(), value);
            }
        }
        Ok(bindings)
    }

    fn eval_or_sequence(
        &mut self,
        left: &Expression,
        right: &Expression,
        locals: &Bindings,
    ) -> Result<Value, EvalError> {
        // Base case of the loop idiom: a left side shaped like `x == N`
        // terminates the recursion when N equals the first bound value.
        if let Expression::InfixOperation(_, _, guard) = left {
            if let (Expression::IntegerLiteral(value), Some(first)) =
                (guard.as_ref(), locals.first())
            {
                if Value::Integer(*value) == first {
                    return Ok(first);
                }
            }
        }

        if let Expression::ArgumentChain {
            left: next,
            right: step,
        } = right
        {
            // Emit one combinator value, then recurse for effect.
            let emitted = self.eval_expression(step, locals)?;
            self.steps.push(emitted);
            self.eval_expression(next, locals)?;
            Ok(Value::Absent)
        } else {
            self.eval_expression(right, locals)
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn eval_prefix_operation(kind: PrefixOperationKind, value: Value) -> Result<Value, EvalError> {
    match (kind, value) {
        (PrefixOperationKind::Bang, Value::Boolean(value)) => Ok(Value::Boolean(!value)),
        (PrefixOperationKind::Minus, Value::Integer(value)) => value
            .checked_neg()
            .map(Value::Integer)
            .ok_or_else(|| RuntimeError::IntegerOverflow.into()),
        _ => Err(TypeError::InvalidUnaryOperand {
            operator: kind,
            value,
        }
        .into()),
    }
}

fn eval_infix_operation(
    kind: InfixOperationKind,
    left: Value,
    right: Value,
) -> Result<Value, EvalError> {
    use InfixOperationKind::*;
    match kind {
        Plus | Minus | Multiply | Divide | Modulo => {
            let (Value::Integer(lhs), Value::Integer(rhs)) = (left, right) else {
                return Err(TypeError::NonIntegerOperands {
                    operator: kind,
                    left,
                    right,
                }
                .into());
            };
            let result = match kind {
                Plus => lhs.checked_add(rhs),
                Minus => lhs.checked_sub(rhs),
                Multiply => lhs.checked_mul(rhs),
                Divide if rhs == 0 => return Err(RuntimeError::DivisionByZero.into()),
                Divide => floor_div(lhs, rhs),
                _ if rhs == 0 => return Err(RuntimeError::ModuloByZero.into()),
                _ => floor_mod(lhs, rhs),
            };
            result
                .map(Value::Integer)
                .ok_or_else(|| RuntimeError::IntegerOverflow.into())
        }
        And | Or => match (left, right) {
            (Value::Boolean(lhs), Value::Boolean(rhs)) => Ok(Value::Boolean(if kind == And {
                lhs && rhs
            } else {
                lhs || rhs
            })),
            _ => Err(RuntimeError::NonBooleanLogicOperand { operator: kind }.into()),
        },
        Equal => Ok(Value::Boolean(values_equal(left, right))),
        NotEqual => Ok(Value::Boolean(!values_equal(left, right))),
        GreaterThan | LessThan | GreaterEqual | LessEqual => {
            let (Some(lhs), Some(rhs)) = (left.ordinal(), right.ordinal()) else {
                return Err(TypeError::IncomparableOperands { left, right }.into());
            };
            Ok(Value::Boolean(match kind {
                GreaterThan => lhs > rhs,
                LessThan => lhs < rhs,
                GreaterEqual => lhs >= rhs,
                _ => lhs <= rhs,
            }))
        }
    }
}

fn values_equal(left: Value, right: Value) -> bool {
    match (left.ordinal(), right.ordinal()) {
        (Some(lhs), Some(rhs)) => lhs == rhs,
        (None, None) => true,
        _ => false,
    }
}

// Division and modulo floor toward negative infinity.
fn floor_div(lhs: i64, rhs: i64) -> Option<i64> {
    let quotient = lhs.checked_div(rhs)?;
    if lhs % rhs != 0 && (lhs < 0) != (rhs < 0) {
        quotient.checked_sub(1)
    } else {
        Some(quotient)
    }
}

fn floor_mod(lhs: i64, rhs: i64) -> Option<i64> {
    let remainder = lhs.checked_rem(rhs)?;
    if remainder != 0 && (remainder < 0) != (rhs < 0) {
        remainder.checked_add(rhs)
    } else {
        Some(remainder)
    }
}

#[cfg(test)]
mod tests {
    use lambda_lang_core::ast::{InfixOperationKind, PrefixOperationKind};
    use lambda_lang_core::lexer::Tokenizer;
    use lambda_lang_core::parser::Parser;

    use super::Interpreter;
    use crate::error::{EvalError, RuntimeError, TypeError};
    use crate::value::{StatementResult, Value};

    fn parse(
        input: &str,
        interpreter: &Interpreter,
    ) -> lambda_lang_core::ast::Program {
        let tokenizer = Tokenizer::new(input);
        Parser::new(tokenizer, interpreter.functions())
            .parse_program()
            .unwrap()
    }

    fn run_session(inputs: Vec<(&str, Result<Vec<StatementResult>, EvalError>)>) {
        let mut interpreter = Interpreter::new();
        for (input, expected) in inputs {
            let program = parse(input, &interpreter);
            let result = interpreter.interpret(&program);
            assert_eq!(result, expected, "input: {input}");
        }
    }

    fn ok_int(value: i64) -> Result<Vec<StatementResult>, EvalError> {
        Ok(vec![StatementResult::Value(Value::Integer(value))])
    }

    fn ok_bool(value: bool) -> Result<Vec<StatementResult>, EvalError> {
        Ok(vec![StatementResult::Value(Value::Boolean(value))])
    }

    fn ok_defined() -> Result<Vec<StatementResult>, EvalError> {
        Ok(vec![StatementResult::Defined])
    }

    #[test]
    fn test_literals() {
        let inputs = vec![
            ("5", ok_int(5)),
            ("-5", ok_int(-5)),
            ("True", ok_bool(true)),
            ("False", ok_bool(false)),
        ];

        run_session(inputs);
    }

    #[test]
    fn test_arithmetic() {
        let inputs = vec![
            ("2+3*4", ok_int(14)),
            ("(2+3)*4", ok_int(20)),
            ("-30/6*5-2", ok_int(-27)),
            ("-30/6", ok_int(-5)),
            ("30/7", ok_int(4)),
            ("-30/7", ok_int(-5)),
            ("7%3", ok_int(1)),
            ("-7%3", ok_int(2)),
            ("7%-3", ok_int(-2)),
            (
                "2/0",
                Err(EvalError::Runtime(RuntimeError::DivisionByZero)),
            ),
            ("4%0", Err(EvalError::Runtime(RuntimeError::ModuloByZero))),
            (
                "1+True",
                Err(EvalError::Type(TypeError::NonIntegerOperands {
                    operator: InfixOperationKind::Plus,
                    left: Value::Integer(1),
                    right: Value::Boolean(true),
                })),
            ),
        ];

        run_session(inputs);
    }

    #[test]
    fn test_logic_operators() {
        let inputs = vec![
            ("True&&False", ok_bool(false)),
            ("True&&True", ok_bool(true)),
            ("True||False", ok_bool(true)),
            ("False||False", ok_bool(false)),
            (
                "1&&True",
                Err(EvalError::Runtime(RuntimeError::NonBooleanLogicOperand {
                    operator: InfixOperationKind::And,
                })),
            ),
            (
                "True||3",
                Err(EvalError::Runtime(RuntimeError::NonBooleanLogicOperand {
                    operator: InfixOperationKind::Or,
                })),
            ),
            ("not True", ok_bool(false)),
            ("not False", ok_bool(true)),
            (
                "not 1",
                Err(EvalError::Type(TypeError::InvalidUnaryOperand {
                    operator: PrefixOperationKind::Bang,
                    value: Value::Integer(1),
                })),
            ),
            (
                "not -1",
                Err(EvalError::Type(TypeError::InvalidUnaryOperand {
                    operator: PrefixOperationKind::Bang,
                    value: Value::Integer(-1),
                })),
            ),
        ];

        run_session(inputs);
    }

    #[test]
    fn test_comparisons() {
        let inputs = vec![
            ("1<2", ok_bool(true)),
            ("2>=2", ok_bool(true)),
            ("2!=2", ok_bool(false)),
            ("2<=1", ok_bool(false)),
            ("0>1", ok_bool(false)),
            // Booleans order as integers.
            ("True==1", ok_bool(true)),
            ("False<True", ok_bool(true)),
        ];

        run_session(inputs);
    }

    #[test]
    fn test_function_calls() {
        let inputs = vec![
            ("Defun (Add,a,b)a+b", ok_defined()),
            ("Add(2,1)", ok_int(3)),
            ("Add(2,1)-8", ok_int(-5)),
            ("8-Add(2,1)", ok_int(5)),
            ("Add(Add(2,2),2)", ok_int(6)),
            ("2-Add(2,Add(2,2))", ok_int(-4)),
            ("Add(2,1)==3", ok_bool(true)),
            ("3!=Add(2,1)", ok_bool(false)),
            ("(Add(2,1)==3)||(Add(2,1)==4)", ok_bool(true)),
            ("(Add(2,1)==4)||(Add(2,1)==4)", ok_bool(false)),
            ("(Add(2,1)==3)&&(Add(2,1)==3)", ok_bool(true)),
            ("(Add(2,1)==4)&&(Add(2,1)==3)", ok_bool(false)),
            (
                "Add(1)",
                Err(EvalError::Runtime(RuntimeError::WrongArgumentCount {
                    name: "Add".into(),
                    expected: 2,
                    actual: 1,
                })),
            ),
            (
                "Add(1,2,3)",
                Err(EvalError::Runtime(RuntimeError::WrongArgumentCount {
                    name: "Add".into(),
                    expected: 2,
                    actual: 3,
                })),
            ),
            (
                "Add(True,2)",
                Err(EvalError::Type(TypeError::NonIntegerOperands {
                    operator: InfixOperationKind::Plus,
                    left: Value::Boolean(true),
                    right: Value::Integer(2),
                })),
            ),
            (
                "Missing(1)",
                Err(EvalError::Runtime(RuntimeError::UndefinedFunction(
                    "Missing".into(),
                ))),
            ),
        ];

        run_session(inputs);
    }

    #[test]
    fn test_redefinition_overwrites() {
        let inputs = vec![
            ("Defun (Add,a,b)a+b", ok_defined()),
            ("Add(2,1)", ok_int(3)),
            ("Defun (Add,a,b)a-b", ok_defined()),
            ("Add(2,1)", ok_int(1)),
        ];

        run_session(inputs);
    }

    #[test]
    fn test_definition_and_call_in_one_input() {
        let inputs = vec![(
            "Defun (Add,a,b)a+b ; Add(2,1)",
            Ok(vec![
                StatementResult::Defined,
                StatementResult::Value(Value::Integer(3)),
            ]),
        )];

        run_session(inputs);
    }

    #[test]
    fn test_lambda_reads_enclosing_bindings() {
        let inputs = vec![
            ("Defun (AddAplusAMulB,a,b)a + lambd (b,a) (b*a)", ok_defined()),
            ("AddAplusAMulB(4,2)", ok_int(12)),
            (
                "Defun (AddAplusAMulBplusBMinusA,a,b)a + lambd (b,a) (b*a) + lambd (b,a) (b-a)",
                ok_defined(),
            ),
            ("AddAplusAMulBplusBMinusA(5,8)", ok_int(48)),
        ];

        run_session(inputs);
    }

    #[test]
    fn test_factorial() {
        let inputs = vec![
            (
                "Defun (Factorial, n)(n == 1) or (n * Factorial(n - 1))",
                ok_defined(),
            ),
            ("Factorial(4)", ok_int(24)),
            ("Factorial(1)", ok_int(1)),
            (
                "Factorial(-1)",
                Err(EvalError::Runtime(RuntimeError::RecursionLimitExceeded)),
            ),
        ];

        run_session(inputs);
    }

    #[test]
    fn test_sequencing_loop() {
        let mut interpreter = Interpreter::new();
        for input in [
            "Defun (Add,a,b)a+b",
            "Defun (repeat,n)(n==0) or (repeat(n-1) , Add(1,1))",
        ] {
            let program = parse(input, &interpreter);
            assert_eq!(interpreter.interpret(&program), ok_defined());
        }

        let program = parse("repeat(5)", &interpreter);
        let result = interpreter.interpret(&program);
        assert_eq!(
            result,
            Ok(vec![StatementResult::Value(Value::Absent)])
        );
        // One emitted combinator value per iteration.
        assert_eq!(interpreter.take_steps(), vec![Value::Integer(2); 5]);
        assert!(interpreter.take_steps().is_empty());

        let program = parse("repeat(0)", &interpreter);
        assert_eq!(interpreter.interpret(&program), ok_int(0));
        assert!(interpreter.take_steps().is_empty());

        let program = parse("repeat(-1)", &interpreter);
        assert_eq!(
            interpreter.interpret(&program),
            Err(EvalError::Runtime(RuntimeError::RecursionLimitExceeded))
        );
        interpreter.take_steps();
    }

    #[test]
    fn test_unbound_names_are_absent() {
        let inputs = vec![
            ("Defun (f,a)b", ok_defined()),
            ("f(1)", Ok(vec![StatementResult::Value(Value::Absent)])),
            ("Defun (g,a)b+1", ok_defined()),
            (
                "g(1)",
                Err(EvalError::Type(TypeError::NonIntegerOperands {
                    operator: InfixOperationKind::Plus,
                    left: Value::Absent,
                    right: Value::Integer(1),
                })),
            ),
            ("Defun (h,a)b==b", ok_defined()),
            ("h(1)", Ok(vec![StatementResult::Value(Value::Boolean(true))])),
        ];

        run_session(inputs);
    }

    #[test]
    fn test_chained_argument_binds_two_parameters() {
        // A single `call , expr` argument supplies the first two bindings.
        let inputs = vec![
            ("Defun (One,a)1", ok_defined()),
            ("Defun (Add,a,b)a+b", ok_defined()),
            ("Defun (pair,n)Add(One(n) , 5)", ok_defined()),
            ("pair(0)", ok_int(6)),
        ];

        run_session(inputs);
    }

    #[test]
    fn test_overflow_is_reported() {
        let inputs = vec![
            (
                "9223372036854775807+1",
                Err(EvalError::Runtime(RuntimeError::IntegerOverflow)),
            ),
            (
                "9223372036854775807*2",
                Err(EvalError::Runtime(RuntimeError::IntegerOverflow)),
            ),
        ];

        run_session(inputs);
    }
}
