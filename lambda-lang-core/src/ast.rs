use std::fmt::Display;
use std::rc::Rc;

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    FunctionDefinition(FunctionDefinition),
    Expression(Expression),
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionDefinition {
    pub name: Rc<str>,
    pub parameters: Vec<Rc<str>>,
    pub body: Expression,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLiteral(i64),
    BooleanLiteral(bool),
    PrefixOperation(PrefixOperationKind, Box<Expression>),
    InfixOperation(InfixOperationKind, Box<Expression>, Box<Expression>),
    Lambda {
        parameters: Vec<Rc<str>>,
        body: Box<Expression>,
    },
    Call {
        name: Rc<str>,
        arguments: Vec<Expression>,
    },
    // A `call , expression` pair; a call whose single argument has this
    // shape binds its first two parameters from the pair.
    ArgumentChain {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    // The bare-word `or` sequencing operator of the loop-emulation idiom.
    OrSequence {
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InfixOperationKind {
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    And,
    Or,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PrefixOperationKind {
    Minus,
    Bang,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Identifier {
    pub name: Rc<str>,
}

#[derive(Debug)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl InfixOperationKind {
    pub fn to_str(&self) -> &'static str {
        use InfixOperationKind::*;
        match self {
            Plus => "+",
            Minus => "-",
            Multiply => "*",
            Divide => "/",
            Modulo => "%",
            Equal => "==",
            NotEqual => "!=",
            GreaterThan => ">",
            LessThan => "<",
            GreaterEqual => ">=",
            LessEqual => "<=",
            And => "&&",
            Or => "||",
        }
    }
}

impl PrefixOperationKind {
    pub fn to_str(&self) -> &'static str {
        use PrefixOperationKind::*;
        match self {
            Minus => "-",
            Bang => "!",
        }
    }
}

impl Display for InfixOperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl Display for PrefixOperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Expression::*;
        match self {
            Identifier(ident) => write!(f, "{}", ident.name),
            IntegerLiteral(val) => write!(f, "{}", val),
            BooleanLiteral(val) => write!(f, "{}", if *val { "True" } else { "False" }),
            PrefixOperation(kind, expr) => write!(f, "({}{})", kind, expr),
            InfixOperation(kind, left, right) => write!(f, "({} {} {})", left, kind, right),
            Lambda { parameters, body } => {
                write!(f, "lambd({}) ({})", join_names(parameters), body)
            }
            Call { name, arguments } => {
                write!(
                    f,
                    "{}({})",
                    name,
                    arguments
                        .iter()
                        .map(|arg| arg.to_string())
                        .collect::<Vec<String>>()
                        .join(", ")
                )
            }
            ArgumentChain { left, right } => write!(f, "({} , {})", left, right),
            OrSequence { left, right } => write!(f, "({} or {})", left, right),
        }
    }
}

impl Display for FunctionDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.parameters.is_empty() {
            write!(f, "Defun ({}) {}", self.name, self.body)
        } else {
            write!(
                f,
                "Defun ({}, {}) {}",
                self.name,
                join_names(&self.parameters),
                self.body
            )
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Statement::*;
        match self {
            FunctionDefinition(definition) => write!(f, "{};", definition),
            Expression(expression) => write!(f, "{};", expression),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}

fn join_names(names: &[Rc<str>]) -> String {
    names
        .iter()
        .map(|name| name.as_ref())
        .collect::<Vec<&str>>()
        .join(", ")
}
