use std::collections::HashMap;
use std::rc::Rc;

use lambda_lang_core::ast::Expression;
use lambda_lang_core::parser::FunctionLookup;

use crate::value::Value;

#[derive(Debug, PartialEq, Clone)]
pub struct Function {
    pub parameters: Vec<Rc<str>>,
    pub body: Expression,
}

/// The session-wide function table. Owned by exactly one interpreter;
/// definitions silently overwrite and are never removed.
#[derive(Debug, Default, Clone)]
pub struct FunctionTable {
    store: HashMap<Rc<str>, Function>,
}

impl FunctionTable {
    pub fn new() -> Self {
        FunctionTable {
            store: HashMap::new(),
        }
    }

    pub fn define(&mut self, name: Rc<str>, function: Function) {
        self.store.insert(name, function);
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.store.get(name)
    }
}

impl FunctionLookup for FunctionTable {
    fn is_defined(&self, name: &str) -> bool {
        self.store.contains_key(name)
    }
}

/// Per-call parameter bindings. Insertion order is kept because the
/// sequencing operator's base-case test reads the first binding.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct Bindings {
    values: Vec<(Rc<str>, Value)>,
}

impl Bindings {
    pub fn new() -> Self {
        Bindings { values: Vec::new() }
    }

    pub fn bind(&mut self, name: Rc<str>, value: Value) {
        match self
            .values
            .iter_mut()
            .find(|(existing, _)| existing.as_ref() == name.as_ref())
        {
            Some((_, slot)) => *slot = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values
            .iter()
            .find(|(existing, _)| existing.as_ref() == name)
            .map(|(_, value)| *value)
    }

    pub fn first(&self) -> Option<Value> {
        self.values.first().map(|(_, value)| *value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_lang_core::ast::Expression;

    #[test]
    fn test_bindings_keep_insertion_order() {
        let mut bindings = Bindings::new();
        bindings.bind("n".into(), Value::Integer(5));
        bindings.bind("acc".into(), Value::Integer(0));

        assert_eq!(bindings.first(), Some(Value::Integer(5)));
        assert_eq!(bindings.get("acc"), Some(Value::Integer(0)));
        assert_eq!(bindings.get("missing"), None);

        // Rebinding overwrites in place and keeps the position.
        bindings.bind("n".into(), Value::Integer(4));
        assert_eq!(bindings.first(), Some(Value::Integer(4)));
    }

    #[test]
    fn test_function_table_overwrites() {
        let mut table = FunctionTable::new();
        table.define(
            "Add".into(),
            Function {
                parameters: vec!["a".into(), "b".into()],
                body: Expression::IntegerLiteral(1),
            },
        );
        assert!(table.is_defined("Add"));
        assert!(!table.is_defined("Sub"));

        table.define(
            "Add".into(),
            Function {
                parameters: vec!["a".into()],
                body: Expression::IntegerLiteral(2),
            },
        );
        assert_eq!(table.get("Add").unwrap().parameters.len(), 1);
    }
}
