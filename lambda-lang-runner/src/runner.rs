use lambda_lang_core::lexer::Tokenizer;
use lambda_lang_core::parser::Parser;
use lambda_lang_interpreter::evaluator::Interpreter;
use lambda_lang_interpreter::value::{StatementResult, Value};

// Executes a whole source file as one input unit against a fresh
// interpreter.
pub fn execute(source: &str) {
    let mut interpreter = Interpreter::new();
    let tokenizer = Tokenizer::new(source);
    let program = match Parser::new(tokenizer, interpreter.functions()).parse_program() {
        Ok(program) => program,
        Err(err) => {
            println!("Syntax error: {err}");
            return;
        }
    };

    let outcome = interpreter.interpret(&program);
    for step in interpreter.take_steps() {
        println!("{step}");
    }
    match outcome {
        Ok(results) => {
            for result in results {
                if let StatementResult::Value(Value::Absent) = result {
                    continue;
                }
                println!("{result}");
            }
        }
        Err(err) => println!("{err}"),
    }
}
