use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use lambda_lang_core::lexer::Tokenizer;
use lambda_lang_core::parser::Parser;
use lambda_lang_interpreter::evaluator::Interpreter;
use lambda_lang_interpreter::value::{StatementResult, Value};

const PROMPT: &str = ">>> ";

pub fn start() -> rustyline::Result<()> {
    let mut rl = DefaultEditor::new()?;
    let mut interpreter = Interpreter::new();

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                rl.add_history_entry(&line)?;
                run_line(&line, &mut interpreter);
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}

fn run_line(line: &str, interpreter: &mut Interpreter) {
    let tokenizer = Tokenizer::new(line);
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
