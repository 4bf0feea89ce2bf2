mod repl;
mod runner;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Source file to execute; starts the interactive prompt when absent.
    path: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    match cli.path {
        None => repl::start().unwrap(),
        Some(path) => {
            if path.extension().map_or(true, |extension| extension != "lambda") {
                eprintln!("Error: the file must have a .lambda suffix");
                std::process::exit(1);
            }
            let source = std::fs::read_to_string(path).unwrap();
            runner::execute(&source);
        }
    }
}
