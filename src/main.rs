//! Run a BASIC program from a source file.

use qbasic::lang::{lex, parse};
use qbasic::mach::{Console, Runtime};
use std::process;

fn main() {
    let mut args = std::env::args().skip(1);
    let path = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("usage: qbasic <program.bas>");
            process::exit(2);
        }
    };
    let source = match std::fs::read_to_string(&path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("{}: {}", path, error);
            process::exit(1);
        }
    };
    let program = match parse(&lex(&source)) {
        Ok(program) => program,
        Err(errors) => {
            for error in errors {
                eprintln!("?{}", error);
            }
            process::exit(1);
        }
    };
    let mut runtime = Runtime::new(program, Box::new(Console::new()));
    if let Err(error) = runtime.run() {
        eprintln!("?{}", error);
        process::exit(1);
    }
}
