//! The driver ties the parser, reader, and evaluator together into the two
//! end-to-end modes §4.9 describes: an interactive REPL and a one-shot
//! script load.

use crate::builtins;
use crate::env::Environment;
use crate::eval;
use crate::parser::parse_program;
use crate::reader::read;
use crate::value::Value;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// Builds a fresh root environment with every builtin already bound.
pub fn new_root_environment() -> Rc<RefCell<Environment>> {
    let mut root = Environment::new();
    builtins::populate_environment(&mut root);
    Rc::new(RefCell::new(root))
}

/// Loads and runs `path` to completion, printing nothing but error
/// diagnostics on `stderr`; returns `false` if the file itself could not be
/// read or parsed.
pub fn run_script(path: &str) -> bool {
    let env = new_root_environment();
    let src = match std::fs::read_to_string(path) {
        Ok(src) => src,
        Err(e) => {
            eprintln!("Error: could not read '{path}': {e}");
            return false;
        }
    };
    let tree = match parse_program(&src) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("Parse Error: {e}");
            return false;
        }
    };
    let Value::SExpr(exprs) = read(&tree) else {
        warn!("top-level program did not read as an SExpr");
        return false;
    };
    for expr in exprs {
        let result = eval::eval(Rc::clone(&env), expr);
        if let Value::Error(msg) = result {
            eprintln!("Error: {msg}");
        }
    }
    true
}

/// Runs the interactive read-eval-print loop until EOF or interrupt.
pub fn run_repl(prompt: &str) {
    println!("Lispy Version 0.1.0");
    println!("Press Ctrl+C or Ctrl+D to exit");

    let env = new_root_environment();
    let mut rl = DefaultEditor::new().expect("failed to initialize line editor");

    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                match parse_program(&line) {
                    Ok(tree) => {
                        let Value::SExpr(exprs) = read(&tree) else {
                            continue;
                        };
                        for expr in exprs {
                            debug!(?expr, "evaluating top-level form");
                            println!("=> {}", eval::eval(Rc::clone(&env), expr));
                        }
                    }
                    Err(e) => eprintln!("Parse Error: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted (Ctrl+C)");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("Bye!");
                break;
            }
            Err(e) => {
                eprintln!("Readline Error: {e:?}");
                break;
            }
        }
    }
}
