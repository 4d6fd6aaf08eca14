//! The evaluator: reduces Values to Values in an Environment.
//!
//! No tail-call optimization is performed (a spec non-goal); every nested
//! call is an ordinary recursive Rust call, so pathologically deep Lispy
//! recursion exhausts the Rust stack rather than running forever.

use crate::apply;
use crate::env::Environment;
use crate::error::{LispyError, err};
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

/// `eval(env, v)`: symbols resolve against `env`, S-expressions reduce via
/// [`eval_sexpr`], and every other variant evaluates to itself.
pub fn eval(env: Rc<RefCell<Environment>>, v: Value) -> Value {
    match v {
        Value::Symbol(s) => {
            let result = env.borrow().get(&s);
            trace!(symbol = %s, %result, "resolved symbol");
            result
        }
        Value::SExpr(items) => eval_sexpr(env, items),
        other => other,
    }
}

fn eval_sexpr(env: Rc<RefCell<Environment>>, items: Vec<Value>) -> Value {
    // Step 1: evaluate every child in place, left to right.
    let mut evaluated: Vec<Value> = items
        .into_iter()
        .map(|item| eval(Rc::clone(&env), item))
        .collect();

    // Step 2: the first Error encountered (left to right) short-circuits
    // the whole S-expression; everything else evaluated is dropped.
    if let Some(pos) = evaluated.iter().position(Value::is_error) {
        return evaluated.swap_remove(pos);
    }

    // Step 3/4: zero children is the unit value; exactly one unwraps.
    if evaluated.is_empty() {
        return Value::empty_sexpr();
    }
    if evaluated.len() == 1 {
        return evaluated.pop().unwrap();
    }

    // Step 5: the first child must be a function, applied to the rest.
    let mut rest = evaluated;
    let head = rest.remove(0);
    match head {
        Value::Function(f) => apply::apply(f, rest, env),
        other => err(LispyError::NotAFunction {
            found: other.type_name().to_string(),
        }),
    }
}
