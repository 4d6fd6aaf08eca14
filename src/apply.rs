//! The Applier: binds arguments to a function's formals, including
//! variadic `&` binding and automatic currying via partial application.

use crate::builtins;
use crate::env::Environment;
use crate::error::{LispyError, err};
use crate::eval;
use crate::value::{Function, Value};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Applies `f` to already-evaluated `args` in caller environment `caller_env`.
pub fn apply(f: Function, args: Vec<Value>, caller_env: Rc<RefCell<Environment>>) -> Value {
    match f {
        Function::Builtin { op, .. } => builtins::dispatch(op, caller_env, args),
        Function::Lambda { formals, body, env } => {
            apply_lambda(formals, body, env, args, caller_env)
        }
    }
}

fn apply_lambda(
    formals: Box<Value>,
    body: Box<Value>,
    env: Rc<RefCell<Environment>>,
    args: Vec<Value>,
    caller_env: Rc<RefCell<Environment>>,
) -> Value {
    let formals = match *formals {
        Value::QExpr(items) => items,
        other => return Value::Error(format!("internal error: formals not a Q-Expression, got {other}")),
    };
    let total = formals.len();
    let given = args.len();
    let mut formals: VecDeque<Value> = formals.into();
    let mut args: VecDeque<Value> = args.into();

    while !args.is_empty() {
        if formals.is_empty() {
            return err(LispyError::TooManyArguments {
                got: given,
                expected: total,
            });
        }
        let formal = formals.pop_front().unwrap();
        let name = match formal {
            Value::Symbol(s) => s,
            other => {
                return Value::Error(format!("internal error: formal not a symbol, got {other}"));
            }
        };

        if name == "&" {
            let rest_name = match (formals.pop_front(), formals.is_empty()) {
                (Some(Value::Symbol(s)), true) => s,
                _ => return err(LispyError::BadVariadicFormals),
            };
            let rest: Vec<Value> = args.into_iter().collect();
            env.borrow_mut().put(rest_name, Value::QExpr(rest));
            args = VecDeque::new();
            break;
        }

        let value = args.pop_front().unwrap();
        env.borrow_mut().put(name, value);
    }

    // A trailing `&` with zero supplied arguments still binds its symbol,
    // to an empty Q-Expression.
    if matches!(formals.front(), Some(Value::Symbol(s)) if s == "&") {
        formals.pop_front();
        let rest_name = match (formals.pop_front(), formals.is_empty()) {
            (Some(Value::Symbol(s)), true) => s,
            _ => return err(LispyError::BadVariadicFormals),
        };
        env.borrow_mut().put(rest_name, Value::QExpr(Vec::new()));
    }

    if formals.is_empty() {
        env.borrow_mut().set_parent(caller_env);
        let body_as_sexpr = match *body {
            Value::QExpr(items) => Value::SExpr(items),
            other => other,
        };
        eval::eval(env, body_as_sexpr)
    } else {
        // Fewer arguments than formals: curry. The environment holding the
        // bindings made so far was already an independent copy (every
        // lookup through `Environment::get` deep-copies), so returning it
        // as-is already satisfies "return a fresh value" without an extra
        // redundant clone.
        Value::Function(Function::Lambda {
            formals: Box::new(Value::QExpr(formals.into())),
            body,
            env,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::populate_environment;
    use crate::parser::parse_program;
    use crate::reader::read;

    fn run(src: &str) -> Value {
        let mut root = Environment::new();
        populate_environment(&mut root);
        let root = Rc::new(RefCell::new(root));
        let program = parse_program(src).unwrap();
        let Value::SExpr(exprs) = read(&program) else {
            panic!("expected program to read as SExpr");
        };
        let mut result = Value::empty_sexpr();
        for expr in exprs {
            result = eval::eval(Rc::clone(&root), expr);
        }
        result
    }

    #[test]
    fn full_application_evaluates_body() {
        assert_eq!(run("((-> {x y} {+ x y}) 3 4)"), Value::Number(7));
    }

    #[test]
    fn partial_application_curries() {
        assert_eq!(
            run("(= {g} ((-> {x y} {+ x y}) 10)) (g 5)"),
            Value::Number(15)
        );
    }

    #[test]
    fn variadic_binds_remaining_args_as_qexpr() {
        assert_eq!(
            run("((-> {x & xs} {xs}) 1 2 3)"),
            Value::QExpr(vec![Value::Number(2), Value::Number(3)])
        );
    }

    #[test]
    fn variadic_with_no_trailing_args_binds_empty_qexpr() {
        assert_eq!(run("((-> {x & xs} {xs}) 1)"), Value::QExpr(vec![]));
    }

    #[test]
    fn too_many_arguments_is_an_error() {
        let result = run("((-> {x} {x}) 1 2)");
        assert!(matches!(result, Value::Error(_)));
    }

    #[test]
    fn original_lambda_is_unaffected_by_partial_application() {
        assert_eq!(
            run("(def {f} (-> {x y} {+ x y})) (= {g} (f 1)) (f 10 20)"),
            Value::Number(30)
        );
    }
}
