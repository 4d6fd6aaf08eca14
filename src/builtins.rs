//! The closed set of primitive operations a Builtin Function dispatches
//! through. Each op is identified by [`BuiltinOp`] rather than a bare
//! function pointer so that two builtins compare equal iff their op-id
//! does (§4.6).

use crate::env::Environment;
use crate::error::{LispyError, err};
use crate::eval;
use crate::value::{BuiltinOp, Function, Value};
use lazy_static::lazy_static;
use std::cell::RefCell;
use std::rc::Rc;

macro_rules! check_arity_exact {
    ($name:expr, $args:expr, $expected:expr) => {
        if $args.len() != $expected {
            return err(LispyError::ArityMismatch {
                name: $name.to_string(),
                got: $args.len(),
                expected: $expected.to_string(),
            });
        }
    };
}

macro_rules! check_arity_min {
    ($name:expr, $args:expr, $min:expr) => {
        if $args.len() < $min {
            return err(LispyError::ArityMismatch {
                name: $name.to_string(),
                got: $args.len(),
                expected: format!("at least {}", $min),
            });
        }
    };
}

fn type_mismatch(name: &str, index: usize, found: &Value, expected: &str) -> Value {
    err(LispyError::TypeMismatch {
        name: name.to_string(),
        index,
        found: found.type_name().to_string(),
        expected: expected.to_string(),
    })
}

fn require_nonempty_qexpr(v: Value, name: &str, index: usize) -> Result<Vec<Value>, Value> {
    match v {
        Value::QExpr(items) if items.is_empty() => {
            Err(err(LispyError::EmptyArgument {
                name: name.to_string(),
                index,
            }))
        }
        Value::QExpr(items) => Ok(items),
        other => Err(type_mismatch(name, index, &other, "qexpr")),
    }
}

fn numbers(name: &str, args: &[Value]) -> Result<Vec<i64>, Value> {
    let mut out = Vec::with_capacity(args.len());
    for (i, a) in args.iter().enumerate() {
        match a {
            Value::Number(n) => out.push(*n),
            other => return Err(type_mismatch(name, i + 1, other, "number")),
        }
    }
    Ok(out)
}

// --- Q-Expression / list operations ---

fn list(_env: Rc<RefCell<Environment>>, args: Vec<Value>) -> Value {
    Value::QExpr(args)
}

fn head(_env: Rc<RefCell<Environment>>, mut args: Vec<Value>) -> Value {
    check_arity_exact!("head", args, 1);
    let items = match require_nonempty_qexpr(args.remove(0), "head", 1) {
        Ok(items) => items,
        Err(e) => return e,
    };
    let first = Value::seq_take(items, 0);
    Value::QExpr(vec![first])
}

fn tail(_env: Rc<RefCell<Environment>>, mut args: Vec<Value>) -> Value {
    check_arity_exact!("tail", args, 1);
    let mut items = match require_nonempty_qexpr(args.remove(0), "tail", 1) {
        Ok(items) => items,
        Err(e) => return e,
    };
    Value::seq_pop(&mut items, 0);
    Value::QExpr(items)
}

fn join(_env: Rc<RefCell<Environment>>, args: Vec<Value>) -> Value {
    check_arity_min!("join", args, 1);
    let mut result = Vec::new();
    for (i, a) in args.into_iter().enumerate() {
        match a {
            Value::QExpr(items) => Value::seq_join(&mut result, items),
            other => return type_mismatch("join", i + 1, &other, "qexpr"),
        }
    }
    Value::QExpr(result)
}

fn cons(_env: Rc<RefCell<Environment>>, mut args: Vec<Value>) -> Value {
    check_arity_exact!("cons", args, 2);
    if !matches!(args[1], Value::QExpr(_)) {
        return type_mismatch("cons", 2, &args[1], "qexpr");
    }
    let Value::QExpr(mut items) = args.remove(1) else {
        unreachable!()
    };
    let head = args.remove(0);
    items.insert(0, head);
    Value::QExpr(items)
}

fn len(_env: Rc<RefCell<Environment>>, args: Vec<Value>) -> Value {
    check_arity_exact!("len", args, 1);
    match &args[0] {
        Value::QExpr(items) => Value::Number(items.len() as i64),
        other => type_mismatch("len", 1, other, "qexpr"),
    }
}

fn eval_builtin(env: Rc<RefCell<Environment>>, mut args: Vec<Value>) -> Value {
    check_arity_exact!("eval", args, 1);
    match args.remove(0) {
        Value::QExpr(items) => eval::eval(env, Value::SExpr(items)),
        other => type_mismatch("eval", 1, &other, "qexpr"),
    }
}

// --- Arithmetic ---

fn fold_numeric(
    name: &str,
    args: Vec<Value>,
    op: impl Fn(i64, i64) -> Result<i64, Value>,
    negate_unary: bool,
) -> Value {
    check_arity_min!(name, args, 1);
    let ns = match numbers(name, &args) {
        Ok(ns) => ns,
        Err(e) => return e,
    };
    let mut iter = ns.into_iter();
    let mut acc = iter.next().unwrap();
    let mut folded_any = false;
    for n in iter {
        folded_any = true;
        match op(acc, n) {
            Ok(v) => acc = v,
            Err(e) => return e,
        }
    }
    if !folded_any && negate_unary {
        acc = -acc;
    }
    Value::Number(acc)
}

fn add(_env: Rc<RefCell<Environment>>, args: Vec<Value>) -> Value {
    fold_numeric("+", args, |a, b| Ok(a + b), false)
}

fn sub(_env: Rc<RefCell<Environment>>, args: Vec<Value>) -> Value {
    fold_numeric("-", args, |a, b| Ok(a - b), true)
}

fn mul(_env: Rc<RefCell<Environment>>, args: Vec<Value>) -> Value {
    fold_numeric("*", args, |a, b| Ok(a * b), false)
}

fn div(_env: Rc<RefCell<Environment>>, args: Vec<Value>) -> Value {
    fold_numeric(
        "/",
        args,
        |a, b| {
            if b == 0 {
                Err(err(LispyError::DivisionByZero))
            } else {
                Ok(a / b)
            }
        },
        false,
    )
}

fn modulo(_env: Rc<RefCell<Environment>>, args: Vec<Value>) -> Value {
    fold_numeric(
        "%",
        args,
        |a, b| {
            if b == 0 {
                Err(err(LispyError::DivisionByZero))
            } else {
                Ok(a % b)
            }
        },
        false,
    )
}

// --- Equality / ordering ---

fn eq(_env: Rc<RefCell<Environment>>, mut args: Vec<Value>) -> Value {
    check_arity_exact!("==", args, 2);
    let b = args.remove(1);
    let a = args.remove(0);
    Value::Number(if a == b { 1 } else { 0 })
}

fn neq(_env: Rc<RefCell<Environment>>, mut args: Vec<Value>) -> Value {
    check_arity_exact!("!=", args, 2);
    let b = args.remove(1);
    let a = args.remove(0);
    Value::Number(if a != b { 1 } else { 0 })
}

fn compare(name: &str, args: Vec<Value>, op: impl Fn(i64, i64) -> bool) -> Value {
    check_arity_exact!(name, args, 2);
    let ns = match numbers(name, &args) {
        Ok(ns) => ns,
        Err(e) => return e,
    };
    Value::Number(if op(ns[0], ns[1]) { 1 } else { 0 })
}

fn lt(_env: Rc<RefCell<Environment>>, args: Vec<Value>) -> Value {
    compare("<", args, |a, b| a < b)
}

fn lte(_env: Rc<RefCell<Environment>>, args: Vec<Value>) -> Value {
    compare("<=", args, |a, b| a <= b)
}

fn gt(_env: Rc<RefCell<Environment>>, args: Vec<Value>) -> Value {
    compare(">", args, |a, b| a > b)
}

fn gte(_env: Rc<RefCell<Environment>>, args: Vec<Value>) -> Value {
    compare(">=", args, |a, b| a >= b)
}

// --- Control / binding ---

fn if_builtin(env: Rc<RefCell<Environment>>, mut args: Vec<Value>) -> Value {
    check_arity_exact!("if", args, 3);
    let cond = match &args[0] {
        Value::Number(n) => *n,
        other => return type_mismatch("if", 1, other, "number"),
    };
    if !matches!(args[1], Value::QExpr(_)) {
        return type_mismatch("if", 2, &args[1], "qexpr");
    }
    if !matches!(args[2], Value::QExpr(_)) {
        return type_mismatch("if", 3, &args[2], "qexpr");
    }
    let else_branch = args.remove(2);
    let then_branch = args.remove(1);
    let chosen = if cond != 0 { then_branch } else { else_branch };
    let Value::QExpr(items) = chosen else {
        unreachable!()
    };
    eval::eval(env, Value::SExpr(items))
}

fn bind_symbols(
    name: &str,
    mut args: Vec<Value>,
    write: impl Fn(String, Value),
) -> Value {
    check_arity_min!(name, args, 2);
    let symbols = match args.remove(0) {
        Value::QExpr(items) => items,
        other => return type_mismatch(name, 1, &other, "qexpr of symbols"),
    };
    if symbols.len() != args.len() {
        return err(LispyError::ArityMismatch {
            name: name.to_string(),
            got: args.len(),
            expected: symbols.len().to_string(),
        });
    }
    let mut names = Vec::with_capacity(symbols.len());
    for s in symbols {
        match s {
            Value::Symbol(sym) => names.push(sym),
            other => return type_mismatch(name, 1, &other, "symbol"),
        }
    }
    for (sym, value) in names.into_iter().zip(args) {
        write(sym, value);
    }
    Value::empty_sexpr()
}

fn def(env: Rc<RefCell<Environment>>, args: Vec<Value>) -> Value {
    bind_symbols("def", args, |sym, value| env.borrow_mut().def(sym, value))
}

fn put(env: Rc<RefCell<Environment>>, args: Vec<Value>) -> Value {
    bind_symbols("=", args, |sym, value| env.borrow_mut().put(sym, value))
}

fn lambda(_env: Rc<RefCell<Environment>>, mut args: Vec<Value>) -> Value {
    check_arity_exact!("->", args, 2);
    if let Value::QExpr(items) = &args[0] {
        for item in items {
            if !matches!(item, Value::Symbol(_)) {
                return type_mismatch("->", 1, item, "symbol");
            }
        }
    } else {
        return type_mismatch("->", 1, &args[0], "qexpr");
    }
    if !matches!(args[1], Value::QExpr(_)) {
        return type_mismatch("->", 2, &args[1], "qexpr");
    }
    let body = args.remove(1);
    let formals = args.remove(0);
    Value::Function(Function::Lambda {
        formals: Box::new(formals),
        body: Box::new(body),
        env: Rc::new(RefCell::new(Environment::new())),
    })
}

// --- I/O ---

fn print(_env: Rc<RefCell<Environment>>, args: Vec<Value>) -> Value {
    let mut line = String::new();
    for a in &args {
        line.push_str(&a.to_string());
        line.push(' ');
    }
    println!("{line}");
    Value::empty_sexpr()
}

fn error_builtin(_env: Rc<RefCell<Environment>>, mut args: Vec<Value>) -> Value {
    check_arity_exact!("error", args, 1);
    match args.remove(0) {
        Value::String(s) => err(LispyError::UserError(s)),
        other => type_mismatch("error", 1, &other, "string"),
    }
}

fn type_builtin(_env: Rc<RefCell<Environment>>, mut args: Vec<Value>) -> Value {
    check_arity_exact!("type", args, 1);
    Value::String(args.remove(0).type_name().to_string())
}

fn load(env: Rc<RefCell<Environment>>, mut args: Vec<Value>) -> Value {
    check_arity_exact!("load", args, 1);
    let path = match args.remove(0) {
        Value::String(s) => s,
        other => return type_mismatch("load", 1, &other, "string"),
    };
    let src = match std::fs::read_to_string(&path) {
        Ok(src) => src,
        Err(e) => return err(LispyError::LoadFailure(e.to_string())),
    };
    let tree = match crate::parser::parse_program(&src) {
        Ok(tree) => tree,
        Err(e) => return err(LispyError::LoadFailure(e.to_string())),
    };
    if let Value::SExpr(exprs) = crate::reader::read(&tree) {
        for expr in exprs {
            let result = eval::eval(Rc::clone(&env), expr);
            if let Value::Error(msg) = result {
                eprintln!("Error: {msg}");
            }
        }
    }
    Value::empty_sexpr()
}

/// Dispatches a Builtin's op-id to its implementation, logging whenever a
/// builtin produces an `Error` value (§4.11 — diagnostic only, never
/// changes the result).
pub fn dispatch(op: BuiltinOp, env: Rc<RefCell<Environment>>, args: Vec<Value>) -> Value {
    let result = match op {
        BuiltinOp::List => list(env, args),
        BuiltinOp::Head => head(env, args),
        BuiltinOp::Tail => tail(env, args),
        BuiltinOp::Join => join(env, args),
        BuiltinOp::Cons => cons(env, args),
        BuiltinOp::Len => len(env, args),
        BuiltinOp::Eval => eval_builtin(env, args),
        BuiltinOp::Add => add(env, args),
        BuiltinOp::Sub => sub(env, args),
        BuiltinOp::Mul => mul(env, args),
        BuiltinOp::Div => div(env, args),
        BuiltinOp::Mod => modulo(env, args),
        BuiltinOp::Eq => eq(env, args),
        BuiltinOp::Neq => neq(env, args),
        BuiltinOp::Lt => lt(env, args),
        BuiltinOp::Lte => lte(env, args),
        BuiltinOp::Gt => gt(env, args),
        BuiltinOp::Gte => gte(env, args),
        BuiltinOp::If => if_builtin(env, args),
        BuiltinOp::Def => def(env, args),
        BuiltinOp::Put => put(env, args),
        BuiltinOp::Lambda => lambda(env, args),
        BuiltinOp::Print => print(env, args),
        BuiltinOp::Error => error_builtin(env, args),
        BuiltinOp::Type => type_builtin(env, args),
        BuiltinOp::Load => load(env, args),
    };
    if let Value::Error(msg) = &result {
        tracing::debug!(?op, %msg, "builtin produced an error");
    }
    result
}

lazy_static! {
    /// Name ↔ op-id registration table, built once. This is the literal
    /// realization of the "function pointers become a tagged op-id enum
    /// dispatched in one place" design note.
    static ref BUILTIN_TABLE: Vec<(&'static str, BuiltinOp)> = vec![
        ("list", BuiltinOp::List),
        ("head", BuiltinOp::Head),
        ("tail", BuiltinOp::Tail),
        ("join", BuiltinOp::Join),
        ("cons", BuiltinOp::Cons),
        ("len", BuiltinOp::Len),
        ("eval", BuiltinOp::Eval),
        ("+", BuiltinOp::Add),
        ("-", BuiltinOp::Sub),
        ("*", BuiltinOp::Mul),
        ("/", BuiltinOp::Div),
        ("%", BuiltinOp::Mod),
        ("==", BuiltinOp::Eq),
        ("!=", BuiltinOp::Neq),
        ("<", BuiltinOp::Lt),
        ("<=", BuiltinOp::Lte),
        (">", BuiltinOp::Gt),
        (">=", BuiltinOp::Gte),
        ("if", BuiltinOp::If),
        ("def", BuiltinOp::Def),
        ("=", BuiltinOp::Put),
        ("->", BuiltinOp::Lambda),
        ("print", BuiltinOp::Print),
        ("error", BuiltinOp::Error),
        ("type", BuiltinOp::Type),
        ("load", BuiltinOp::Load),
    ];
}

/// Populates `env` with every builtin, keyed by name.
pub fn populate_environment(env: &mut Environment) {
    for (name, op) in BUILTIN_TABLE.iter() {
        env.put(
            (*name).to_string(),
            Value::Function(Function::Builtin {
                name: (*name).to_string(),
                op: *op,
            }),
        );
    }
}
