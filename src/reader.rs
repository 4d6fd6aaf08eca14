//! Reader: converts a [`ParseNode`] tree into a [`Value`] (§4.3/§4.4).
//!
//! Tag matching is substring-based, except for the top-level `program`
//! node, which is matched exactly and treated as an `SExpr` the same way
//! `root` would be.

use crate::error::LispyError;
use crate::parser::ParseNode;
use crate::value::Value;

fn is_delimiter_child(node: &ParseNode) -> bool {
    matches!(node.contents.as_str(), "(" | ")" | "{" | "}")
        || node.tag == "regex"
        || node.tag.contains("comment")
}

fn read_children(node: &ParseNode) -> Vec<Value> {
    node.children
        .iter()
        .filter(|c| !is_delimiter_child(c))
        .map(read)
        .collect()
}

fn read_number(text: &str) -> Value {
    match text.parse::<i64>() {
        Ok(n) => Value::Number(n),
        Err(_) => crate::error::err(LispyError::InvalidNumber),
    }
}

fn read_string(text: &str) -> Value {
    let inner = &text[1..text.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    Value::String(out)
}

/// Converts a parse-tree node into a Value, recursing into `sexpr`/`qexpr`
/// children while skipping delimiter punctuation and comments.
pub fn read(node: &ParseNode) -> Value {
    let tag = node.tag.as_str();
    if tag == "program" || tag == "root" {
        Value::SExpr(read_children(node))
    } else if tag.contains("number") {
        read_number(&node.contents)
    } else if tag.contains("string") {
        read_string(&node.contents)
    } else if tag.contains("symbol") {
        Value::Symbol(node.contents.clone())
    } else if tag.contains("sexpr") {
        Value::SExpr(read_children(node))
    } else if tag.contains("qexpr") {
        Value::QExpr(read_children(node))
    } else if tag.contains("comment") {
        Value::empty_sexpr()
    } else {
        Value::Error(format!("unrecognized parse node tag '{tag}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_program;

    fn read_one(src: &str) -> Value {
        let program = parse_program(src).unwrap();
        let Value::SExpr(mut top) = read(&program) else {
            panic!("program did not read as an SExpr");
        };
        assert_eq!(top.len(), 1);
        top.pop().unwrap()
    }

    #[test]
    fn reads_number() {
        assert_eq!(read_one("42"), Value::Number(42));
        assert_eq!(read_one("-7"), Value::Number(-7));
    }

    #[test]
    fn reads_string_with_escapes() {
        assert_eq!(
            read_one(r#""a\nb""#),
            Value::String("a\nb".to_string())
        );
    }

    #[test]
    fn reads_symbol() {
        assert_eq!(read_one("foo?"), Value::Symbol("foo?".to_string()));
    }

    #[test]
    fn reads_nested_sexpr() {
        let v = read_one("(+ 1 (* 2 3))");
        assert_eq!(
            v,
            Value::SExpr(vec![
                Value::Symbol("+".to_string()),
                Value::Number(1),
                Value::SExpr(vec![
                    Value::Symbol("*".to_string()),
                    Value::Number(2),
                    Value::Number(3),
                ]),
            ])
        );
    }

    #[test]
    fn reads_qexpr_distinctly_from_sexpr() {
        let v = read_one("{1 2 3}");
        assert_eq!(
            v,
            Value::QExpr(vec![Value::Number(1), Value::Number(2), Value::Number(3)])
        );
    }

    #[test]
    fn comments_are_discarded() {
        let program = parse_program("; a leading comment\n(+ 1 2)").unwrap();
        let Value::SExpr(top) = read(&program) else {
            panic!("expected SExpr");
        };
        assert_eq!(top.len(), 1);
    }
}
