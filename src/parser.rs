//! Concrete syntax parser: turns Lispy source text into the parse tree
//! contract the reader expects (§6) — nodes with a dotted tag, literal
//! contents, and ordered children.
//!
//! This is the only place `nom` combinators touch the grammar directly.
//! The rest of the crate never looks at raw text again once a
//! [`ParseNode`] tree exists.

use nom::branch::alt;
use nom::bytes::complete::take_while1;
use nom::character::complete::{anychar, char, digit1, multispace0, none_of};
use nom::combinator::{map, opt, recognize};
use nom::multi::many0;
use nom::sequence::{delimited, preceded};
use nom::{IResult, Parser};

use crate::error::LispyError;

/// A node of the generic parse tree described in §6: a dotted tag string,
/// the raw matched text, and an ordered list of children. Delimiter
/// punctuation is retained as leaf children (tag `"char"`) so the reader's
/// skip-list logic (§4.3/§4.4) has something real to filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNode {
    pub tag: String,
    pub contents: String,
    pub children: Vec<ParseNode>,
}

impl ParseNode {
    fn leaf(tag: &str, contents: &str) -> Self {
        ParseNode {
            tag: tag.to_string(),
            contents: contents.to_string(),
            children: Vec::new(),
        }
    }

    fn branch(tag: &str, children: Vec<ParseNode>) -> Self {
        ParseNode {
            tag: tag.to_string(),
            contents: String::new(),
            children,
        }
    }
}

fn ws(input: &str) -> IResult<&str, &str> {
    multispace0(input)
}

fn parse_comment(input: &str) -> IResult<&str, ParseNode> {
    map(
        recognize(preceded(char(';'), many0(none_of("\n")))),
        |s: &str| ParseNode::leaf("comment", s),
    )
    .parse(input)
}

fn parse_number(input: &str) -> IResult<&str, ParseNode> {
    map(recognize(preceded(opt(char('-')), digit1)), |s: &str| {
        ParseNode::leaf("number", s)
    })
    .parse(input)
}

fn parse_string(input: &str) -> IResult<&str, ParseNode> {
    let string_body = many0(alt((
        recognize(preceded(char('\\'), anychar)),
        recognize(none_of("\"")),
    )));
    map(
        recognize(delimited(char('"'), string_body, char('"'))),
        |s: &str| ParseNode::leaf("string", s),
    )
    .parse(input)
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_+-*%/\\=<>!?&".contains(c)
}

fn parse_symbol(input: &str) -> IResult<&str, ParseNode> {
    map(take_while1(is_symbol_char), |s: &str| {
        ParseNode::leaf("symbol", s)
    })
    .parse(input)
}

fn parse_sexpr(input: &str) -> IResult<&str, ParseNode> {
    let (input, _) = preceded(ws, char('(')).parse(input)?;
    let (input, body) = many0(preceded(ws, parse_expr)).parse(input)?;
    let (input, _) = preceded(ws, char(')')).parse(input)?;
    let mut children = vec![ParseNode::leaf("char", "(")];
    children.extend(body);
    children.push(ParseNode::leaf("char", ")"));
    Ok((input, ParseNode::branch("sexpr", children)))
}

fn parse_qexpr(input: &str) -> IResult<&str, ParseNode> {
    let (input, _) = preceded(ws, char('{')).parse(input)?;
    let (input, body) = many0(preceded(ws, parse_expr)).parse(input)?;
    let (input, _) = preceded(ws, char('}')).parse(input)?;
    let mut children = vec![ParseNode::leaf("char", "{")];
    children.extend(body);
    children.push(ParseNode::leaf("char", "}"));
    Ok((input, ParseNode::branch("qexpr", children)))
}

fn parse_expr(input: &str) -> IResult<&str, ParseNode> {
    alt((
        parse_comment,
        parse_number,
        parse_string,
        parse_symbol,
        parse_sexpr,
        parse_qexpr,
    ))
    .parse(input)
}

/// Parses a whole program: zero or more top-level expressions, matching the
/// `program = expr*` rule of §6. Fails if trailing input isn't consumed.
pub fn parse_program(input: &str) -> Result<ParseNode, LispyError> {
    let (remaining, exprs) = many0(preceded(ws, parse_expr))
        .parse(input)
        .map_err(|e| LispyError::ParseFailure(e.to_string()))?;
    let (remaining, _) =
        ws(remaining).map_err(|e: nom::Err<nom::error::Error<&str>>| {
            LispyError::ParseFailure(e.to_string())
        })?;
    if !remaining.is_empty() {
        return Err(LispyError::ParseFailure(format!(
            "unexpected input at: {remaining:?}"
        )));
    }
    Ok(ParseNode::branch("program", exprs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_number() {
        let (rest, node) = parse_expr("42").unwrap();
        assert_eq!(rest, "");
        assert_eq!(node.tag, "number");
        assert_eq!(node.contents, "42");
    }

    #[test]
    fn parses_negative_number() {
        let (_, node) = parse_expr("-7").unwrap();
        assert_eq!(node.tag, "number");
        assert_eq!(node.contents, "-7");
    }

    #[test]
    fn parses_symbol() {
        let (_, node) = parse_expr("foo-bar?").unwrap();
        assert_eq!(node.tag, "symbol");
        assert_eq!(node.contents, "foo-bar?");
    }

    #[test]
    fn parses_string_with_escapes() {
        let (_, node) = parse_expr("\"a\\\"b\"").unwrap();
        assert_eq!(node.tag, "string");
        assert_eq!(node.contents, "\"a\\\"b\"");
    }

    #[test]
    fn parses_comment_to_end_of_line() {
        let (rest, node) = parse_expr("; a comment\n(+ 1 2)").unwrap();
        assert_eq!(node.tag, "comment");
        assert_eq!(node.contents, "; a comment");
        assert_eq!(rest, "\n(+ 1 2)");
    }

    #[test]
    fn parses_sexpr_with_delimiter_children() {
        let (_, node) = parse_expr("(+ 1 2)").unwrap();
        assert_eq!(node.tag, "sexpr");
        assert_eq!(node.children.first().unwrap().contents, "(");
        assert_eq!(node.children.last().unwrap().contents, ")");
        assert_eq!(node.children.len(), 5); // ( + 1 2 )
    }

    #[test]
    fn parses_nested_qexpr() {
        let (_, node) = parse_expr("{1 {2 3}}").unwrap();
        assert_eq!(node.tag, "qexpr");
        // '{' 1 '{2 3}' '}'
        assert_eq!(node.children.len(), 4);
    }

    #[test]
    fn parses_program_with_multiple_top_level_forms() {
        let program = parse_program("(+ 1 2) (def {x} 3)").unwrap();
        assert_eq!(program.tag, "program");
        assert_eq!(program.children.len(), 2);
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(parse_program("(+ 1 2) )").is_err());
    }
}
