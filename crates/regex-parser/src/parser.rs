//! Recursive-descent parser.
//!
//! ```text
//! regex      := sequence ('|' regex)?
//! sequence   := atom*
//! atom       := primary quantifier?
//! primary    := '(' regex ')' | letter | digit | '.'
//! quantifier := '?' | '*' | '+'
//! ```
//!
//! Every byte that isn't a recognized metacharacter (`(`, `)`, `|`, `?`,
//! `*`, `+`, `.`) is treated as a one-byte literal to match verbatim —
//! see the crate-level docs for why this implementation picked that
//! reading over silently dropping such bytes.
//!
//! A single pass over the pattern collects atoms into a growing list; a
//! trailing quantifier mutates the most recently appended atom in place
//! rather than being a separate node, mirroring how the original parser
//! rewrites its current list node into a repeat node when it sees `?`,
//! `*`, or `+`.

use regex_ast::{Node, RepeatBound};

use crate::error::ParseError;

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(pattern: &'a str) -> Self {
        Self {
            bytes: pattern.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }
}

/// Parse a pattern string into an (unnormalized) AST.
///
/// Callers almost always want [`regex_ast::eliminate_single_sequences`]
/// and [`regex_ast::compress_literals`] run over the result before
/// handing it to a compiler; this function only implements the grammar.
pub fn parse(pattern: &str) -> Result<Node, ParseError> {
    let mut cursor = Cursor::new(pattern);
    let node = parse_regex(&mut cursor)?;
    if let Some(byte) = cursor.peek() {
        // Only ')' can legally still be here, and only if some enclosing
        // call consumes it — reaching the top level with one left over
        // means it was never opened.
        if byte == b')' {
            return Err(ParseError::UnterminatedGroup { offset: cursor.pos });
        }
    }
    log::debug!("parsed pattern {pattern:?} into {node}");
    Ok(node)
}

fn parse_regex(cursor: &mut Cursor<'_>) -> Result<Node, ParseError> {
    let seq = parse_sequence(cursor)?;

    if cursor.peek() == Some(b'|') {
        cursor.advance();
        let rhs = parse_regex(cursor)?;
        return Ok(Node::Alternate(Box::new(seq), Box::new(rhs)));
    }

    Ok(seq)
}

fn parse_sequence(cursor: &mut Cursor<'_>) -> Result<Node, ParseError> {
    let mut items: Vec<Node> = Vec::new();

    loop {
        let Some(byte) = cursor.peek() else { break };
        if byte == b'|' || byte == b')' {
            break;
        }

        let offset = cursor.pos;
        cursor.advance();

        match byte {
            b'(' => {
                let inner = parse_regex(cursor)?;
                match cursor.peek() {
                    Some(b')') => {
                        cursor.advance();
                    }
                    _ => return Err(ParseError::UnterminatedGroup { offset }),
                }
                items.push(inner);
            }
            b'.' => items.push(Node::Any),
            b'?' | b'*' | b'+' => {
                let quantifier = byte as char;
                let bound = match quantifier {
                    '?' => RepeatBound::QUESTION,
                    '*' => RepeatBound::STAR,
                    '+' => RepeatBound::PLUS,
                    _ => unreachable!(),
                };
                let Some(last) = items.pop() else {
                    return Err(ParseError::StrayQuantifier { offset, quantifier });
                };
                if matches!(last, Node::Repeat { .. }) {
                    return Err(ParseError::StrayQuantifier { offset, quantifier });
                }
                items.push(Node::Repeat {
                    child: Box::new(last),
                    bound,
                });
            }
            other => {
                // Any other byte, including letters, digits, and
                // anything outside the documented alphabet, is a
                // one-byte literal.
                let text = (other as char).to_string();
                items.push(Node::Literal { offset, text });
            }
        }
    }

    Ok(Node::Sequence(items))
}
