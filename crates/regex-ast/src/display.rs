//! Pretty-printing, grounded on the original source's `print_node`.
//!
//! Kept as a `Display` impl rather than a free `print_*` function —
//! this also gives the round-trip property (`parse` then `to_string`
//! reproduces the pattern, up to redundant parens) something to compare
//! against in tests.

use std::fmt;

use crate::node::Node;

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Literal { text, .. } => write!(f, "{text}"),
            Node::Any => write!(f, "."),
            Node::Sequence(items) => {
                for item in items {
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Node::Alternate(a, b) => write!(f, "{a}|{b}"),
            Node::Repeat { child, bound } => {
                write!(f, "({child})")?;
                match bound.symbol() {
                    Some(sym) => write!(f, "{sym}"),
                    None => write!(f, "{{{},{:?}}}", bound.min, bound.max),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RepeatBound;

    #[test]
    fn display_literal() {
        let node = Node::Literal {
            offset: 0,
            text: "abc".into(),
        };
        assert_eq!(node.to_string(), "abc");
    }

    #[test]
    fn display_alternate() {
        let a = Node::Literal {
            offset: 0,
            text: "a".into(),
        };
        let b = Node::Literal {
            offset: 2,
            text: "b".into(),
        };
        let node = Node::Alternate(Box::new(a), Box::new(b));
        assert_eq!(node.to_string(), "a|b");
    }

    #[test]
    fn display_repeat_star() {
        let node = Node::Repeat {
            child: Box::new(Node::Any),
            bound: RepeatBound::STAR,
        };
        assert_eq!(node.to_string(), "(.)*");
    }
}
