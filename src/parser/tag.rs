//! Tag name and attribute extraction from the tokens buffered between `<` and `>`

use std::iter::Peekable;
use std::slice::Iter;

use crate::context::NodeAttribute;
use crate::lexer::{Token, TokenKind};

/// Name and attributes of one tag, in document order
#[derive(Debug, Clone, PartialEq)]
pub struct Tag<'src> {
    pub name: &'src str,
    pub attributes: Vec<NodeAttribute>,
}

impl<'src> Tag<'src> {
    /// Split the buffered tag tokens (whitespace already dropped) into name and attributes.
    ///
    /// Attributes alternate name, `=`, value; quoted values lose their quotes. A name with no
    /// `=` after it is a valueless attribute, and `k=` with nothing after it has an empty
    /// value. Returns `None` for an empty buffer.
    pub fn from_tokens(tokens: &[Token<'src>]) -> Option<Self> {
        let (first, rest) = tokens.split_first()?;
        let mut rest = rest.iter().peekable();
        let mut attributes = Vec::new();
        while let Some(attribute) = next_attribute(&mut rest) {
            attributes.push(attribute);
        }
        Some(Tag {
            name: unquote(first),
            attributes,
        })
    }
}

fn next_attribute(tokens: &mut Peekable<Iter<'_, Token<'_>>>) -> Option<NodeAttribute> {
    // skip any stray `=`
    let name = loop {
        let token = tokens.next()?;
        if token.kind != TokenKind::Equals {
            break unquote(token);
        }
    };

    if tokens.next_if(|t| t.kind == TokenKind::Equals).is_none() {
        return Some(NodeAttribute::valueless(name));
    }
    let value = tokens
        .next_if(|t| t.kind != TokenKind::Equals)
        .map(unquote)
        .unwrap_or("");
    Some(NodeAttribute::valued(name, value))
}

fn unquote<'src>(token: &Token<'src>) -> &'src str {
    match token.kind {
        TokenKind::Quoted => token
            .text
            .get(1..token.text.len().saturating_sub(1))
            .unwrap_or(""),
        _ => token.text,
    }
}
