//! Token definitions for tag markup
//!
//! The raw tokens are produced by logos over a fixed separator set: `<`, `>`, `/`, `=`, both
//! quote characters and whitespace. Everything between separators is one text token. The
//! [`TokenSource`](super::TokenSource) refines raw tokens into [`TokenKind`]s, folding quoted
//! values into a single token when quoting is enabled.
use logos::Logos;
use std::fmt;

/// Raw tokens recognised by the logos lexer
#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy)]
pub enum RawToken {
    #[token("<")]
    Open,
    #[token(">")]
    Close,
    #[token("/")]
    Slash,
    #[token("=")]
    Equals,
    #[token("\"")]
    DoubleQuote,
    #[token("'")]
    SingleQuote,

    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    // Text content (catch-all for non-separator characters)
    #[regex(r#"[^<>/="' \t\r\n\f]+"#)]
    Text,
}

/// Token kinds handed to the stream parser
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenKind {
    Open,
    Close,
    Slash,
    Equals,
    Whitespace,
    /// Any run of non-separator text, or a quote character while quoting is off
    Word,
    /// A complete quoted value, quotes included
    Quoted,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Open => "open",
            TokenKind::Close => "close",
            TokenKind::Slash => "slash",
            TokenKind::Equals => "equals",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Word => "word",
            TokenKind::Quoted => "quoted",
        };
        write!(f, "<{}>", name)
    }
}

/// One token with the slice of input it covers
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    /// Byte offset of the token in the input
    pub offset: usize,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, text: &'src str, offset: usize) -> Self {
        Token { kind, text, offset }
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }

    /// Byte range of the token in the input
    pub fn span(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.text.len()
    }
}
