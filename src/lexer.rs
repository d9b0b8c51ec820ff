//! Lexer module for tag markup
//!
//! Tokenization is done by a logos lexer over a fixed separator set. The [`TokenSource`] on top
//! of it adds the two things the stream parser needs from its input: quoted values recognised
//! only while inside a tag, and a one-token lookahead that can be committed or rolled back.

pub mod token_source;
pub mod tokens;

pub use token_source::{Lookahead, TokenSource};
pub use tokens::{RawToken, Token, TokenKind};

use crate::error::TokenError;

/// Token prefixes after `<` that leave quoting off: CDATA sections and comments
const UNQUOTED_TAGS: [&str; 2] = ["![CDATA[", "!--"];

/// Collect all tokens of `source`, toggling quoting at tag boundaries the way the parser does
///
/// Quoting is switched on after `<` unless the next token opens a CDATA section or a comment.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, TokenError> {
    let mut tokens = Vec::new();
    let mut source = TokenSource::new(source);
    while let Some(token) = source.next_token()? {
        match token.kind {
            TokenKind::Open => {
                let quoted_tag = !source.peek()?.token().is_some_and(|next| {
                    next.kind == TokenKind::Word
                        && UNQUOTED_TAGS.iter().any(|prefix| next.text.starts_with(prefix))
                });
                source.set_quoting(quoted_tag);
            }
            TokenKind::Close => source.set_quoting(false),
            _ => {}
        }
        tokens.push(token);
    }
    Ok(tokens)
}

/// Render the token stream one token per line as `<kind> "text"`
pub fn dump_tokens(source: &str) -> Result<String, TokenError> {
    let lines: Vec<String> = tokenize(source)?
        .iter()
        .map(|token| format!("{} {:?}", token.kind, token.text))
        .collect();
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_tag_with_attribute() {
        let kinds: Vec<TokenKind> = tokenize("<b k='v'>X</b>")
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Open,
                TokenKind::Word,
                TokenKind::Whitespace,
                TokenKind::Word,
                TokenKind::Equals,
                TokenKind::Quoted,
                TokenKind::Close,
                TokenKind::Word,
                TokenKind::Open,
                TokenKind::Slash,
                TokenKind::Word,
                TokenKind::Close,
            ]
        );
    }

    #[test]
    fn test_apostrophe_in_text_is_not_a_quote() {
        let tokens = tokenize("<p>it's</p>").unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["<", "p", ">", "it", "'", "s", "<", "/", "p", ">"]);
    }

    #[test]
    fn test_dump_tokens() {
        assert_eq!(
            dump_tokens("<a>x").unwrap(),
            "<open> \"<\"\n<word> \"a\"\n<close> \">\"\n<word> \"x\""
        );
    }

    #[test]
    fn test_apostrophe_in_cdata_and_comment_is_not_a_quote() {
        let dump = dump_tokens("<![CDATA[it's]]>").unwrap();
        assert!(dump.contains("<word> \"'\""), "{}", dump);
        assert!(!dump.contains("<quoted>"), "{}", dump);

        let tokens = tokenize("<!-- it's --><a k='v'>").unwrap();
        let quoted: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Quoted)
            .map(|t| t.text)
            .collect();
        assert_eq!(quoted, vec!["'v'"]);
    }
}
