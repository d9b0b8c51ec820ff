//! Forward-only token source with a quoting toggle and one-token lookahead
//!
//! Quoting is switched on by the parser only while it is inside a tag, so `<` and `>` inside a
//! quoted attribute value stay literal. Lookahead is a micro-transaction: [`TokenSource::peek`]
//! reads at most one token ahead and the returned [`Lookahead`] either commits it (the token is
//! consumed) or rolls it back (the next call to [`TokenSource::next_token`] returns it again).

use logos::Logos;

use super::tokens::{RawToken, Token, TokenKind};
use crate::error::TokenError;

pub struct TokenSource<'src> {
    lexer: logos::Lexer<'src, RawToken>,
    quoting: bool,
    lookahead: Option<Token<'src>>,
}

impl<'src> TokenSource<'src> {
    pub fn new(source: &'src str) -> Self {
        TokenSource {
            lexer: RawToken::lexer(source),
            quoting: false,
            lookahead: None,
        }
    }

    /// Toggle quote recognition for tokens not yet read.
    ///
    /// A token already held by a rolled back lookahead keeps the kind it was read with.
    pub fn set_quoting(&mut self, quoting: bool) {
        self.quoting = quoting;
    }

    pub fn quoting(&self) -> bool {
        self.quoting
    }

    pub fn next_token(&mut self) -> Result<Option<Token<'src>>, TokenError> {
        match self.lookahead.take() {
            Some(token) => Ok(Some(token)),
            None => self.lex(),
        }
    }

    /// Read one token ahead; the lookahead rolls back unless committed
    pub fn peek(&mut self) -> Result<Lookahead<'_, 'src>, TokenError> {
        let token = match self.lookahead.take() {
            Some(token) => Some(token),
            None => self.lex()?,
        };
        Ok(Lookahead {
            source: self,
            token,
        })
    }

    fn lex(&mut self) -> Result<Option<Token<'src>>, TokenError> {
        let Some(raw) = self.lexer.next() else {
            return Ok(None);
        };
        let offset = self.lexer.span().start;
        let raw = raw.map_err(|_| TokenError::Unrecognized { offset })?;

        let kind = match raw {
            RawToken::Open => TokenKind::Open,
            RawToken::Close => TokenKind::Close,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Equals => TokenKind::Equals,
            RawToken::Whitespace => TokenKind::Whitespace,
            RawToken::Text => TokenKind::Word,
            RawToken::DoubleQuote | RawToken::SingleQuote if self.quoting => {
                let quote = if raw == RawToken::DoubleQuote { '"' } else { '\'' };
                let Some(end) = self.lexer.remainder().find(quote) else {
                    return Err(TokenError::UnterminatedQuote { quote, offset });
                };
                self.lexer.bump(end + quote.len_utf8());
                TokenKind::Quoted
            }
            RawToken::DoubleQuote | RawToken::SingleQuote => TokenKind::Word,
        };

        Ok(Some(Token::new(kind, self.lexer.slice(), offset)))
    }
}

impl<'src> Iterator for TokenSource<'src> {
    type Item = Result<Token<'src>, TokenError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

/// A pending one-token lookahead; dropping it without [`Lookahead::commit`] rolls it back
pub struct Lookahead<'a, 'src> {
    source: &'a mut TokenSource<'src>,
    token: Option<Token<'src>>,
}

impl<'a, 'src> Lookahead<'a, 'src> {
    /// The peeked token, `None` at end of input
    pub fn token(&self) -> Option<&Token<'src>> {
        self.token.as_ref()
    }

    /// Consume the peeked token
    pub fn commit(mut self) -> Option<Token<'src>> {
        self.token.take()
    }

    /// Put the peeked token back
    pub fn rollback(self) {}
}

impl Drop for Lookahead<'_, '_> {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            self.source.lookahead = Some(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &mut TokenSource<'_>) -> Vec<(TokenKind, String)> {
        source
            .by_ref()
            .map(|t| t.map(|t| (t.kind, t.text.to_string())))
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_quotes_are_words_without_quoting() {
        let mut source = TokenSource::new("'a'");
        assert_eq!(
            kinds(&mut source),
            vec![
                (TokenKind::Word, "'".to_string()),
                (TokenKind::Word, "a".to_string()),
                (TokenKind::Word, "'".to_string()),
            ]
        );
    }

    #[test]
    fn test_quoted_value_keeps_separators() {
        let mut source = TokenSource::new(r#"k="<a/> b">"#);
        source.set_quoting(true);
        assert_eq!(
            kinds(&mut source),
            vec![
                (TokenKind::Word, "k".to_string()),
                (TokenKind::Equals, "=".to_string()),
                (TokenKind::Quoted, r#""<a/> b""#.to_string()),
                (TokenKind::Close, ">".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_quote() {
        let mut source = TokenSource::new("k='abc");
        source.set_quoting(true);
        assert_eq!(source.next_token().unwrap().unwrap().text, "k");
        assert_eq!(source.next_token().unwrap().unwrap().kind, TokenKind::Equals);
        assert_eq!(
            source.next_token(),
            Err(TokenError::UnterminatedQuote {
                quote: '\'',
                offset: 2
            })
        );
    }

    #[test]
    fn test_rollback_returns_token_again() {
        let mut source = TokenSource::new("<a>");
        assert_eq!(source.next_token().unwrap().unwrap().kind, TokenKind::Open);

        let peeked = source.peek().unwrap();
        assert_eq!(peeked.token().map(|t| t.text), Some("a"));
        peeked.rollback();

        let next = source.next_token().unwrap().unwrap();
        assert_eq!((next.kind, next.text, next.offset), (TokenKind::Word, "a", 1));
    }

    #[test]
    fn test_commit_consumes_token() {
        let mut source = TokenSource::new("<![CDATA[x]]>");
        source.next_token().unwrap();

        let committed = source.peek().unwrap().commit().unwrap();
        assert_eq!(committed.text, "![CDATA[x]]");
        assert_eq!(source.next_token().unwrap().unwrap().kind, TokenKind::Close);
    }

    #[test]
    fn test_peek_twice_sees_same_token() {
        let mut source = TokenSource::new("a b");
        {
            let first = source.peek().unwrap();
            assert_eq!(first.token().map(|t| t.text), Some("a"));
        }
        let second = source.peek().unwrap();
        assert_eq!(second.token().map(|t| t.text), Some("a"));
    }

    #[test]
    fn test_peek_at_end_of_input() {
        let mut source = TokenSource::new("");
        assert!(source.peek().unwrap().token().is_none());
        assert_eq!(source.next_token(), Ok(None));
    }
}
