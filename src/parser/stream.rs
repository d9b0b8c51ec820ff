//! The tokenizer-driven stream parser
//!
//! [`StreamParser::parse`] walks the token stream once. Text outside tags is delivered to the
//! routed word listeners as it arrives. Tag tokens are buffered until `>`, then the tag is
//! turned into a push, a pop or a push/pop pair on the [`ContextStack`], and the match events
//! those produce are dispatched to the path listeners before the next token is read.
//!
//! CDATA sections suppress tag recognition: their content is buffered and delivered as one
//! word when the closing sentinel is seen. Comments, directives and processing instructions
//! are recognised by the tag name and dropped.

use std::mem;

use super::listener::{Listeners, PathListener, WordListener};
use super::tag::Tag;
use crate::config::DigesterConfig;
use crate::context::{ContextStack, ListenerId, MatchEvent};
use crate::error::{ParseError, Result};
use crate::lexer::{Token, TokenKind, TokenSource};
use crate::path::LocationPath;

const COMMENT_OPEN: &str = "!--";
const COMMENT_CLOSE: &str = "--";

/// Digests markup into context stack transitions and word deliveries
#[derive(Debug, Default)]
pub struct StreamParser {
    config: DigesterConfig,
    stack: ContextStack,
    listeners: Listeners,
    failed: bool,
}

impl StreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DigesterConfig) -> Self {
        StreamParser {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &DigesterConfig {
        &self.config
    }

    pub fn stack(&self) -> &ContextStack {
        &self.stack
    }

    /// Bind `listener` to `path`; it gets begin/end events whenever the path starts or stops
    /// holding on the open-node stack
    pub fn register(
        &mut self,
        path: LocationPath,
        listener: Box<dyn PathListener>,
    ) -> Result<ListenerId> {
        path.validate()?;
        let id = self.listeners.add_path(listener);
        self.stack.register(id, path)?;
        Ok(id)
    }

    /// Remove a path listener and its path registration
    pub fn unregister(&mut self, id: ListenerId) -> Option<Box<dyn PathListener>> {
        self.stack.unregister(id);
        self.listeners.remove_path(id)
    }

    /// Attach a listener that receives every word delivered from now on
    pub fn add_word_listener(&mut self, listener: Box<dyn WordListener>) -> ListenerId {
        self.listeners.add_word(listener)
    }

    pub fn remove_word_listener(&mut self, id: ListenerId) -> Option<Box<dyn WordListener>> {
        self.listeners.remove_word(id)
    }

    /// Clear node contexts and open nodes and stop routing words to path listeners.
    ///
    /// Registrations and listeners survive a reset.
    pub fn reset(&mut self) {
        self.stack.reset();
        self.listeners.reset_routes();
        self.failed = false;
    }

    /// Digest `input` from the start.
    ///
    /// Every parse starts from an empty stack. A failed parse leaves the parser unusable until
    /// [`StreamParser::reset`] is called.
    pub fn parse(&mut self, input: &str) -> Result<()> {
        if self.failed {
            return Err(ParseError::NeedsReset.into());
        }
        self.reset();

        let scan = Scan {
            tokens: TokenSource::new(input),
            config: &self.config,
            stack: &mut self.stack,
            listeners: &mut self.listeners,
            state: ParserState::default(),
            buffer: Vec::new(),
            opened_at: 0,
        };
        let result = scan.run();
        if let Err(err) = &result {
            log::debug!(target: "markup_digester", "parse failed: {}", err);
            self.failed = true;
        }
        result
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct ParserState {
    in_tag: bool,
    close_seen: bool,
    inline_seen: bool,
    /// Tag recognition suppressed
    escaped: bool,
    in_cdata: bool,
    in_comment: bool,
    buffering: bool,
}

/// State of one pass over the input
struct Scan<'src, 'p> {
    tokens: TokenSource<'src>,
    config: &'p DigesterConfig,
    stack: &'p mut ContextStack,
    listeners: &'p mut Listeners,
    state: ParserState,
    buffer: Vec<Token<'src>>,
    /// Offset of the `<` that opened the current tag or CDATA section
    opened_at: usize,
}

impl<'src> Scan<'src, '_> {
    fn run(mut self) -> Result<()> {
        while let Some(token) = self.tokens.next_token()? {
            let state = self.state;
            match token.kind {
                TokenKind::Open if !state.escaped && !state.in_tag => self.open(token)?,
                TokenKind::Close if state.in_cdata => self.close_cdata(token)?,
                TokenKind::Close if state.in_tag => self.close_tag(token)?,
                TokenKind::Slash if state.in_tag && !state.in_comment => {
                    self.state.close_seen = true;
                    self.state.inline_seen = !self.buffer.is_empty();
                }
                TokenKind::Whitespace if state.in_tag => {}
                _ if state.buffering => self.buffer_token(token),
                _ => self.listeners.deliver(token.text)?,
            }
        }
        self.finish()
    }

    fn open(&mut self, token: Token<'src>) -> Result<()> {
        self.opened_at = token.offset;

        let lookahead = self.tokens.peek()?;
        let cdata = lookahead
            .token()
            .copied()
            .filter(|next| next.kind == TokenKind::Word)
            .filter(|next| next.text.starts_with(self.config.cdata_open.as_str()));
        let Some(next) = cdata else {
            lookahead.rollback();
            self.buffer.clear();
            self.state = ParserState {
                in_tag: true,
                buffering: true,
                ..ParserState::default()
            };
            self.tokens.set_quoting(true);
            return Ok(());
        };
        lookahead.commit();

        self.buffer.clear();
        self.state = ParserState {
            escaped: true,
            in_cdata: true,
            buffering: true,
            ..ParserState::default()
        };
        let prefix = self.config.cdata_open.len();
        let content = &next.text[prefix..];
        if !content.is_empty() {
            self.buffer
                .push(Token::new(TokenKind::Word, content, next.offset + prefix));
        }
        Ok(())
    }

    fn buffer_token(&mut self, token: Token<'src>) {
        if self.state.in_tag && self.buffer.is_empty() && token.text.starts_with(COMMENT_OPEN) {
            self.state.in_comment = true;
            self.tokens.set_quoting(false);
        }
        self.buffer.push(token);
    }

    /// `>` inside CDATA: the section ends only if the last token carries the close sentinel
    fn close_cdata(&mut self, token: Token<'src>) -> Result<()> {
        let close = self.config.cdata_close.as_str();
        if !self.buffer.last().is_some_and(|last| last.text.ends_with(close)) {
            self.buffer.push(token);
            return Ok(());
        }

        let mut text: String = self.buffer.drain(..).map(|t| t.text).collect();
        text.truncate(text.len() - close.len());
        self.state = ParserState::default();
        if !text.is_empty() {
            self.listeners.deliver(&text)?;
        }
        Ok(())
    }

    fn comment_closed(&self) -> bool {
        match self.buffer.as_slice() {
            [only] => only.text.len() >= COMMENT_OPEN.len() + COMMENT_CLOSE.len()
                && only.text.ends_with(COMMENT_CLOSE),
            [.., last] => last.text.ends_with(COMMENT_CLOSE),
            [] => false,
        }
    }

    fn close_tag(&mut self, token: Token<'src>) -> Result<()> {
        if self.state.in_comment && !self.comment_closed() {
            self.buffer.push(token);
            return Ok(());
        }

        let state = mem::take(&mut self.state);
        self.tokens.set_quoting(false);
        let buffer = mem::take(&mut self.buffer);
        let Some(tag) = Tag::from_tokens(&buffer) else {
            return Ok(());
        };

        if self.config.is_skipped(tag.name) {
            log::debug!(target: "markup_digester", "skipping markup declaration <{}>", tag.name);
            return Ok(());
        }

        match (state.close_seen, state.inline_seen) {
            (true, true) => {
                self.listeners.deliver(&format!("<{}/>", tag.name))?;
                let events = self.stack.push(tag.name, tag.attributes)?;
                self.dispatch(events)?;
                let events = self.stack.pop()?;
                self.dispatch(events)
            }
            (true, false) => {
                let events = self.stack.pop_named(tag.name)?;
                self.dispatch(events)?;
                self.listeners.deliver(&format!("</{}>", tag.name))?;
                Ok(())
            }
            _ => {
                self.listeners.deliver(&format!("<{}>", tag.name))?;
                let events = self.stack.push(tag.name, tag.attributes)?;
                self.dispatch(events)
            }
        }
    }

    fn dispatch(&mut self, events: Vec<MatchEvent>) -> Result<()> {
        for event in events {
            self.listeners.dispatch(event)?;
        }
        Ok(())
    }

    fn finish(self) -> Result<()> {
        let offset = self.opened_at;
        let state = self.state;
        if state.in_cdata {
            Err(ParseError::UnclosedCdata { offset }.into())
        } else if state.in_comment {
            Err(ParseError::UnclosedComment { offset }.into())
        } else if state.in_tag {
            Err(ParseError::UnclosedTag { offset }.into())
        } else {
            if !self.stack.is_empty() {
                log::debug!(
                    target: "markup_digester",
                    "input ended with {} open nodes",
                    self.stack.depth()
                );
            }
            Ok(())
        }
    }
}
