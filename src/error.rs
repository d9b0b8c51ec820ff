//! Error types for digesting
//!
//! Every failure surfaces as a [`DigestError`]. Compilation, parse, configuration and listener
//! failures keep their own enums so callers can match on the stage that failed.

use std::error::Error;
use std::fmt;

/// Result alias used across the crate
pub type Result<T, E = DigestError> = std::result::Result<T, E>;

/// Top level error returned by the digester
#[derive(Debug)]
pub enum DigestError {
    /// The path expression could not be compiled
    Compile(CompileError),
    /// The input could not be parsed
    Parse(ParseError),
    /// A path or configuration value is unusable, e.g. a location path without steps
    Configuration(String),
    /// A listener callback failed; the parse was aborted
    Listener(ListenerError),
}

impl fmt::Display for DigestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestError::Compile(err) => write!(f, "Compilation error: {}", err),
            DigestError::Parse(err) => write!(f, "Parse error: {}", err),
            DigestError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            DigestError::Listener(err) => write!(f, "Listener error: {}", err),
        }
    }
}

impl Error for DigestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DigestError::Compile(err) => Some(err),
            DigestError::Parse(err) => Some(err),
            DigestError::Configuration(_) => None,
            DigestError::Listener(err) => Some(err),
        }
    }
}

impl From<CompileError> for DigestError {
    fn from(err: CompileError) -> Self {
        DigestError::Compile(err)
    }
}

impl From<ParseError> for DigestError {
    fn from(err: ParseError) -> Self {
        DigestError::Parse(err)
    }
}

impl From<TokenError> for DigestError {
    fn from(err: TokenError) -> Self {
        DigestError::Parse(ParseError::Token(err))
    }
}

impl From<ListenerError> for DigestError {
    fn from(err: ListenerError) -> Self {
        DigestError::Listener(err)
    }
}

/// A path expression that failed to compile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub expression: String,
    /// Byte offset in `expression` where the failure was detected
    pub offset: usize,
    pub message: String,
}

impl CompileError {
    pub fn new(expression: &str, offset: usize, message: impl Into<String>) -> Self {
        CompileError {
            expression: expression.to_string(),
            offset,
            message: message.into(),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at offset {} in '{}'",
            self.message, self.offset, self.expression
        )
    }
}

impl Error for CompileError {}

/// Failures raised by the token source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Input the lexer could not classify
    Unrecognized { offset: usize },
    /// A quoted attribute value without its closing quote
    UnterminatedQuote { quote: char, offset: usize },
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Unrecognized { offset } => {
                write!(f, "Unrecognized input at offset {}", offset)
            }
            TokenError::UnterminatedQuote { quote, offset } => {
                write!(f, "Unterminated {} quote opened at offset {}", quote, offset)
            }
        }
    }
}

impl Error for TokenError {}

/// Malformed input, at the token level or in the tag structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Token(TokenError),
    /// The input ended inside `<...`
    UnclosedTag { offset: usize },
    /// The input ended inside a CDATA section
    UnclosedCdata { offset: usize },
    /// The input ended inside a `<!-- ... -->` comment
    UnclosedComment { offset: usize },
    /// A previous parse failed and `reset()` was not called since
    NeedsReset,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Token(err) => write!(f, "{}", err),
            ParseError::UnclosedTag { offset } => {
                write!(f, "Input ended inside the tag opened at offset {}", offset)
            }
            ParseError::UnclosedCdata { offset } => {
                write!(f, "Input ended inside the CDATA section opened at offset {}", offset)
            }
            ParseError::UnclosedComment { offset } => {
                write!(f, "Input ended inside the comment opened at offset {}", offset)
            }
            ParseError::NeedsReset => {
                write!(f, "Parser state is indeterminate after a failed parse, reset it first")
            }
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseError::Token(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TokenError> for ParseError {
    fn from(err: TokenError) -> Self {
        ParseError::Token(err)
    }
}

/// Error raised from inside a listener callback
#[derive(Debug)]
pub struct ListenerError {
    message: String,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        ListenerError {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: Box<dyn Error + Send + Sync>) -> Self {
        ListenerError {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ListenerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {}", self.message, source),
            None => write!(f, "{}", self.message),
        }
    }
}

impl Error for ListenerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn Error + 'static))
    }
}
