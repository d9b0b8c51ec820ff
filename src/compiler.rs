//! Path-expression compiler
//!
//! Compilation runs in two passes: the chumsky grammar in [`syntax`] turns the expression into
//! a syntax tree, and the [`reduce::Reducer`] turns that tree into the
//! [`LocationPath`]/[`Step`](crate::path::Step)/[`Condition`](crate::path::Condition) graph.
//! Grammar failures and reducer failures both surface as a single [`CompileError`].

pub mod reduce;
pub mod syntax;

use chumsky::error::SimpleReason;
use chumsky::Parser;

pub use reduce::Reducer;
pub use syntax::{ElementSyntax, IdentifierSyntax, PathSyntax, PredicateKind, PredicateSyntax};

use crate::error::CompileError;
use crate::path::LocationPath;
use syntax::ParserError;

/// Parse `expression` into its syntax tree without interpreting it
pub fn parse_syntax(expression: &str) -> Result<PathSyntax, CompileError> {
    syntax::path()
        .parse(expression)
        .map_err(|errors| convert_errors(expression, errors))
}

pub fn compile(expression: &str) -> Result<LocationPath, CompileError> {
    let syntax = parse_syntax(expression)?;
    Reducer::new(expression).reduce(syntax)
}

/// Byte offset of the character at `char_offset`, or the end of `text`
pub(crate) fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}

/// Report the error that got furthest into the expression
fn convert_errors(expression: &str, errors: Vec<ParserError>) -> CompileError {
    match errors.into_iter().max_by_key(|e| e.span().start) {
        Some(error) => CompileError::new(
            expression,
            byte_offset(expression, error.span().start),
            describe(&error),
        ),
        None => CompileError::new(expression, 0, "invalid path expression"),
    }
}

fn describe(error: &ParserError) -> String {
    if let SimpleReason::Custom(message) = error.reason() {
        return message.clone();
    }

    let found = match error.found() {
        Some(c) => format!("unexpected '{}'", c),
        None => "unexpected end of expression".to_string(),
    };
    let mut expected: Vec<String> = error
        .expected()
        .map(|e| match e {
            Some(c) => format!("'{}'", c),
            None => "end of expression".to_string(),
        })
        .collect();
    expected.sort();
    expected.dedup();

    if expected.is_empty() {
        found
    } else {
        format!("{}, expected {}", found, expected.join(" or "))
    }
}
