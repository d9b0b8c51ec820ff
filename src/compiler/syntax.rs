//! Path-expression grammar
//!
//! ```text
//! path       := '/' path_list | path_list
//! path_list  := path_elem ('/' path_elem)*
//! path_elem  := node ['[' condition ']']
//! condition  := identifier operator value | index | identifier
//! identifier := '@' attribute | node
//! operator   := '<=' | '>=' | '!=' | '<' | '>' | '='
//! ```
//!
//! The parser only recognises shape; it keeps operator symbols and indices as text and leaves
//! their interpretation to the reducer.

use chumsky::prelude::*;
use std::ops::Range;

/// Type alias for parser error
pub(crate) type ParserError = Simple<char>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSyntax {
    pub absolute: bool,
    pub elements: Vec<ElementSyntax>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSyntax {
    pub node: String,
    pub predicate: Option<PredicateSyntax>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateSyntax {
    pub kind: PredicateKind,
    /// Character range of the bracketed predicate
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateKind {
    Comparison {
        identifier: IdentifierSyntax,
        operator: String,
        value: String,
    },
    Index(String),
    /// A bare identifier with no operator
    Test(IdentifierSyntax),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierSyntax {
    Attribute(String),
    Node(String),
}

fn is_name_char(c: &char) -> bool {
    !c.is_whitespace() && !matches!(c, '/' | '[' | ']' | '@' | '=' | '<' | '>' | '!' | '\'' | '"')
}

fn name() -> impl Parser<char, String, Error = ParserError> + Clone {
    filter(is_name_char).repeated().at_least(1).collect::<String>()
}

fn quoted(quote: char) -> impl Parser<char, String, Error = ParserError> + Clone {
    just(quote)
        .ignore_then(
            filter(move |c: &char| *c != quote)
                .repeated()
                .collect::<String>(),
        )
        .then_ignore(just(quote))
}

/// A quoted literal, or a bare one such as a number
fn value() -> impl Parser<char, String, Error = ParserError> + Clone {
    quoted('\'').or(quoted('"')).or(name())
}

fn identifier() -> impl Parser<char, IdentifierSyntax, Error = ParserError> + Clone {
    just('@')
        .ignore_then(name())
        .map(IdentifierSyntax::Attribute)
        .or(name().map(IdentifierSyntax::Node))
}

fn operator() -> impl Parser<char, String, Error = ParserError> + Clone {
    choice((
        just("<="),
        just(">="),
        just("!="),
        just("<"),
        just(">"),
        just("="),
    ))
    .map(|symbol: &str| symbol.to_string())
}

fn predicate() -> impl Parser<char, PredicateSyntax, Error = ParserError> + Clone {
    let comparison = identifier()
        .padded()
        .then(operator().padded())
        .then(value().padded())
        .map(|((identifier, operator), value)| PredicateKind::Comparison {
            identifier,
            operator,
            value,
        });
    let index = text::int::<_, ParserError>(10)
        .padded()
        .map(PredicateKind::Index);
    let test = identifier().padded().map(PredicateKind::Test);

    just('[')
        .ignore_then(choice((
            comparison.then_ignore(just(']')),
            index.then_ignore(just(']')),
            test.then_ignore(just(']')),
        )))
        .map_with_span(|kind, span| PredicateSyntax { kind, span })
}

fn element() -> impl Parser<char, ElementSyntax, Error = ParserError> + Clone {
    name()
        .then(predicate().or_not())
        .map(|(node, predicate)| ElementSyntax { node, predicate })
}

/// Parser for a complete path expression
pub fn path() -> impl Parser<char, PathSyntax, Error = ParserError> + Clone {
    just('/')
        .or_not()
        .map(|slash| slash.is_some())
        .then(element().separated_by(just('/')).at_least(1))
        .padded()
        .then_ignore(end())
        .map(|(absolute, elements)| PathSyntax { absolute, elements })
}
