//! Reduction of the syntax tree into a [`LocationPath`]
//!
//! The reducer interprets what the grammar left as text: operator symbols become
//! [`Operator`]s, indices become 1-based occurrence numbers, bare identifiers become name
//! conditions. Anything the path model cannot express is a compile error pointing at the
//! offending predicate.

use super::syntax::{ElementSyntax, IdentifierSyntax, PathSyntax, PredicateKind, PredicateSyntax};
use super::byte_offset;
use crate::error::CompileError;
use crate::path::{Condition, Identifier, LocationPath, Operator, Step};

pub struct Reducer<'e> {
    expression: &'e str,
}

impl<'e> Reducer<'e> {
    pub fn new(expression: &'e str) -> Self {
        Reducer { expression }
    }

    pub fn reduce(&self, syntax: PathSyntax) -> Result<LocationPath, CompileError> {
        let steps = syntax
            .elements
            .into_iter()
            .map(|element| self.visit_element(element))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LocationPath::new(syntax.absolute, steps))
    }

    fn visit_element(&self, element: ElementSyntax) -> Result<Step, CompileError> {
        match element.predicate {
            Some(predicate) => {
                let condition = self.visit_predicate(predicate)?;
                Ok(Step::with_condition(element.node, condition))
            }
            None => Ok(Step::new(element.node)),
        }
    }

    fn visit_predicate(&self, predicate: PredicateSyntax) -> Result<Condition, CompileError> {
        let start = predicate.span.start;
        match predicate.kind {
            PredicateKind::Comparison {
                identifier,
                operator,
                value,
            } => {
                let operator: Operator = operator.parse().map_err(|msg| self.error(start, msg))?;
                Ok(Condition::comparison(
                    self.visit_identifier(identifier),
                    operator,
                    value,
                ))
            }
            PredicateKind::Index(digits) => match digits.parse::<usize>() {
                Ok(0) => Err(self.error(start, "index must be at least 1")),
                Ok(index) => Ok(Condition::Index(index)),
                Err(_) => Err(self.error(start, format!("index {} is out of range", digits))),
            },
            PredicateKind::Test(IdentifierSyntax::Node(name)) => Ok(Condition::Name(name)),
            PredicateKind::Test(IdentifierSyntax::Attribute(name)) => Err(self.error(
                start,
                format!("attribute @{} needs an operator and a value", name),
            )),
        }
    }

    fn visit_identifier(&self, identifier: IdentifierSyntax) -> Identifier {
        match identifier {
            IdentifierSyntax::Attribute(name) => Identifier::Attribute(name),
            IdentifierSyntax::Node(name) => Identifier::Node(name),
        }
    }

    fn error(&self, char_offset: usize, message: impl Into<String>) -> CompileError {
        CompileError::new(
            self.expression,
            byte_offset(self.expression, char_offset),
            message,
        )
    }
}
