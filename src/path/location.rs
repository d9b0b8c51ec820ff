//! Steps, location paths and matching against a node stack

use std::fmt;

use super::condition::Condition;
use crate::context::NodeContext;
use crate::error::{DigestError, Result};

/// Read access to a stack of open nodes, outermost first
pub trait NodeStack {
    fn depth(&self) -> usize;
    fn node(&self, index: usize) -> &NodeContext;
}

impl NodeStack for [NodeContext] {
    fn depth(&self) -> usize {
        self.len()
    }

    fn node(&self, index: usize) -> &NodeContext {
        &self[index]
    }
}

/// One path segment: an expected node name plus an optional condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    name: String,
    condition: Option<Condition>,
}

impl Step {
    pub fn new(name: impl Into<String>) -> Self {
        Step {
            name: name.into(),
            condition: None,
        }
    }

    pub fn with_condition(name: impl Into<String>, condition: Condition) -> Self {
        Step {
            name: name.into(),
            condition: Some(condition),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn matches(&self, node: &NodeContext) -> bool {
        node.name() == self.name
            && self
                .condition
                .as_ref()
                .map_or(true, |condition| condition.evaluate(node))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.condition {
            Some(condition) => write!(f, "{}[{}]", self.name, condition),
            None => f.write_str(&self.name),
        }
    }
}

/// A compiled path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationPath {
    absolute: bool,
    steps: Vec<Step>,
}

impl LocationPath {
    /// Build a path. An empty step list is accepted here and rejected when matched.
    pub fn new(absolute: bool, steps: Vec<Step>) -> Self {
        LocationPath { absolute, steps }
    }

    pub fn absolute(steps: Vec<Step>) -> Self {
        LocationPath::new(true, steps)
    }

    pub fn relative(steps: Vec<Step>) -> Self {
        LocationPath::new(false, steps)
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Fail fast on a path that can never be matched
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(DigestError::Configuration(
                "location path has no steps".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether the path holds on `stack`.
    ///
    /// An absolute path aligns step `i` with stack position `i`. A relative path holds when
    /// any contiguous window of the stack satisfies the steps; windows are tried from the
    /// outermost position inward and the first hit wins.
    pub fn matches<S: NodeStack + ?Sized>(&self, stack: &S) -> Result<bool> {
        self.validate()?;

        let width = self.steps.len();
        let depth = stack.depth();
        if width > depth {
            return Ok(false);
        }

        if self.absolute {
            return Ok(self.matches_at(stack, 0));
        }
        Ok((0..=depth - width).any(|start| self.matches_at(stack, start)))
    }

    fn matches_at<S: NodeStack + ?Sized>(&self, stack: &S, start: usize) -> bool {
        self.steps
            .iter()
            .enumerate()
            .all(|(offset, step)| step.matches(stack.node(start + offset)))
    }
}

impl fmt::Display for LocationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            f.write_str("/")?;
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}
