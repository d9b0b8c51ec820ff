//! Declarative path model
//!
//! A [`LocationPath`] is a list of [`Step`]s, each an expected node name with an optional
//! [`Condition`]. Paths are matched against the live stack of open nodes, never against a
//! document tree, so matching only ever sees the currently parsed depth.

pub mod condition;
pub mod location;

pub use condition::{Condition, Identifier, Operator};
pub use location::{LocationPath, NodeStack, Step};
