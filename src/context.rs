//! Node contexts and the context stack
//!
//! The context stack mirrors the tags currently open in the input. Every structural position
//! (the names of the open tags from the root down) gets one record per parse that counts the
//! visits to it; each open node pairs that counter with the attributes of the current visit.
//! Registered [`LocationPath`](crate::path::LocationPath)s are re-evaluated as nodes are
//! pushed and popped.

pub mod node;
pub mod stack;

pub use node::{NodeAttribute, NodeContext, PathKey};
pub use stack::{ContextStack, ListenerId, MatchEvent, MatchEventKind, StackView};
