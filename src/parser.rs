//! Stream parser for tag markup
//!
//! The parser drives a [`ContextStack`](crate::context::ContextStack) from a token stream and
//! routes the text it sees to listeners:
//!
//! - [`WordListener`]s receive words (text fragments and synthesized tag text) as they are
//!   delivered, in the order they started listening.
//! - [`PathListener`]s are registered with a [`LocationPath`](crate::path::LocationPath). They
//!   are told when the path starts and stops holding, and decide through a [`WordRoute`]
//!   whether to receive the words delivered in between.
//!
//! There is no document tree: everything happens in a single forward pass.

pub mod listener;
pub mod stream;
pub mod tag;

pub use listener::{Listeners, PathListener, WordListener, WordRoute};
pub use stream::StreamParser;
pub use tag::Tag;
