//! # markup-digester
//!
//! Streaming extraction of text from SGML/XML-like markup with XPath-style paths.
//!
//! The input is read once, front to back. No document tree is built: the parser keeps only the
//! stack of currently open tags, and every registered path is re-evaluated as that stack
//! changes. Text is handed to whoever is listening while a path holds.
//!
//! ## Modules
//!
//! - [`lexer`]: logos tokens and the [`TokenSource`](lexer::TokenSource) with one-token
//!   lookahead.
//! - [`context`]: node contexts and the [`ContextStack`](context::ContextStack) that fires
//!   begin/end match events.
//! - [`path`]: steps, conditions and location paths.
//! - [`compiler`]: path-expression grammar and reduction to a [`LocationPath`].
//! - [`parser`]: the [`StreamParser`](parser::StreamParser) state machine and listener traits.
//! - [`digester`]: the [`Digester`] facade.
//!
//! ## Example
//!
//! ```text
//! let mut digester = Digester::new();
//! let matches = digester.find_matches_expr("/a/b[@k='v']", "<a><b k='v'>X</b><b k='w'>Y</b></a>")?;
//! assert_eq!(matches, vec!["X"]);
//! ```

pub mod compiler;
pub mod config;
pub mod context;
pub mod digester;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod path;

pub use compiler::compile;
pub use config::DigesterConfig;
pub use digester::Digester;
pub use error::{DigestError, Result};
pub use path::LocationPath;
