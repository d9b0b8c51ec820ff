//! The digester facade
//!
//! A [`Digester`] compiles path expressions and collects the text matched by a path over one
//! input. Each call registers a transient collector per path, parses the input, and removes
//! the collectors again whether the parse succeeded or not.
//!
//! ```text
//! let mut digester = Digester::new();
//! let path = digester.compile("/rss/channel/item[@type='news']/title")?;
//! let titles = digester.find_matches(&path, feed)?;
//! ```

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use crate::compiler;
use crate::config::DigesterConfig;
use crate::context::ListenerId;
use crate::error::{ListenerError, Result};
use crate::parser::{PathListener, StreamParser, WordListener, WordRoute};
use crate::path::LocationPath;

type Matches = Rc<RefCell<Vec<String>>>;

/// Buffers the words routed between a begin and an end event into one match
struct MatchCollector {
    matches: Matches,
    current: String,
    trim: bool,
}

impl WordListener for MatchCollector {
    fn on_word(&mut self, word: &str) -> Result<(), ListenerError> {
        self.current.push_str(word);
        Ok(())
    }
}

impl PathListener for MatchCollector {
    fn on_begin(&mut self, words: &mut WordRoute<'_>) -> Result<(), ListenerError> {
        self.current.clear();
        words.listen();
        Ok(())
    }

    fn on_end(&mut self, words: &mut WordRoute<'_>) -> Result<(), ListenerError> {
        words.stop();
        let text = mem::take(&mut self.current);
        let text = if self.trim {
            text.trim().to_string()
        } else {
            text
        };
        self.matches.borrow_mut().push(text);
        Ok(())
    }
}

/// Path registrations that are removed from the parser when dropped
struct Registrations<'p> {
    parser: &'p mut StreamParser,
    ids: Vec<ListenerId>,
}

impl<'p> Registrations<'p> {
    fn new(parser: &'p mut StreamParser) -> Self {
        Registrations {
            parser,
            ids: Vec::new(),
        }
    }

    fn register(&mut self, path: LocationPath, listener: Box<dyn PathListener>) -> Result<()> {
        let id = self.parser.register(path, listener)?;
        self.ids.push(id);
        Ok(())
    }
}

impl Drop for Registrations<'_> {
    fn drop(&mut self) {
        for id in self.ids.drain(..) {
            self.parser.unregister(id);
        }
    }
}

#[derive(Debug, Default)]
pub struct Digester {
    parser: StreamParser,
}

impl Digester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DigesterConfig) -> Self {
        Digester {
            parser: StreamParser::with_config(config),
        }
    }

    pub fn config(&self) -> &DigesterConfig {
        self.parser.config()
    }

    /// Compile a path expression such as `/rss/channel/item[@type='news']`
    pub fn compile(&self, expression: &str) -> Result<LocationPath> {
        Ok(compiler::compile(expression)?)
    }

    /// Text matched by `path` in `input`, one entry per match in the order the matches ended.
    ///
    /// A match is every word delivered while the path holds: text, CDATA content and the
    /// synthesized text of nested tags, concatenated.
    pub fn find_matches(&mut self, path: &LocationPath, input: &str) -> Result<Vec<String>> {
        let mut matches = self.find_all(std::slice::from_ref(path), input)?;
        Ok(matches.pop().unwrap_or_default())
    }

    pub fn find_matches_expr(&mut self, expression: &str, input: &str) -> Result<Vec<String>> {
        let path = self.compile(expression)?;
        self.find_matches(&path, input)
    }

    /// Digest `input` once for several paths; the result has one match list per path
    pub fn find_all(&mut self, paths: &[LocationPath], input: &str) -> Result<Vec<Vec<String>>> {
        self.parser.reset();
        let trim = self.parser.config().trim_matches;

        let mut registrations = Registrations::new(&mut self.parser);
        let mut collected = Vec::with_capacity(paths.len());
        for path in paths {
            let matches = Matches::default();
            registrations.register(
                path.clone(),
                Box::new(MatchCollector {
                    matches: Rc::clone(&matches),
                    current: String::new(),
                    trim,
                }),
            )?;
            collected.push(matches);
        }
        registrations.parser.parse(input)?;
        drop(registrations);

        log::debug!(
            target: "markup_digester",
            "digested {} bytes for {} paths",
            input.len(),
            paths.len()
        );
        Ok(collected
            .iter()
            .map(|matches| mem::take(&mut *matches.borrow_mut()))
            .collect())
    }

    pub fn parser(&self) -> &StreamParser {
        &self.parser
    }

    pub fn parser_mut(&mut self) -> &mut StreamParser {
        &mut self.parser
    }

    pub fn reset(&mut self) {
        self.parser.reset();
    }
}
