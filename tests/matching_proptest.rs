//! Property-based tests for path matching and match events
//!
//! Stacks and documents are drawn from a three-letter tag alphabet so that paths hit often.

use std::cell::RefCell;
use std::rc::Rc;

use markup_digester::context::{ContextStack, NodeContext, PathKey};
use markup_digester::error::ListenerError;
use markup_digester::parser::{PathListener, StreamParser, WordListener, WordRoute};
use markup_digester::path::{LocationPath, Step};
use proptest::prelude::*;

fn tag_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c"]).prop_map(str::to_string)
}

fn names(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(tag_name(), 0..max)
}

fn stack_of(names: &[String]) -> Vec<NodeContext> {
    names
        .iter()
        .map(|name| NodeContext::new(name.as_str(), Vec::new()))
        .collect()
}

fn steps(names: &[String]) -> Vec<Step> {
    names.iter().map(|name| Step::new(name.as_str())).collect()
}

/// Open/close operations; `None` closes the innermost open tag
fn document() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::option::of(tag_name()), 0..40).prop_map(|ops| {
        let mut open = Vec::new();
        let mut out = String::new();
        for op in ops {
            match op {
                Some(name) => {
                    out.push_str(&format!("<{}>t", name));
                    open.push(name);
                }
                None => {
                    if let Some(name) = open.pop() {
                        out.push_str(&format!("</{}>", name));
                    }
                }
            }
        }
        while let Some(name) = open.pop() {
            out.push_str(&format!("</{}>", name));
        }
        out
    })
}

struct EventLog {
    events: Rc<RefCell<Vec<&'static str>>>,
}

impl WordListener for EventLog {
    fn on_word(&mut self, _word: &str) -> Result<(), ListenerError> {
        Ok(())
    }
}

impl PathListener for EventLog {
    fn on_begin(&mut self, _words: &mut WordRoute<'_>) -> Result<(), ListenerError> {
        self.events.borrow_mut().push("begin");
        Ok(())
    }

    fn on_end(&mut self, _words: &mut WordRoute<'_>) -> Result<(), ListenerError> {
        self.events.borrow_mut().push("end");
        Ok(())
    }
}

proptest! {
    #[test]
    fn relative_paths_are_translation_invariant(
        prefix in names(4),
        path in prop::collection::vec(tag_name(), 1..4),
        suffix in names(4),
    ) {
        let located = LocationPath::relative(steps(&path));
        let stack: Vec<String> = prefix.iter().chain(&path).chain(&suffix).cloned().collect();
        prop_assert!(located.matches(stack_of(&stack).as_slice()).unwrap());
    }

    #[test]
    fn relative_matching_is_window_existence(
        stack in names(7),
        path in prop::collection::vec(tag_name(), 1..4),
    ) {
        let located = LocationPath::relative(steps(&path));
        let expected = stack.windows(path.len()).any(|window| window == path.as_slice());
        prop_assert_eq!(located.matches(stack_of(&stack).as_slice()).unwrap(), expected);
    }

    #[test]
    fn absolute_paths_are_position_exact(
        stack in names(7),
        path in prop::collection::vec(tag_name(), 1..4),
    ) {
        let located = LocationPath::absolute(steps(&path));
        let expected = stack.starts_with(&path);
        prop_assert_eq!(located.matches(stack_of(&stack).as_slice()).unwrap(), expected);
    }

    #[test]
    fn occurrences_grow_with_each_revisit(
        parents in prop::collection::vec(tag_name(), 0..4),
        child in tag_name(),
        visits in 1usize..20,
    ) {
        let mut stack = ContextStack::new();
        for parent in &parents {
            stack.push(parent, Vec::new()).unwrap();
        }
        let before = stack.memoized();
        for visit in 1..=visits {
            stack.push(&child, Vec::new()).unwrap();
            prop_assert_eq!(stack.top().unwrap().occurrences(), visit);
            stack.pop().unwrap();
        }
        prop_assert_eq!(stack.memoized(), before + 1);

        let mut key: Vec<&str> = parents.iter().map(String::as_str).collect();
        key.push(&child);
        prop_assert_eq!(stack.lookup(&PathKey::from_names(&key)).unwrap().occurrences(), visits);
    }

    #[test]
    fn begin_and_end_events_alternate(
        input in document(),
        path in prop::collection::vec(tag_name(), 1..3),
        absolute in any::<bool>(),
    ) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut parser = StreamParser::new();
        parser
            .register(
                LocationPath::new(absolute, steps(&path)),
                Box::new(EventLog { events: Rc::clone(&events) }),
            )
            .unwrap();
        parser.parse(&input).unwrap();

        let events = events.borrow();
        for (i, event) in events.iter().enumerate() {
            let expected = if i % 2 == 0 { "begin" } else { "end" };
            prop_assert_eq!(*event, expected);
        }
        // every tag is closed, so every begin has its end
        prop_assert_eq!(events.len() % 2, 0);
    }
}
