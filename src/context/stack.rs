//! The live stack of open nodes and the edge-triggered path registrations
//!
//! Node records live in an arena. Each record keeps its children in a map from tag name to
//! record id, which makes the arena a trie over path keys: finding the record for a push is one
//! hash lookup under the current top of stack, with no key built per push. A record carries the
//! name and the occurrence counter of its position; the attributes belong to each visit and
//! live on the open-node entry.
//!
//! Registered paths carry an active flag. A push only re-evaluates inactive paths and a pop
//! only re-evaluates active ones, so begin and end events fire on transitions only.

use std::collections::HashMap;
use std::fmt;

use super::node::{NodeAttribute, NodeContext, PathKey};
use crate::error::Result;
use crate::path::{LocationPath, NodeStack};

type NodeId = usize;

/// Identifies a registered listener, and the path it was registered with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u32);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEventKind {
    Begin,
    End,
}

/// A registered path became true (`Begin`) or stopped being true (`End`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchEvent {
    pub listener: ListenerId,
    pub kind: MatchEventKind,
}

impl MatchEvent {
    pub fn begin(listener: ListenerId) -> Self {
        MatchEvent {
            listener,
            kind: MatchEventKind::Begin,
        }
    }

    pub fn end(listener: ListenerId) -> Self {
        MatchEvent {
            listener,
            kind: MatchEventKind::End,
        }
    }
}

#[derive(Debug)]
struct NodeRecord {
    context: NodeContext,
    children: HashMap<String, NodeId>,
}

/// One open tag: the record of its position and the context seen on this visit
#[derive(Debug)]
struct OpenNode {
    record: NodeId,
    context: NodeContext,
}

#[derive(Debug)]
struct Registration {
    listener: ListenerId,
    path: LocationPath,
    active: bool,
}

/// Borrowed view of the open nodes, outermost first
pub struct StackView<'a> {
    open: &'a [OpenNode],
}

impl NodeStack for StackView<'_> {
    fn depth(&self) -> usize {
        self.open.len()
    }

    fn node(&self, index: usize) -> &NodeContext {
        &self.open[index].context
    }
}

#[derive(Debug, Default)]
pub struct ContextStack {
    records: Vec<NodeRecord>,
    roots: HashMap<String, NodeId>,
    open: Vec<OpenNode>,
    registrations: Vec<Registration>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Open nodes, outermost first
    pub fn contexts(&self) -> impl Iterator<Item = &NodeContext> + '_ {
        self.open.iter().map(|node| &node.context)
    }

    pub fn top(&self) -> Option<&NodeContext> {
        self.open.last().map(|node| &node.context)
    }

    pub fn view(&self) -> StackView<'_> {
        StackView { open: &self.open }
    }

    /// Key of the current top of stack
    pub fn path_key(&self) -> PathKey {
        PathKey::new(self.contexts().map(|context| context.name().to_string()).collect())
    }

    /// The memoized record for `key`, if that position was visited since the last reset.
    ///
    /// The returned context carries the position's name and occurrence counter, no attributes.
    pub fn lookup(&self, key: &PathKey) -> Option<&NodeContext> {
        let mut siblings = &self.roots;
        let mut found = None;
        for name in key.names() {
            let id = *siblings.get(name)?;
            siblings = &self.records[id].children;
            found = Some(id);
        }
        found.map(|id| &self.records[id].context)
    }

    /// Number of distinct positions memoized since the last reset
    pub fn memoized(&self) -> usize {
        self.records.len()
    }

    pub fn register(&mut self, listener: ListenerId, path: LocationPath) -> Result<()> {
        path.validate()?;
        self.registrations.retain(|r| r.listener != listener);
        self.registrations.push(Registration {
            listener,
            path,
            active: false,
        });
        Ok(())
    }

    pub fn unregister(&mut self, listener: ListenerId) -> Option<LocationPath> {
        let index = self
            .registrations
            .iter()
            .position(|r| r.listener == listener)?;
        Some(self.registrations.remove(index).path)
    }

    pub fn is_active(&self, listener: ListenerId) -> bool {
        self.registrations
            .iter()
            .any(|r| r.listener == listener && r.active)
    }

    pub fn registered(&self) -> usize {
        self.registrations.len()
    }

    /// Drop every node context and open node; registrations stay but are marked inactive
    pub fn reset(&mut self) {
        self.records.clear();
        self.roots.clear();
        self.open.clear();
        for registration in &mut self.registrations {
            registration.active = false;
        }
    }

    /// Whether `path` holds on the current stack
    pub fn matches(&self, path: &LocationPath) -> Result<bool> {
        path.matches(&self.view())
    }

    /// Open a node and report the paths that became true
    pub fn push(&mut self, name: &str, attributes: Vec<NodeAttribute>) -> Result<Vec<MatchEvent>> {
        let record = self.intern(name);
        let occurrences = self.records[record].context.occurrences();
        self.open.push(OpenNode {
            record,
            context: NodeContext::visit(name, attributes, occurrences),
        });
        log::trace!(target: "markup_digester", "push <{}> depth {}", name, self.open.len());
        self.activate()
    }

    /// Close the innermost open node named `name`, discarding any nodes opened after it.
    ///
    /// A name that is not open leaves the stack untouched.
    pub fn pop_named(&mut self, name: &str) -> Result<Vec<MatchEvent>> {
        let Some(index) = self
            .open
            .iter()
            .rposition(|node| node.context.name() == name)
        else {
            log::debug!(target: "markup_digester", "ignoring close of </{}>, not open", name);
            return Ok(Vec::new());
        };
        self.open.truncate(index);
        log::trace!(target: "markup_digester", "pop </{}> depth {}", name, self.open.len());
        self.deactivate()
    }

    /// Close the innermost open node, whatever its name
    pub fn pop(&mut self) -> Result<Vec<MatchEvent>> {
        if let Some(node) = self.open.pop() {
            log::trace!(
                target: "markup_digester",
                "pop <{}/> depth {}",
                node.context.name(),
                self.open.len()
            );
        }
        self.deactivate()
    }

    fn intern(&mut self, name: &str) -> NodeId {
        let parent = self.open.last().map(|node| node.record);
        let siblings = match parent {
            Some(parent) => &self.records[parent].children,
            None => &self.roots,
        };

        if let Some(&id) = siblings.get(name) {
            self.records[id].context.record_visit();
            return id;
        }

        let id = self.records.len();
        self.records.push(NodeRecord {
            context: NodeContext::new(name, Vec::new()),
            children: HashMap::new(),
        });
        let siblings = match parent {
            Some(parent) => &mut self.records[parent].children,
            None => &mut self.roots,
        };
        siblings.insert(name.to_string(), id);
        id
    }

    fn activate(&mut self) -> Result<Vec<MatchEvent>> {
        let view = StackView { open: &self.open };
        let mut events = Vec::new();
        for registration in self.registrations.iter_mut().filter(|r| !r.active) {
            if registration.path.matches(&view)? {
                registration.active = true;
                log::debug!(target: "markup_digester", "begin {} on {}", registration.listener, registration.path);
                events.push(MatchEvent::begin(registration.listener));
            }
        }
        Ok(events)
    }

    fn deactivate(&mut self) -> Result<Vec<MatchEvent>> {
        let view = StackView { open: &self.open };
        let mut events = Vec::new();
        for registration in self.registrations.iter_mut().filter(|r| r.active) {
            if !registration.path.matches(&view)? {
                registration.active = false;
                log::debug!(target: "markup_digester", "end {} on {}", registration.listener, registration.path);
                events.push(MatchEvent::end(registration.listener));
            }
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{Condition, Step};

    fn relative(names: &[&str]) -> LocationPath {
        LocationPath::relative(names.iter().map(|n| Step::new(*n)).collect())
    }

    fn absolute(names: &[&str]) -> LocationPath {
        LocationPath::absolute(names.iter().map(|n| Step::new(*n)).collect())
    }

    fn names(stack: &ContextStack) -> Vec<&str> {
        stack.contexts().map(NodeContext::name).collect()
    }

    #[test]
    fn test_push_pop_mirrors_open_tags() {
        let mut stack = ContextStack::new();
        stack.push("a", Vec::new()).unwrap();
        stack.push("b", Vec::new()).unwrap();
        assert_eq!(names(&stack), vec!["a", "b"]);
        stack.pop_named("b").unwrap();
        assert_eq!(names(&stack), vec!["a"]);
        stack.pop().unwrap();
        assert!(stack.is_empty());
    }

    #[test]
    fn test_pop_named_discards_unclosed_children() {
        let mut stack = ContextStack::new();
        for name in ["a", "b", "c", "d"] {
            stack.push(name, Vec::new()).unwrap();
        }
        stack.pop_named("b").unwrap();
        assert_eq!(names(&stack), vec!["a"]);
    }

    #[test]
    fn test_pop_named_of_unknown_tag_is_ignored() {
        let mut stack = ContextStack::new();
        stack.push("a", Vec::new()).unwrap();
        stack.pop_named("zzz").unwrap();
        assert_eq!(names(&stack), vec!["a"]);
    }

    #[test]
    fn test_revisit_reuses_record_and_counts() {
        let mut stack = ContextStack::new();
        stack.push("a", Vec::new()).unwrap();
        for expected in 1..=3 {
            stack.push("b", Vec::new()).unwrap();
            assert_eq!(stack.top().unwrap().occurrences(), expected);
            stack.pop_named("b").unwrap();
        }
        assert_eq!(stack.memoized(), 2);
        let b = stack.lookup(&PathKey::from_names(&["a", "b"])).unwrap();
        assert_eq!(b.occurrences(), 3);
    }

    #[test]
    fn test_same_name_elsewhere_is_a_different_record() {
        let mut stack = ContextStack::new();
        stack.push("a", Vec::new()).unwrap();
        stack.push("b", Vec::new()).unwrap();
        stack.pop_named("a").unwrap();
        stack.push("b", Vec::new()).unwrap();

        assert_eq!(stack.memoized(), 3);
        assert_eq!(stack.lookup(&PathKey::from_names(&["b"])).unwrap().occurrences(), 1);
        assert_eq!(
            stack.lookup(&PathKey::from_names(&["a", "b"])).unwrap().occurrences(),
            1
        );
        assert!(stack.lookup(&PathKey::from_names(&["b", "a"])).is_none());
    }

    #[test]
    fn test_siblings_share_record_but_keep_their_attributes() {
        let mut stack = ContextStack::new();
        stack.push("a", Vec::new()).unwrap();
        stack.push("b", vec![NodeAttribute::valued("k", "v")]).unwrap();
        assert_eq!(stack.top().unwrap().attribute_value("k"), Some("v"));
        assert_eq!(stack.top().unwrap().occurrences(), 1);
        stack.pop_named("b").unwrap();

        stack.push("b", vec![NodeAttribute::valued("k", "w")]).unwrap();
        assert_eq!(stack.top().unwrap().attribute_value("k"), Some("w"));
        assert_eq!(stack.top().unwrap().occurrences(), 2);

        assert_eq!(stack.memoized(), 2);
        assert_eq!(stack.path_key(), PathKey::from_names(&["a", "b"]));
        let record = stack.lookup(&stack.path_key()).unwrap();
        assert_eq!(record.occurrences(), 2);
        assert!(record.attributes().is_empty());
    }

    #[test]
    fn test_attributed_siblings_keep_memo_bounded() {
        let mut stack = ContextStack::new();
        stack.push("list", Vec::new()).unwrap();
        for i in 0..1000 {
            stack
                .push("item", vec![NodeAttribute::valued("id", i.to_string())])
                .unwrap();
            stack.pop_named("item").unwrap();
        }
        assert_eq!(stack.memoized(), 2);
        let items = stack.lookup(&PathKey::from_names(&["list", "item"])).unwrap();
        assert_eq!(items.occurrences(), 1000);
    }

    #[test]
    fn test_condition_sees_visit_attributes() {
        let mut stack = ContextStack::new();
        let id = ListenerId(4);
        stack
            .register(
                id,
                LocationPath::absolute(vec![
                    Step::new("a"),
                    Step::with_condition("b", Condition::attribute_equals("k", "v")),
                ]),
            )
            .unwrap();
        stack.push("a", Vec::new()).unwrap();
        assert_eq!(
            stack.push("b", vec![NodeAttribute::valued("k", "v")]).unwrap(),
            vec![MatchEvent::begin(id)]
        );
        assert_eq!(stack.pop_named("b").unwrap(), vec![MatchEvent::end(id)]);
        assert!(stack
            .push("b", vec![NodeAttribute::valued("k", "w")])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_events_are_edge_triggered() {
        let mut stack = ContextStack::new();
        let id = ListenerId(7);
        stack.register(id, relative(&["a"])).unwrap();

        assert_eq!(stack.push("a", Vec::new()).unwrap(), vec![MatchEvent::begin(id)]);
        // Unrelated children do not re-fire while the path stays true
        assert!(stack.push("x", Vec::new()).unwrap().is_empty());
        assert!(stack.pop_named("x").unwrap().is_empty());
        assert!(stack.push("y", Vec::new()).unwrap().is_empty());
        assert!(stack.pop().unwrap().is_empty());
        assert!(stack.is_active(id));

        assert_eq!(stack.pop_named("a").unwrap(), vec![MatchEvent::end(id)]);
        assert!(!stack.is_active(id));
    }

    #[test]
    fn test_events_follow_registration_order() {
        let mut stack = ContextStack::new();
        stack.register(ListenerId(2), absolute(&["a"])).unwrap();
        stack.register(ListenerId(1), relative(&["a"])).unwrap();
        assert_eq!(
            stack.push("a", Vec::new()).unwrap(),
            vec![MatchEvent::begin(ListenerId(2)), MatchEvent::begin(ListenerId(1))]
        );
    }

    #[test]
    fn test_index_condition_sees_revisits() {
        let mut stack = ContextStack::new();
        let id = ListenerId(0);
        stack
            .register(
                id,
                LocationPath::relative(vec![Step::with_condition("b", Condition::Index(2))]),
            )
            .unwrap();
        stack.push("a", Vec::new()).unwrap();
        assert!(stack.push("b", Vec::new()).unwrap().is_empty());
        stack.pop_named("b").unwrap();
        assert_eq!(stack.push("b", Vec::new()).unwrap(), vec![MatchEvent::begin(id)]);
    }

    #[test]
    fn test_zero_step_registration_fails() {
        let mut stack = ContextStack::new();
        let err = stack
            .register(ListenerId(0), LocationPath::relative(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, crate::error::DigestError::Configuration(_)));
        assert_eq!(stack.registered(), 0);
    }

    #[test]
    fn test_reset_clears_nodes_and_flags_but_keeps_registrations() {
        let mut stack = ContextStack::new();
        let id = ListenerId(3);
        stack.register(id, relative(&["a"])).unwrap();
        stack.push("a", Vec::new()).unwrap();
        assert!(stack.is_active(id));

        stack.reset();
        assert!(stack.is_empty());
        assert_eq!(stack.memoized(), 0);
        assert!(!stack.is_active(id));
        assert_eq!(stack.registered(), 1);
        assert_eq!(stack.push("a", Vec::new()).unwrap(), vec![MatchEvent::begin(id)]);
        assert_eq!(stack.top().unwrap().occurrences(), 1);
    }

    #[test]
    fn test_unregister_returns_path() {
        let mut stack = ContextStack::new();
        stack.register(ListenerId(1), relative(&["a"])).unwrap();
        assert_eq!(stack.unregister(ListenerId(1)), Some(relative(&["a"])));
        assert_eq!(stack.unregister(ListenerId(1)), None);
        assert!(stack.push("a", Vec::new()).unwrap().is_empty());
    }
}
