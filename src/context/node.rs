//! Node attributes, node contexts and path keys

/// A name with an optional value, as written in a tag
#[derive(Debug, Clone)]
pub struct NodeAttribute {
    name: String,
    value: Option<String>,
}

impl NodeAttribute {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        NodeAttribute {
            name: name.into(),
            value,
        }
    }

    pub fn valued(name: impl Into<String>, value: impl Into<String>) -> Self {
        NodeAttribute::new(name, Some(value.into()))
    }

    pub fn valueless(name: impl Into<String>) -> Self {
        NodeAttribute::new(name, None)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Exact equality: same name and same value, absent only matching absent
    pub fn is_identical(&self, other: &NodeAttribute) -> bool {
        self.name == other.name && self.value == other.value
    }
}

/// Attributes are equal when their names match and their values match or either value is
/// absent. This relation is not transitive, so `NodeAttribute` is not `Eq`.
impl PartialEq for NodeAttribute {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && match (&self.value, &other.value) {
                (Some(left), Some(right)) => left == right,
                _ => true,
            }
    }
}

/// One observed tag at a structural position
#[derive(Debug, Clone, PartialEq)]
pub struct NodeContext {
    name: String,
    attributes: Vec<NodeAttribute>,
    occurrences: usize,
}

impl NodeContext {
    pub fn new(name: impl Into<String>, attributes: Vec<NodeAttribute>) -> Self {
        NodeContext {
            name: name.into(),
            attributes,
            occurrences: 1,
        }
    }

    /// The context of one visit to a position entered `occurrences` times so far
    pub(crate) fn visit(
        name: impl Into<String>,
        attributes: Vec<NodeAttribute>,
        occurrences: usize,
    ) -> Self {
        NodeContext {
            name: name.into(),
            attributes,
            occurrences,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes in document order
    pub fn attributes(&self) -> &[NodeAttribute] {
        &self.attributes
    }

    /// First attribute with this name
    pub fn attribute(&self, name: &str) -> Option<&NodeAttribute> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }

    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(NodeAttribute::value)
    }

    /// How many times this position has been entered, starting at 1
    pub fn occurrences(&self) -> usize {
        self.occurrences
    }

    pub(crate) fn record_visit(&mut self) {
        self.occurrences += 1;
    }
}

/// Structural identity of a stack position: the ancestor names from the root down to the
/// node, inclusive
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PathKey(Vec<String>);

impl PathKey {
    pub fn new(names: Vec<String>) -> Self {
        PathKey(names)
    }

    pub fn from_names(names: &[&str]) -> Self {
        PathKey(names.iter().map(|name| name.to_string()).collect())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
