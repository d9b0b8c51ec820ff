//! Step conditions
//!
//! A condition is a predicate over one [`NodeContext`]. Each variant has one evaluation rule;
//! comparison operators go through a small symbol table shared by parsing and printing.

use std::fmt;
use std::str::FromStr;

use crate::context::NodeContext;

/// Comparison operators, in the order the compiler tries them (two-character symbols first)
const OPERATORS: [(&str, Operator); 6] = [
    ("<=", Operator::LessOrEqual),
    (">=", Operator::GreaterOrEqual),
    ("!=", Operator::NotEqual),
    ("<", Operator::Less),
    (">", Operator::Greater),
    ("=", Operator::Equal),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
    NotEqual,
}

impl Operator {
    pub fn symbols() -> impl Iterator<Item = &'static str> {
        OPERATORS.iter().map(|(symbol, _)| *symbol)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Less => "<",
            Operator::LessOrEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
        }
    }

    /// Whether the operands are coerced to numbers before comparing
    pub fn is_numeric(self) -> bool {
        !matches!(self, Operator::Equal | Operator::NotEqual)
    }

    /// Compare `lhs` against `rhs`.
    ///
    /// `=` and `!=` compare the raw strings. The ordering operators parse both sides as
    /// floats; an operand that does not parse counts as 0.
    pub fn compare(self, lhs: &str, rhs: &str) -> bool {
        match self {
            Operator::Equal => lhs == rhs,
            Operator::NotEqual => lhs != rhs,
            Operator::Less => numeric(lhs) < numeric(rhs),
            Operator::LessOrEqual => numeric(lhs) <= numeric(rhs),
            Operator::Greater => numeric(lhs) > numeric(rhs),
            Operator::GreaterOrEqual => numeric(lhs) >= numeric(rhs),
        }
    }
}

fn numeric(operand: &str) -> f64 {
    operand.trim().parse::<f64>().unwrap_or(0.0)
}

/// Literals printed without quotes
fn is_bare_number(value: &str) -> bool {
    value.parse::<f64>().is_ok()
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OPERATORS
            .iter()
            .find(|(symbol, _)| *symbol == s)
            .map(|(_, op)| *op)
            .ok_or_else(|| format!("unknown operator '{}'", s))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Left-hand side of a comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    /// `@name`: the value of the named attribute
    Attribute(String),
    /// `name`: the node's own name
    Node(String),
}

impl Identifier {
    /// The operand this identifier denotes on `node`, `None` when the attribute is absent.
    /// A valueless attribute resolves to the empty string.
    pub fn resolve<'n>(&self, node: &'n NodeContext) -> Option<&'n str> {
        match self {
            Identifier::Attribute(name) => node
                .attribute(name)
                .map(|attribute| attribute.value().unwrap_or("")),
            Identifier::Node(_) => Some(node.name()),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Attribute(name) => write!(f, "@{}", name),
            Identifier::Node(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Holds when the node carries this name
    Name(String),
    Comparison {
        identifier: Identifier,
        operator: Operator,
        value: String,
    },
    /// Holds when the node's occurrence counter equals the index (1-based)
    Index(usize),
}

impl Condition {
    pub fn comparison(identifier: Identifier, operator: Operator, value: impl Into<String>) -> Self {
        Condition::Comparison {
            identifier,
            operator,
            value: value.into(),
        }
    }

    pub fn attribute_equals(name: impl Into<String>, value: impl Into<String>) -> Self {
        Condition::comparison(Identifier::Attribute(name.into()), Operator::Equal, value)
    }

    pub fn evaluate(&self, node: &NodeContext) -> bool {
        match self {
            Condition::Name(name) => node.name() == name,
            Condition::Comparison {
                identifier,
                operator,
                value,
            } => identifier
                .resolve(node)
                .is_some_and(|operand| operator.compare(operand, value)),
            Condition::Index(index) => node.occurrences() == *index,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Name(name) => f.write_str(name),
            Condition::Comparison {
                identifier,
                operator,
                value,
            } => {
                if is_bare_number(value) {
                    write!(f, "{}{}{}", identifier, operator, value)
                } else if value.contains('\'') {
                    write!(f, "{}{}\"{}\"", identifier, operator, value)
                } else {
                    write!(f, "{}{}'{}'", identifier, operator, value)
                }
            }
            Condition::Index(index) => write!(f, "{}", index),
        }
    }
}
