// Rule conditions evaluated against issue attributes
use super::issue::Issue;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    Contains,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub path: String,
    pub operator: Operator,
    pub value: Value,
}

impl Condition {
    pub fn new(path: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn equals(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(path, Operator::Equals, value)
    }

    pub fn contains(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(path, Operator::Contains, value)
    }

    /// An absent path never matches, whatever the operator.
    pub fn evaluate(&self, issue: &Issue) -> bool {
        let Some(resolved) = issue.resolve(&self.path) else {
            return false;
        };

        match self.operator {
            Operator::Equals => resolved == &self.value,
            Operator::Contains => contains(resolved, &self.value),
        }
    }
}

fn contains(container: &Value, member: &Value) -> bool {
    match (container, member) {
        (Value::Array(items), _) => items.contains(member),
        (Value::String(haystack), Value::String(needle)) => haystack.contains(needle.as_str()),
        (Value::Object(map), Value::String(key)) => map.contains_key(key),
        _ => false,
    }
}

/// A group matches when every condition holds.
pub fn matches_all(issue: &Issue, conditions: &[Condition]) -> bool {
    conditions.iter().all(|condition| condition.evaluate(issue))
}
