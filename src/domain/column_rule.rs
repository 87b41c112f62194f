// Column rules compiled from board list descriptors
use super::board::{BoardList, Label};
use super::condition::{matches_all, Condition};
use super::issue::{Assignee, Issue, STATE_OPENED};
use regex::Regex;
use std::sync::LazyLock;

pub const ASSIGNEE_CLASS_NAME: &str = "assignee";
pub const NOT_IMPLEMENTED_TITLE: &str = "NotImplemented";
pub const NOT_IMPLEMENTED_CLASS_NAME: &str = "notimplemented";

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").expect("valid regex"));

/// The shape of a board list, checked label first, then assignee.
#[derive(Debug, Clone, PartialEq)]
pub enum ListRule {
    Label(Label),
    Assignee(Assignee),
    Unimplemented,
}

impl ListRule {
    pub fn classify(list: &BoardList) -> Self {
        if let Some(label) = list.label.as_ref().filter(|l| !l.name.is_empty()) {
            return ListRule::Label(label.clone());
        }

        match &list.assignee {
            Some(assignee) => ListRule::Assignee(assignee.clone()),
            None => ListRule::Unimplemented,
        }
    }

    pub fn compile(self) -> ColumnRule {
        match self {
            ListRule::Label(label) => ColumnRule {
                class_name: class_name_for(&label.name),
                conditions: vec![
                    Condition::equals("state", STATE_OPENED),
                    Condition::contains("labels", label.name.as_str()),
                ],
                title: label.name,
                color: Some(label.color),
            },
            // Every assignee list shares one class name, so a second assignee
            // list replaces the first on the dashboard.
            ListRule::Assignee(assignee) => ColumnRule {
                title: assignee.name,
                class_name: ASSIGNEE_CLASS_NAME.to_string(),
                color: None,
                conditions: vec![
                    Condition::equals("state", STATE_OPENED),
                    Condition::equals("assignee.id", assignee.id),
                ],
            },
            // TODO: milestone lists, matching on `milestone.title`.
            ListRule::Unimplemented => ColumnRule {
                title: NOT_IMPLEMENTED_TITLE.to_string(),
                class_name: NOT_IMPLEMENTED_CLASS_NAME.to_string(),
                color: None,
                conditions: Vec::new(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRule {
    pub title: String,
    pub class_name: String,
    pub color: Option<String>,
    pub conditions: Vec<Condition>,
}

impl ColumnRule {
    pub fn from_list(list: &BoardList) -> Self {
        ListRule::classify(list).compile()
    }

    /// A rule without conditions claims nothing.
    pub fn matches(&self, issue: &Issue) -> bool {
        !self.conditions.is_empty() && matches_all(issue, &self.conditions)
    }
}

/// Strip every run of non-word characters so the name is usable as a CSS class.
pub fn class_name_for(name: &str) -> String {
    NON_WORD.replace_all(name, "").into_owned()
}
