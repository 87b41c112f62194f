// Dashboard domain model - issues partitioned into ordered columns
use super::condition::{matches_all, Condition};
use super::issue::{Issue, STATE_CLOSED};
use indexmap::IndexMap;
use std::collections::HashSet;

pub const BACKLOG: &str = "backlog";
pub const CLOSED: &str = "closed";
pub const DEFAULT_COLUMN_COLOR: &str = "#428bca";

const BACKLOG_COLOR: &str = "#767676";
const CLOSED_COLOR: &str = "#21ba45";

#[derive(Debug, Clone)]
pub struct Column {
    pub title: String,
    pub class_name: String,
    pub position: usize,
    pub color: Option<String>,
    pub issues: Vec<Issue>,
}

impl Column {
    pub fn new(title: String, class_name: String, position: usize, color: Option<String>) -> Self {
        Self {
            title,
            class_name,
            position,
            color,
            issues: Vec::new(),
        }
    }

    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }
}

/// Columns keyed by class name. `backlog` and `closed` always exist; rule
/// columns are added in between and `closed` keeps the last position.
#[derive(Debug, Clone)]
pub struct Dashboard {
    columns: IndexMap<String, Column>,
}

impl Dashboard {
    /// Start with every issue in the backlog, then move the closed ones out.
    /// Issues sharing an id are kept once.
    pub fn new(issues: Vec<Issue>) -> Self {
        let mut seen = HashSet::new();
        let issues: Vec<Issue> = issues.into_iter().filter(|i| seen.insert(i.id)).collect();

        let mut backlog = Column::new(
            "Backlog".to_string(),
            BACKLOG.to_string(),
            0,
            Some(BACKLOG_COLOR.to_string()),
        );
        backlog.issues = issues;
        let closed = Column::new(
            "Closed".to_string(),
            CLOSED.to_string(),
            1,
            Some(CLOSED_COLOR.to_string()),
        );

        let mut columns = IndexMap::new();
        columns.insert(BACKLOG.to_string(), backlog);
        columns.insert(CLOSED.to_string(), closed);

        let mut dashboard = Self { columns };
        let closed_condition = [Condition::equals("state", STATE_CLOSED)];
        dashboard.move_from_backlog(CLOSED, |issue| matches_all(issue, &closed_condition));
        dashboard
    }

    /// Insert a column just before `closed`. An existing column with the same
    /// class name is replaced, issues included.
    pub fn add_column(&mut self, title: String, class_name: String, color: Option<String>) {
        let num_columns = self.columns.len();
        let column = Column::new(title, class_name.clone(), num_columns - 1, color);
        self.columns.insert(class_name, column);

        if let Some(closed) = self.columns.get_mut(CLOSED) {
            closed.position = num_columns;
        }
    }

    /// Move the backlog issues accepted by `predicate` into `class_name`,
    /// replacing that column's issues. Returns the ids that moved.
    pub fn move_from_backlog<F>(&mut self, class_name: &str, predicate: F) -> Vec<u64>
    where
        F: Fn(&Issue) -> bool,
    {
        if class_name == BACKLOG || !self.columns.contains_key(class_name) {
            return Vec::new();
        }

        let Some(backlog) = self.columns.get_mut(BACKLOG) else {
            return Vec::new();
        };
        let (matched, remaining): (Vec<Issue>, Vec<Issue>) =
            std::mem::take(&mut backlog.issues).into_iter().partition(|i| predicate(i));
        backlog.issues = remaining;

        let moved = matched.iter().map(|i| i.id).collect();
        if let Some(column) = self.columns.get_mut(class_name) {
            column.issues = matched;
        }
        moved
    }

    #[cfg(test)]
    pub fn column(&self, class_name: &str) -> Option<&Column> {
        self.columns.get(class_name)
    }

    /// Columns in render order, left to right.
    pub fn columns_by_position(&self) -> Vec<&Column> {
        let mut columns: Vec<&Column> = self.columns.values().collect();
        columns.sort_by_key(|c| c.position);
        columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// `(class_name, color)` pairs for stylesheet generation.
    pub fn colors(&self) -> Vec<(String, Option<String>)> {
        self.columns
            .values()
            .map(|c| (c.class_name.clone(), c.color.clone()))
            .collect()
    }

    pub fn total(&self) -> usize {
        self.columns.values().map(Column::issue_count).sum()
    }

    #[cfg(test)]
    pub fn issue_ids(&self) -> Vec<u64> {
        self.columns
            .values()
            .flat_map(|c| c.issues.iter().map(|i| i.id))
            .collect()
    }
}
