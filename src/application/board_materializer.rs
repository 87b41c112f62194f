// Board materializer - Partitions a board's issues into dashboard columns
use crate::domain::board::BoardList;
use crate::domain::column_rule::ColumnRule;
use crate::domain::dashboard::Dashboard;
use crate::domain::issue::Issue;

/// Build a dashboard from board lists in input order. Each rule claims only
/// what is still in the backlog, so the first matching rule wins.
pub fn materialize(lists: &[BoardList], issues: Vec<Issue>) -> Dashboard {
    let mut dashboard = Dashboard::new(issues);

    for list in lists {
        let rule = ColumnRule::from_list(list);
        dashboard.add_column(rule.title.clone(), rule.class_name.clone(), rule.color.clone());
        let moved = dashboard.move_from_backlog(&rule.class_name, |issue| rule.matches(issue));

        tracing::debug!(
            "Column {} ({}) claimed {} issues",
            rule.class_name,
            rule.title,
            moved.len()
        );
    }

    tracing::debug!(
        "Materialized {} columns holding {} issues",
        dashboard.len(),
        dashboard.total()
    );
    dashboard
}
