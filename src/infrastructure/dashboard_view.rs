// Mapper from a materialized board to the render model
use crate::application::board_service::BoardDashboard;
use crate::domain::dashboard::{Column, DEFAULT_COLUMN_COLOR};
use crate::domain::issue::Issue;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub group: String,
    pub project: Option<String>,
    pub board: Option<String>,
    pub milestone: Option<String>,
    pub columns: Vec<ColumnView>,
    pub colors: Vec<ColorView>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ColumnView {
    pub class_name: String,
    pub title: String,
    pub color: String,
    pub position: usize,
    pub issue_count: usize,
    pub issues: Vec<IssueView>,
}

#[derive(Debug, Serialize)]
pub struct ColorView {
    pub class_name: String,
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct IssueView {
    pub id: u64,
    pub iid: u64,
    pub project_id: u64,
    pub project_name: Option<String>,
    pub title: String,
    pub state: String,
    pub web_url: Option<String>,
    pub labels: Vec<String>,
    pub assignee_name: Option<String>,
    pub milestone: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub fn dashboard_to_view(board: &BoardDashboard) -> DashboardView {
    let dashboard = &board.dashboard;

    let columns = dashboard
        .columns_by_position()
        .into_iter()
        .map(|c| column_to_view(c, &board.project_names))
        .collect();

    let colors = dashboard
        .colors()
        .into_iter()
        .map(|(class_name, color)| ColorView {
            class_name,
            color: color.unwrap_or_else(|| DEFAULT_COLUMN_COLOR.to_string()),
        })
        .collect();

    DashboardView {
        group: board.group.name.clone(),
        project: board.project.as_ref().map(|p| p.name.clone()),
        board: board.board.name.clone(),
        milestone: board.board.milestone_title().map(str::to_string),
        columns,
        colors,
        total: dashboard.total(),
    }
}

fn column_to_view(column: &Column, project_names: &HashMap<u64, String>) -> ColumnView {
    ColumnView {
        class_name: column.class_name.clone(),
        title: column.title.clone(),
        color: column
            .color
            .clone()
            .unwrap_or_else(|| DEFAULT_COLUMN_COLOR.to_string()),
        position: column.position,
        issue_count: column.issue_count(),
        issues: column
            .issues
            .iter()
            .map(|i| issue_to_view(i, project_names))
            .collect(),
    }
}

fn issue_to_view(issue: &Issue, project_names: &HashMap<u64, String>) -> IssueView {
    IssueView {
        id: issue.id,
        iid: issue.iid,
        project_id: issue.project_id,
        project_name: project_names.get(&issue.project_id).cloned(),
        title: issue.title.clone(),
        state: issue.state.clone(),
        web_url: issue.web_url.clone(),
        labels: issue.labels.clone(),
        assignee_name: issue.assignee.as_ref().map(|a| a.name.clone()),
        milestone: issue.milestone.as_ref().map(|m| m.title.clone()),
        updated_at: issue.updated_at,
    }
}
