// Repository trait for the remote issue tracker
use crate::domain::board::{Board, BoardList, Group, Project};
use crate::domain::issue::Issue;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("issue tracker returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("request to issue tracker failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not decode issue tracker response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type TrackerResult<T> = Result<T, TrackerError>;

#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn list_groups(&self) -> TrackerResult<Vec<Group>>;

    async fn get_group(&self, group_id: u64) -> TrackerResult<Group>;

    async fn list_group_boards(&self, group_id: u64) -> TrackerResult<Vec<Board>>;

    async fn list_group_projects(&self, group_id: u64) -> TrackerResult<Vec<Project>>;

    async fn list_subgroups(&self, group_id: u64) -> TrackerResult<Vec<Group>>;

    async fn get_group_board(&self, group_id: u64, board_id: u64) -> TrackerResult<Board>;

    /// Current list definitions of a group board
    async fn list_group_board_lists(
        &self,
        group_id: u64,
        board_id: u64,
    ) -> TrackerResult<Vec<BoardList>>;

    /// Issues of every project in the group, optionally scoped to a milestone title
    async fn list_group_issues(
        &self,
        group_id: u64,
        milestone: Option<&str>,
    ) -> TrackerResult<Vec<Issue>>;

    /// All non-archived projects visible to the token
    async fn list_projects(&self) -> TrackerResult<Vec<Project>>;

    async fn get_project(&self, project_id: u64) -> TrackerResult<Project>;

    async fn list_project_boards(&self, project_id: u64) -> TrackerResult<Vec<Board>>;

    async fn get_project_board(&self, project_id: u64, board_id: u64) -> TrackerResult<Board>;

    async fn list_project_board_lists(
        &self,
        project_id: u64,
        board_id: u64,
    ) -> TrackerResult<Vec<BoardList>>;

    async fn list_project_issues(
        &self,
        project_id: u64,
        milestone: Option<&str>,
    ) -> TrackerResult<Vec<Issue>>;
}
