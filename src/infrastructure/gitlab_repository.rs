// GitLab REST repository implementation
use crate::application::issue_tracker::{IssueTracker, TrackerError, TrackerResult};
use crate::domain::board::{Board, BoardList, Group, Project};
use crate::domain::issue::Issue;
use async_trait::async_trait;
use futures::stream::{FuturesOrdered, StreamExt};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Instant;

const TOTAL_PAGES_HEADER: &str = "x-total-pages";
const NEXT_PAGE_HEADER: &str = "x-next-page";

#[derive(Debug, Clone)]
pub struct GitLabRepository {
    client: reqwest::Client,
    host: String,
    token: String,
    per_page: u32,
    page_concurrency: usize,
}

struct Page<T> {
    items: Vec<T>,
    total_pages: Option<u32>,
    next_page: Option<u32>,
}

impl GitLabRepository {
    pub fn new(
        host: String,
        token: String,
        user_agent: &str,
        per_page: u32,
        page_concurrency: usize,
    ) -> TrackerResult<Self> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;

        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            token,
            per_page: per_page.max(1),
            page_concurrency: page_concurrency.max(1),
        })
    }

    /// `params` values are url-encoded here.
    fn build_url(&self, path: &str, params: &[(&str, String)]) -> String {
        let mut url = format!("{}/api/v4{}", self.host, path);
        for (i, (key, value)) in params.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    async fn get(&self, url: &str, what: &str) -> TrackerResult<(HeaderMap, bytes::Bytes)> {
        let response = self
            .client
            .get(url)
            .header("PRIVATE-TOKEN", &self.token)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TrackerError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            return Err(TrackerError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok((headers, body))
    }

    async fn fetch_one<T: DeserializeOwned>(&self, path: &str, what: &str) -> TrackerResult<T> {
        let url = self.build_url(path, &[]);
        let (_, body) = self.get(&url, what).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        page: u32,
    ) -> TrackerResult<Page<T>> {
        let mut params = params.to_vec();
        params.push(("per_page", self.per_page.to_string()));
        params.push(("page", page.to_string()));
        let url = self.build_url(path, &params);

        let (headers, body) = self.get(&url, path).await?;
        Ok(Page {
            items: serde_json::from_slice(&body)?,
            total_pages: header_number(&headers, TOTAL_PAGES_HEADER),
            next_page: header_number(&headers, NEXT_PAGE_HEADER),
        })
    }

    /// Fetch every page of a collection. When the first page reports the page
    /// count the rest are fetched concurrently; otherwise `x-next-page` is
    /// followed one page at a time.
    async fn fetch_collection<T: DeserializeOwned + Send>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> TrackerResult<Vec<T>> {
        let start = Instant::now();
        let first: Page<T> = self.fetch_page(path, params, 1).await?;
        let mut items = first.items;

        match first.total_pages {
            Some(total) if total > 1 => {
                let mut pending = FuturesOrdered::new();
                let mut next_page = 2;
                while next_page <= total && pending.len() < self.page_concurrency {
                    pending.push_back(self.fetch_page::<T>(path, params, next_page));
                    next_page += 1;
                }

                while let Some(fetched) = pending.next().await {
                    items.extend(fetched?.items);
                    if next_page <= total {
                        pending.push_back(self.fetch_page::<T>(path, params, next_page));
                        next_page += 1;
                    }
                }
            }
            Some(_) => {}
            None => {
                let mut next = first.next_page;
                while let Some(page) = next {
                    let fetched: Page<T> = self.fetch_page(path, params, page).await?;
                    items.extend(fetched.items);
                    next = fetched.next_page;
                }
            }
        }

        tracing::info!(
            "Fetched {} objects from {} in {:?}",
            items.len(),
            path,
            start.elapsed()
        );
        Ok(items)
    }
}

impl GitLabRepository {
    /// Board lists are decoded one by one; a malformed entry becomes a
    /// placeholder list rather than failing the page.
    async fn fetch_board_lists(&self, path: &str) -> TrackerResult<Vec<BoardList>> {
        let values: Vec<serde_json::Value> = self.fetch_collection(path, &[]).await?;
        Ok(values.into_iter().map(BoardList::from_value).collect())
    }
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<u32> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn milestone_params(milestone: Option<&str>) -> Vec<(&'static str, String)> {
    milestone
        .map(|title| vec![("milestone", title.to_string())])
        .unwrap_or_default()
}

#[async_trait]
impl IssueTracker for GitLabRepository {
    async fn list_groups(&self) -> TrackerResult<Vec<Group>> {
        self.fetch_collection("/groups", &[]).await
    }

    async fn get_group(&self, group_id: u64) -> TrackerResult<Group> {
        self.fetch_one(&format!("/groups/{group_id}"), &format!("group {group_id}"))
            .await
    }

    async fn list_group_boards(&self, group_id: u64) -> TrackerResult<Vec<Board>> {
        self.fetch_collection(&format!("/groups/{group_id}/boards"), &[])
            .await
    }

    async fn list_group_projects(&self, group_id: u64) -> TrackerResult<Vec<Project>> {
        self.fetch_collection(
            &format!("/groups/{group_id}/projects"),
            &[("archived", "false".to_string())],
        )
        .await
    }

    async fn list_subgroups(&self, group_id: u64) -> TrackerResult<Vec<Group>> {
        self.fetch_collection(&format!("/groups/{group_id}/subgroups"), &[])
            .await
    }

    async fn get_group_board(&self, group_id: u64, board_id: u64) -> TrackerResult<Board> {
        self.fetch_one(
            &format!("/groups/{group_id}/boards/{board_id}"),
            &format!("board {board_id}"),
        )
        .await
    }

    async fn list_group_board_lists(
        &self,
        group_id: u64,
        board_id: u64,
    ) -> TrackerResult<Vec<BoardList>> {
        self.fetch_board_lists(&format!("/groups/{group_id}/boards/{board_id}/lists"))
            .await
    }

    async fn list_group_issues(
        &self,
        group_id: u64,
        milestone: Option<&str>,
    ) -> TrackerResult<Vec<Issue>> {
        self.fetch_collection(
            &format!("/groups/{group_id}/issues"),
            &milestone_params(milestone),
        )
        .await
    }

    async fn list_projects(&self) -> TrackerResult<Vec<Project>> {
        self.fetch_collection("/projects", &[("archived", "false".to_string())])
            .await
    }

    async fn get_project(&self, project_id: u64) -> TrackerResult<Project> {
        self.fetch_one(
            &format!("/projects/{project_id}"),
            &format!("project {project_id}"),
        )
        .await
    }

    async fn list_project_boards(&self, project_id: u64) -> TrackerResult<Vec<Board>> {
        self.fetch_collection(&format!("/projects/{project_id}/boards"), &[])
            .await
    }

    async fn get_project_board(&self, project_id: u64, board_id: u64) -> TrackerResult<Board> {
        self.fetch_one(
            &format!("/projects/{project_id}/boards/{board_id}"),
            &format!("board {board_id}"),
        )
        .await
    }

    async fn list_project_board_lists(
        &self,
        project_id: u64,
        board_id: u64,
    ) -> TrackerResult<Vec<BoardList>> {
        self.fetch_board_lists(&format!("/projects/{project_id}/boards/{board_id}/lists"))
            .await
    }

    async fn list_project_issues(
        &self,
        project_id: u64,
        milestone: Option<&str>,
    ) -> TrackerResult<Vec<Issue>> {
        self.fetch_collection(
            &format!("/projects/{project_id}/issues"),
            &milestone_params(milestone),
        )
        .await
    }
}
