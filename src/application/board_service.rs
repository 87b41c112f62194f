// Board service - Use cases for browsing groups, projects and board dashboards
use crate::application::board_materializer::materialize;
use crate::application::issue_tracker::{IssueTracker, TrackerResult};
use crate::application::object_cache::ObjectCache;
use crate::domain::board::{Board, BoardList, Group, Project};
use crate::domain::dashboard::Dashboard;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize)]
pub struct GroupDetails {
    pub group: Group,
    pub boards: Vec<Board>,
    pub projects: Vec<Project>,
    pub subgroups: Vec<Group>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectBoards {
    pub group: Group,
    pub project: Project,
    pub boards: Vec<Board>,
}

/// A materialized board together with what the view needs around it.
#[derive(Debug, Clone)]
pub struct BoardDashboard {
    pub group: Group,
    pub project: Option<Project>,
    pub board: Board,
    pub dashboard: Dashboard,
    pub project_names: HashMap<u64, String>,
}

pub struct BoardService {
    tracker: Arc<dyn IssueTracker>,
    groups: ObjectCache<Group>,
    projects: ObjectCache<Project>,
    boards: ObjectCache<Board>,
    // Ids from the last full non-archived project listing. The project cache
    // also holds projects fetched one at a time, so it cannot stand in for it.
    active_projects: RwLock<Option<HashSet<u64>>>,
}

impl BoardService {
    pub fn new(tracker: Arc<dyn IssueTracker>) -> Self {
        Self {
            tracker,
            groups: ObjectCache::new(),
            projects: ObjectCache::new(),
            boards: ObjectCache::new(),
            active_projects: RwLock::new(None),
        }
    }

    /// Prefetch groups and projects. Failures only leave the caches cold.
    pub async fn warm_cache(&self) {
        if let Err(e) = self.load_groups().await {
            tracing::warn!("Could not prefetch groups: {}", e);
        }
        if let Err(e) = self.load_projects().await {
            tracing::warn!("Could not prefetch projects: {}", e);
        }
    }

    async fn load_groups(&self) -> TrackerResult<()> {
        let start = Instant::now();
        let groups = self.tracker.list_groups().await?;
        self.groups.insert_all(groups.into_iter().map(|g| (g.id, g))).await;
        tracing::info!("Cached {} groups in {:?}", self.groups.len().await, start.elapsed());
        Ok(())
    }

    async fn load_projects(&self) -> TrackerResult<HashSet<u64>> {
        let start = Instant::now();
        let projects = self.tracker.list_projects().await?;
        let ids: HashSet<u64> = projects.iter().map(|p| p.id).collect();
        self.projects.insert_all(projects.into_iter().map(|p| (p.id, p))).await;
        *self.active_projects.write().await = Some(ids.clone());
        tracing::info!("Cached {} projects in {:?}", ids.len(), start.elapsed());
        Ok(ids)
    }

    async fn active_projects(&self) -> TrackerResult<HashSet<u64>> {
        let loaded = self.active_projects.read().await.clone();
        match loaded {
            Some(ids) => Ok(ids),
            None => self.load_projects().await,
        }
    }

    pub async fn list_groups(&self) -> TrackerResult<Vec<Group>> {
        if self.groups.is_empty().await {
            self.load_groups().await?;
        }

        let mut groups: Vec<Group> = self
            .groups
            .values()
            .await
            .iter()
            .map(|g| (**g).clone())
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(groups)
    }

    pub async fn group_details(&self, group_id: u64) -> TrackerResult<GroupDetails> {
        let group = self.group(group_id).await?;
        let boards = self.tracker.list_group_boards(group_id).await?;
        let projects = self.tracker.list_group_projects(group_id).await?;
        let subgroups = self.tracker.list_subgroups(group_id).await?;

        Ok(GroupDetails {
            group: (*group).clone(),
            boards,
            projects,
            subgroups,
        })
    }

    pub async fn project_boards(&self, project_id: u64) -> TrackerResult<ProjectBoards> {
        let project = self.project(project_id).await?;
        let group = self.group(project.namespace.id).await?;
        let boards = self.tracker.list_project_boards(project_id).await?;

        Ok(ProjectBoards {
            group: (*group).clone(),
            project: (*project).clone(),
            boards,
        })
    }

    /// The board itself is cached; its lists are fetched on every call.
    pub async fn project_board(
        &self,
        project_id: u64,
        board_id: u64,
    ) -> TrackerResult<BoardDashboard> {
        let project = self.project(project_id).await?;
        let group = self.group(project.namespace.id).await?;
        let board = self
            .boards
            .get_or_fetch(board_id, move || {
                self.tracker.get_project_board(project_id, board_id)
            })
            .await?;
        let lists = self
            .tracker
            .list_project_board_lists(project_id, board_id)
            .await?;

        let issues = self
            .tracker
            .list_project_issues(project_id, board.milestone_title())
            .await?;
        tracing::debug!(
            "Materializing project board {} with {} lists and {} issues",
            board_id,
            lists.len(),
            issues.len()
        );

        let dashboard = materialize(&lists, issues);

        Ok(BoardDashboard {
            group: (*group).clone(),
            project: Some((*project).clone()),
            board: with_lists(&board, lists),
            dashboard,
            project_names: self.project_names().await,
        })
    }

    /// Group boards only show issues of non-archived projects.
    pub async fn group_board(
        &self,
        group_id: u64,
        board_id: u64,
    ) -> TrackerResult<BoardDashboard> {
        let group = self.group(group_id).await?;
        let board = self
            .boards
            .get_or_fetch(board_id, move || self.tracker.get_group_board(group_id, board_id))
            .await?;
        let lists = self
            .tracker
            .list_group_board_lists(group_id, board_id)
            .await?;
        let active_projects = self.active_projects().await?;

        let issues: Vec<_> = self
            .tracker
            .list_group_issues(group_id, board.milestone_title())
            .await?
            .into_iter()
            .filter(|issue| active_projects.contains(&issue.project_id))
            .collect();
        tracing::debug!(
            "Materializing group board {} with {} lists and {} issues",
            board_id,
            lists.len(),
            issues.len()
        );

        let dashboard = materialize(&lists, issues);

        Ok(BoardDashboard {
            group: (*group).clone(),
            project: None,
            board: with_lists(&board, lists),
            dashboard,
            project_names: self.project_names().await,
        })
    }

    async fn group(&self, group_id: u64) -> TrackerResult<Arc<Group>> {
        self.groups
            .get_or_fetch(group_id, move || self.tracker.get_group(group_id))
            .await
    }

    async fn project(&self, project_id: u64) -> TrackerResult<Arc<Project>> {
        self.projects
            .get_or_fetch(project_id, move || self.tracker.get_project(project_id))
            .await
    }

    async fn project_names(&self) -> HashMap<u64, String> {
        self.projects
            .values()
            .await
            .iter()
            .map(|p| (p.id, p.name.clone()))
            .collect()
    }
}

fn with_lists(board: &Board, lists: Vec<BoardList>) -> Board {
    Board {
        lists,
        ..board.clone()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::issue_tracker::TrackerError;
    use crate::domain::dashboard::{BACKLOG, CLOSED};
    use crate::domain::issue::Issue;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory tracker: one group (1) with projects 10 and 12, an archived
    /// project (11) that `list_projects` omits, and one board (100).
    #[derive(Default)]
    pub(crate) struct FakeTracker {
        pub(crate) group_fetches: AtomicUsize,
        pub(crate) board_fetches: AtomicUsize,
        pub(crate) list_fetches: AtomicUsize,
        pub(crate) milestones_seen: Mutex<Vec<Option<String>>>,
        /// Lists returned instead of the board's own once set.
        pub(crate) edited_lists: Mutex<Option<Vec<BoardList>>>,
    }

    impl FakeTracker {
        fn board_lists(&self, board_id: u64) -> TrackerResult<Vec<BoardList>> {
            self.list_fetches.fetch_add(1, Ordering::SeqCst);
            if board_id != 100 {
                return Err(TrackerError::NotFound(format!("board {board_id}")));
            }
            Ok(self
                .edited_lists
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| board().lists))
        }
    }

    fn from_json<T: serde::de::DeserializeOwned>(value: Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    fn group() -> Group {
        from_json(json!({"id": 1, "name": "Platform"}))
    }

    fn project() -> Project {
        from_json(json!({"id": 10, "name": "api", "namespace": {"id": 1}}))
    }

    fn other_project() -> Project {
        from_json(json!({"id": 12, "name": "web", "namespace": {"id": 1}}))
    }

    fn board() -> Board {
        from_json(json!({
            "id": 100,
            "name": "Development",
            "milestone": {"title": "Sprint 3"},
            "lists": [
                {"id": 1, "label": {"name": "status:wip", "color": "#7f8c8d"}, "assignee": null},
                {"id": 2, "label": null, "assignee": {"id": 5, "name": "Ada"}}
            ]
        }))
    }

    fn issues() -> Vec<Issue> {
        from_json(json!([
            {"id": 1, "project_id": 10, "state": "opened", "labels": ["status:wip"]},
            {
                "id": 2, "project_id": 10, "state": "opened", "labels": [],
                "assignee": {"id": 5, "name": "Ada"}
            },
            {"id": 3, "project_id": 10, "state": "closed", "labels": ["status:wip"]},
            {"id": 4, "project_id": 10, "state": "opened", "labels": []},
            {"id": 5, "project_id": 11, "state": "opened", "labels": ["status:wip"]},
            {"id": 6, "project_id": 12, "state": "opened", "labels": []}
        ]))
    }

    #[async_trait]
    impl IssueTracker for FakeTracker {
        async fn list_groups(&self) -> TrackerResult<Vec<Group>> {
            Ok(vec![
                from_json(json!({"id": 2, "name": "Web"})),
                group(),
            ])
        }

        async fn get_group(&self, group_id: u64) -> TrackerResult<Group> {
            self.group_fetches.fetch_add(1, Ordering::SeqCst);
            match group_id {
                1 => Ok(group()),
                _ => Err(TrackerError::NotFound(format!("group {group_id}"))),
            }
        }

        async fn list_group_boards(&self, _group_id: u64) -> TrackerResult<Vec<Board>> {
            Ok(vec![board()])
        }

        async fn list_group_projects(&self, _group_id: u64) -> TrackerResult<Vec<Project>> {
            Ok(vec![project()])
        }

        async fn list_subgroups(&self, _group_id: u64) -> TrackerResult<Vec<Group>> {
            Ok(Vec::new())
        }

        async fn get_group_board(&self, _group_id: u64, board_id: u64) -> TrackerResult<Board> {
            self.board_fetches.fetch_add(1, Ordering::SeqCst);
            match board_id {
                100 => Ok(board()),
                _ => Err(TrackerError::NotFound(format!("board {board_id}"))),
            }
        }

        async fn list_group_board_lists(
            &self,
            _group_id: u64,
            board_id: u64,
        ) -> TrackerResult<Vec<BoardList>> {
            self.board_lists(board_id)
        }

        async fn list_group_issues(
            &self,
            _group_id: u64,
            milestone: Option<&str>,
        ) -> TrackerResult<Vec<Issue>> {
            self.milestones_seen.lock().unwrap().push(milestone.map(str::to_string));
            Ok(issues())
        }

        async fn list_projects(&self) -> TrackerResult<Vec<Project>> {
            Ok(vec![project(), other_project()])
        }

        async fn get_project(&self, project_id: u64) -> TrackerResult<Project> {
            match project_id {
                10 => Ok(project()),
                12 => Ok(other_project()),
                _ => Err(TrackerError::NotFound(format!("project {project_id}"))),
            }
        }

        async fn list_project_boards(&self, _project_id: u64) -> TrackerResult<Vec<Board>> {
            Ok(vec![board()])
        }

        async fn get_project_board(&self, project_id: u64, board_id: u64) -> TrackerResult<Board> {
            self.get_group_board(project_id, board_id).await
        }

        async fn list_project_board_lists(
            &self,
            _project_id: u64,
            board_id: u64,
        ) -> TrackerResult<Vec<BoardList>> {
            self.board_lists(board_id)
        }

        async fn list_project_issues(
            &self,
            _project_id: u64,
            milestone: Option<&str>,
        ) -> TrackerResult<Vec<Issue>> {
            self.milestones_seen.lock().unwrap().push(milestone.map(str::to_string));
            Ok(issues().into_iter().filter(|i| i.project_id == 10).collect())
        }
    }

    fn ids(dashboard: &Dashboard, class_name: &str) -> Vec<u64> {
        dashboard
            .column(class_name)
            .map(|c| c.issues.iter().map(|i| i.id).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_list_groups_sorted_by_name() {
        let service = BoardService::new(Arc::new(FakeTracker::default()));
        let names: Vec<String> = service
            .list_groups()
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();

        assert_eq!(names, vec!["Platform".to_string(), "Web".to_string()]);
    }

    #[tokio::test]
    async fn test_project_board() {
        let tracker = Arc::new(FakeTracker::default());
        let service = BoardService::new(tracker.clone());

        let result = service.project_board(10, 100).await.unwrap();
        let dashboard = &result.dashboard;

        assert_eq!(ids(dashboard, "statuswip"), vec![1]);
        assert_eq!(ids(dashboard, "assignee"), vec![2]);
        assert_eq!(ids(dashboard, CLOSED), vec![3]);
        assert_eq!(ids(dashboard, BACKLOG), vec![4]);
        assert_eq!(result.group.name, "Platform");
        assert_eq!(
            tracker.milestones_seen.lock().unwrap().as_slice(),
            &[Some("Sprint 3".to_string())]
        );
    }

    #[tokio::test]
    async fn test_group_board_drops_issues_of_unknown_projects() {
        let service = BoardService::new(Arc::new(FakeTracker::default()));

        let result = service.group_board(1, 100).await.unwrap();

        assert!(result.project.is_none());
        assert!(!result.dashboard.issue_ids().contains(&5));
        assert!(result.dashboard.issue_ids().contains(&6));
        assert_eq!(result.dashboard.total(), 5);
        assert_eq!(result.project_names.get(&10).map(String::as_str), Some("api"));
    }

    #[tokio::test]
    async fn test_group_and_board_are_cached() {
        let tracker = Arc::new(FakeTracker::default());
        let service = BoardService::new(tracker.clone());

        service.group_board(1, 100).await.unwrap();
        service.group_board(1, 100).await.unwrap();

        assert_eq!(tracker.group_fetches.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.board_fetches.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.milestones_seen.lock().unwrap().len(), 2);
    }

    fn render_order(result: &BoardDashboard) -> Vec<String> {
        result
            .dashboard
            .columns_by_position()
            .iter()
            .map(|c| c.class_name.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_board_lists_are_fetched_on_every_request() {
        let tracker = Arc::new(FakeTracker::default());
        let service = BoardService::new(tracker.clone());

        let first = service.group_board(1, 100).await.unwrap();
        *tracker.edited_lists.lock().unwrap() = Some(vec![from_json(json!({
            "id": 3,
            "label": {"name": "type:bug", "color": "#00cac8"},
            "assignee": null
        }))]);
        let second = service.project_board(10, 100).await.unwrap();

        assert_eq!(render_order(&first), vec!["backlog", "statuswip", "assignee", "closed"]);
        assert_eq!(render_order(&second), vec!["backlog", "typebug", "closed"]);
        assert_eq!(second.board.lists.len(), 1);
        assert_eq!(tracker.board_fetches.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.list_fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_group_board_loads_full_project_list_after_single_project_fetch() {
        let service = BoardService::new(Arc::new(FakeTracker::default()));

        service.project_boards(10).await.unwrap();
        let result = service.group_board(1, 100).await.unwrap();

        let ids = result.dashboard.issue_ids();
        assert!(ids.contains(&1));
        assert!(ids.contains(&6));
        assert!(!ids.contains(&5));
        assert_eq!(result.project_names.get(&12).map(String::as_str), Some("web"));
    }

    #[tokio::test]
    async fn test_malformed_list_becomes_placeholder_column() {
        let tracker = Arc::new(FakeTracker::default());
        let service = BoardService::new(tracker.clone());
        *tracker.edited_lists.lock().unwrap() = Some(vec![BoardList::from_value(json!({
            "id": 9,
            "label": {"name": "type:bug"},
            "assignee": null
        }))]);

        let result = service.project_board(10, 100).await.unwrap();

        assert_eq!(render_order(&result), vec!["backlog", "notimplemented", "closed"]);
        assert!(ids(&result.dashboard, "notimplemented").is_empty());
    }

    #[tokio::test]
    async fn test_unknown_group_is_not_found() {
        let service = BoardService::new(Arc::new(FakeTracker::default()));

        let err = service.group_details(99).await.unwrap_err();
        assert!(matches!(err, TrackerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_project_boards_resolves_namespace_group() {
        let service = BoardService::new(Arc::new(FakeTracker::default()));

        let result = service.project_boards(10).await.unwrap();
        assert_eq!(result.group.id, 1);
        assert_eq!(result.boards.len(), 1);
    }
}
