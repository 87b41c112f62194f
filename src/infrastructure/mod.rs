// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod dashboard_view;
pub mod gitlab_repository;
pub mod http_response;
