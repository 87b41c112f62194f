// Application layer - Use cases and ports
pub mod board_materializer;
pub mod board_service;
pub mod issue_tracker;
pub mod object_cache;
