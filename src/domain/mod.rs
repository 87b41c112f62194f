// Domain layer - Board and issue models, column rules, dashboard partitioning
pub mod board;
pub mod column_rule;
pub mod condition;
pub mod dashboard;
pub mod issue;
