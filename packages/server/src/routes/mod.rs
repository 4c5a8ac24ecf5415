pub mod debug;
pub mod executions;
pub mod health;
pub mod jobs;
pub mod root;
