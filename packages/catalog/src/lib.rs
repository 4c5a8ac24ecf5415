//! Durable storage of jobs and their execution history.
//!
//! This crate owns the `jobs` and `job_executions` tables and exposes the
//! narrow [`Catalog`] contract the dispatch and execution cores depend on.
//! It makes no scheduling decisions of its own.

mod error;
mod models;
mod store;

pub use error::CatalogError;
pub use models::{Execution, ExecutionStats, ExecutionStatus, Job, JobUpdate, EXECUTION_TYPE_AT_LEAST_ONCE};
pub use store::{compute_stats, Catalog, PostgresCatalog};

#[cfg(any(test, feature = "testing"))]
mod fake;
#[cfg(any(test, feature = "testing"))]
pub use fake::FakeCatalog;

/// Embedded migrations for `jobs`/`job_executions`. Run at process startup
/// via `catalog::MIGRATOR.run(&pool).await`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
