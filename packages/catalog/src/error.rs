use thiserror::Error;

/// Internal error taxonomy for the catalog store (spec §7: `InvalidSchedule`,
/// `NotFound`, `StoreError`).
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid schedule: {0}")]
    InvalidSchedule(#[from] cron::CronError),

    #[error("job {0} not found")]
    NotFound(uuid::Uuid),

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}
