use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),
}

/// Returned by [`crate::FiringSink::submit`] when the execution core's
/// bounded queue is full (spec §4.4, §7 `OverCapacity`). The dispatch loop
/// logs and drops the firing rather than treating this as fatal.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("execution queue is at capacity")]
pub struct OverCapacity;
