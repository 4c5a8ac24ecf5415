use thiserror::Error;

/// Outcome classification for a single HTTP attempt (spec §4.4, §7).
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("application failure: {status}: {body}")]
    Application { status: i32, body: String },

    #[error("transport failure: {0}")]
    Transport(String),
}
