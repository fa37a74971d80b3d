use reqwest::StatusCode;
use thiserror::Error;

/// The one message the user ever sees for a failed generation.
pub const FAILURE_MESSAGE: &str = "Failed to generate cover letter. Please try again.";

/// Why a generation request did not produce a letter
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request to generation service failed: {0}")]
    Transport(reqwest::Error),

    #[error("generation service returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed generation response: {0}")]
    MalformedResponse(String),
}

// The request URL carries the API key as a query parameter, so it never
// travels with the error into logs.
impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Transport(err.without_url())
    }
}

impl GenerationError {
    /// Every failure kind collapses into the same user-facing text;
    /// the details only go to the log.
    pub fn user_message(&self) -> &'static str {
        FAILURE_MESSAGE
    }
}
