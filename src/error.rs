use std::time::Duration;

use thiserror::Error;

use crate::session::Locator;

/// Failures reported by the UI automation session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{target} was not ready after {waited:?}")]
    Timeout { target: Locator, waited: Duration },
    #[error("{0} not found")]
    NotFound(Locator),
    #[error("no option labelled {text:?} in {target}")]
    NoSuchOption { target: Locator, text: String },
    #[error("browser error: {0}")]
    Browser(String),
}

impl From<anyhow::Error> for SessionError {
    fn from(e: anyhow::Error) -> Self {
        SessionError::Browser(format!("{e:#}"))
    }
}

/// How the location loop must react to a [`ScrapeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The session never reached the location list; abort the run.
    Fatal,
    /// Abandon the current location and carry on with the next one.
    Recoverable,
    /// Keep what was collected but attempt no further locations.
    StopIteration,
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("session bootstrap failed at step '{step}': {source}")]
    Bootstrap {
        step: &'static str,
        #[source]
        source: SessionError,
    },
    #[error("error while processing location '{location}': {source}")]
    Location {
        location: String,
        #[source]
        source: SessionError,
    },
    #[error("failed to navigate back to location selection after '{location}': {source}")]
    NavigateBack {
        location: String,
        #[source]
        source: SessionError,
    },
}

impl ScrapeError {
    pub fn severity(&self) -> Severity {
        match self {
            ScrapeError::Bootstrap { .. } => Severity::Fatal,
            ScrapeError::Location { .. } => Severity::Recoverable,
            ScrapeError::NavigateBack { .. } => Severity::StopIteration,
        }
    }
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("remote store answered {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("failed to encode dataset: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
