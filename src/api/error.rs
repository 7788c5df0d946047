use thiserror::Error;

/// Failure talking to the server.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned status {status}")]
    Status { status: u16 },
    #[error("{0}")]
    Rejected(String),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport(e) if e.is_timeout())
    }
}

/// A list fetch or playlist mutation that did not go through.
///
/// Shown inline on list screens or as a notice; never blocks navigation.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("not logged in")]
    NoToken,
    #[error("could not {action}: {source}")]
    Failed {
        action: &'static str,
        #[source]
        source: ApiError,
    },
}

impl DataError {
    pub(crate) fn failed(action: &'static str) -> impl FnOnce(ApiError) -> DataError {
        move |source| DataError::Failed { action, source }
    }

    /// Short text for the status line or an inline list error.
    pub fn user_message(&self) -> String {
        match self {
            DataError::NoToken => "Please log in to continue.".to_string(),
            DataError::Failed { action, .. } => format!("Could not {action}."),
        }
    }
}
