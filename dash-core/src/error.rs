use reqwest::StatusCode;

/// Failures of the forecast and alerts flows.
///
/// Only [`DashboardError::Transport`] is eligible for retry. Everything else is surfaced
/// immediately.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Failed to reach {provider}: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} request failed with status {status}: {body}")]
    HttpStatus {
        provider: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("Malformed {provider} response: {reason}")]
    MalformedResponse {
        provider: &'static str,
        reason: String,
    },

    #[error("Invalid forecast request: {0}")]
    InvalidRequest(String),
}

impl DashboardError {
    pub(crate) fn malformed(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse { provider, reason: reason.into() }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;
