use thiserror::Error;

use crate::core::stage::Stage;

pub const MSG_TOPIC_REQUIRED: &str = "Please enter a topic to search.";
pub const MSG_SELECTION_REQUIRED: &str = "Please select at least one video to transcribe.";
pub const MSG_DETAILS_REQUIRED: &str = "Host Name and Channel Name are required.";
pub const MSG_NO_TRANSCRIPTS: &str = "Could not fetch any transcripts.";
pub const MSG_SEARCH_FAILED: &str = "Failed to fetch videos.";
pub const MSG_TRANSCRIPTS_FAILED: &str = "Failed to get transcripts.";
pub const MSG_SCRIPT_FAILED: &str = "Failed to generate script.";
pub const MSG_BACKEND_UNREACHABLE: &str = "Could not connect to the backend.";

/// Errors returned by the workflow reducer and controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Required local input is missing; no remote call was made.
    #[error("{0}")]
    Validation(String),
    /// The remote call failed or returned a non-success status.
    #[error("{0}")]
    Transport(String),
    /// Every transcript in the batch came back error-marked.
    #[error("{0}")]
    PartialData(String),
    #[error("a request is already in flight")]
    Busy,
    #[error("cannot move from stage {from} to stage {to}")]
    InvalidTransition { from: Stage, to: Stage },
    #[error("this action needs stage {expected}, workflow is at stage {actual}")]
    WrongStage { expected: Stage, actual: Stage },
    #[error("video {0} is not among the fetched candidates")]
    UnknownVideo(String),
}

impl WorkflowError {
    /// Text placed in `last_error` for errors the user should see.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            WorkflowError::Validation(message)
            | WorkflowError::Transport(message)
            | WorkflowError::PartialData(message) => Some(message),
            _ => None,
        }
    }
}

/// Failures of the remote script service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("could not reach {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: u16,
        detail: Option<String>,
    },
    #[error("invalid response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{0}")]
    Other(String),
}

impl ServiceError {
    /// Server-supplied `detail` text, if the failing response carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ServiceError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Maps the failure to the message shown to the user for one operation.
    /// The server `detail` replaces `status_fallback` only when `with_detail`
    /// is set.
    pub fn user_message(&self, status_fallback: &str, with_detail: bool) -> String {
        match self {
            ServiceError::Connect { .. } => MSG_BACKEND_UNREACHABLE.to_string(),
            ServiceError::Status { detail, .. } => detail
                .as_deref()
                .filter(|_| with_detail)
                .map(str::trim)
                .filter(|detail| !detail.is_empty())
                .unwrap_or(status_fallback)
                .to_string(),
            ServiceError::Decode { .. } => status_fallback.to_string(),
            ServiceError::Other(message) if !message.trim().is_empty() => message.clone(),
            ServiceError::Other(_) => status_fallback.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_prefers_detail() {
        let err = ServiceError::Status {
            url: "http://x".to_string(),
            status: 429,
            detail: Some("quota exceeded".to_string()),
        };
        assert_eq!(err.user_message(MSG_SCRIPT_FAILED, true), "quota exceeded");
        assert_eq!(err.user_message(MSG_SEARCH_FAILED, false), MSG_SEARCH_FAILED);
    }

    #[test]
    fn status_error_without_detail_uses_fallback() {
        let err = ServiceError::Status {
            url: "http://x".to_string(),
            status: 500,
            detail: Some("  ".to_string()),
        };
        assert_eq!(err.user_message(MSG_SCRIPT_FAILED, true), MSG_SCRIPT_FAILED);
    }

    #[test]
    fn only_user_facing_errors_have_messages() {
        assert_eq!(
            WorkflowError::Validation("x".to_string()).user_message(),
            Some("x")
        );
        assert_eq!(WorkflowError::Busy.user_message(), None);
    }
}
