use lambda_http::http::StatusCode;
use serde::Serialize;

/// Why the event-details document cannot be handed out yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadRefusal {
    NotRegistered,
    PaymentNotVerified,
}

impl DownloadRefusal {
    pub fn message(&self) -> &'static str {
        match self {
            DownloadRefusal::NotRegistered => "Please register for the workshop first",
            DownloadRefusal::PaymentNotVerified => {
                "Payment must be verified to download Event Details"
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkshopError {
    /// Credential check failed; the message is safe to show to the user.
    #[error("{0}")]
    Auth(String),

    #[error("No user logged in")]
    NotAuthenticated,

    #[error("You need admin privileges to access this page")]
    AccessDenied,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{}", .0.message())]
    EventDetailsUnavailable(DownloadRefusal),

    #[error("backend request failed: {0}")]
    Backend(String),

    #[error("malformed document: {0}")]
    Document(#[from] serde_json::Error),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl WorkshopError {
    pub fn backend(context: &str, err: impl std::fmt::Debug) -> Self {
        WorkshopError::Backend(format!("{}: {:?}", context, err))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            WorkshopError::Auth(_) | WorkshopError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            WorkshopError::AccessDenied | WorkshopError::EventDetailsUnavailable(_) => {
                StatusCode::FORBIDDEN
            }
            WorkshopError::Validation(_) => StatusCode::BAD_REQUEST,
            WorkshopError::NotFound(_) => StatusCode::NOT_FOUND,
            WorkshopError::Conflict(_) => StatusCode::CONFLICT,
            WorkshopError::Backend(_) | WorkshopError::Document(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            WorkshopError::Auth(_) => "AuthenticationFailed",
            WorkshopError::NotAuthenticated => "NotAuthenticated",
            WorkshopError::AccessDenied => "AccessDenied",
            WorkshopError::Validation(_) => "InvalidRequest",
            WorkshopError::NotFound(_) => "NotFound",
            WorkshopError::Conflict(_) => "Conflict",
            WorkshopError::EventDetailsUnavailable(DownloadRefusal::NotRegistered) => {
                "NotRegistered"
            }
            WorkshopError::EventDetailsUnavailable(DownloadRefusal::PaymentNotVerified) => {
                "PaymentNotVerified"
            }
            WorkshopError::Backend(_) | WorkshopError::Document(_) => "InternalError",
        }
    }

    /// Body sent to the client. Backend details stay in the logs.
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            WorkshopError::Backend(_) | WorkshopError::Document(_) => {
                "Something went wrong. Please try again.".to_string()
            }
            other => other.to_string(),
        };
        ErrorResponse {
            error: self.code().to_string(),
            message,
        }
    }
}
