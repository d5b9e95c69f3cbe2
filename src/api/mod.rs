pub mod client;
pub mod fragment;

pub use client::{ApiClient, AppointmentRecord, MedicineRecord};
pub use fragment::{affordance_total, parse_reminder_fragment, ReminderItem};

/// Error type for rescue server operations.
#[derive(Debug)]
pub enum ApiError {
    /// Transport-level failure (connection refused, timeout, bad URL).
    Http(reqwest::Error),
    /// Non-2xx response; the body is surfaced as the error detail.
    Status { status: u16, body: String },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Http(e) => write!(f, "request failed: {}", e),
            ApiError::Status { status, body } => {
                write!(f, "server returned {}: {}", status, body)
            }
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Http(e) => Some(e),
            ApiError::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Http(err)
    }
}
