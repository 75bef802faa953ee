use thiserror::Error;

/// Type alias for Result with GmailError
pub type Result<T> = std::result::Result<T, GmailError>;

/// Error types for the label export and delete tools
#[derive(Error, Debug)]
pub enum GmailError {
    /// Gmail API returned an error
    #[error("Gmail API error: {0}")]
    ApiError(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// Rate limit exceeded - provider asked us to wait the specified seconds
    #[error("Rate limit exceeded, retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    /// User cancelled a prompt
    #[error("Operation cancelled: {0}")]
    OperationCancelled(String),

    /// Network-related error (connection issues, timeouts, etc.)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Server returned 5xx error
    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden (403)
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// Response was missing fields we rely on
    #[error("Invalid message format: {0}")]
    InvalidMessageFormat(String),

    /// Menu or prompt selection outside the offered range
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// Progress bar called with a non-positive total
    #[error("Invalid progress total: {0}")]
    InvalidProgress(String),

    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic catch-all error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl GmailError {
    /// Whether the same call could succeed if made again later
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GmailError::RateLimitExceeded { .. }
                | GmailError::ServerError { .. }
                | GmailError::NetworkError(_)
        )
    }

    /// Seconds the provider asked us to wait, if this is a rate-limit error
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            GmailError::RateLimitExceeded { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// Seconds to wait from a `Retry-After` header.
///
/// Accepts delay-seconds or an HTTP-date. Missing, malformed and past values
/// fall back to a short default.
fn parse_retry_after_header<B>(response: &hyper::Response<B>) -> u64 {
    let Some(value) = response
        .headers()
        .get(hyper::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
    else {
        return DEFAULT_RETRY_AFTER_SECS;
    };

    if let Ok(seconds) = value.trim().parse::<u64>() {
        return seconds;
    }

    httpdate::parse_http_date(value)
        .ok()
        .and_then(|at| at.duration_since(std::time::SystemTime::now()).ok())
        .map(|wait| wait.as_secs())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

impl From<google_gmail1::Error> for GmailError {
    fn from(error: google_gmail1::Error) -> Self {
        match error {
            google_gmail1::Error::Failure(ref response) => {
                let status = response.status();
                let code = status.as_u16();
                let message = format!(
                    "HTTP {}: {}",
                    code,
                    status.canonical_reason().unwrap_or("Unknown")
                );

                match code {
                    429 => GmailError::RateLimitExceeded {
                        retry_after: parse_retry_after_header(response),
                    },
                    400 => GmailError::BadRequest(message),
                    401 => GmailError::AuthError(message),
                    403 => GmailError::Forbidden(message),
                    404 => GmailError::NotFound(message),
                    500..=599 => GmailError::ServerError {
                        status: code,
                        message,
                    },
                    _ => GmailError::ApiError(message),
                }
            }
            google_gmail1::Error::BadRequest(ref err) => GmailError::BadRequest(err.to_string()),
            google_gmail1::Error::HttpError(ref err) => {
                GmailError::NetworkError(format!("Connection error: {}", err))
            }
            google_gmail1::Error::Io(err) => GmailError::NetworkError(err.to_string()),
            _ => GmailError::ApiError(error.to_string()),
        }
    }
}

impl From<inquire::InquireError> for GmailError {
    fn from(error: inquire::InquireError) -> Self {
        match error {
            inquire::InquireError::OperationCanceled
            | inquire::InquireError::OperationInterrupted => {
                GmailError::OperationCancelled("prompt cancelled".to_string())
            }
            inquire::InquireError::IO(err) => GmailError::IoError(err),
            other => GmailError::Unknown(other.to_string()),
        }
    }
}
