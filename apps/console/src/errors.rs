use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Generic alert text used when the backend gave no message of its own.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Client-level error type.
/// Backend failures are only split into auth, validation and everything else.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} is required")]
    MissingField(&'static str),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Builds the error for a non-2xx response from its status and raw body.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = extract_message(body);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Unauthorized {
                message: message.unwrap_or_else(|| "Not authenticated".to_string()),
            },
            StatusCode::BAD_REQUEST => ClientError::Validation {
                message: message.unwrap_or_else(|| "Invalid request".to_string()),
            },
            _ => ClientError::Api {
                status: status.as_u16(),
                message: message.unwrap_or_else(|| body.trim().to_string()),
            },
        }
    }

    /// True for failures that the session gate treats as "logged out".
    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Unauthorized { .. })
    }

    /// One-line text suitable for an alert: the backend's own message if it
    /// sent one, otherwise a generic fallback.
    pub fn alert_message(&self) -> String {
        match self {
            ClientError::Unauthorized { message } | ClientError::Validation { message } => {
                message.clone()
            }
            ClientError::Api { message, .. } if !message.is_empty() => message.clone(),
            ClientError::MissingField(_) => self.to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

/// Pulls a human message out of an error body.
///
/// `{"error": "..."}` and `{"detail": "..."}` are used verbatim; field error maps
/// like `{"email": ["already exists"]}` are flattened into `email: already exists`.
fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    for key in ["error", "detail", "message"] {
        if let Some(text) = object.get(key).and_then(Value::as_str) {
            return Some(text.to_string());
        }
    }

    let parts: Vec<String> = object
        .iter()
        .filter_map(|(field, errors)| {
            let text = match errors {
                Value::String(s) => s.clone(),
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(" "),
                _ => return None,
            };
            (!text.is_empty()).then(|| format!("{field}: {text}"))
        })
        .collect();

    (!parts.is_empty()).then(|| parts.join("; "))
}
