use serde_json::{json, Map, Value};

/// Failure taxonomy of an outbound call.
///
/// `Display` is the user-facing message carried by the normalized result.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("invalid API key")]
    Auth,

    #[error("API rate limit exceeded")]
    RateLimit,

    #[error("HTTP {status}: {body}")]
    Protocol { status: u16, body: String },

    #[error("request timed out")]
    Timeout,

    #[error("connection error: {0}")]
    Transport(String),
}

/// Domain status of a call.
///
/// Only the dialog check has a defined domain (`found` / `not_found`); other
/// payloads keep whatever `status` string they carried, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Found,
    NotFound,
    Error,
    Other(Option<String>),
}

impl Status {
    fn from_body(body: &Value) -> Self {
        match body.get("status").and_then(Value::as_str) {
            Some("found") => Status::Found,
            Some("not_found") => Status::NotFound,
            Some("error") => Status::Error,
            Some(other) => Status::Other(Some(other.to_string())),
            None => Status::Other(None),
        }
    }
}

/// Uniform outcome of any outbound API call.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedResult {
    pub status: Status,
    pub message: Option<String>,
    /// Decoded body on success, an empty object on failure.
    pub raw: Value,
}

impl NormalizedResult {
    /// Wrap a decoded HTTP 200 body.
    pub fn from_body(raw: Value) -> Self {
        let status = Status::from_body(&raw);
        let message = raw
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            status,
            message,
            raw,
        }
    }

    pub fn from_error(err: &ApiError) -> Self {
        Self {
            status: Status::Error,
            message: Some(err.to_string()),
            raw: Value::Object(Map::new()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }

    /// The payload shown verbatim on result screens.
    ///
    /// Failures have no body, so they are shown as `{"status":"error","message":...}`.
    pub fn diagnostic(&self) -> Value {
        match (&self.status, self.raw.as_object()) {
            (Status::Error, Some(obj)) if obj.is_empty() => json!({
                "status": "error",
                "message": self.message.clone().unwrap_or_default(),
            }),
            _ => self.raw.clone(),
        }
    }
}

impl From<ApiError> for NormalizedResult {
    fn from(err: ApiError) -> Self {
        Self::from_error(&err)
    }
}
