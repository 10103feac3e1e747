use reqwest::StatusCode;
use serde_json::{Map, Value};
use std::time::Duration;

/// A normalized body together with the status it arrived with.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: RemoteResponse,
}

impl Reply {
    pub fn new(status: StatusCode, body: RemoteResponse) -> Self {
        Self { status, body }
    }

    /// Whether Discord refused the request, either with an error body or
    /// with a non-2xx status and something else entirely, like a proxy page.
    pub fn is_rejection(&self) -> bool {
        !self.status.is_success() || self.body.platform_error().is_some()
    }
}

/// A Discord response body, normalized by its shape.
///
/// Discord answers most calls with JSON, but some deletions return an empty
/// `204 No Content` and error pages may not be JSON at all. We keep anything
/// that fails to parse as plain text, exactly as received.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteResponse {
    /// A JSON object, e.g. a user, a guild or an error body.
    Object(Map<String, Value>),
    /// A JSON array, as returned by every listing endpoint.
    List(Vec<Value>),
    /// A JSON string, or a body that isn't JSON.
    Text(String),
    /// Valid JSON of a shape we never expect (numbers, booleans, null).
    Unrecognized(Value),
}

/// The error body Discord returns alongside a non-2xx status.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformError {
    pub code: i64,
    pub message: String,
}

impl RemoteResponse {
    /// Sorts a raw body into one of our shapes.
    pub fn from_body(body: String) -> Self {
        match serde_json::from_str(&body) {
            Ok(Value::Object(object)) => Self::Object(object),
            Ok(Value::Array(list)) => Self::List(list),
            Ok(Value::String(text)) => Self::Text(text),
            Ok(other) => Self::Unrecognized(other),
            Err(_) => Self::Text(body),
        }
    }

    /// If this response asks us to back off, how long to wait.
    ///
    /// Only objects carry `retry_after`. A value we can't turn into a
    /// duration still counts as a deferral, and waits `fallback` instead.
    pub fn retry_after(&self, fallback: Duration) -> Option<Duration> {
        let Self::Object(object) = self else {
            return None;
        };
        let value = object.get("retry_after")?;

        let wait = value
            .as_f64()
            .filter(|seconds| seconds.is_finite())
            .and_then(|seconds| Duration::try_from_secs_f64(seconds.max(0.0)).ok())
            .unwrap_or(fallback);
        Some(wait)
    }

    /// The platform's error body, if this is one.
    ///
    /// Discord reports failures as `{"message": "...", "code": 10003}`.
    pub fn platform_error(&self) -> Option<PlatformError> {
        let Self::Object(object) = self else {
            return None;
        };

        let code = object.get("code")?.as_i64()?;
        let message = object
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Some(PlatformError { code, message })
    }

    /// Returns the inner value of an object response.
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }
}
