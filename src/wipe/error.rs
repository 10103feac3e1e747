use serde_json::Value;

use super::Pass;
use crate::api::RemoteResponse;

/// Failures that stop a wipe.
///
/// Transport errors and rate limits never show up here; they're absorbed by
/// the retry loop.
#[derive(Debug, thiserror::Error)]
pub enum WipeError {
    #[error("Discord API returned unexpected data: {0}")]
    ProtocolViolation(Value),
    #[error("expected a list of {pass}, got {response:?}")]
    UnexpectedListing {
        pass: Pass,
        response: RemoteResponse,
    },
    #[error("malformed entry within {pass}: {source}")]
    MalformedItem {
        pass: Pass,
        #[source]
        source: serde_json::Error,
    },
    #[error("gave up after {attempts} attempts: {last_failure}")]
    RetriesExhausted { attempts: u32, last_failure: String },
}
