use std::time::Duration;
use url::Url;

use crate::wipe::RetryPolicy;

/// The versioned Discord API endpoint used unless overridden.
pub const DEFAULT_API_URL: &str = "https://discord.com/api/v9";

/// How long a single request may take before it counts as a transport failure.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The pause between removing one item and the next.
const DEFAULT_PACE: Duration = Duration::from_secs(1);

/// Everything the API client needs to know before its first request.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every request path is appended to.
    pub api_url: Url,
    /// Whether to probe `/users/@me` while constructing the client.
    pub verify_token: bool,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL should be valid"),
            verify_token: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Pacing and retry behavior for the deletion passes.
#[derive(Debug, Clone)]
pub struct WipeConfig {
    /// Delay after each removed item.
    pub pace: Duration,
    /// How every listing and removal call is retried.
    pub retry: RetryPolicy,
}

impl Default for WipeConfig {
    fn default() -> Self {
        Self {
            pace: DEFAULT_PACE,
            retry: RetryPolicy::default(),
        }
    }
}
