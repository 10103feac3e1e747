use std::{fmt::Display, future::Future, num::NonZeroU32, time::Duration};
use tracing::{info, warn};

use super::{error::WipeError, sleep::Sleeper};
use crate::api::{RemoteResponse, Reply};

/// How a single call is retried.
///
/// Failed calls are retried after a fixed `interval`, with no backoff growth.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub interval: Duration,
    /// Upper bound on attempts, counting rate-limited ones. `None` retries forever.
    pub max_attempts: Option<NonZeroU32>,
}

impl RetryPolicy {
    pub const fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    pub const fn bounded(interval: Duration, max_attempts: NonZeroU32) -> Self {
        Self {
            interval,
            max_attempts: Some(max_attempts),
        }
    }

    fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts
            .is_some_and(|max_attempts| attempts >= max_attempts.get())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::unbounded(Duration::from_secs(1))
    }
}

/// Runs `call` until Discord gives us a usable answer.
///
/// Only the body decides what happens next; the status is passed through.
///
/// - A transport error waits `policy.interval`, then tries again.
/// - A rate-limited response waits its `retry_after`, then tries again.
/// - A response of an unrecognized shape is fatal and is never retried.
///
/// Every retry re-issues the whole call. A deletion whose response was lost
/// in transit will therefore be sent twice.
pub async fn request_wait<F, Fut, E, S>(
    policy: &RetryPolicy,
    sleeper: &S,
    mut call: F,
) -> Result<Reply, WipeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Reply, E>>,
    E: Display,
    S: Sleeper,
{
    let mut attempts: u32 = 0;

    loop {
        attempts = attempts.saturating_add(1);

        let wait = match call().await {
            Err(error) => {
                if policy.exhausted(attempts) {
                    warn!(attempt = attempts, %error, "request failed, giving up");
                    return Err(WipeError::RetriesExhausted {
                        attempts,
                        last_failure: error.to_string(),
                    });
                }
                warn!(attempt = attempts, %error, "request failed, retrying");
                policy.interval
            }
            Ok(Reply {
                body: RemoteResponse::Unrecognized(value),
                ..
            }) => {
                return Err(WipeError::ProtocolViolation(value));
            }
            Ok(reply) => {
                let Some(retry_after) = reply.body.retry_after(policy.interval) else {
                    return Ok(reply);
                };

                if policy.exhausted(attempts) {
                    warn!(attempt = attempts, "rate limited, giving up");
                    return Err(WipeError::RetriesExhausted {
                        attempts,
                        last_failure: format!("rate limited for {retry_after:?}"),
                    });
                }
                info!(
                    attempt = attempts,
                    "Rate limited. Retrying after {:.2} seconds...",
                    retry_after.as_secs_f64()
                );
                retry_after
            }
        };

        sleeper.sleep(wait).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wipe::sleep::RecordingSleeper;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::{cell::RefCell, collections::VecDeque};

    type Outcome = Result<Reply, &'static str>;

    /// Hands out `outcomes` one per call, counting the calls made.
    struct Script {
        outcomes: RefCell<VecDeque<Outcome>>,
        calls: RefCell<u32>,
    }

    impl Script {
        fn new(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
            Self {
                outcomes: RefCell::new(outcomes.into_iter().collect()),
                calls: RefCell::new(0),
            }
        }

        async fn call(&self) -> Outcome {
            *self.calls.borrow_mut() += 1;
            self.outcomes
                .borrow_mut()
                .pop_front()
                .expect("script should not run dry")
        }

        fn calls(&self) -> u32 {
            *self.calls.borrow()
        }
    }

    fn ok(body: RemoteResponse) -> Outcome {
        Ok(Reply::new(StatusCode::OK, body))
    }

    fn object(value: serde_json::Value) -> RemoteResponse {
        RemoteResponse::from_body(value.to_string())
    }

    #[tokio::test]
    async fn test_returns_first_usable_response() {
        let sleeper = RecordingSleeper::default();
        let script = Script::new([ok(object(json!({"id": "1"}))), ok(object(json!({"id": "2"})))]);

        let response = request_wait(&RetryPolicy::default(), &sleeper, || script.call())
            .await
            .expect("should succeed");

        assert_eq!(response.body, object(json!({"id": "1"})));
        assert_eq!(script.calls(), 1);
        assert!(sleeper.waits().is_empty());
    }

    #[tokio::test]
    async fn test_lists_and_text_are_usable() {
        let sleeper = RecordingSleeper::default();
        let script = Script::new([
            ok(RemoteResponse::List(vec![json!("retry_after")])),
            ok(RemoteResponse::Text("retry_after".into())),
        ]);
        let policy = RetryPolicy::default();

        let first = request_wait(&policy, &sleeper, || script.call()).await;
        let second = request_wait(&policy, &sleeper, || script.call()).await;

        assert!(matches!(first.map(|reply| reply.body), Ok(RemoteResponse::List(_))));
        assert!(matches!(second.map(|reply| reply.body), Ok(RemoteResponse::Text(_))));
        assert_eq!(script.calls(), 2);
        assert!(sleeper.waits().is_empty());
    }

    #[tokio::test]
    async fn test_rate_limit_waits_then_reissues() {
        let sleeper = RecordingSleeper::default();
        let script = Script::new([
            ok(object(json!({"message": "You are being rate limited.", "retry_after": 3.25}))),
            ok(RemoteResponse::Text(String::new())),
        ]);

        let response = request_wait(&RetryPolicy::default(), &sleeper, || script.call())
            .await
            .expect("should succeed");

        assert_eq!(response.body, RemoteResponse::Text(String::new()));
        assert_eq!(script.calls(), 2);
        assert_eq!(sleeper.waits(), vec![Duration::from_millis(3250)]);
    }

    #[tokio::test]
    async fn test_unrecognized_shape_is_fatal() {
        let sleeper = RecordingSleeper::default();
        let script = Script::new([
            ok(RemoteResponse::Unrecognized(json!(42))),
            ok(RemoteResponse::Text(String::new())),
        ]);

        let result = request_wait(&RetryPolicy::default(), &sleeper, || script.call()).await;

        assert!(matches!(result, Err(WipeError::ProtocolViolation(value)) if value == json!(42)));
        assert_eq!(script.calls(), 1);
        assert!(sleeper.waits().is_empty());
    }

    #[tokio::test]
    async fn test_transport_errors_wait_fixed_interval() {
        let sleeper = RecordingSleeper::default();
        let script = Script::new([
            Err("connection reset"),
            Err("timed out"),
            Err("connection refused"),
            ok(object(json!({"id": "1"}))),
        ]);
        let policy = RetryPolicy::unbounded(Duration::from_millis(250));

        let response = request_wait(&policy, &sleeper, || script.call())
            .await
            .expect("should eventually succeed");

        assert_eq!(response.body, object(json!({"id": "1"})));
        assert_eq!(script.calls(), 4);
        assert_eq!(sleeper.waits(), vec![Duration::from_millis(250); 3]);
    }

    #[tokio::test]
    async fn test_bounded_policy_gives_up() {
        let sleeper = RecordingSleeper::default();
        let script = Script::new([
            Err("connection reset"),
            ok(object(json!({"retry_after": 1}))),
            Err("connection refused"),
        ]);
        let policy = RetryPolicy::bounded(
            Duration::from_secs(1),
            NonZeroU32::new(3).expect("3 is non-zero"),
        );

        let result = request_wait(&policy, &sleeper, || script.call()).await;

        match result {
            Err(WipeError::RetriesExhausted {
                attempts,
                last_failure,
            }) => {
                assert_eq!(attempts, 3);
                assert_eq!(last_failure, "connection refused");
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert_eq!(script.calls(), 3);
        assert_eq!(sleeper.waits().len(), 2);
    }

    #[tokio::test]
    async fn test_error_status_is_passed_through() {
        let sleeper = RecordingSleeper::default();
        let page = RemoteResponse::Text("<html>Service Unavailable</html>".into());
        let script = Script::new([Ok(Reply::new(StatusCode::SERVICE_UNAVAILABLE, page.clone()))]);

        let reply = request_wait(&RetryPolicy::default(), &sleeper, || script.call())
            .await
            .expect("an error page is still a reply");

        assert_eq!(reply, Reply::new(StatusCode::SERVICE_UNAVAILABLE, page));
        assert!(sleeper.waits().is_empty());
    }
}
