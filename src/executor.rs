//! Bounded-retry request execution shared by every store client.
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ExecError, TransportError};
use crate::http::{ApiRequest, HttpTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Holds no per-call state, so one executor can serve every store and screen at once.
pub struct RequestExecutor {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Sends `request`, retrying transport failures and non-2xx statuses.
    /// Deserialization failures are returned on the spot.
    pub async fn execute<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ExecError> {
        let max = self.policy.max_attempts;
        let mut last_error = String::new();

        for attempt in 1..=max {
            match self.transport.send(request).await {
                Ok(resp) if resp.is_success() => {
                    log::debug!(
                        "[{:?} {}] attempt {}/{} -> {}",
                        request.method,
                        request.url,
                        attempt,
                        max,
                        resp.status
                    );
                    return serde_json::from_slice::<T>(&resp.body).map_err(|e| {
                        log::warn!("Parse error for {}: {}", request.url, e);
                        ExecError::Parse(e.to_string())
                    });
                }
                Ok(resp) => {
                    last_error = TransportError::Status {
                        status: resp.status,
                    }
                    .to_string();
                    log::warn!(
                        "[{:?} {}] attempt {}/{} -> {}",
                        request.method,
                        request.url,
                        attempt,
                        max,
                        resp.status
                    );
                }
                Err(e) if e.is_transient() => {
                    last_error = e.to_string();
                    log::warn!(
                        "[{:?} {}] attempt {}/{} failed: {}",
                        request.method,
                        request.url,
                        attempt,
                        max,
                        e
                    );
                }
                Err(e) => {
                    log::warn!("[{:?} {}] not retried: {}", request.method, request.url, e);
                    return Err(ExecError::Request(e.to_string()));
                }
            }

            if attempt < max && !self.policy.delay.is_zero() {
                tokio::time::sleep(self.policy.delay).await;
            }
        }

        Err(ExecError::Network {
            attempts: max,
            message: last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockTransport, ScriptedReply};
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Pong {
        ok: bool,
    }

    fn executor(transport: Arc<MockTransport>, attempts: u32) -> RequestExecutor {
        RequestExecutor::new(transport, RetryPolicy::new(attempts, Duration::ZERO))
    }

    #[tokio::test]
    async fn stops_after_configured_attempts_on_transient_failure() {
        let transport = Arc::new(MockTransport::new());
        transport.fallback(ScriptedReply::Fail(TransportError::Timeout));
        let exec = executor(transport.clone(), 3);

        let result: Result<Pong, _> = exec.execute(&ApiRequest::get("https://a.test/ping")).await;

        assert!(matches!(result, Err(ExecError::Network { attempts: 3, .. })));
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn non_success_status_is_retried() {
        let transport = Arc::new(MockTransport::new());
        transport.push(ScriptedReply::Status(503));
        transport.push(ScriptedReply::json(r#"{"ok":true}"#));
        let exec = executor(transport.clone(), 3);

        let result: Pong = exec
            .execute(&ApiRequest::get("https://a.test/ping"))
            .await
            .unwrap();

        assert_eq!(result, Pong { ok: true });
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn malformed_body_is_not_retried() {
        let transport = Arc::new(MockTransport::new());
        transport.fallback(ScriptedReply::json("<html>oops</html>"));
        let exec = executor(transport.clone(), 3);

        let result: Result<Pong, _> = exec.execute(&ApiRequest::get("https://a.test/ping")).await;

        assert!(matches!(result, Err(ExecError::Parse(_))));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn invalid_request_is_terminal() {
        let transport = Arc::new(MockTransport::new());
        transport.fallback(ScriptedReply::Fail(TransportError::InvalidRequest(
            "bad header".into(),
        )));
        let exec = executor(transport.clone(), 3);

        let result: Result<Pong, _> = exec.execute(&ApiRequest::get("https://a.test/ping")).await;

        assert!(matches!(result, Err(ExecError::Request(_))));
        assert_eq!(transport.call_count(), 1);
    }

    #[test]
    fn policy_never_drops_below_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
        assert_eq!(RetryPolicy::default().max_attempts(), 3);
        assert_eq!(RetryPolicy::default().delay(), Duration::from_secs(1));
    }
}
