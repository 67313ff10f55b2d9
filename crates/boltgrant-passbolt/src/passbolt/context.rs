//! Caller-supplied deadline and cancellation for remote calls.

use crate::passbolt::error::{Result, ShareError};
use crate::passbolt::types::PassboltError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Deadline and cancellation signal shared by every call of one
/// reconciliation.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl OperationContext {
    /// No deadline, fresh cancellation token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deadline `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().deadline_at(Instant::now() + timeout)
    }

    pub fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Share an external cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Run one remote call under this context.
    ///
    /// Cancellation wins over completion; an elapsed deadline is reported
    /// before the call is even started.
    pub async fn run<T, F>(&self, operation: &str, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, PassboltError>>,
    {
        if self.is_cancelled() {
            return Err(ShareError::cancelled(operation));
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(ShareError::deadline_exceeded(operation));
            }
        }

        let bounded = async {
            match self.deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, call).await {
                    Ok(res) => res.map_err(|e| ShareError::remote(operation, e)),
                    Err(_) => Err(ShareError::deadline_exceeded(operation)),
                },
                None => call.await.map_err(|e| ShareError::remote(operation, e)),
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ShareError::cancelled(operation)),
            res = bounded => res,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passbolt::error::ErrorClass;

    #[tokio::test]
    async fn test_passes_result_through() {
        let ctx = OperationContext::new();
        let v = ctx.run("list groups", async { Ok::<_, PassboltError>(3) }).await;
        assert_eq!(v.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_wraps_remote_error_with_operation() {
        let ctx = OperationContext::new();
        let err = ctx
            .run("list users", async {
                Err::<(), _>(PassboltError::forbidden("Access denied: /users.json"))
            })
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::Remote);
        assert!(err.to_string().contains("list users"));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let ctx = OperationContext::new();
        ctx.cancellation_token().cancel();
        let err = ctx
            .run("list groups", async { Ok::<_, PassboltError>(()) })
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::Cancelled);
    }

    #[tokio::test]
    async fn test_cancelled_mid_flight() {
        let token = CancellationToken::new();
        let ctx = OperationContext::new().with_cancellation(token.clone());
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });
        let err = ctx
            .run("share folder F1", async {
                std::future::pending::<std::result::Result<(), PassboltError>>().await
            })
            .await
            .unwrap_err();
        canceller.await.unwrap();
        assert_eq!(err.class(), ErrorClass::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded_mid_flight() {
        let ctx = OperationContext::with_timeout(Duration::from_secs(5));
        let err = ctx
            .run("list folders", async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, PassboltError>(())
            })
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::DeadlineExceeded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_deadline_skips_call() {
        let ctx = OperationContext::with_timeout(Duration::from_secs(1));
        tokio::time::advance(Duration::from_secs(2)).await;
        let mut called = false;
        let err = ctx
            .run("list groups", async {
                called = true;
                Ok::<_, PassboltError>(())
            })
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::DeadlineExceeded);
        assert!(!called);
    }
}
