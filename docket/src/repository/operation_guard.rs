use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::errors::{DocketError, DocketResult, ErrorKind};

/// Bounds every store round-trip of a repository by an optional timeout and
/// an optional cancellation token.
#[derive(Clone, Default)]
pub(crate) struct OperationGuard {
    timeout: Option<Duration>,
    cancellation: Option<CancellationToken>,
}

impl OperationGuard {
    pub(crate) fn new(timeout: Option<Duration>, cancellation: Option<CancellationToken>) -> Self {
        OperationGuard {
            timeout,
            cancellation,
        }
    }

    pub(crate) fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) fn with_timeout(&self, timeout: Duration) -> Self {
        OperationGuard {
            timeout: Some(timeout),
            cancellation: self.cancellation.clone(),
        }
    }

    pub(crate) fn with_cancellation(&self, token: CancellationToken) -> Self {
        OperationGuard {
            timeout: self.timeout,
            cancellation: Some(token),
        }
    }

    /// Fails with `Cancelled` once the bound token has been cancelled.
    pub(crate) fn check(&self, operation: &str) -> DocketResult<()> {
        match &self.cancellation {
            Some(token) if token.is_cancelled() => Err(cancelled(operation)),
            _ => Ok(()),
        }
    }

    /// Runs one round-trip under the guard.
    pub(crate) async fn run<F, R>(&self, operation: &str, round_trip: F) -> DocketResult<R>
    where
        F: Future<Output = DocketResult<R>>,
    {
        self.check(operation)?;

        let bounded = async {
            match self.timeout {
                Some(duration) => match tokio::time::timeout(duration, round_trip).await {
                    Ok(result) => result,
                    Err(_) => {
                        log::error!("{} timed out after {:?}", operation, duration);
                        Err(DocketError::new(
                            &format!("{} timed out after {:?}", operation, duration),
                            ErrorKind::Timeout,
                        ))
                    }
                },
                None => round_trip.await,
            }
        };

        match &self.cancellation {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(cancelled(operation)),
                result = bounded => result,
            },
            None => bounded.await,
        }
    }
}

fn cancelled(operation: &str) -> DocketError {
    log::debug!("{} was cancelled", operation);
    DocketError::new(&format!("{} was cancelled", operation), ErrorKind::Cancelled)
}
