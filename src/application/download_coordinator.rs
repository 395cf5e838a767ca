use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::error_classifier::classify;
use crate::{
    backend::TransferBackend,
    config::DEFAULT_TIMEOUT_SECS,
    domain::{
        AfterAcknowledge, AppError, DownloadPhase, NavigationDirective, OriginContext,
        RetrievalOutcome, RetrievalRequest, TransferError,
    },
};

pub const SUCCESS_MESSAGE: &str = "Download successfully!";
pub const ACKNOWLEDGE_LABEL: &str = "OK";

/// Runs one retrieval per user request and decides where the user goes next.
///
/// Holds no state between requests: no caching, no retries.
pub struct DownloadCoordinator<B> {
    backend: B,
    timeout: Option<Duration>,
}

impl<B: TransferBackend> DownloadCoordinator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }

    /// Bound each backend call. `None` waits for the backend indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate the raw form input, dispatch it and build the directive.
    ///
    /// Never fails: every error ends up as a message with [`AfterAcknowledge::Stay`].
    pub async fn handle_download(
        &self,
        local_name: &str,
        remote_name: &str,
        origin: OriginContext,
    ) -> NavigationDirective {
        let outcome = match RetrievalRequest::new(local_name, remote_name, origin) {
            Ok(request) => self.retrieve(&request).await,
            Err(e) => {
                warn!("download request rejected: {}", e);
                RetrievalOutcome::Failure(e)
            }
        };
        directive_for(&outcome, origin)
    }

    /// Dispatch a validated request to the backend exactly once.
    pub async fn retrieve(&self, request: &RetrievalRequest) -> RetrievalOutcome {
        debug!(
            phase = ?DownloadPhase::Dispatched,
            origin = ?request.origin(),
            "retrieving {} as {}",
            request.remote_name(),
            request.local_name()
        );
        let started = Instant::now();

        let call = self
            .backend
            .retrieve(request.local_name(), request.remote_name());
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(TransferError::TimedOut(limit))),
            None => call.await,
        };

        match result {
            Ok(()) => {
                info!(
                    phase = ?DownloadPhase::Succeeded,
                    "downloaded {} in {:.2?}",
                    request.remote_name(),
                    started.elapsed()
                );
                RetrievalOutcome::Success
            }
            Err(e) => {
                warn!(
                    phase = ?DownloadPhase::Failed,
                    "download of {} failed after {:.2?}: {}",
                    request.remote_name(),
                    started.elapsed(),
                    e
                );
                RetrievalOutcome::Failure(AppError::Transfer(e))
            }
        }
    }
}

/// Directive for a resolved outcome. Only a success navigates away.
pub fn directive_for(outcome: &RetrievalOutcome, origin: OriginContext) -> NavigationDirective {
    match outcome {
        RetrievalOutcome::Success => NavigationDirective {
            message: SUCCESS_MESSAGE.to_string(),
            action_label: ACKNOWLEDGE_LABEL.to_string(),
            on_acknowledge: AfterAcknowledge::NavigateTo(origin.destination()),
        },
        RetrievalOutcome::Failure(error) => NavigationDirective {
            message: classify(error),
            action_label: ACKNOWLEDGE_LABEL.to_string(),
            on_acknowledge: AfterAcknowledge::Stay,
        },
    }
}
