//! Consumer side of the event channel: filter, then append.

use crate::core::filter;
use crate::core::journal::Journal;
use crate::errors::{AppError, AppResult};
use crate::transport::InboundMessage;
use crate::utils::Clock;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub accepted: u64,
    pub rejected: u64,
    /// Accepted records that could not be written.
    pub failed: u64,
}

/// Run until every sender is dropped and the channel is empty.
pub async fn drain(
    mut rx: mpsc::Receiver<InboundMessage>,
    journal: Arc<Journal>,
    clock: Arc<dyn Clock>,
) -> PipelineStats {
    let mut stats = PipelineStats::default();

    while let Some(msg) = rx.recv().await {
        let record = match filter::accept(&msg, clock.now()) {
            Ok(r) => r,
            Err(reason) => {
                stats.rejected += 1;
                log::debug!("Dropped message on '{}': {}", msg.topic, reason);
                continue;
            }
        };

        let j = Arc::clone(&journal);
        let line = format!("{} {}={}", record.time_str(), record.source, record.value.as_str());
        match blocking(move || j.append(&record)).await {
            Ok(()) => {
                stats.accepted += 1;
                log::debug!("Logged {}", line);
            }
            Err(e) => {
                stats.failed += 1;
                log::error!("Failed to log {}: {}", line, e);
            }
        }
    }

    stats
}

/// Run file work off the async worker threads.
pub(crate) async fn blocking<T, F>(f: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> AppResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Other(format!("blocking task failed: {e}")))?
}
