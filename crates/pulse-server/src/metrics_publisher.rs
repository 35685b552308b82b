//! Periodic metrics publication — polls the aggregation service and
//! broadcasts each snapshot on the `metrics` channel.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pulse_core::MetricsSnapshot;
use thiserror::Error;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::websocket::broadcast::Broadcaster;

/// Error returned by a metrics source poll.
#[derive(Debug, Error)]
#[error("metrics source unavailable: {0}")]
pub struct MetricsSourceError(pub String);

/// The metrics-aggregation collaborator.
///
/// Implemented outside this crate by whatever computes dashboard summaries
/// (the document-store aggregation layer). The publisher only ever polls.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Compute the current snapshot.
    async fn snapshot(&self) -> Result<MetricsSnapshot, MetricsSourceError>;
}

/// Drives periodic metrics broadcasts until cancelled.
pub struct MetricsPublisher {
    source: Arc<dyn MetricsSource>,
    broadcaster: Arc<Broadcaster>,
    period: Duration,
    cancel: CancellationToken,
}

impl MetricsPublisher {
    /// Create a publisher polling `source` every `period`.
    pub fn new(
        source: Arc<dyn MetricsSource>,
        broadcaster: Arc<Broadcaster>,
        period: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            broadcaster,
            period,
            cancel,
        }
    }

    /// Run the publish loop.
    ///
    /// A failed poll is logged and skipped; the loop only exits on
    /// cancellation.
    pub async fn run(self) {
        let mut ticks = time::interval(self.period);
        let _ = ticks.tick().await;

        loop {
            tokio::select! {
                _ = ticks.tick() => {
                    match self.source.snapshot().await {
                        Ok(snapshot) => {
                            self.broadcaster.publish_metrics_update(snapshot).await;
                        }
                        Err(error) => {
                            warn!(%error, "metrics source poll failed, skipping tick");
                        }
                    }
                }
                () = self.cancel.cancelled() => {
                    debug!("metrics publisher cancelled");
                    return;
                }
            }
        }
    }
}
