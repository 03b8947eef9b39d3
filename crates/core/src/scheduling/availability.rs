//! Availability oracle over the backend free/busy feed.

use std::sync::Arc;

use rendezvous_domain::{AvailabilityVerdict, TimeInterval};
use tracing::{debug, warn};

use crate::calendar_ports::FreeBusyProvider;

/// Answers "is this slot free?" for exactly the interval asked about.
///
/// Nothing is cached: every call queries the backend. When the query fails
/// the slot is reported busy.
#[derive(Clone)]
pub struct AvailabilityOracle {
    provider: Arc<dyn FreeBusyProvider>,
}

impl AvailabilityOracle {
    pub fn new(provider: Arc<dyn FreeBusyProvider>) -> Self {
        Self { provider }
    }

    /// Full verdict, including whether it came from the backend or from a
    /// failed check.
    pub async fn check(&self, interval: &TimeInterval) -> AvailabilityVerdict {
        match self.provider.busy_blocks(interval).await {
            Ok(blocks) => {
                let verdict = AvailabilityVerdict::from_busy_blocks(interval.clone(), &blocks);
                debug!(
                    start = %interval.start(),
                    end = %interval.end(),
                    busy_blocks = blocks.len(),
                    is_free = verdict.is_free,
                    "Availability checked"
                );
                verdict
            }
            Err(err) => {
                warn!(
                    start = %interval.start(),
                    end = %interval.end(),
                    error = %err,
                    kind = err.kind(),
                    "Availability check failed, treating slot as busy"
                );
                AvailabilityVerdict::unknown(interval.clone())
            }
        }
    }

    pub async fn is_free(&self, interval: &TimeInterval) -> bool {
        self.check(interval).await.is_free
    }
}
