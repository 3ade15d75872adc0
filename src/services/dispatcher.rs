// src/services/dispatcher.rs

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::platforms::{Messaging, TransportError};

/// Pause for one second after this many delivery attempts, to stay under
/// the transport's rate ceiling.
const PACING_CHUNK: usize = 25;
const PACING_PAUSE: Duration = Duration::from_secs(1);

/// Aggregate outcome of one fan-out. `sent + failed + blocked == total`
/// holds for every dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
    pub blocked: usize,
    pub total: usize,
}

/// Rate-limited fan-out over the messaging transport. Recipients are
/// attempted exactly once each; per-recipient failures are recorded and
/// never abort the batch.
pub struct Dispatcher {
    transport: Arc<dyn Messaging>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Messaging>) -> Self {
        Self { transport }
    }

    pub async fn dispatch(&self, recipients: &[i64], text: &str) -> DispatchReport {
        let mut report = DispatchReport {
            total: recipients.len(),
            ..Default::default()
        };

        for (attempted, &chat_id) in recipients.iter().enumerate() {
            match self.transport.send_message(chat_id, text).await {
                Ok(_) => report.sent += 1,
                Err(TransportError::Blocked) => {
                    debug!("recipient {} has blocked delivery", chat_id);
                    report.blocked += 1;
                }
                Err(TransportError::Other(e)) => {
                    debug!("delivery to {} failed: {}", chat_id, e);
                    report.failed += 1;
                }
            }

            let done = attempted + 1;
            if done % PACING_CHUNK == 0 && done < recipients.len() {
                tokio::time::sleep(PACING_PAUSE).await;
            }
        }

        info!(
            "dispatch finished: {} sent, {} failed, {} blocked ({} total)",
            report.sent, report.failed, report.blocked, report.total
        );
        report
    }
}
