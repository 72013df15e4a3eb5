//! Fire-and-forget notification dispatch for newly stored records.
//!
//! The notifier hands each notification to a tracked background task, so
//! the inbound request never waits on the receiver and never learns about
//! delivery failures. Tasks are tracked so the process can drain in-flight
//! dispatches at shutdown; delivery is at-most-once and a shutdown racing
//! a dispatch may drop the notification.

use std::{sync::Arc, time::Duration};

use busload_core::RecordId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

use crate::{
    client::NotifyClient,
    error::{NotifyError, Result},
};

/// Event name carried by every new-record notification.
pub const NEW_DETECTION_EVENT: &str = "new_detection_data";

/// One outbound notification payload.
///
/// Constructed per dispatch and owned by the background task for the
/// duration of a single call; never persisted. The `secret` is a shared
/// static token the receiver compares against its own configuration.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    /// Event discriminator, always [`NEW_DETECTION_EVENT`].
    pub event: String,
    /// Identifier of the freshly stored push record.
    pub record_id: RecordId,
    /// Model inference time reported with the push.
    pub inference_time_sec: f64,
    /// The normalized detection list.
    pub detection_results: Vec<Value>,
    /// Dispatch time.
    pub timestamp: DateTime<Utc>,
    /// Shared secret for receiver-side verification.
    pub secret: String,
}

/// Dispatches webhook notifications without blocking callers.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: Arc<NotifyClient>,
    webhook_url: Option<String>,
    secret: String,
    tracker: TaskTracker,
}

impl Notifier {
    /// Creates a notifier over a shared delivery client.
    ///
    /// With no webhook URL configured every dispatch is a no-op treated
    /// as success.
    pub fn new(client: NotifyClient, webhook_url: Option<String>, secret: Option<String>) -> Self {
        Self {
            client: Arc::new(client),
            webhook_url,
            secret: secret.unwrap_or_default(),
            tracker: TaskTracker::new(),
        }
    }

    /// Queues a notification for a newly stored record.
    ///
    /// Returns immediately; the delivery runs on a tracked background
    /// task. Failures are logged at error level with the receiver's
    /// status and body, then dropped — the push is neither rolled back
    /// nor requeued.
    pub fn notify_new_detection(
        &self,
        record_id: RecordId,
        inference_time_sec: f64,
        detection_results: Vec<Value>,
    ) {
        let Some(url) = self.webhook_url.clone() else {
            debug!(%record_id, "no webhook URL configured, skipping notification");
            return;
        };

        let notification = Notification {
            event: NEW_DETECTION_EVENT.to_string(),
            record_id,
            inference_time_sec,
            detection_results,
            timestamp: Utc::now(),
            secret: self.secret.clone(),
        };

        let client = self.client.clone();
        self.tracker.spawn(async move {
            match send(&client, &url, &notification).await {
                Ok(duration) => {
                    info!(
                        record_id = %notification.record_id,
                        duration_ms = duration.as_millis() as u64,
                        "webhook notification delivered"
                    );
                },
                Err(e) => {
                    error!(
                        record_id = %notification.record_id,
                        error = %e,
                        "webhook notification failed"
                    );
                },
            }
        });
    }

    /// Waits for all in-flight notifications to finish.
    ///
    /// Call once at process shutdown after the server has stopped
    /// accepting requests; no notification may be queued afterwards.
    pub async fn shutdown(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}

/// Sends one notification and classifies the outcome.
async fn send(client: &NotifyClient, url: &str, notification: &Notification) -> Result<Duration> {
    let response = client.post_json(url, notification).await?;

    if response.is_success {
        Ok(response.duration)
    } else {
        Err(NotifyError::rejected(response.status_code, response.body))
    }
}
