// libs/waiting-room-client/src/poller.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::client::StatusClient;
use crate::models::{WaitingStatus, WaitingTrigger};

/// Fixed polling cadence. Matching the waiting views, which re-check every
/// three seconds regardless of load or latency.
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Background poller for a waiting view.
///
/// Polls the waiting-status endpoint until the trigger state is observed,
/// then invokes the transition callback once and stops. The transitioned
/// flag guards the callback even if two polls race each other, so a UI
/// navigation hooked to it can never double-fire.
///
/// The poll task lives until the trigger fires, `stop()` is called, or the
/// poller is dropped. Must be created inside a Tokio runtime.
pub struct WaitingRoomPoller {
    handle: JoinHandle<()>,
    transitioned: Arc<AtomicBool>,
}

impl WaitingRoomPoller {
    /// Spawns a poller on the fixed cadence. The first poll runs
    /// immediately, matching a view that wants the current state on mount.
    pub fn spawn<F>(
        client: StatusClient,
        appointment_id: Uuid,
        trigger: WaitingTrigger,
        on_transition: F,
    ) -> Self
    where
        F: FnMut(WaitingStatus) + Send + 'static,
    {
        Self::spawn_with_interval(client, appointment_id, trigger, POLL_INTERVAL, on_transition)
    }

    fn spawn_with_interval<F>(
        client: StatusClient,
        appointment_id: Uuid,
        trigger: WaitingTrigger,
        poll_interval: Duration,
        mut on_transition: F,
    ) -> Self
    where
        F: FnMut(WaitingStatus) + Send + 'static,
    {
        let transitioned = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&transitioned);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);

            loop {
                interval.tick().await;

                match client.fetch_status(appointment_id).await {
                    Ok(status) => {
                        if trigger.matches(&status) {
                            // swap returns the previous value; only the
                            // first observer gets to fire the callback
                            if !flag.swap(true, Ordering::SeqCst) {
                                info!(
                                    "Waiting room transition for appointment {}: {:?}",
                                    appointment_id, trigger
                                );
                                on_transition(status);
                            }
                            break;
                        }
                    }
                    Err(e) => {
                        // Transient failure, keep the cadence going
                        warn!(
                            "Waiting room poll failed for appointment {}: {}",
                            appointment_id, e
                        );
                    }
                }
            }
        });

        Self {
            handle,
            transitioned,
        }
    }

    /// Whether the transition callback has fired.
    pub fn has_transitioned(&self) -> bool {
        self.transitioned.load(Ordering::SeqCst)
    }

    /// Stops polling. Safe to call after the transition already fired.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for WaitingRoomPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
