//! Host continuity: grace timers for disconnected hosts.
//!
//! When a room's host drops, the server arms a timer here. If the host
//! comes back (or the room closes) before it fires, the timer is
//! disarmed and nothing happens. If it fires, the expiry action the
//! server supplied runs — re-check that the host is still gone, promote
//! a replacement, broadcast.
//!
//! At most one timer exists per room. Arming while a timer is already
//! pending is a no-op, so repeated host disconnect/reconnect cycles
//! can't stack timers.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use quizroom_protocol::RoomId;

/// How long a room waits for its host to return before promoting a
/// replacement.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub struct HostContinuity {
    grace: Duration,
    // Shared with the spawned timer tasks, which remove their own
    // entry when they fire.
    timers: Arc<Mutex<HashMap<RoomId, JoinHandle<()>>>>,
}

impl Default for HostContinuity {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE)
    }
}

impl HostContinuity {
    pub fn new(grace: Duration) -> Self {
        Self {
            grace,
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Arms the grace timer for a room. `on_expiry` runs once the full
    /// grace period elapses without a disarm. No-op if a timer for this
    /// room is already pending.
    pub async fn arm<F>(&self, room_id: RoomId, on_expiry: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut timers = self.timers.lock().await;
        // A finished handle is a timer that already fired; replace it.
        if let Some(existing) = timers.get(&room_id) {
            if !existing.is_finished() {
                return;
            }
        }

        tracing::info!(%room_id, grace = ?self.grace, "host grace timer armed");
        let grace = self.grace;
        let shared = Arc::clone(&self.timers);
        let key = room_id.clone();
        // Anchor the deadline to arm time, not the spawned task's
        // first poll, so the grace period starts now.
        let sleep = tokio::time::sleep(grace);
        let handle = tokio::spawn(async move {
            sleep.await;
            // Remove our own entry first so the expiry action can
            // re-arm if it needs to.
            shared.lock().await.remove(&key);
            tracing::info!(room_id = %key, "host grace timer expired");
            on_expiry.await;
        });
        timers.insert(room_id, handle);
    }

    /// Cancels a room's pending timer. Safe to call when none exists.
    pub async fn disarm(&self, room_id: &RoomId) {
        if let Some(handle) = self.timers.lock().await.remove(room_id) {
            handle.abort();
            tracing::info!(%room_id, "host grace timer disarmed");
        }
    }

    /// Whether a timer is currently pending for the room.
    pub async fn is_armed(&self, room_id: &RoomId) -> bool {
        self.timers
            .lock()
            .await
            .get(room_id)
            .is_some_and(|h| !h.is_finished())
    }
}
