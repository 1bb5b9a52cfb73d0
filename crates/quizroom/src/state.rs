//! Shared server state passed to each connection task.

use std::sync::Arc;
use std::time::Duration;

use quizroom_protocol::JsonCodec;
use quizroom_room::RoomStore;
use quizroom_session::{HostContinuity, SessionBinder};

/// Everything the connection handlers share. Wrapped in `Arc` by the
/// server and cheaply cloned into each task.
pub(crate) struct AppState {
    pub(crate) rooms: RoomStore,
    pub(crate) binder: SessionBinder,
    pub(crate) continuity: Arc<HostContinuity>,
    pub(crate) codec: JsonCodec,
}

impl AppState {
    pub(crate) fn new(host_grace: Duration) -> Self {
        Self {
            rooms: RoomStore::new(),
            binder: SessionBinder::new(),
            continuity: Arc::new(HostContinuity::new(host_grace)),
            codec: JsonCodec,
        }
    }
}
