//! In-memory room registry.
//!
//! The map itself is guarded by an async `RwLock`; each room sits
//! behind its own `Mutex`, so commands against different rooms never
//! contend. Callers clone the `Arc` out of the map and release the map
//! lock before touching the room.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use quizroom_protocol::{PlayerId, RoomId, RoomSettings};

use crate::model::Room;
use crate::RoomError;

/// Shared handle to a single room's state.
pub type SharedRoom = Arc<Mutex<Room>>;

/// All live rooms. Rooms exist from `CREATE_ROOM` until `CLOSE_ROOM`;
/// there is no idle expiry.
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: RwLock<HashMap<RoomId, SharedRoom>>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a room under a freshly generated code and returns its
    /// handle. Settings are normalized here so the rest of the crate
    /// can assume well-formed scoring positions.
    pub async fn create_room(
        &self,
        room_name: Option<String>,
        host_id: PlayerId,
        host_name: String,
        settings: RoomSettings,
    ) -> (RoomId, SharedRoom) {
        let settings = settings.normalized();
        let mut rooms = self.rooms.write().await;
        // Collisions in a 36^6 space are rare; retry until free.
        let room_id = loop {
            let candidate = RoomId::generate();
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
        };
        let room = Room::new(
            room_id.clone(),
            room_name,
            host_id,
            host_name,
            settings,
        );
        let shared = Arc::new(Mutex::new(room));
        rooms.insert(room_id.clone(), Arc::clone(&shared));
        tracing::info!(%room_id, total = rooms.len(), "room created");
        (room_id, shared)
    }

    /// Looks up a room by its code.
    pub async fn get(&self, room_id: &RoomId) -> Result<SharedRoom, RoomError> {
        self.rooms
            .read()
            .await
            .get(room_id)
            .cloned()
            .ok_or_else(|| RoomError::RoomNotFound(room_id.clone()))
    }

    /// Removes a room. Existing handles stay usable until dropped, but
    /// the code is immediately free for reuse.
    pub async fn remove(&self, room_id: &RoomId) -> Option<SharedRoom> {
        let removed = self.rooms.write().await.remove(room_id);
        if removed.is_some() {
            tracing::info!(%room_id, "room removed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }
}
