//! Connection-to-player bindings.
//!
//! A binding ties one live socket to one `(room, player)` pair and
//! carries the outbound queue for that socket. Bindings are keyed by
//! [`ConnectionId`], so a player reconnecting in a second tab simply
//! produces a second binding; the room layer doesn't care how many
//! sockets a player holds.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;

use quizroom_protocol::{PlayerId, RoomId};

/// Process-unique id for one accepted socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

impl ConnectionId {
    /// Allocates the next id. Never reused within a process.
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// What a bound connection is attached to. The sender feeds the
/// connection's writer task; encoded frames pushed here go out in push
/// order.
#[derive(Debug, Clone)]
pub struct Binding {
    pub room_id: RoomId,
    pub player_id: PlayerId,
    pub sender: UnboundedSender<Vec<u8>>,
}

/// All live bindings. One per connection, at most.
#[derive(Debug, Default)]
pub struct SessionBinder {
    bindings: Mutex<HashMap<ConnectionId, Binding>>,
}

impl SessionBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a connection, replacing any previous binding it held
    /// (a client switching rooms re-binds on the same socket).
    pub async fn bind(&self, connection_id: ConnectionId, binding: Binding) {
        tracing::debug!(
            %connection_id,
            room_id = %binding.room_id,
            player_id = %binding.player_id,
            "connection bound"
        );
        self.bindings.lock().await.insert(connection_id, binding);
    }

    /// Removes and returns a connection's binding, if it had one.
    pub async fn unbind(&self, connection_id: ConnectionId) -> Option<Binding> {
        let removed = self.bindings.lock().await.remove(&connection_id);
        if removed.is_some() {
            tracing::debug!(%connection_id, "connection unbound");
        }
        removed
    }

    /// The binding a connection currently holds.
    pub async fn get(&self, connection_id: ConnectionId) -> Option<Binding> {
        self.bindings.lock().await.get(&connection_id).cloned()
    }

    /// Every binding attached to a room, for broadcasting. Order is
    /// unspecified.
    pub async fn members_of(&self, room_id: &RoomId) -> Vec<(ConnectionId, Binding)> {
        self.bindings
            .lock()
            .await
            .iter()
            .filter(|(_, b)| &b.room_id == room_id)
            .map(|(id, b)| (*id, b.clone()))
            .collect()
    }

    /// Drops every binding attached to a room and returns them, for
    /// room-closed teardown.
    pub async fn drop_room(&self, room_id: &RoomId) -> Vec<Binding> {
        let mut bindings = self.bindings.lock().await;
        let doomed: Vec<ConnectionId> = bindings
            .iter()
            .filter(|(_, b)| &b.room_id == room_id)
            .map(|(id, _)| *id)
            .collect();
        let removed = doomed
            .into_iter()
            .filter_map(|id| bindings.remove(&id))
            .collect::<Vec<_>>();
        if !removed.is_empty() {
            tracing::debug!(%room_id, dropped = removed.len(), "room bindings dropped");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn binding(room: &str, player: &str) -> (Binding, mpsc::UnboundedReceiver<Vec<u8>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Binding {
                room_id: RoomId::from(room),
                player_id: PlayerId::from(player),
                sender: tx,
            },
            rx,
        )
    }

    #[test]
    fn test_connection_ids_are_unique_and_ordered() {
        let a = ConnectionId::next();
        let b = ConnectionId::next();
        assert_ne!(a, b);
        assert!(a < b);
    }

    #[tokio::test]
    async fn test_bind_replaces_previous_binding() {
        let binder = SessionBinder::new();
        let conn = ConnectionId::next();
        let (first, _rx1) = binding("ROOM01", "p1");
        let (second, _rx2) = binding("ROOM02", "p1");

        binder.bind(conn, first).await;
        binder.bind(conn, second).await;

        let current = binder.get(conn).await.unwrap();
        assert_eq!(current.room_id, RoomId::from("ROOM02"));
        assert!(binder.members_of(&RoomId::from("ROOM01")).await.is_empty());
    }

    #[tokio::test]
    async fn test_members_of_filters_by_room() {
        let binder = SessionBinder::new();
        let room = RoomId::from("ROOM01");
        let (a, _ra) = binding("ROOM01", "p1");
        let (b, _rb) = binding("ROOM01", "p2");
        let (c, _rc) = binding("OTHER1", "p3");
        binder.bind(ConnectionId::next(), a).await;
        binder.bind(ConnectionId::next(), b).await;
        binder.bind(ConnectionId::next(), c).await;

        let members = binder.members_of(&room).await;
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|(_, b)| b.room_id == room));
    }

    #[tokio::test]
    async fn test_unbind_is_idempotent() {
        let binder = SessionBinder::new();
        let conn = ConnectionId::next();
        let (b, _rx) = binding("ROOM01", "p1");
        binder.bind(conn, b).await;

        assert!(binder.unbind(conn).await.is_some());
        assert!(binder.unbind(conn).await.is_none());
        assert!(binder.get(conn).await.is_none());
    }

    #[tokio::test]
    async fn test_drop_room_removes_only_that_room() {
        let binder = SessionBinder::new();
        let (a, _ra) = binding("ROOM01", "p1");
        let (b, _rb) = binding("OTHER1", "p2");
        let keep = ConnectionId::next();
        binder.bind(ConnectionId::next(), a).await;
        binder.bind(keep, b).await;

        let dropped = binder.drop_room(&RoomId::from("ROOM01")).await;
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].player_id, PlayerId::from("p1"));
        assert!(binder.get(keep).await.is_some());
    }
}
