use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;

use super::protocol::ServerFrame;

pub type ConnectionId = u64;

type RoomMap = HashMap<String, Vec<(ConnectionId, mpsc::UnboundedSender<String>)>>;

/// Fan-out of chat frames to every connection joined to a room.
///
/// Each WebSocket owns one unbounded sender; the hub only holds clones of it,
/// so a closed socket shows up as a failed send and is pruned lazily.
#[derive(Clone, Default)]
pub struct ChatHub {
    rooms: Arc<RwLock<RoomMap>>,
    next_id: Arc<AtomicU64>,
}

impl ChatHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_connection_id(&self) -> ConnectionId {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Add a connection to a room. Joining twice is a no-op.
    pub fn join(&self, room: &str, conn: ConnectionId, tx: mpsc::UnboundedSender<String>) {
        let mut rooms = self.rooms.write().unwrap_or_else(|e| e.into_inner());
        let members = rooms.entry(room.to_string()).or_default();
        if !members.iter().any(|(id, _)| *id == conn) {
            members.push((conn, tx));
        }
    }

    /// Remove a connection from a room; empty rooms are dropped.
    pub fn leave(&self, room: &str, conn: ConnectionId) {
        let mut rooms = self.rooms.write().unwrap_or_else(|e| e.into_inner());
        if let Some(members) = rooms.get_mut(room) {
            members.retain(|(id, _)| *id != conn);
            if members.is_empty() {
                rooms.remove(room);
            }
        }
    }

    /// Remove a connection from every room it joined.
    pub fn disconnect(&self, conn: ConnectionId) {
        let mut rooms = self.rooms.write().unwrap_or_else(|e| e.into_inner());
        rooms.retain(|_, members| {
            members.retain(|(id, _)| *id != conn);
            !members.is_empty()
        });
    }

    pub fn is_member(&self, room: &str, conn: ConnectionId) -> bool {
        let rooms = self.rooms.read().unwrap_or_else(|e| e.into_inner());
        rooms
            .get(room)
            .is_some_and(|members| members.iter().any(|(id, _)| *id == conn))
    }

    pub fn member_count(&self, room: &str) -> usize {
        let rooms = self.rooms.read().unwrap_or_else(|e| e.into_inner());
        rooms.get(room).map_or(0, Vec::len)
    }

    /// Send a frame to every connection in the room. Returns how many received it.
    pub fn broadcast(&self, room: &str, frame: &ServerFrame) -> usize {
        let payload = frame.to_json();
        let mut dead = Vec::new();
        let delivered = {
            let rooms = self.rooms.read().unwrap_or_else(|e| e.into_inner());
            let Some(members) = rooms.get(room) else {
                return 0;
            };
            let mut delivered = 0;
            for (id, tx) in members {
                if tx.send(payload.clone()).is_ok() {
                    delivered += 1;
                } else {
                    dead.push(*id);
                }
            }
            delivered
        };
        for id in dead {
            log::debug!("Pruning closed chat connection {id}");
            self.disconnect(id);
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(room: &str) -> ServerFrame {
        ServerFrame::Status { room: room.into(), msg: "hello".into() }
    }

    #[test]
    fn broadcast_reaches_only_room_members() {
        let hub = ChatHub::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let a = hub.next_connection_id();
        let b = hub.next_connection_id();
        assert_ne!(a, b);

        hub.join("general", a, tx_a);
        hub.join("other", b, tx_b);

        assert_eq!(hub.broadcast("general", &status("general")), 1);
        assert!(rx_a.try_recv().unwrap().contains("\"status\""));
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn joining_twice_delivers_once() {
        let hub = ChatHub::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.join("general", 1, tx.clone());
        hub.join("general", 1, tx);
        assert_eq!(hub.member_count("general"), 1);
        hub.broadcast("general", &status("general"));
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn leave_and_disconnect_clean_up_rooms() {
        let hub = ChatHub::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        hub.join("a", 1, tx.clone());
        hub.join("b", 1, tx.clone());
        hub.join("b", 2, tx);

        hub.leave("a", 1);
        assert!(!hub.is_member("a", 1));
        assert_eq!(hub.member_count("a"), 0);

        hub.disconnect(1);
        assert!(!hub.is_member("b", 1));
        assert!(hub.is_member("b", 2));
    }

    #[test]
    fn closed_receivers_are_pruned_on_broadcast() {
        let hub = ChatHub::new();
        let (tx_live, mut rx_live) = mpsc::unbounded_channel();
        let (tx_dead, rx_dead) = mpsc::unbounded_channel();
        hub.join("general", 1, tx_live);
        hub.join("general", 2, tx_dead);
        drop(rx_dead);

        assert_eq!(hub.broadcast("general", &status("general")), 1);
        assert!(rx_live.try_recv().is_ok());
        assert_eq!(hub.member_count("general"), 1);
        assert!(!hub.is_member("general", 2));
    }

    #[test]
    fn broadcast_to_unknown_room_is_a_no_op() {
        let hub = ChatHub::new();
        assert_eq!(hub.broadcast("nowhere", &status("nowhere")), 0);
    }
}
