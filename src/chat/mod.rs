//! Room-scoped chat relay: wire frames, the in-process hub, and the
//! per-connection WebSocket loop.

pub mod hub;
pub mod protocol;
pub mod socket;

pub use hub::ChatHub;
