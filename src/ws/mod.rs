//! WebSocket layer: upgrade handler, per-connection loop, and wire frames.

pub mod connection;
pub mod handler;
pub mod messages;
