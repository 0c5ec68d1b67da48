//! Wire types shared by the HTTP and WebSocket RPC transports.

pub mod frames;
pub mod handshake;
pub mod methods;
