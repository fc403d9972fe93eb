pub mod accept;
pub mod handshake;
pub mod server;
