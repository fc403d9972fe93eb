//! Incremental HTTP/1.x message parsing for protocol handshakes.
//!
//! The [`http`] module reads and builds the request/response exchange that
//! opens a persistent connection. Its [`Parser`](http::Parser) accepts bytes
//! in arbitrary chunks as they come off a socket and reports exactly how many
//! of them belong to the message.

pub mod config;
pub mod http;
