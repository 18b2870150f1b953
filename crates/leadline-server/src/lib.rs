//! HTTP front end for [`leadline`].
//!
//! The binary in `main.rs` wires configuration, telemetry and the file-backed
//! stores together; this library target exposes the same router so it can be
//! driven in tests without binding a socket.

pub mod server;
