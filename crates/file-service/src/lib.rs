//! File-transfer engine for a request/response node bus.
//!
//! A node exposes locally stored files (firmware images, configuration
//! blobs, logs) to remote peers and/or pulls a remote file into memory
//! chunk by chunk. This crate is the engine only: path resolution with
//! traversal protection, the two inbound request handlers, and the
//! client-side pull state machine. The bus transport, message codec, and
//! request/response dispatch belong to the host, which bridges in through
//! the [`BusTransport`] port the way a dispatch loop invokes callbacks.
//!
//! # Sides
//!
//! - **Server** — [`FileServer`] answers `GetInfo` and `Read` requests
//!   against an ordered list of search roots, with an optional exact-match
//!   path override table.
//! - **Client** — [`FileClient`] drives one sequential pull per
//!   (node id, path) key, detecting end of file by a short chunk.
//!
//! Both sides refuse construction on an anonymous node.

pub mod client;
pub mod error;
pub mod resolver;
pub mod server;

pub use client::{BusTransport, FileClient, TransferStatus};
pub use error::{ServiceError, TransportError};
pub use resolver::PathResolver;
pub use server::FileServer;
