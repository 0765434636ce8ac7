//! Wire payload types for the buslink file-transfer services.
//!
//! A node on the bus exposes two file services to its peers: `GetInfo`
//! (metadata query) and `Read` (chunked read at a byte offset). This crate
//! defines the request/response payloads for both, the protocol error
//! vocabulary, and the entry-type flag set. Transport framing and the
//! request/response matching live in the host dispatch layer, not here.

pub mod messages;
pub mod types;

pub use messages::{GetInfoRequest, GetInfoResponse, ReadRequest, ReadResponse};
pub use types::{EntryType, FileError, FilePath, NodeId, PathEncodingError};

/// Maximum number of data bytes in a single `Read` response.
///
/// A response carrying fewer bytes than this (including zero) marks the
/// end of the file; the reader stops requesting further chunks.
pub const MAX_CHUNK_SIZE: usize = 256;
