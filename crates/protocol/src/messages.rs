use serde::{Deserialize, Serialize};

use crate::types::{EntryType, FileError, FilePath, base64_bytes};

// ---------------------------------------------------------------------------
// GetInfo service
// ---------------------------------------------------------------------------

/// Asks a node for metadata about one of its files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetInfoRequest {
    pub path: FilePath,
}

/// Metadata reply: error code, byte size, and entry-type flags.
///
/// On failure `error` carries the cause and the remaining fields stay at
/// their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetInfoResponse {
    pub error: FileError,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub entry_type: EntryType,
}

impl GetInfoResponse {
    /// Builds a failure reply carrying only the error code.
    pub fn failure(error: FileError) -> Self {
        Self {
            error,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Read service
// ---------------------------------------------------------------------------

/// Asks a node for the bytes of a file starting at `offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadRequest {
    pub offset: u64,
    pub path: FilePath,
}

/// One chunk of file data.
///
/// `data` holds at most [`MAX_CHUNK_SIZE`](crate::MAX_CHUNK_SIZE) bytes; a
/// shorter (or empty) chunk is the end-of-file marker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadResponse {
    pub error: FileError,
    #[serde(default, with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl ReadResponse {
    /// Builds a success reply carrying `data`.
    pub fn chunk(data: Vec<u8>) -> Self {
        Self {
            error: FileError::Ok,
            data,
        }
    }

    /// Builds a failure reply carrying only the error code.
    pub fn failure(error: FileError) -> Self {
        Self {
            error,
            data: Vec::new(),
        }
    }
}
