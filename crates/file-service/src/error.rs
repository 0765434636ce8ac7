//! File-service error types.

use buslink_protocol::{FileError, NodeId};

/// Failure reported by the host transport when a request cannot be sent.
#[derive(Debug, thiserror::Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

/// Errors produced by the file-transfer engine.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("file service cannot be started on an anonymous node")]
    AnonymousNode,

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("file not found")]
    NotFound,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("transfer already active for node {node_id} path {path:?}")]
    TransferActive { node_id: NodeId, path: String },

    #[error("no transfer for node {node_id} path {path:?}")]
    UnknownTransfer { node_id: NodeId, path: String },

    #[error("transfer for node {node_id} path {path:?} is already complete")]
    TransferComplete { node_id: NodeId, path: String },

    #[error("response offset {got} does not match expected offset {expected}")]
    OffsetMismatch { expected: u64, got: u64 },

    #[error("remote error: {0}")]
    Remote(FileError),
}

impl ServiceError {
    /// Maps this failure onto the protocol error vocabulary for a response.
    pub fn to_file_error(&self) -> FileError {
        match self {
            ServiceError::NotFound => FileError::NotFound,
            ServiceError::InvalidPath(_) => FileError::NotFound,
            ServiceError::Io(e) => FileError::from_io(e),
            ServiceError::Remote(code) => *code,
            _ => FileError::UnknownError,
        }
    }
}
