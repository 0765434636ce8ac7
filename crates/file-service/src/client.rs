//! Client-side driver for pulling a remote file chunk by chunk.
//!
//! The driver owns no scheduling: it issues read requests through the host
//! transport and is fed the matching responses by the host dispatch. One
//! transfer may be in flight per (node id, path) key; distinct keys advance
//! independently. Completion is signalled by a chunk shorter than the
//! negotiated chunk size (an empty chunk counts).

use std::collections::HashMap;

use tracing::{debug, warn};

use buslink_protocol::{FilePath, MAX_CHUNK_SIZE, NodeId, ReadRequest, ReadResponse};

use crate::error::{ServiceError, TransportError};

/// Outbound request port provided by the host dispatch.
///
/// The dispatch matches each response to the request it answers; when the
/// response arrives it is handed back to
/// [`FileClient::handle_read_response`] together with the offset the
/// request carried, which is what lets the driver reject out-of-order
/// delivery.
pub trait BusTransport {
    /// Sends a read request to `target` and registers interest in its
    /// response. An `Err` means the request never left this node.
    fn send_read_request(&self, target: NodeId, request: ReadRequest)
    -> Result<(), TransportError>;
}

impl<T: BusTransport + ?Sized> BusTransport for &T {
    fn send_read_request(
        &self,
        target: NodeId,
        request: ReadRequest,
    ) -> Result<(), TransportError> {
        (**self).send_read_request(target, request)
    }
}

/// Progress report returned for each accepted response chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    /// Chunk accepted, next request issued.
    InProgress { received: u64 },
    /// Final chunk accepted; the file is fully received.
    Complete { size: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TransferKey {
    node_id: NodeId,
    path: String,
}

#[derive(Debug, Default)]
struct Transfer {
    offset: u64,
    data: Vec<u8>,
    complete: bool,
}

/// Pulls remote files into memory over the bus.
pub struct FileClient<T: BusTransport> {
    local_id: NodeId,
    transport: T,
    transfers: HashMap<TransferKey, Transfer>,
    chunk_size: usize,
}

impl<T: BusTransport> FileClient<T> {
    /// Creates a client for the node identified by `local_id`.
    ///
    /// Fails with [`ServiceError::AnonymousNode`] when the node has no
    /// assigned identity.
    pub fn new(local_id: Option<NodeId>, transport: T) -> Result<Self, ServiceError> {
        let local_id = local_id.ok_or(ServiceError::AnonymousNode)?;
        Ok(Self {
            local_id,
            transport,
            transfers: HashMap::new(),
            chunk_size: MAX_CHUNK_SIZE,
        })
    }

    /// Overrides the chunk size used for end-of-transfer detection.
    ///
    /// Must match the serving node's per-response cap; bounded by the
    /// protocol maximum [`MAX_CHUNK_SIZE`].
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = if chunk_size == 0 {
            MAX_CHUNK_SIZE
        } else {
            chunk_size.min(MAX_CHUNK_SIZE)
        };
        self
    }

    /// Node id this client requests as.
    pub fn local_id(&self) -> NodeId {
        self.local_id
    }

    /// Starts pulling `path` from `target`, beginning at offset 0.
    ///
    /// Fails with [`ServiceError::TransferActive`] while an incomplete
    /// transfer exists for the same (node, path) key. A previously
    /// completed transfer for the key is discarded and restarted from
    /// scratch. A transport failure removes the fresh transfer again, so a
    /// later `start` retries cleanly.
    pub fn start(&mut self, target: NodeId, path: &str) -> Result<(), ServiceError> {
        let key = TransferKey {
            node_id: target,
            path: path.to_string(),
        };
        if let Some(existing) = self.transfers.get(&key) {
            if !existing.complete {
                return Err(ServiceError::TransferActive {
                    node_id: target,
                    path: path.to_string(),
                });
            }
        }

        debug!(node = target, path, "starting transfer");
        self.transfers.insert(key.clone(), Transfer::default());

        if let Err(e) = self.transport.send_read_request(
            target,
            ReadRequest {
                offset: 0,
                path: FilePath::from(path),
            },
        ) {
            self.transfers.remove(&key);
            return Err(e.into());
        }
        Ok(())
    }

    /// Feeds the driver one read response.
    ///
    /// `request_offset` is the offset the answered request carried. The
    /// response is rejected, without touching transfer state, when no
    /// transfer exists for the key, the transfer is already complete, or
    /// the offset does not match the transfer's current offset. A remote
    /// error or a failure to issue the follow-up request removes the
    /// transfer; the caller restarts from offset 0 via [`FileClient::start`].
    pub fn handle_read_response(
        &mut self,
        source: NodeId,
        path: &str,
        request_offset: u64,
        response: ReadResponse,
    ) -> Result<TransferStatus, ServiceError> {
        let key = TransferKey {
            node_id: source,
            path: path.to_string(),
        };

        let Some(transfer) = self.transfers.get_mut(&key) else {
            debug!(node = source, path, "dropping response for unknown transfer");
            return Err(ServiceError::UnknownTransfer {
                node_id: source,
                path: path.to_string(),
            });
        };

        if transfer.complete {
            debug!(node = source, path, "dropping response for completed transfer");
            return Err(ServiceError::TransferComplete {
                node_id: source,
                path: path.to_string(),
            });
        }

        if request_offset != transfer.offset {
            warn!(
                node = source,
                path,
                expected = transfer.offset,
                got = request_offset,
                "out-of-order response rejected"
            );
            return Err(ServiceError::OffsetMismatch {
                expected: transfer.offset,
                got: request_offset,
            });
        }

        if !response.error.is_ok() {
            warn!(node = source, path, error = %response.error, "remote read failed");
            self.transfers.remove(&key);
            return Err(ServiceError::Remote(response.error));
        }

        let len = response.data.len();
        transfer.data.extend_from_slice(&response.data);
        transfer.offset += len as u64;
        let next_offset = transfer.offset;

        // A short (or empty) chunk is the end-of-file marker.
        if len < self.chunk_size {
            transfer.complete = true;
            debug!(node = source, path, size = next_offset, "transfer complete");
            return Ok(TransferStatus::Complete { size: next_offset });
        }

        if let Err(e) = self.transport.send_read_request(
            source,
            ReadRequest {
                offset: next_offset,
                path: FilePath::from(path),
            },
        ) {
            self.transfers.remove(&key);
            return Err(e.into());
        }
        Ok(TransferStatus::InProgress {
            received: next_offset,
        })
    }

    /// Bytes received so far for the key (0 when no transfer exists).
    pub fn bytes_received(&self, target: NodeId, path: &str) -> u64 {
        self.transfers
            .get(&TransferKey {
                node_id: target,
                path: path.to_string(),
            })
            .map(|t| t.offset)
            .unwrap_or(0)
    }

    /// Returns `true` once the transfer for the key has completed.
    pub fn is_complete(&self, target: NodeId, path: &str) -> bool {
        self.transfers
            .get(&TransferKey {
                node_id: target,
                path: path.to_string(),
            })
            .is_some_and(|t| t.complete)
    }

    /// Removes a completed transfer and yields its accumulated bytes.
    ///
    /// Returns `None` while the transfer is absent or still in progress.
    pub fn take_data(&mut self, target: NodeId, path: &str) -> Option<Vec<u8>> {
        let key = TransferKey {
            node_id: target,
            path: path.to_string(),
        };
        if self.transfers.get(&key)?.complete {
            self.transfers.remove(&key).map(|t| t.data)
        } else {
            None
        }
    }

    /// Discards the transfer for the key, complete or not.
    ///
    /// Any response that arrives for the key afterwards is dropped as
    /// unknown. Returns `true` when a transfer existed.
    pub fn abandon(&mut self, target: NodeId, path: &str) -> bool {
        self.transfers
            .remove(&TransferKey {
                node_id: target,
                path: path.to_string(),
            })
            .is_some()
    }
}
