//! Inbound request handlers for the file services a node exposes.
//!
//! The host dispatch registers [`FileServer::handle_get_info`] and
//! [`FileServer::handle_read`] for the two request kinds and invokes them
//! synchronously with the requesting node's id. Handlers never fail: every
//! request produces a well-formed response, with local failures mapped onto
//! the protocol error vocabulary.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;

use tracing::{debug, warn};

use buslink_protocol::{
    EntryType, FileError, FilePath, GetInfoRequest, GetInfoResponse, MAX_CHUNK_SIZE, NodeId,
    ReadRequest, ReadResponse,
};

use crate::error::ServiceError;
use crate::resolver::PathResolver;

/// Serves local files to remote peers.
pub struct FileServer {
    local_id: NodeId,
    resolver: PathResolver,
    chunk_size: usize,
}

impl FileServer {
    /// Creates a server for the node identified by `local_id`.
    ///
    /// Fails with [`ServiceError::AnonymousNode`] when the node has no
    /// assigned identity; an anonymous node cannot answer on the bus.
    pub fn new(
        local_id: Option<NodeId>,
        search_roots: Vec<PathBuf>,
        path_map: HashMap<String, PathBuf>,
    ) -> Result<Self, ServiceError> {
        let local_id = local_id.ok_or(ServiceError::AnonymousNode)?;
        Ok(Self {
            local_id,
            resolver: PathResolver::new(search_roots, path_map),
            chunk_size: MAX_CHUNK_SIZE,
        })
    }

    /// Lowers the per-response chunk cap, e.g. for constrained links.
    ///
    /// The protocol maximum [`MAX_CHUNK_SIZE`] is a hard upper bound; a
    /// larger or zero value falls back to it.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = if chunk_size == 0 {
            MAX_CHUNK_SIZE
        } else {
            chunk_size.min(MAX_CHUNK_SIZE)
        };
        self
    }

    /// Node id this server answers as.
    pub fn local_id(&self) -> NodeId {
        self.local_id
    }

    /// Snapshot of the resolver's per-path hit counters.
    pub fn path_hit_counters(&self) -> HashMap<PathBuf, u64> {
        self.resolver.hit_counters()
    }

    /// Handles a `GetInfo` request from `source`.
    pub fn handle_get_info(&self, source: NodeId, request: &GetInfoRequest) -> GetInfoResponse {
        let requested = String::from_utf8_lossy(&request.path.raw).into_owned();
        debug!(node = source, path = %requested, "get_info request");

        match self.get_info(&request.path) {
            Ok(size) => GetInfoResponse {
                error: FileError::Ok,
                size,
                entry_type: EntryType::FILE | EntryType::READABLE,
            },
            Err(e) => {
                warn!(node = source, path = %requested, error = %e, "get_info failed");
                GetInfoResponse::failure(e.to_file_error())
            }
        }
    }

    /// Handles a `Read` request from `source`.
    pub fn handle_read(&self, source: NodeId, request: &ReadRequest) -> ReadResponse {
        let requested = String::from_utf8_lossy(&request.path.raw).into_owned();
        debug!(
            node = source,
            path = %requested,
            offset = request.offset,
            "read request"
        );

        match self.read_chunk(request) {
            Ok(data) => ReadResponse::chunk(data),
            Err(e) => {
                warn!(
                    node = source,
                    path = %requested,
                    offset = request.offset,
                    error = %e,
                    "read failed"
                );
                ReadResponse::failure(e.to_file_error())
            }
        }
    }

    fn get_info(&self, path: &FilePath) -> Result<u64, ServiceError> {
        let resolved = self.resolver.resolve(path)?;
        let file = File::open(&resolved)?;
        Ok(file.metadata()?.len())
    }

    fn read_chunk(&self, request: &ReadRequest) -> Result<Vec<u8>, ServiceError> {
        let resolved = self.resolver.resolve(&request.path)?;
        let mut file = File::open(&resolved)?;
        file.seek(SeekFrom::Start(request.offset))?;

        let mut data = Vec::with_capacity(self.chunk_size);
        file.take(self.chunk_size as u64).read_to_end(&mut data)?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    fn server_over(dir: &Path) -> FileServer {
        FileServer::new(Some(7), vec![dir.to_path_buf()], HashMap::new()).unwrap()
    }

    #[test]
    fn anonymous_node_cannot_construct() {
        let result = FileServer::new(None, vec![], HashMap::new());
        assert!(matches!(result, Err(ServiceError::AnonymousNode)));
    }

    #[test]
    fn get_info_reports_size_and_flags() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(tmp.path(), "cfg.bin", b"\xab\xcd\xab\xcd");
        let server = server_over(tmp.path());

        let resp = server.handle_get_info(
            42,
            &GetInfoRequest {
                path: FilePath::from("cfg.bin"),
            },
        );
        assert_eq!(resp.error, FileError::Ok);
        assert_eq!(resp.size, 4);
        assert!(resp.entry_type.contains(EntryType::FILE));
        assert!(resp.entry_type.contains(EntryType::READABLE));
    }

    #[test]
    fn get_info_missing_file_is_well_formed_error() {
        let tmp = tempfile::tempdir().unwrap();
        let server = server_over(tmp.path());

        let resp = server.handle_get_info(
            42,
            &GetInfoRequest {
                path: FilePath::from("absent.bin"),
            },
        );
        assert_eq!(resp.error, FileError::NotFound);
        assert_eq!(resp.size, 0);
        assert!(resp.entry_type.is_empty());
    }

    #[test]
    fn read_returns_whole_small_file() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(tmp.path(), "cfg.bin", b"\xab\xcd\xab\xcd");
        let server = server_over(tmp.path());

        let resp = server.handle_read(
            42,
            &ReadRequest {
                offset: 0,
                path: FilePath::from("cfg.bin"),
            },
        );
        assert_eq!(resp.error, FileError::Ok);
        assert_eq!(resp.data, b"\xab\xcd\xab\xcd");
    }

    #[test]
    fn read_honors_offset_and_chunk_cap() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(tmp.path(), "big.bin", &vec![7u8; 600]);
        let server = server_over(tmp.path());

        let path = FilePath::from("big.bin");
        let first = server.handle_read(42, &ReadRequest { offset: 0, path: path.clone() });
        assert_eq!(first.data.len(), MAX_CHUNK_SIZE);

        let last = server.handle_read(42, &ReadRequest { offset: 512, path: path.clone() });
        assert_eq!(last.data.len(), 88);

        let past_end = server.handle_read(42, &ReadRequest { offset: 600, path });
        assert_eq!(past_end.error, FileError::Ok);
        assert!(past_end.data.is_empty());
    }

    #[test]
    fn lowered_chunk_size_is_respected() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(tmp.path(), "big.bin", &vec![1u8; 100]);
        let server = server_over(tmp.path()).with_chunk_size(16);

        let resp = server.handle_read(
            42,
            &ReadRequest {
                offset: 0,
                path: FilePath::from("big.bin"),
            },
        );
        assert_eq!(resp.data.len(), 16);
    }

    #[test]
    fn chunk_size_never_exceeds_protocol_maximum() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(tmp.path(), "big.bin", &vec![1u8; 1024]);
        let server = server_over(tmp.path()).with_chunk_size(4096);

        let resp = server.handle_read(
            42,
            &ReadRequest {
                offset: 0,
                path: FilePath::from("big.bin"),
            },
        );
        assert_eq!(resp.data.len(), MAX_CHUNK_SIZE);
    }

    #[test]
    fn read_traversal_is_rejected_with_error_response() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(tmp.path(), "secret.bin", b"s");
        let sub = tmp.path().join("sub");
        std::fs::create_dir_all(&sub).unwrap();
        let server = FileServer::new(Some(7), vec![sub], HashMap::new()).unwrap();

        let resp = server.handle_read(
            42,
            &ReadRequest {
                offset: 0,
                path: FilePath::from("../secret.bin"),
            },
        );
        assert!(!resp.error.is_ok());
        assert!(resp.data.is_empty());
    }

    #[test]
    fn served_files_show_up_in_hit_counters() {
        let tmp = tempfile::tempdir().unwrap();
        let file = write_file(tmp.path(), "cfg.bin", b"x");
        let abs = std::path::absolute(&file).unwrap();
        let server = server_over(tmp.path());

        let path = FilePath::from("cfg.bin");
        server.handle_get_info(42, &GetInfoRequest { path: path.clone() });
        server.handle_read(42, &ReadRequest { offset: 0, path });

        assert_eq!(server.path_hit_counters().get(&abs), Some(&2));
    }
}
