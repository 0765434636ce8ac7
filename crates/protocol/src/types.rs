use serde::{Deserialize, Serialize};

/// Bus node address. Identifies a peer on the shared bus; the wire format
/// carries it as a small unsigned integer.
pub type NodeId = u8;

/// Error returned when a [`FilePath`] does not decode as UTF-8.
#[derive(Debug, thiserror::Error)]
#[error("file path is not valid UTF-8")]
pub struct PathEncodingError;

/// A file path as it travels on the bus.
///
/// Raw bytes with a protocol-defined separator ([`FilePath::SEPARATOR`]),
/// not the host path separator. A remote-supplied `FilePath` is untrusted:
/// it must be decoded, separator-translated, and normalized before it is
/// allowed anywhere near the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePath {
    /// Raw path bytes, base64-encoded in JSON.
    #[serde(with = "base64_bytes")]
    pub raw: Vec<u8>,
}

impl FilePath {
    /// Path separator code point used on the wire.
    pub const SEPARATOR: u8 = b'/';

    /// Wraps raw wire bytes.
    pub fn new(raw: Vec<u8>) -> Self {
        Self { raw }
    }

    /// Decodes the raw bytes as UTF-8.
    pub fn decode(&self) -> Result<&str, PathEncodingError> {
        std::str::from_utf8(&self.raw).map_err(|_| PathEncodingError)
    }
}

impl From<&str> for FilePath {
    fn from(s: &str) -> Self {
        Self {
            raw: s.as_bytes().to_vec(),
        }
    }
}

/// Protocol error vocabulary for file-service responses.
///
/// Numeric values are fixed by the bus protocol and carried as an `i16`
/// on the wire. `Ok` and `UnknownError` are always reachable; the finer
/// codes are populated where the host io error classifies cleanly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(from = "i16", into = "i16")]
pub enum FileError {
    #[default]
    #[error("OK")]
    Ok,
    #[error("file not found")]
    NotFound,
    #[error("I/O error")]
    IoError,
    #[error("access denied")]
    AccessDenied,
    #[error("is a directory")]
    IsDirectory,
    #[error("invalid mode")]
    InvalidMode,
    #[error("file too large")]
    FileTooLarge,
    #[error("out of space")]
    OutOfSpace,
    #[error("unknown error")]
    UnknownError,
}

impl FileError {
    /// Protocol code for this error.
    pub fn code(self) -> i16 {
        match self {
            FileError::Ok => 0,
            FileError::NotFound => 2,
            FileError::IoError => 5,
            FileError::AccessDenied => 13,
            FileError::IsDirectory => 21,
            FileError::InvalidMode => 22,
            FileError::FileTooLarge => 27,
            FileError::OutOfSpace => 28,
            FileError::UnknownError => 32767,
        }
    }

    /// Maps a host io error onto the protocol vocabulary.
    ///
    /// Codes without a clean correspondence collapse to `IoError`; anything
    /// the host cannot classify at all becomes `UnknownError`.
    pub fn from_io(err: &std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::NotFound => FileError::NotFound,
            ErrorKind::PermissionDenied => FileError::AccessDenied,
            ErrorKind::IsADirectory => FileError::IsDirectory,
            ErrorKind::StorageFull => FileError::OutOfSpace,
            ErrorKind::Other => FileError::UnknownError,
            _ => FileError::IoError,
        }
    }

    /// Returns `true` for the success code.
    pub fn is_ok(self) -> bool {
        self == FileError::Ok
    }
}

impl From<i16> for FileError {
    fn from(code: i16) -> Self {
        match code {
            0 => FileError::Ok,
            2 => FileError::NotFound,
            5 => FileError::IoError,
            13 => FileError::AccessDenied,
            21 => FileError::IsDirectory,
            22 => FileError::InvalidMode,
            27 => FileError::FileTooLarge,
            28 => FileError::OutOfSpace,
            // Unrecognized codes collapse to the generic failure.
            _ => FileError::UnknownError,
        }
    }
}

impl From<FileError> for i16 {
    fn from(err: FileError) -> Self {
        err.code()
    }
}

bitflags::bitflags! {
    /// Entry-type flag set in a `GetInfo` response.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EntryType: u8 {
        const FILE      = 1 << 0;
        const DIRECTORY = 1 << 1;
        const SYMLINK   = 1 << 2;
        const READABLE  = 1 << 3;
        const WRITEABLE = 1 << 4;
    }
}

impl Default for EntryType {
    fn default() -> Self {
        EntryType::empty()
    }
}

// On the wire the flag set is its raw bits, nothing more.
impl Serialize for EntryType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for EntryType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u8::deserialize(deserializer)?;
        Ok(EntryType::from_bits_retain(bits))
    }
}

/// Serde adapter carrying raw byte fields as base64 strings in JSON.
pub(crate) mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        STANDARD.encode(data).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
