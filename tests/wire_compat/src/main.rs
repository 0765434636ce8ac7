fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use buslink_protocol::{
        EntryType, FileError, FilePath, GetInfoRequest, GetInfoResponse, ReadRequest, ReadResponse,
    };

    /// Deserializes a fixture into a payload type, re-serializes it, and
    /// compares the JSON values. Any drift in field names, base64 byte
    /// encoding, or numeric codes breaks peers already on the bus.
    fn roundtrip_test<T>(fixture: &str)
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture: serde_json::Value =
            serde_json::from_str(fixture).expect("fixture must be valid JSON");
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize fixture: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize fixture: {e}"));
        assert_eq!(
            fixture, reserialized,
            "wire shape drifted:\n  fixture: {fixture}\n  crate:   {reserialized}"
        );
    }

    #[test]
    fn fixture_get_info_request() {
        // path "cfg.bin"
        roundtrip_test::<GetInfoRequest>(r#"{"path":{"raw":"Y2ZnLmJpbg=="}}"#);
    }

    #[test]
    fn fixture_get_info_response_ok() {
        // error 0 (OK), entryType 9 (FILE | READABLE)
        roundtrip_test::<GetInfoResponse>(r#"{"error":0,"size":4096,"entryType":9}"#);
    }

    #[test]
    fn fixture_get_info_response_not_found() {
        roundtrip_test::<GetInfoResponse>(r#"{"error":2,"size":0,"entryType":0}"#);
    }

    #[test]
    fn fixture_read_request() {
        roundtrip_test::<ReadRequest>(r#"{"offset":512,"path":{"raw":"bG9ncy9ib290LmxvZw=="}}"#);
    }

    #[test]
    fn fixture_read_response_chunk() {
        // data "Hello"
        roundtrip_test::<ReadResponse>(r#"{"error":0,"data":"SGVsbG8="}"#);
    }

    #[test]
    fn fixture_read_response_empty_terminator() {
        roundtrip_test::<ReadResponse>(r#"{"error":0,"data":""}"#);
    }

    #[test]
    fn fixture_read_response_error() {
        // 13 = access denied
        roundtrip_test::<ReadResponse>(r#"{"error":13,"data":""}"#);
    }

    #[test]
    fn error_codes_pinned() {
        // Codes are protocol constants; renumbering is a wire break.
        for (err, code) in [
            (FileError::Ok, 0),
            (FileError::NotFound, 2),
            (FileError::IoError, 5),
            (FileError::AccessDenied, 13),
            (FileError::IsDirectory, 21),
            (FileError::InvalidMode, 22),
            (FileError::FileTooLarge, 27),
            (FileError::OutOfSpace, 28),
            (FileError::UnknownError, 32767),
        ] {
            assert_eq!(err.code(), code);
            assert_eq!(FileError::from(code), err);
        }
    }

    #[test]
    fn entry_type_bits_pinned() {
        assert_eq!(EntryType::FILE.bits(), 1);
        assert_eq!(EntryType::DIRECTORY.bits(), 2);
        assert_eq!(EntryType::SYMLINK.bits(), 4);
        assert_eq!(EntryType::READABLE.bits(), 8);
        assert_eq!(EntryType::WRITEABLE.bits(), 16);
    }

    #[test]
    fn path_separator_pinned() {
        assert_eq!(FilePath::SEPARATOR, b'/');
        assert_eq!(buslink_protocol::MAX_CHUNK_SIZE, 256);
    }
}
