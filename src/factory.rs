//! Helpers that open a handle and hand it to [`Stream`].

use std::io::{Read, Write};
use std::path::Path;

use url::Url;

use crate::handle::{FileHandle, MemoryHandle, PipeHandle};
use crate::{Result, Stream, StreamError};

/// Open the file at `path` with an `fopen`-style `mode`.
pub fn open(path: impl AsRef<Path>, mode: &str) -> Result<Stream> {
    Stream::from_handle(FileHandle::open(path, mode)?)
}

/// Open a stream by URI.
///
/// Supported: `file:///absolute/path`, `memory:` and `temp:`. The mode is
/// honoured for files and in-memory buffers; temporary streams are always
/// read-write.
pub fn open_uri(uri: &str, mode: &str) -> Result<Stream> {
    let url = Url::parse(uri)?;
    match url.scheme() {
        "file" => {
            let path = url.to_file_path().map_err(|_| {
                StreamError::argument(format!("not a local file URI: {}", uri))
            })?;
            open(path, mode)
        }
        "memory" => {
            crate::mode::open_options(mode)?;
            Stream::from_handle(MemoryHandle::with_mode(Vec::new(), mode))
        }
        "temp" => temp(),
        scheme => Err(StreamError::argument(format!(
            "unsupported stream scheme `{}`",
            scheme
        ))),
    }
}

/// Read-write in-memory stream holding `data`, positioned at its start.
pub fn from_bytes(data: impl Into<Vec<u8>>) -> Result<Stream> {
    Stream::from_handle(MemoryHandle::from_bytes(data))
}

/// Empty read-write stream backed by a temporary file.
pub fn temp() -> Result<Stream> {
    Stream::new(None)
}

/// Read-only, non-seekable stream draining `reader`.
pub fn from_reader(reader: impl Read + Send + 'static) -> Result<Stream> {
    Stream::from_handle(PipeHandle::reader(reader))
}

/// Write-only, non-seekable stream feeding `writer`.
pub fn from_writer(writer: impl Write + Send + 'static) -> Result<Stream> {
    Stream::from_handle(PipeHandle::writer(writer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initialize;
    use std::fs;
    use std::io::SeekFrom;
    use tempdir::TempDir;

    #[test]
    fn open_existing_file() {
        initialize();

        let dir = TempDir::new("factory").unwrap();
        let path = dir.path().join("greeting.txt");
        fs::write(&path, "hello world").unwrap();

        let mut stream = open(&path, "r").unwrap();
        assert_eq!(stream.size(), Some(11));
        stream.seek(SeekFrom::Start(6)).unwrap();
        assert_eq!(stream.contents().unwrap(), b"world");
        assert_eq!(
            stream.metadata_value("uri").and_then(|v| v.as_str()),
            Some(path.to_str().unwrap())
        );
    }

    #[test]
    fn exclusive_create_refuses_existing_file() {
        let dir = TempDir::new("factory").unwrap();
        let path = dir.path().join("exists.txt");
        fs::write(&path, "").unwrap();

        assert!(open(&path, "x").unwrap_err().is_runtime());
        assert!(open(&path, "q").unwrap_err().is_argument());
    }

    #[test]
    fn file_uri() {
        let dir = TempDir::new("factory").unwrap();
        let path = dir.path().join("by_uri.txt");
        let uri = Url::from_file_path(&path).unwrap();

        let mut stream = open_uri(uri.as_str(), "w+").unwrap();
        stream.write(b"via uri").unwrap();
        stream.close();
        assert_eq!(fs::read_to_string(&path).unwrap(), "via uri");
    }

    #[test]
    fn memory_and_temp_uris() {
        let stream = open_uri("memory:", "r").unwrap();
        assert!(stream.is_readable());
        assert!(!stream.is_writable());

        let stream = open_uri("temp:", "r").unwrap();
        assert!(stream.is_readable());
        assert!(stream.is_writable());
    }

    #[test]
    fn unknown_uris_are_rejected() {
        assert!(open_uri("http://example.com/body", "r")
            .unwrap_err()
            .is_argument());
        assert!(open_uri("not a uri", "r").unwrap_err().is_argument());
        assert!(open_uri("memory:", "z").unwrap_err().is_argument());
    }

    #[test]
    fn pipes() {
        let mut stream = from_reader(&b"from a pipe"[..]).unwrap();
        assert!(!stream.is_seekable());
        assert_eq!(stream.contents().unwrap(), b"from a pipe");

        let stream = from_writer(std::io::sink()).unwrap();
        assert!(stream.is_writable());
        assert!(!stream.is_readable());
    }
}
