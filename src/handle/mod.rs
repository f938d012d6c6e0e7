//! Handles are the low-level byte resources a [`Stream`](crate::Stream)
//! wraps. A handle knows how it was opened and can describe itself; the
//! stream decides what is allowed based on that description.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::io::{self, Read, Seek, Write};
use std::time::SystemTime;

use serde_json::Value;

mod file;
mod memory;
mod pipe;
mod temp;

pub use file::FileHandle;
pub use memory::MemoryHandle;
pub use pipe::PipeHandle;
pub use temp::TempHandle;

/// Description of a handle as reported at construction time.
///
/// Every handle reports at least `mode` (string) and `seekable` (bool).
pub type Metadata = BTreeMap<String, Value>;

pub const KEY_MODE: &str = "mode";
pub const KEY_SEEKABLE: &str = "seekable";
pub const KEY_URI: &str = "uri";
pub const KEY_WRAPPER_TYPE: &str = "wrapper_type";
pub const KEY_STREAM_TYPE: &str = "stream_type";
pub const KEY_UNREAD_BYTES: &str = "unread_bytes";
pub const KEY_TIMED_OUT: &str = "timed_out";
pub const KEY_BLOCKED: &str = "blocked";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub size: u64,
    pub modified: Option<SystemTime>,
}

pub trait Handle: Read + Write + Seek + Send + Debug {
    /// `false` once the handle has been closed.
    fn is_open(&self) -> bool;

    fn metadata(&self) -> io::Result<Metadata>;

    fn stat(&self) -> io::Result<Stat>;

    /// Current position. Handles that cannot seek override this to report
    /// how many bytes went through them.
    fn position(&mut self) -> io::Result<u64> {
        self.stream_position()
    }

    /// Whether the position is at the end of the underlying data.
    fn eof(&mut self) -> io::Result<bool>;

    /// Release the underlying resource. Further I/O fails.
    fn close(&mut self) -> io::Result<()>;
}

/// Builds the metadata entries shared by every handle kind.
pub(crate) fn base_metadata(
    wrapper_type: &str,
    stream_type: &str,
    mode: &str,
    seekable: bool,
    uri: &str,
) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(KEY_WRAPPER_TYPE.to_owned(), wrapper_type.into());
    metadata.insert(KEY_STREAM_TYPE.to_owned(), stream_type.into());
    metadata.insert(KEY_MODE.to_owned(), mode.into());
    metadata.insert(KEY_UNREAD_BYTES.to_owned(), 0.into());
    metadata.insert(KEY_SEEKABLE.to_owned(), seekable.into());
    metadata.insert(KEY_URI.to_owned(), uri.into());
    metadata.insert(KEY_TIMED_OUT.to_owned(), false.into());
    metadata.insert(KEY_BLOCKED.to_owned(), true.into());
    metadata
}

pub(crate) fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "handle is closed")
}
