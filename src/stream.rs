use std::io::{self, Read, Seek, SeekFrom, Write};

use serde_json::Value;

use crate::config::Config;
use crate::handle::{Handle, Metadata, TempHandle, KEY_MODE, KEY_SEEKABLE};
use crate::mode::{self, DEFAULT_MODE};
use crate::{Result, StreamError};

const DETACHED: &str = "Stream is detached";

/// Byte stream over an exclusively owned [`Handle`].
///
/// Capabilities and size are captured once, when the stream is built, and
/// are not re-read from the handle afterwards. A stream is open until
/// [`close`](Stream::close) or [`detach`](Stream::detach) is called or it
/// is dropped; after that every I/O operation fails.
///
/// The inherent `read`, `write` and `seek` shadow the [`std::io`] trait
/// methods of the same name. Use the trait paths (`Read::read`) or helpers
/// such as [`io::copy`] to go through the traits.
#[derive(Debug)]
pub struct Stream {
    handle: Option<Box<dyn Handle>>,
    metadata: Metadata,
    mode: String,
    seekable: bool,
    readable: bool,
    writable: bool,
    size: Option<u64>,
    closed: bool,
    write_chunk_size: usize,
}

impl Stream {
    /// Wrap `handle`, or a fresh temporary read-write store if `None`.
    pub fn new(handle: Option<Box<dyn Handle>>) -> Result<Self> {
        Self::with_config(handle, Config::global())
    }

    pub fn from_handle(handle: impl Handle + 'static) -> Result<Self> {
        Self::new(Some(Box::new(handle)))
    }

    pub fn with_config(
        handle: Option<Box<dyn Handle>>,
        config: &Config,
    ) -> Result<Self> {
        config.validate()?;

        let handle: Box<dyn Handle> = match handle {
            Some(handle) => handle,
            None => {
                let temp =
                    TempHandle::create_in(&config.temp_dir).map_err(|err| {
                        StreamError::io("temporary stream creation failed", err)
                    })?;
                Box::new(temp)
            }
        };

        if !handle.is_open() {
            return Err(StreamError::argument("invalid resource"));
        }

        let metadata = handle.metadata().map_err(|err| {
            StreamError::io("Unable to retrieve stream metadata", err)
        })?;
        let mode = metadata
            .get(KEY_MODE)
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_MODE)
            .to_owned();
        let seekable = metadata
            .get(KEY_SEEKABLE)
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let size = match handle.stat() {
            Ok(stat) => Some(stat.size),
            Err(e) => {
                log::debug!("stream size is unknown: {}", e);
                None
            }
        };

        log::debug!(
            "opened stream over {:?} (mode {}, seekable {}, size {:?})",
            handle,
            mode,
            seekable,
            size
        );

        Ok(Self {
            readable: mode::is_readable(&mode),
            writable: mode::is_writable(&mode),
            handle: Some(handle),
            metadata,
            mode,
            seekable,
            size,
            closed: false,
            write_chunk_size: config.write_chunk_size,
        })
    }

    pub fn is_seekable(&self) -> bool {
        self.seekable
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Metadata captured at construction, `None` once closed.
    pub fn metadata(&self) -> Option<&Metadata> {
        if self.closed {
            None
        } else {
            Some(&self.metadata)
        }
    }

    pub fn metadata_value(&self, key: &str) -> Option<&Value> {
        self.metadata()?.get(key)
    }

    /// Size reported by the handle at construction. Writes made through
    /// the stream are not reflected.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    fn attached(&mut self) -> Result<&mut dyn Handle> {
        match self.handle.as_deref_mut() {
            Some(handle) if !self.closed => Ok(handle),
            _ => Err(StreamError::runtime(DETACHED)),
        }
    }

    /// Everything from the current position to the end.
    pub fn contents(&mut self) -> Result<Vec<u8>> {
        let readable = self.readable;
        let handle = self.attached()?;
        if !readable {
            return Err(StreamError::runtime(
                "Cannot read from non-readable stream",
            ));
        }

        handle.position().map_err(|err| {
            StreamError::io("Unable to determine stream position", err)
        })?;

        let mut contents = Vec::new();
        handle.read_to_end(&mut contents).map_err(|err| {
            StreamError::io("Unable to read stream contents", err)
        })?;
        log::trace!("read {} bytes of stream contents", contents.len());
        Ok(contents)
    }

    pub fn tell(&mut self) -> Result<u64> {
        self.attached()?.position().map_err(|err| {
            StreamError::io("Unable to determine stream position", err)
        })
    }

    /// Does not require the stream to be readable.
    pub fn eof(&mut self) -> Result<bool> {
        self.attached()?.eof().map_err(|err| {
            StreamError::io("Unable to determine end of stream", err)
        })
    }

    /// Move to `pos` and return the new position.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let seekable = self.seekable;
        let handle = self.attached()?;
        if !seekable {
            return Err(StreamError::runtime("Stream is not seekable"));
        }

        handle.seek(pos).map_err(|err| {
            StreamError::io(format!("Unable to seek to {:?}", pos), err)
        })
    }

    pub fn rewind(&mut self) -> Result<()> {
        self.seek(SeekFrom::Start(0))
            .map(|_| ())
            .map_err(|err| StreamError::wrap("rewind failed", err))
    }

    /// Read up to `length` bytes. Fewer bytes are returned near the end of
    /// the data or when the handle delivers a short read.
    ///
    /// The buffer grows with the data actually read, so `length` only
    /// bounds the result.
    pub fn read(&mut self, length: usize) -> Result<Vec<u8>> {
        let handle = self.readable_handle()?;
        let mut buf = Vec::new();
        if length == 0 {
            return Ok(buf);
        }

        Read::take(&mut *handle, length as u64)
            .read_to_end(&mut buf)
            .map_err(|err| StreamError::io("Unable to read from stream", err))?;
        log::trace!("read {} of {} requested bytes", buf.len(), length);
        Ok(buf)
    }

    /// Handle for `read`, which needs the stream to be both seekable and
    /// readable.
    fn readable_handle(&mut self) -> Result<&mut dyn Handle> {
        let allowed = self.seekable && self.readable;
        let handle = self.attached()?;
        if !allowed {
            return Err(StreamError::runtime(
                "Cannot read from non-readable stream",
            ));
        }
        Ok(handle)
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        let handle = self.readable_handle()?;
        if buf.is_empty() {
            return Ok(0);
        }

        let bytes = handle
            .read(buf)
            .map_err(|err| StreamError::io("Unable to read from stream", err))?;
        log::trace!("read {} of {} requested bytes", bytes, buf.len());
        Ok(bytes)
    }

    /// Write `content` and return how many bytes the handle accepted.
    ///
    /// The count is lower than `content.len()` when the handle takes a
    /// chunk only partially or fails after some bytes were written.
    pub fn write(&mut self, content: &[u8]) -> Result<usize> {
        let allowed = self.seekable && self.writable;
        let chunk_size = self.write_chunk_size;
        let handle = self.attached()?;
        if !allowed {
            return Err(StreamError::runtime(
                "Cannot write to a non-writable stream",
            ));
        }

        let mut written = 0;
        for chunk in content.chunks(chunk_size) {
            match handle.write(chunk) {
                Ok(bytes) => {
                    written += bytes;
                    if bytes < chunk.len() {
                        break;
                    }
                }
                Err(err) if written == 0 => {
                    return Err(StreamError::io(
                        "Unable to write to stream",
                        err,
                    ));
                }
                Err(err) => {
                    log::debug!(
                        "write stopped after {} of {} bytes: {}",
                        written,
                        content.len(),
                        err
                    );
                    break;
                }
            }
        }
        log::trace!("wrote {} of {} bytes", written, content.len());
        Ok(written)
    }

    /// Take the handle out of the stream, leaving the stream closed.
    ///
    /// Returns `None` if the stream was already closed or detached.
    pub fn detach(&mut self) -> Option<Box<dyn Handle>> {
        let handle = self.handle.take();
        self.metadata.clear();
        self.mode = DEFAULT_MODE.to_owned();
        self.seekable = false;
        self.readable = false;
        self.writable = false;
        self.size = None;
        self.closed = true;

        if handle.is_some() {
            log::debug!("stream detached");
        }
        handle
    }

    /// Detach and release the handle.
    ///
    /// A failure to release the handle is logged and otherwise ignored, so
    /// callers cannot observe it.
    pub fn close(&mut self) {
        if let Some(mut handle) = self.detach() {
            if let Err(e) = handle.close() {
                log::warn!("Failed to close stream handle: {}", e);
            }
        }
    }

    /// Whole content as text, or an empty string when it cannot be
    /// produced. Never fails.
    ///
    /// Nothing is produced for a closed or non-readable stream, or when
    /// the position is at the very start or unknown. Seekable streams are
    /// rewound before reading. Invalid UTF-8 is replaced.
    pub fn serialize_to_string(&mut self) -> String {
        if self.closed || !self.readable {
            return String::new();
        }
        match self.tell() {
            Ok(0) | Err(_) => return String::new(),
            Ok(_) => {}
        }

        if self.seekable {
            if let Err(e) = self.rewind() {
                log::debug!("stream serialization skipped: {}", e);
                return String::new();
            }
        }

        match self.contents() {
            Ok(contents) => String::from_utf8_lossy(&contents).into_owned(),
            Err(e) => {
                log::debug!("stream serialization skipped: {}", e);
                String::new()
            }
        }
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        self.close();
    }
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_into(buf)?)
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(Stream::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.attached()?.flush().map_err(|err| {
            StreamError::io("Unable to flush stream", err).into()
        })
    }
}

impl Seek for Stream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Ok(Stream::seek(self, pos)?)
    }
}
