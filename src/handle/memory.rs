use std::io::{Cursor, Read, Result, Seek, SeekFrom, Write};

use super::{base_metadata, closed_error, Handle, Metadata, Stat};

const MEMORY_URI: &str = "memory:";

/// Growable in-memory buffer.
#[derive(Debug)]
pub struct MemoryHandle {
    buffer: Cursor<Vec<u8>>,
    mode: String,
    open: bool,
}

impl MemoryHandle {
    pub fn new() -> Self {
        Self::with_mode(Vec::new(), "w+b")
    }

    /// Buffer pre-filled with `data`, positioned at its start.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::with_mode(data.into(), "w+b")
    }

    pub fn with_mode(data: Vec<u8>, mode: &str) -> Self {
        Self {
            buffer: Cursor::new(data),
            mode: mode.to_owned(),
            open: true,
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer.into_inner()
    }

    fn check_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(closed_error())
        }
    }
}

impl Default for MemoryHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl Read for MemoryHandle {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.check_open()?;
        self.buffer.read(buf)
    }
}

impl Write for MemoryHandle {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.check_open()?;
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> Result<()> {
        self.check_open()
    }
}

impl Seek for MemoryHandle {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.check_open()?;
        self.buffer.seek(pos)
    }
}

impl Handle for MemoryHandle {
    fn is_open(&self) -> bool {
        self.open
    }

    fn metadata(&self) -> Result<Metadata> {
        self.check_open()?;
        Ok(base_metadata("memory", "MEMORY", &self.mode, true, MEMORY_URI))
    }

    fn stat(&self) -> Result<Stat> {
        self.check_open()?;
        Ok(Stat {
            size: self.buffer.get_ref().len() as u64,
            modified: None,
        })
    }

    fn eof(&mut self) -> Result<bool> {
        self.check_open()?;
        Ok(self.buffer.position() >= self.buffer.get_ref().len() as u64)
    }

    fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_past_end_grow_buffer() {
        let mut handle = MemoryHandle::new();
        handle.write_all(b"hello").unwrap();
        handle.seek(SeekFrom::Start(8)).unwrap();
        handle.write_all(b"!").unwrap();

        assert_eq!(handle.stat().unwrap().size, 9);
        assert_eq!(handle.into_inner(), b"hello\0\0\0!");
    }

    #[test]
    fn negative_seek_is_an_error() {
        let mut handle = MemoryHandle::from_bytes("abc");
        assert!(handle.seek(SeekFrom::End(-4)).is_err());
        assert_eq!(handle.seek(SeekFrom::End(-1)).unwrap(), 2);
    }

    #[test]
    fn eof_after_last_byte() {
        let mut handle = MemoryHandle::from_bytes("ab");
        let mut buf = [0; 1];
        handle.read_exact(&mut buf).unwrap();
        assert!(!handle.eof().unwrap());
        handle.read_exact(&mut buf).unwrap();
        assert!(handle.eof().unwrap());
    }
}
