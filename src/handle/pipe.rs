use std::fmt;
use std::io::{self, Read, Result, Seek, SeekFrom, Write};

use super::{base_metadata, closed_error, Handle, Metadata, Stat};

enum End {
    Reader(Box<dyn Read + Send>),
    Writer(Box<dyn Write + Send>),
}

/// One end of a pipe, such as a child process' stdout or stdin.
///
/// Pipes cannot seek and have no size.
pub struct PipeHandle {
    end: Option<End>,
    position: u64,
    eof: bool,
}

impl PipeHandle {
    pub fn reader(reader: impl Read + Send + 'static) -> Self {
        Self {
            end: Some(End::Reader(Box::new(reader))),
            position: 0,
            eof: false,
        }
    }

    pub fn writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            end: Some(End::Writer(Box::new(writer))),
            position: 0,
            eof: false,
        }
    }

    fn mode(&self) -> &'static str {
        match self.end {
            Some(End::Writer(_)) => "w",
            _ => "r",
        }
    }
}

fn unsupported(what: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("pipe does not support {}", what),
    )
}

impl fmt::Debug for PipeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipeHandle")
            .field("mode", &self.mode())
            .field("open", &self.end.is_some())
            .field("eof", &self.eof)
            .finish()
    }
}

impl Read for PipeHandle {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.end.as_mut() {
            Some(End::Reader(reader)) => {
                let bytes = reader.read(buf)?;
                if bytes == 0 && !buf.is_empty() {
                    self.eof = true;
                }
                self.position += bytes as u64;
                Ok(bytes)
            }
            Some(End::Writer(_)) => Err(unsupported("reading")),
            None => Err(closed_error()),
        }
    }
}

impl Write for PipeHandle {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        match self.end.as_mut() {
            Some(End::Writer(writer)) => {
                let bytes = writer.write(buf)?;
                self.position += bytes as u64;
                Ok(bytes)
            }
            Some(End::Reader(_)) => Err(unsupported("writing")),
            None => Err(closed_error()),
        }
    }

    fn flush(&mut self) -> Result<()> {
        match self.end.as_mut() {
            Some(End::Writer(writer)) => writer.flush(),
            Some(End::Reader(_)) => Ok(()),
            None => Err(closed_error()),
        }
    }
}

impl Seek for PipeHandle {
    fn seek(&mut self, _pos: SeekFrom) -> Result<u64> {
        if self.end.is_none() {
            return Err(closed_error());
        }
        Err(unsupported("seeking"))
    }
}

impl Handle for PipeHandle {
    fn is_open(&self) -> bool {
        self.end.is_some()
    }

    fn metadata(&self) -> Result<Metadata> {
        if self.end.is_none() {
            return Err(closed_error());
        }
        let mut metadata =
            base_metadata("pipe", "pipe", self.mode(), false, "pipe:");
        metadata.insert("eof".to_owned(), self.eof.into());
        Ok(metadata)
    }

    fn stat(&self) -> Result<Stat> {
        Err(unsupported("stat"))
    }

    fn position(&mut self) -> Result<u64> {
        if self.end.is_none() {
            return Err(closed_error());
        }
        Ok(self.position)
    }

    fn eof(&mut self) -> Result<bool> {
        if self.end.is_none() {
            return Err(closed_error());
        }
        Ok(self.eof)
    }

    fn close(&mut self) -> Result<()> {
        if let Some(End::Writer(mut writer)) = self.end.take() {
            writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reader_end_reports_eof_after_drain() {
        let mut pipe = PipeHandle::reader(Cursor::new(b"piped".to_vec()));
        assert!(!pipe.eof().unwrap());

        let mut content = Vec::new();
        pipe.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"piped");
        assert!(pipe.eof().unwrap());
        assert_eq!(pipe.position().unwrap(), 5);
    }

    #[test]
    fn pipes_are_not_seekable() {
        let mut pipe = PipeHandle::writer(Vec::new());
        let metadata = pipe.metadata().unwrap();
        assert_eq!(metadata["seekable"], false);
        assert_eq!(metadata["mode"], "w");

        let err = pipe.seek(SeekFrom::Start(0)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
        assert!(pipe.stat().is_err());
    }

    #[test]
    fn wrong_direction_is_refused() {
        let mut pipe = PipeHandle::reader(std::io::empty());
        assert!(pipe.write(b"x").is_err());

        let mut pipe = PipeHandle::writer(std::io::sink());
        let mut buf = [0; 1];
        assert!(pipe.read(&mut buf).is_err());
    }
}
