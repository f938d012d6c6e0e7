use std::fs::File;
use std::io::{self, Read, Result, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::{base_metadata, closed_error, Handle, Metadata, Stat};
use crate::mode;

/// A plain file opened with an `fopen`-style mode.
#[derive(Debug)]
pub struct FileHandle {
    file: Option<File>,
    path: PathBuf,
    mode: String,
}

impl FileHandle {
    /// Open `path` with `mode` (`"r"`, `"w+"`, `"a"`, ...).
    pub fn open(path: impl AsRef<Path>, mode: &str) -> crate::Result<Self> {
        let path = path.as_ref();
        let file = mode::open_options(mode)?
            .open(path)
            .map_err(|err| {
                crate::StreamError::io(
                    format!(
                        "Unable to open {} using mode {}",
                        path.display(),
                        mode
                    ),
                    err,
                )
            })?;
        Ok(Self::from_file(file, path, mode))
    }

    /// Wrap an already opened file. `mode` must describe how it was opened.
    pub fn from_file(file: File, path: impl Into<PathBuf>, mode: &str) -> Self {
        Self {
            file: Some(file),
            path: path.into(),
            mode: mode.to_owned(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file(&self) -> Result<&File> {
        self.file.as_ref().ok_or_else(closed_error)
    }
}

impl Read for FileHandle {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.file()?.read(buf)
    }
}

impl Write for FileHandle {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.file()?.write(buf)
    }

    fn flush(&mut self) -> Result<()> {
        self.file()?.flush()
    }
}

impl Seek for FileHandle {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.file()?.seek(pos)
    }
}

impl Handle for FileHandle {
    fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn metadata(&self) -> Result<Metadata> {
        self.file()?;
        Ok(base_metadata(
            "plainfile",
            "STDIO",
            &self.mode,
            true,
            &self.path.to_string_lossy(),
        ))
    }

    fn stat(&self) -> Result<Stat> {
        let metadata = self.file()?.metadata()?;
        Ok(Stat {
            size: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }

    fn eof(&mut self) -> Result<bool> {
        let mut file = self.file()?;
        let position = file.stream_position()?;
        Ok(position >= file.metadata()?.len())
    }

    fn close(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.take() {
            if mode::is_writable(&self.mode) {
                file.sync_data()?;
            }
            log::trace!("closed file {}", self.path.display());
        }
        Ok(())
    }
}
