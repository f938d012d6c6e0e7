use std::fs::{File, OpenOptions};
use std::io::{Read, Result, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::{base_metadata, closed_error, Handle, Metadata, Stat};

const TEMP_MODE: &str = "w+b";
const NAME_LENGTH: usize = 10;

/// Read-write scratch file that is removed when the handle is dropped.
#[derive(Debug)]
pub struct TempHandle {
    file: Option<File>,
    path: PathBuf,
}

impl TempHandle {
    pub fn create_in(temp_dir: impl AsRef<Path>) -> Result<Self> {
        let filename: String = std::iter::repeat_with(fastrand::alphanumeric)
            .take(NAME_LENGTH)
            .collect();
        let path = temp_dir.as_ref().join(filename);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)?;
        log::debug!("created temporary stream at {}", path.display());
        Ok(Self {
            file: Some(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file(&self) -> Result<&File> {
        self.file.as_ref().ok_or_else(closed_error)
    }
}

impl Read for TempHandle {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.file()?.read(buf)
    }
}

impl Write for TempHandle {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.file()?.write(buf)
    }

    fn flush(&mut self) -> Result<()> {
        self.file()?.flush()
    }
}

impl Seek for TempHandle {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.file()?.seek(pos)
    }
}

impl Handle for TempHandle {
    fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn metadata(&self) -> Result<Metadata> {
        self.file()?;
        Ok(base_metadata(
            "temp",
            "TEMP",
            TEMP_MODE,
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

    fn close(&mut self) -> Result<()> {
        self.file.take();
        Ok(())
    }
}

impl Drop for TempHandle {
    fn drop(&mut self) {
        self.file.take();
        if let Err(e) = std::fs::remove_file(&self.path) {
            log::warn!(
                "Failed to delete temporary file {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn removed_on_drop() {
        let dir = TempDir::new("temp_handle").unwrap();
        let handle = TempHandle::create_in(dir.path()).unwrap();
        let path = handle.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(handle.path().file_name().unwrap().len(), NAME_LENGTH);

        drop(handle);
        assert!(!path.exists());
    }

    #[test]
    fn read_back_written_data() {
        let dir = TempDir::new("temp_handle").unwrap();
        let mut handle = TempHandle::create_in(dir.path()).unwrap();
        handle.write_all(b"scratch").unwrap();
        handle.rewind().unwrap();

        let mut content = String::new();
        handle.read_to_string(&mut content).unwrap();
        assert_eq!(content, "scratch");
        assert_eq!(handle.metadata().unwrap()["mode"], TEMP_MODE);
    }

    #[test]
    fn missing_directory_fails() {
        let dir = TempDir::new("temp_handle").unwrap();
        assert!(TempHandle::create_in(dir.path().join("absent")).is_err());
    }
}
