//! Uniform byte streams over files, memory buffers, temporary files and
//! pipes.
//!
//! A [`Stream`] owns one [`Handle`](handle::Handle), learns once what it may
//! do with it (read, write, seek) and then enforces that contract on every
//! call. Handles are usually obtained through the [`factory`] helpers.
//!
//! ```no_run
//! use fs_stream::Stream;
//!
//! let mut stream = Stream::new(None)?;
//! stream.write(b"hello")?;
//! stream.rewind()?;
//! assert_eq!(stream.read(5)?, b"hello");
//! # Ok::<(), fs_stream::StreamError>(())
//! ```

pub mod config;
mod errors;
pub mod factory;
pub mod handle;
pub mod mode;
mod stream;

pub use config::Config;
pub use errors::{Result, StreamError};
pub use stream::Stream;

#[cfg(test)]
pub(crate) fn initialize() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
        log::info!("Initializing fs-stream tests");
    });
}
