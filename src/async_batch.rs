//! Async batch unpacking
//!
//! Decoding is synchronous and CPU-bound, so each file is read with
//! `tokio::fs` and decoded on the blocking pool. Files never share decoder
//! state, which is what makes unpacking them concurrently safe.

use crate::{LzwMode, Result, SqzError};
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Read and decompress one file without blocking the runtime
pub async fn decompress_file_async<P: AsRef<Path>>(path: P, mode: LzwMode) -> Result<Vec<u8>> {
    let path = path.as_ref().to_path_buf();
    let data = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => SqzError::NotFound(path.clone()),
        _ => SqzError::Io(e),
    })?;

    log::debug!("Unpacking '{}' ({} bytes)", path.display(), data.len());
    tokio::task::spawn_blocking(move || crate::decompress_bytes_with(&data, mode))
        .await
        .map_err(|e| SqzError::Io(std::io::Error::other(e)))?
}

/// Concurrent unpacking of many resource files
#[derive(Debug, Clone)]
pub struct AsyncBatchProcessor {
    concurrency_limit: usize,
    mode: LzwMode,
}

impl AsyncBatchProcessor {
    /// Create a processor with one task per CPU and standard LZW codes
    pub fn new() -> Self {
        Self {
            concurrency_limit: num_cpus::get(),
            mode: LzwMode::Standard,
        }
    }

    /// Set the number of files decoded at once (at least one)
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit.max(1);
        self
    }

    /// Set the LZW control-code assignment used for every file
    pub fn with_lzw_mode(mut self, mode: LzwMode) -> Self {
        self.mode = mode;
        self
    }

    /// Configured concurrency limit
    pub fn concurrency(&self) -> usize {
        self.concurrency_limit
    }

    /// Unpack all files; the first failure fails the batch
    ///
    /// Results come back in completion order, each paired with its path.
    pub async fn unpack_files<P: AsRef<Path>>(
        &self,
        files: Vec<P>,
    ) -> Result<Vec<(PathBuf, Vec<u8>)>> {
        let mode = self.mode;
        stream::iter(files.into_iter().map(|path| {
            let path = path.as_ref().to_path_buf();
            async move {
                let result = decompress_file_async(&path, mode).await;
                result.map(|data| (path, data))
            }
        }))
        .buffer_unordered(self.concurrency_limit)
        .try_collect()
        .await
    }

    /// Stream per-file results as they complete
    ///
    /// A failing file yields its error and does not stop the others.
    pub fn unpack_files_streaming<P: AsRef<Path>>(
        &self,
        files: Vec<P>,
    ) -> impl Stream<Item = (PathBuf, Result<Vec<u8>>)> {
        let mode = self.mode;
        stream::iter(files.into_iter().map(move |path| {
            let path = path.as_ref().to_path_buf();
            async move {
                let result = decompress_file_async(&path, mode).await;
                if let Err(e) = &result {
                    log::debug!("Unpacking '{}' failed: {}", path.display(), e);
                }
                (path, result)
            }
        }))
        .buffer_unordered(self.concurrency_limit)
    }
}

impl Default for AsyncBatchProcessor {
    fn default() -> Self {
        Self::new()
    }
}
