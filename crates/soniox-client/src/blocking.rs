//! Blocking wrappers for callers without an async runtime.
//!
//! Every operation parks the calling thread on an internal
//! current-thread runtime. Do not use this client from inside a tokio
//! runtime: `block_on` within an async context panics. That limitation
//! is accepted and documented rather than worked around.

use soniox_interface::{CompleteResult, FileStatus, TranscriptionConfig};

use crate::{Result, SpeechClientBuilder};

pub struct SpeechClient {
    inner: crate::SpeechClient,
    runtime: tokio::runtime::Runtime,
}

impl SpeechClient {
    /// Builds a blocking client from the regular builder.
    pub fn from_builder(builder: SpeechClientBuilder) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let inner = builder.build()?;
        Ok(Self { inner, runtime })
    }

    /// Blocking client with configuration resolved from the environment.
    pub fn new() -> Result<Self> {
        Self::from_builder(crate::SpeechClient::builder())
    }

    pub fn transcribe(
        &self,
        audio: impl Into<Vec<u8>>,
        config: &TranscriptionConfig,
    ) -> Result<CompleteResult> {
        self.runtime.block_on(self.inner.transcribe(audio, config))
    }

    pub fn transcribe_file_short(
        &self,
        path: impl AsRef<std::path::Path>,
        config: &TranscriptionConfig,
    ) -> Result<CompleteResult> {
        self.runtime
            .block_on(self.inner.transcribe_file_short(path, config))
    }

    pub fn transcribe_file_async(
        &self,
        path: impl AsRef<std::path::Path>,
        config: &TranscriptionConfig,
        chunk_size: usize,
    ) -> Result<String> {
        self.runtime
            .block_on(self.inner.transcribe_file_async(path, config, chunk_size))
    }

    pub fn get_status(&self, file_id: &str) -> Result<FileStatus> {
        self.runtime.block_on(self.inner.get_status(file_id))
    }

    pub fn get_all_statuses(&self) -> Result<Vec<FileStatus>> {
        self.runtime.block_on(self.inner.get_all_statuses())
    }

    pub fn get_result(&self, file_id: &str) -> Result<CompleteResult> {
        self.runtime.block_on(self.inner.get_result(file_id))
    }

    pub fn delete_file(&self, file_id: &str) -> Result<()> {
        self.runtime.block_on(self.inner.delete_file(file_id))
    }
}
