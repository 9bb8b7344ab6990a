//! Client for the Soniox speech-to-text service.
//!
//! Three ways to transcribe, all on one [`SpeechClient`]:
//!
//! - [`transcribe`](SpeechClient::transcribe) — single-shot, short
//!   in-memory audio.
//! - [`transcribe_stream`](SpeechClient::transcribe_stream) — duplex
//!   streaming with live partial results.
//! - [`transcribe_async`](SpeechClient::transcribe_async) plus the
//!   status/result/delete operations — long-running server-side jobs.
//!
//! Callers without an async runtime use the [`blocking`] module.

mod batch;
pub mod blocking;
mod chunk;
mod error;
mod jobs;
mod live;
mod merge;
pub mod transport;

pub use soniox_interface as interface;

pub use chunk::{DEFAULT_CHUNK_SIZE, FileChunkSource};
pub use error::{Error, Result};
pub use jobs::ASYNC_FILE_CHUNK_SIZE;
pub use live::{LiveTranscription, SessionState};
pub use merge::{ResultAccumulator, update};

use std::sync::Arc;

use transport::{SpeechTransport, WsTransport};

pub const DEFAULT_API_HOST: &str = "https://api.soniox.com:443";
pub const API_KEY_ENV: &str = "SONIOX_API_KEY";
pub const API_HOST_ENV: &str = "SONIOX_API_HOST";

/// Resolves the API host: explicit value, then `SONIOX_API_HOST`, then
/// the default. Re-reads the environment on every call.
pub fn resolve_api_host(explicit: Option<&str>) -> String {
    if let Some(host) = explicit.filter(|h| !h.is_empty()) {
        return host.to_string();
    }
    match std::env::var(API_HOST_ENV) {
        Ok(host) if !host.is_empty() => host,
        _ => DEFAULT_API_HOST.to_string(),
    }
}

/// Resolves the API key: explicit value, then `SONIOX_API_KEY`. A
/// missing key is a fatal configuration error; there is no default.
pub fn resolve_api_key(explicit: Option<&str>) -> Result<String> {
    if let Some(key) = explicit.filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(Error::Configuration(format!(
            "Soniox API key not specified; set the {API_KEY_ENV} environment variable \
             or pass api_key to the client builder"
        ))),
    }
}

/// Stateless handle to the speech service. All session state lives on
/// the server; the client holds only credentials and a transport.
#[derive(Clone)]
pub struct SpeechClient {
    api_key: String,
    transport: Arc<dyn SpeechTransport>,
}

impl SpeechClient {
    pub fn builder() -> SpeechClientBuilder {
        SpeechClientBuilder::default()
    }

    /// Client with configuration resolved entirely from the environment.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn transport(&self) -> &Arc<dyn SpeechTransport> {
        &self.transport
    }
}

#[derive(Default)]
pub struct SpeechClientBuilder {
    api_key: Option<String>,
    api_host: Option<String>,
    transport: Option<Arc<dyn SpeechTransport>>,
}

impl SpeechClientBuilder {
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn api_host(mut self, api_host: impl Into<String>) -> Self {
        self.api_host = Some(api_host.into());
        self
    }

    /// Replaces the bundled WebSocket transport, mainly for tests and
    /// embedders bringing their own channel.
    pub fn transport(mut self, transport: Arc<dyn SpeechTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<SpeechClient> {
        let api_key = resolve_api_key(self.api_key.as_deref())?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(WsTransport::new(resolve_api_host(self.api_host.as_deref()))?),
        };
        Ok(SpeechClient { api_key, transport })
    }
}
