//! Messages exchanged on the duplex streaming call.
//!
//! A session writes one [`StartRequest`] header, then audio, then either
//! half-closes (live transcription) or sends an explicit
//! [`StreamRequest::Eof`] marker (async-job submission). The server side
//! of the call is a sequence of [`StreamResponse`] messages.

use crate::{RecognitionResult, TranscriptionConfig};

/// Header carrying credentials and session configuration. Always the
/// first message on a streaming call, before any audio.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StartRequest {
    pub api_key: String,
    pub config: TranscriptionConfig,
}

/// Client-to-server message on a duplex call.
///
/// Transport-neutral: how `Audio` frames are encoded versus the control
/// messages is the transport's concern.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamRequest {
    Start(StartRequest),
    Audio(bytes::Bytes),
    /// Explicit end-of-file marker, required by the async-job submission
    /// protocol. Live sessions end by half-closing the write side instead.
    Eof,
}

/// Serialized form of the non-audio [`StreamRequest`] variants.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlRequest {
    Start(StartRequest),
    Eof,
}

/// One partial transcription update for a single channel.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PartialResult {
    pub result: RecognitionResult,
    #[serde(default)]
    pub separate_recognition_per_channel: bool,
}

/// Acknowledgment of an async-job submission.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SubmitConfirmation {
    pub file_id: String,
}

/// Server-to-client message on a duplex call.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamResponse {
    Result(PartialResult),
    Accepted(SubmitConfirmation),
}
