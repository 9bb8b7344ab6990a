//! Wire message and result types for the Soniox speech service.
//!
//! This crate holds only data shapes: no I/O, no transport. The client
//! crate (`soniox-client`) drives the protocol over these types.

mod result;
pub mod stream;

pub use result::{CompleteResult, RecognitionResult, Speaker, Word};

use std::collections::HashMap;

/// Recognition tuning for a transcription session. Immutable once a
/// session starts.
///
/// Fields the client itself inspects are typed; everything else rides
/// through untouched in `extra`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate_hertz: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_audio_channels: Option<u32>,
    pub include_nonfinal: bool,
    pub enable_separate_recognition_per_channel: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub language_hints: Vec<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Server-side lifecycle of an async transcription job.
///
/// The vocabulary is owned by the server; values this client does not
/// know about are preserved verbatim in `Unknown`. Only `Completed` and
/// `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    Unknown(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::Processing => "PROCESSING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
            JobStatus::Unknown(other) => other,
        }
    }
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "QUEUED" => JobStatus::Queued,
            "PROCESSING" => JobStatus::Processing,
            "COMPLETED" => JobStatus::Completed,
            "FAILED" => JobStatus::Failed,
            _ => JobStatus::Unknown(value),
        }
    }
}

impl From<JobStatus> for String {
    fn from(value: JobStatus) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status record of one async file, as listed by the status endpoint.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FileStatus {
    pub file_id: String,
    pub status: JobStatus,
}

/// Single-shot transcription of an in-memory audio buffer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TranscribeRequest {
    pub api_key: String,
    pub config: TranscriptionConfig,
    #[serde(with = "serde_bytes")]
    pub audio: Vec<u8>,
}

/// Response to [`TranscribeRequest`]. Exactly one of `result` /
/// `channel_results` is populated, mirroring the channel-separation flag
/// of the request config.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TranscribeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RecognitionResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub channel_results: Vec<RecognitionResult>,
}

/// Query for the status of one file (`file_id` set) or all files
/// (`file_id` unset).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StatusQuery {
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StatusResponse {
    pub files: Vec<FileStatus>,
}

/// Query opening the server-streamed result download for one async job.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResultQuery {
    pub api_key: String,
    pub file_id: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeleteQuery {
    pub api_key: String,
    pub file_id: String,
}
