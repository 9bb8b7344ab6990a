//! Long-running async transcription jobs.
//!
//! The intended caller pattern, not enforced here: submit once, poll
//! [`get_status`](SpeechClient::get_status) on an interval until the
//! status is terminal, fetch the result only when it is
//! [`Completed`](soniox_interface::JobStatus::Completed), and always
//! attempt [`delete_file`](SpeechClient::delete_file) afterwards.

use bytes::Bytes;
use futures_util::{SinkExt, Stream, StreamExt};

use soniox_interface::stream::{StartRequest, StreamRequest, StreamResponse};
use soniox_interface::{
    CompleteResult, DeleteQuery, FileStatus, ResultQuery, StatusQuery, TranscriptionConfig,
};

use crate::chunk::FileChunkSource;
use crate::merge::ResultAccumulator;
use crate::{Error, Result, SpeechClient};

/// Default chunk size for async file submission.
pub const ASYNC_FILE_CHUNK_SIZE: usize = 131_072;

impl SpeechClient {
    /// Submits audio for asynchronous transcription and returns the
    /// server-issued file id.
    ///
    /// Unlike a live session, the submission protocol requires an
    /// explicit end-of-file message before the server acknowledges.
    pub async fn transcribe_async<S>(
        &self,
        audio: S,
        config: &TranscriptionConfig,
    ) -> Result<String>
    where
        S: Stream<Item = Result<Bytes>> + Send,
    {
        let call = self.transport().open_duplex().await?;
        let (mut requests, mut responses) = (call.requests, call.responses);

        requests
            .send(StreamRequest::Start(StartRequest {
                api_key: self.api_key().to_string(),
                config: config.clone(),
            }))
            .await?;

        futures_util::pin_mut!(audio);
        while let Some(chunk) = audio.next().await {
            requests.send(StreamRequest::Audio(chunk?)).await?;
        }

        requests.send(StreamRequest::Eof).await?;
        requests.close().await?;

        match responses.next().await {
            Some(Ok(StreamResponse::Accepted(confirmation))) => {
                tracing::debug!(file_id = %confirmation.file_id, "async submission accepted");
                Ok(confirmation.file_id)
            }
            Some(Ok(other)) => Err(Error::Protocol(format!(
                "unexpected message instead of a submission acknowledgment: {other:?}"
            ))),
            Some(Err(e)) => Err(e),
            None => Err(Error::Protocol(
                "stream closed before the submission was acknowledged".to_string(),
            )),
        }
    }

    /// [`transcribe_async`](Self::transcribe_async) over a chunked
    /// file. [`ASYNC_FILE_CHUNK_SIZE`] suits most uploads.
    pub async fn transcribe_file_async(
        &self,
        path: impl AsRef<std::path::Path>,
        config: &TranscriptionConfig,
        chunk_size: usize,
    ) -> Result<String> {
        let source = FileChunkSource::new(path.as_ref()).chunk_size(chunk_size);
        self.transcribe_async(source.stream(), config).await
    }

    /// Status of one async job. The server must return exactly one
    /// record for a specific file id.
    pub async fn get_status(&self, file_id: &str) -> Result<FileStatus> {
        let response = self
            .transport()
            .get_status(StatusQuery {
                api_key: self.api_key().to_string(),
                file_id: Some(file_id.to_string()),
            })
            .await?;

        let count = response.files.len();
        let mut files = response.files;
        match (files.pop(), files.pop()) {
            (Some(status), None) => Ok(status),
            _ => Err(Error::Protocol(format!(
                "status query for one file returned {count} records"
            ))),
        }
    }

    /// Unfiltered status listing of all async jobs.
    pub async fn get_all_statuses(&self) -> Result<Vec<FileStatus>> {
        let response = self
            .transport()
            .get_status(StatusQuery {
                api_key: self.api_key().to_string(),
                file_id: None,
            })
            .await?;
        Ok(response.files)
    }

    /// Downloads and folds the result of a completed async job.
    pub async fn get_result(&self, file_id: &str) -> Result<CompleteResult> {
        let mut partials = self
            .transport()
            .open_result_stream(ResultQuery {
                api_key: self.api_key().to_string(),
                file_id: file_id.to_string(),
            })
            .await?;

        // The separation flag of the stored session is only known from
        // the stream itself, so the accumulator is seeded lazily.
        let mut accumulator: Option<ResultAccumulator> = None;
        while let Some(partial) = partials.next().await.transpose()? {
            let accumulator = accumulator.get_or_insert_with(|| {
                ResultAccumulator::new(partial.separate_recognition_per_channel)
            });
            accumulator.apply(partial)?;
        }

        match accumulator {
            Some(accumulator) => accumulator.finalize(),
            None => Err(Error::Protocol(
                "result stream closed without delivering any result".to_string(),
            )),
        }
    }

    /// Deletes an async job. Fire-and-forget: success is the only
    /// payload of the acknowledgment.
    pub async fn delete_file(&self, file_id: &str) -> Result<()> {
        self.transport()
            .delete_file(DeleteQuery {
                api_key: self.api_key().to_string(),
                file_id: file_id.to_string(),
            })
            .await
    }
}
