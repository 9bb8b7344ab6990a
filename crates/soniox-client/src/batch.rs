//! Single-shot transcription of short audio.

use soniox_interface::{CompleteResult, TranscribeRequest, TranscribeResponse, TranscriptionConfig};

use crate::{Error, Result, SpeechClient};

impl SpeechClient {
    /// Transcribes an in-memory audio buffer in one request/response
    /// exchange. Suitable for short audio only; longer material belongs
    /// on [`transcribe_stream`](Self::transcribe_stream) or an async job.
    pub async fn transcribe(
        &self,
        audio: impl Into<Vec<u8>>,
        config: &TranscriptionConfig,
    ) -> Result<CompleteResult> {
        let response = self
            .transport()
            .transcribe(TranscribeRequest {
                api_key: self.api_key().to_string(),
                config: config.clone(),
                audio: audio.into(),
            })
            .await?;
        complete_from_response(response, config.enable_separate_recognition_per_channel)
    }

    /// Reads a whole file into memory and transcribes it single-shot.
    pub async fn transcribe_file_short(
        &self,
        path: impl AsRef<std::path::Path>,
        config: &TranscriptionConfig,
    ) -> Result<CompleteResult> {
        let audio = tokio::fs::read(path).await?;
        self.transcribe(audio, config).await
    }
}

/// Checks the response shape against the separation flag and converts
/// it into the matching [`CompleteResult`] variant.
fn complete_from_response(
    response: TranscribeResponse,
    separate: bool,
) -> Result<CompleteResult> {
    if separate {
        if response.result.is_some() {
            return Err(Error::Protocol(
                "single result returned although separate recognition was requested".to_string(),
            ));
        }
        if response.channel_results.is_empty() {
            return Err(Error::Protocol(
                "no channel results returned for separate recognition".to_string(),
            ));
        }
        let mut channel_results = response.channel_results;
        channel_results.sort_by_key(|result| result.channel);
        Ok(CompleteResult::SeparateRecognition { channel_results })
    } else {
        if !response.channel_results.is_empty() {
            return Err(Error::Protocol(
                "channel results returned although separate recognition was not requested"
                    .to_string(),
            ));
        }
        match response.result {
            Some(result) => Ok(CompleteResult::Single { result }),
            None => Err(Error::Protocol(
                "response carried no result at all".to_string(),
            )),
        }
    }
}
