//! Duplex streaming transcription with live results.
//!
//! A session is a pair of cooperating tasks on one streaming call: a
//! writer pushing the header and audio chunks, and a reader folding
//! partial results into a [`ResultAccumulator`] while forwarding each
//! merged snapshot to the caller. The pair is joined by an explicit
//! cancellation edge — a failing writer cancels the reader's wait so the
//! session can never hang on a dead write side — rather than by implicit
//! error bubbling.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use soniox_interface::stream::{StartRequest, StreamRequest, StreamResponse};
use soniox_interface::{CompleteResult, RecognitionResult, TranscriptionConfig};

use crate::chunk::FileChunkSource;
use crate::merge::ResultAccumulator;
use crate::transport::{DuplexCall, RequestSink};
use crate::{Error, Result, SpeechClient};

/// Where a live session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// The header (credentials and config) is written; no audio yet.
    HeaderSent,
    /// Audio is flowing.
    Streaming,
    /// The write side is done; trailing results may still arrive.
    Draining,
    /// The read side observed end-of-stream.
    Closed,
    /// The session ended by cancellation or failure.
    Aborted,
}

#[derive(Clone)]
struct StateCell(Arc<Mutex<SessionState>>);

impl StateCell {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(SessionState::Idle)))
    }

    fn set(&self, next: SessionState) {
        if let Ok(mut state) = self.0.lock() {
            // Terminal states are sticky: a late writer transition must
            // not resurrect a session that already closed or aborted.
            let allowed = match *state {
                SessionState::Aborted => false,
                SessionState::Closed => next == SessionState::Aborted,
                _ => true,
            };
            if !allowed {
                return;
            }
            tracing::debug!(from = ?*state, to = ?next, "session state");
            *state = next;
        }
    }

    fn get(&self) -> SessionState {
        self.0.lock().map(|state| *state).unwrap_or(SessionState::Aborted)
    }
}

/// Handle to an in-flight live transcription.
///
/// Implements `Stream` over the merged per-channel snapshots, one per
/// partial update. The stream is delivered through a single-slot
/// channel: a caller that stops consuming exerts backpressure on the
/// read side, and dropping the handle cancels the session. Call
/// [`finish`](Self::finish) for the complete result.
pub struct LiveTranscription {
    results: mpsc::Receiver<Result<RecognitionResult>>,
    done: tokio::task::JoinHandle<Result<CompleteResult>>,
    cancel: CancellationToken,
    state: StateCell,
}

impl LiveTranscription {
    /// Requests cancellation of both the write and the read side.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    /// Waits for the session to end and returns the complete result, or
    /// the first failure, or [`Error::Cancelled`] after [`cancel`](Self::cancel).
    pub async fn finish(mut self) -> Result<CompleteResult> {
        // Drain pending snapshots so the reader is never parked on a
        // full channel while we wait for it to exit.
        self.results.close();
        while self.results.recv().await.is_some() {}

        match (&mut self.done).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => Err(Error::Cancelled),
            Err(e) => Err(Error::Transport(format!("session task failed: {e}"))),
        }
    }
}

impl Stream for LiveTranscription {
    type Item = Result<RecognitionResult>;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        self.results.poll_recv(cx)
    }
}

impl Drop for LiveTranscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl SpeechClient {
    /// Streams audio to the service and transcribes it live.
    ///
    /// Merged per-channel snapshots arrive on the returned handle as the
    /// service produces them; `finish` returns the complete result once
    /// the stream drains.
    pub async fn transcribe_stream<S>(
        &self,
        audio: S,
        config: &TranscriptionConfig,
    ) -> Result<LiveTranscription>
    where
        S: Stream<Item = Result<Bytes>> + Send + 'static,
    {
        let call = self.transport().open_duplex().await?;
        let start = StartRequest {
            api_key: self.api_key().to_string(),
            config: config.clone(),
        };
        let separate = config.enable_separate_recognition_per_channel;

        let cancel = CancellationToken::new();
        let state = StateCell::new();
        let (results_tx, results_rx) = mpsc::channel(1);

        let done = tokio::spawn(run_live_session(
            call,
            start,
            audio.boxed(),
            separate,
            cancel.clone(),
            results_tx,
            state.clone(),
        ));

        Ok(LiveTranscription {
            results: results_rx,
            done,
            cancel,
            state,
        })
    }

    /// [`transcribe_stream`](Self::transcribe_stream) over a chunked
    /// file. [`DEFAULT_CHUNK_SIZE`](crate::DEFAULT_CHUNK_SIZE) suits
    /// most live sessions.
    pub async fn transcribe_file_stream(
        &self,
        path: impl AsRef<std::path::Path>,
        config: &TranscriptionConfig,
        chunk_size: usize,
    ) -> Result<LiveTranscription> {
        let source = FileChunkSource::new(path.as_ref()).chunk_size(chunk_size);
        self.transcribe_stream(source.stream(), config).await
    }
}

enum ReadEnd {
    /// The transport signalled end-of-stream.
    Eos,
    CallerCancelled,
    WriterFailed,
    Failed(Error),
}

async fn run_live_session(
    call: DuplexCall,
    start: StartRequest,
    audio: BoxStream<'static, Result<Bytes>>,
    separate: bool,
    cancel: CancellationToken,
    results_tx: mpsc::Sender<Result<RecognitionResult>>,
    state: StateCell,
) -> Result<CompleteResult> {
    let DuplexCall {
        requests,
        mut responses,
    } = call;

    let writer_stop = cancel.child_token();
    let reader_stop = CancellationToken::new();
    let writer = tokio::spawn(write_audio(
        requests,
        start,
        audio,
        state.clone(),
        writer_stop.clone(),
        reader_stop.clone(),
    ));

    let mut accumulator = ResultAccumulator::new(separate);
    let mut forward = Some(results_tx);

    let read_end = loop {
        tokio::select! {
            _ = cancel.cancelled() => break ReadEnd::CallerCancelled,
            _ = reader_stop.cancelled() => break ReadEnd::WriterFailed,
            message = responses.next() => match message {
                None => break ReadEnd::Eos,
                Some(Err(e)) => break ReadEnd::Failed(e),
                Some(Ok(StreamResponse::Result(partial))) => {
                    let snapshot = match accumulator.apply(partial) {
                        Ok(snapshot) => snapshot.clone(),
                        Err(e) => break ReadEnd::Failed(e),
                    };
                    if let Some(tx) = forward.clone() {
                        tokio::select! {
                            _ = cancel.cancelled() => break ReadEnd::CallerCancelled,
                            sent = tx.send(Ok(snapshot)) => {
                                if sent.is_err() {
                                    // Caller stopped listening; keep merging.
                                    forward = None;
                                }
                            }
                        }
                    }
                }
                Some(Ok(other)) => break ReadEnd::Failed(Error::Protocol(format!(
                    "unexpected message in live session: {other:?}"
                ))),
            }
        }
    };

    match read_end {
        ReadEnd::Eos => {
            state.set(SessionState::Closed);
            // Stop the writer in case the audio source is still open
            // (the server can end the stream first), then wait it out so
            // real write failures are not swallowed.
            writer_stop.cancel();
            match join_writer(writer).await {
                Ok(()) => accumulator.finalize(),
                Err(Error::Cancelled) if !cancel.is_cancelled() => {
                    // Stopped by us, not the caller; the session is done.
                    accumulator.finalize()
                }
                Err(Error::Cancelled) => {
                    state.set(SessionState::Aborted);
                    Err(Error::Cancelled)
                }
                Err(e) => {
                    state.set(SessionState::Aborted);
                    Err(e)
                }
            }
        }
        ReadEnd::CallerCancelled => {
            state.set(SessionState::Aborted);
            // writer_stop is a child of the caller token, so the writer
            // is already stopping; wait for it before surfacing.
            let _ = join_writer(writer).await;
            Err(Error::Cancelled)
        }
        ReadEnd::WriterFailed => {
            state.set(SessionState::Aborted);
            match join_writer(writer).await {
                Err(e) => Err(e),
                Ok(()) => Err(Error::Cancelled),
            }
        }
        ReadEnd::Failed(e) => {
            state.set(SessionState::Aborted);
            writer_stop.cancel();
            let _ = join_writer(writer).await;
            Err(e)
        }
    }
}

async fn write_audio(
    mut requests: RequestSink,
    start: StartRequest,
    mut audio: BoxStream<'static, Result<Bytes>>,
    state: StateCell,
    stop: CancellationToken,
    reader_stop: CancellationToken,
) -> Result<()> {
    let outcome: Result<()> = async {
        tokio::select! {
            _ = stop.cancelled() => return Err(Error::Cancelled),
            sent = requests.send(StreamRequest::Start(start)) => sent?,
        }
        state.set(SessionState::HeaderSent);

        let mut streaming = false;
        loop {
            let chunk = tokio::select! {
                _ = stop.cancelled() => return Err(Error::Cancelled),
                chunk = audio.next() => chunk,
            };
            match chunk {
                None => break,
                Some(Err(e)) => return Err(e),
                Some(Ok(bytes)) => {
                    if !streaming {
                        state.set(SessionState::Streaming);
                        streaming = true;
                    }
                    tokio::select! {
                        _ = stop.cancelled() => return Err(Error::Cancelled),
                        sent = requests.send(StreamRequest::Audio(bytes)) => sent?,
                    }
                }
            }
        }

        // End-of-source: half-close tells the server no more audio is
        // coming, trailing results may still arrive.
        requests.close().await?;
        state.set(SessionState::Draining);
        Ok(())
    }
    .await;

    match &outcome {
        Ok(()) => {}
        Err(Error::Cancelled) => {
            tracing::debug!("audio writer stopped on cancellation");
        }
        Err(e) => {
            tracing::warn!(error = %e, "audio writer failed, stopping reader");
            reader_stop.cancel();
        }
    }
    outcome
}

async fn join_writer(writer: tokio::task::JoinHandle<Result<()>>) -> Result<()> {
    match writer.await {
        Ok(outcome) => outcome,
        Err(e) if e.is_cancelled() => Err(Error::Cancelled),
        Err(e) => Err(Error::Transport(format!("audio writer task failed: {e}"))),
    }
}
