#![allow(dead_code)] // not every test binary uses every helper

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use futures_util::SinkExt;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::PollSender;

use soniox_client::interface::stream::{PartialResult, StreamRequest, StreamResponse};
use soniox_client::interface::{
    DeleteQuery, RecognitionResult, ResultQuery, StatusQuery, StatusResponse, TranscribeRequest,
    TranscribeResponse, Word,
};
use soniox_client::transport::{
    DuplexCall, PartialResultStream, RequestSink, ResponseStream, SpeechTransport, TransportFuture,
};
use soniox_client::{Error, Result, SpeechClient};

pub const TEST_API_KEY: &str = "test-key";

pub fn client(transport: Arc<MockTransport>) -> SpeechClient {
    SpeechClient::builder()
        .api_key(TEST_API_KEY)
        .transport(transport)
        .build()
        .expect("client must build")
}

pub fn word(text: &str, is_final: bool) -> Word {
    Word {
        text: text.to_string(),
        start_ms: 0,
        duration_ms: 100,
        is_final,
        speaker: 0,
    }
}

pub fn partial(channel: i32, words: &[(&str, bool)], separate: bool) -> StreamResponse {
    StreamResponse::Result(partial_result(channel, words, separate))
}

pub fn partial_result(channel: i32, words: &[(&str, bool)], separate: bool) -> PartialResult {
    PartialResult {
        result: RecognitionResult {
            channel,
            words: words.iter().map(|&(t, f)| word(t, f)).collect(),
            ..Default::default()
        },
        separate_recognition_per_channel: separate,
    }
}

/// When the scripted responses of a duplex call are released.
pub enum RespondWhen {
    Immediately,
    /// Only after the client finished its write side, either with the
    /// explicit EOF marker or by half-closing.
    AfterEof,
}

pub struct DuplexScript {
    pub when: RespondWhen,
    pub responses: Vec<Result<StreamResponse>>,
    /// Keep the response stream open after the script is exhausted, so
    /// a session only ends through cancellation or failure.
    pub hold_open: bool,
    /// Drop the request side after this many accepted requests,
    /// simulating a write failure mid-stream.
    pub close_requests_after: Option<usize>,
}

impl DuplexScript {
    pub fn new(responses: Vec<Result<StreamResponse>>) -> Self {
        Self {
            when: RespondWhen::Immediately,
            responses,
            hold_open: false,
            close_requests_after: None,
        }
    }

    pub fn after_eof(mut self) -> Self {
        self.when = RespondWhen::AfterEof;
        self
    }

    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    pub fn close_requests_after(mut self, accepted: usize) -> Self {
        self.close_requests_after = Some(accepted);
        self
    }
}

/// Scripted in-memory stand-in for the remote service.
#[derive(Default)]
pub struct MockTransport {
    duplex_scripts: Mutex<VecDeque<DuplexScript>>,
    result_streams: Mutex<VecDeque<Vec<Result<PartialResult>>>>,
    status_responses: Mutex<VecDeque<Result<StatusResponse>>>,
    transcribe_responses: Mutex<VecDeque<Result<TranscribeResponse>>>,
    sent: Arc<Mutex<Vec<StreamRequest>>>,
    status_queries: Mutex<Vec<StatusQuery>>,
    result_queries: Mutex<Vec<ResultQuery>>,
    deletes: Mutex<Vec<DeleteQuery>>,
    transcribe_requests: Mutex<Vec<TranscribeRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script_duplex(&self, script: DuplexScript) {
        self.duplex_scripts.lock().unwrap().push_back(script);
    }

    pub fn script_result_stream(&self, partials: Vec<Result<PartialResult>>) {
        self.result_streams.lock().unwrap().push_back(partials);
    }

    pub fn script_status(&self, response: Result<StatusResponse>) {
        self.status_responses.lock().unwrap().push_back(response);
    }

    pub fn script_transcribe(&self, response: Result<TranscribeResponse>) {
        self.transcribe_responses.lock().unwrap().push_back(response);
    }

    pub fn sent_requests(&self) -> Vec<StreamRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn status_queries(&self) -> Vec<StatusQuery> {
        self.status_queries.lock().unwrap().clone()
    }

    pub fn result_queries(&self) -> Vec<ResultQuery> {
        self.result_queries.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<DeleteQuery> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn transcribe_requests(&self) -> Vec<TranscribeRequest> {
        self.transcribe_requests.lock().unwrap().clone()
    }
}

impl SpeechTransport for MockTransport {
    fn transcribe(&self, request: TranscribeRequest) -> TransportFuture<'_, TranscribeResponse> {
        self.transcribe_requests.lock().unwrap().push(request);
        let response = self
            .transcribe_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Transport("no scripted transcribe response".into())));
        Box::pin(async move { response })
    }

    fn open_duplex(&self) -> TransportFuture<'_, DuplexCall> {
        let script = self
            .duplex_scripts
            .lock()
            .unwrap()
            .pop_front()
            .expect("no duplex script queued");
        let sent = self.sent.clone();

        Box::pin(async move {
            let DuplexScript {
                when,
                responses,
                hold_open,
                close_requests_after,
            } = script;

            let (request_tx, mut request_rx) = tokio::sync::mpsc::channel::<StreamRequest>(4);
            let (response_tx, response_rx) =
                tokio::sync::mpsc::channel::<Result<StreamResponse>>(4);
            let (eof_tx, eof_rx) = tokio::sync::oneshot::channel::<()>();

            // Request recorder; doubles as the write-failure injector.
            tokio::spawn(async move {
                let mut eof_tx = Some(eof_tx);
                let mut accepted = 0usize;
                while let Some(request) = request_rx.recv().await {
                    let is_eof = matches!(request, StreamRequest::Eof);
                    sent.lock().unwrap().push(request);
                    accepted += 1;
                    if is_eof {
                        if let Some(tx) = eof_tx.take() {
                            let _ = tx.send(());
                        }
                    }
                    if close_requests_after == Some(accepted) {
                        return; // drops the receiver; further sends fail
                    }
                }
                if let Some(tx) = eof_tx.take() {
                    let _ = tx.send(());
                }
            });

            // Scripted responder.
            tokio::spawn(async move {
                if matches!(when, RespondWhen::AfterEof) {
                    let _ = eof_rx.await;
                }
                for response in responses {
                    if response_tx.send(response).await.is_err() {
                        return;
                    }
                }
                if hold_open {
                    futures_util::future::pending::<()>().await;
                }
            });

            let requests: RequestSink = Box::pin(
                PollSender::new(request_tx)
                    .sink_map_err(|_| Error::Transport("request stream closed".into())),
            );
            let responses: ResponseStream = Box::pin(ReceiverStream::new(response_rx));

            Ok(DuplexCall {
                requests,
                responses,
            })
        })
    }

    fn open_result_stream(&self, query: ResultQuery) -> TransportFuture<'_, PartialResultStream> {
        self.result_queries.lock().unwrap().push(query);
        let partials = self
            .result_streams
            .lock()
            .unwrap()
            .pop_front()
            .expect("no result stream queued");
        Box::pin(async move {
            let stream: PartialResultStream = Box::pin(tokio_stream::iter(partials));
            Ok(stream)
        })
    }

    fn get_status(&self, query: StatusQuery) -> TransportFuture<'_, StatusResponse> {
        self.status_queries.lock().unwrap().push(query);
        let response = self
            .status_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Transport("no scripted status response".into())));
        Box::pin(async move { response })
    }

    fn delete_file(&self, query: DeleteQuery) -> TransportFuture<'_, ()> {
        self.deletes.lock().unwrap().push(query);
        Box::pin(async move { Ok(()) })
    }
}
