//! Transport boundary of the client.
//!
//! Everything above this seam speaks [`SpeechTransport`]; the bundled
//! implementation is [`WsTransport`] (WebSocket for the streaming calls,
//! HTTP for the unary ones). Tests and embedders can substitute their
//! own channel.

mod ws;

pub use ws::WsTransport;

use std::future::Future;
use std::pin::Pin;

use futures_util::{Sink, Stream};
use soniox_interface::stream::{PartialResult, StreamRequest, StreamResponse};
use soniox_interface::{
    DeleteQuery, ResultQuery, StatusQuery, StatusResponse, TranscribeRequest, TranscribeResponse,
};

use crate::Result;

pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

pub type RequestSink = Pin<Box<dyn Sink<StreamRequest, Error = crate::Error> + Send>>;
pub type ResponseStream = Pin<Box<dyn Stream<Item = Result<StreamResponse>> + Send>>;
pub type PartialResultStream = Pin<Box<dyn Stream<Item = Result<PartialResult>> + Send>>;

/// One bidirectional streaming call: a write side for requests and a
/// read side for responses. Dropping either side releases its half of
/// the underlying call.
pub struct DuplexCall {
    pub requests: RequestSink,
    pub responses: ResponseStream,
}

/// The remote speech service, reduced to the five call shapes the
/// client needs. Object-safe so it can live behind an `Arc<dyn _>`.
pub trait SpeechTransport: Send + Sync + 'static {
    /// Unary short-audio transcription.
    fn transcribe(&self, request: TranscribeRequest) -> TransportFuture<'_, TranscribeResponse>;

    /// Opens a bidirectional streaming call.
    fn open_duplex(&self) -> TransportFuture<'_, DuplexCall>;

    /// Opens the server-streamed result download for an async job.
    fn open_result_stream(&self, query: ResultQuery) -> TransportFuture<'_, PartialResultStream>;

    /// Unary status lookup (one file or all files).
    fn get_status(&self, query: StatusQuery) -> TransportFuture<'_, StatusResponse>;

    /// Unary deletion of an async job.
    fn delete_file(&self, query: DeleteQuery) -> TransportFuture<'_, ()>;
}
