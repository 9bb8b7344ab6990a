use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use soniox_interface::stream::{ControlRequest, StreamRequest};
use soniox_interface::{
    DeleteQuery, ResultQuery, StatusQuery, StatusResponse, TranscribeRequest, TranscribeResponse,
};

use super::{
    DuplexCall, PartialResultStream, ResponseStream, SpeechTransport, TransportFuture,
};
use crate::{Error, Result};

const STREAM_PATH: &str = "transcribe-stream";
const RESULT_PATH: &str = "transcribe-async/result";
const TRANSCRIBE_PATH: &str = "transcribe";
const STATUS_PATH: &str = "transcribe-async/status";
const DELETE_PATH: &str = "transcribe-async/delete";

/// The bundled transport: streaming calls over WebSocket, unary calls
/// over HTTP. Control messages travel as JSON text frames, audio as
/// binary frames.
pub struct WsTransport {
    api_host: url::Url,
    http: reqwest::Client,
}

impl WsTransport {
    pub fn new(api_host: impl AsRef<str>) -> Result<Self> {
        let api_host: url::Url = api_host
            .as_ref()
            .parse()
            .map_err(|e| Error::Configuration(format!("invalid API host: {e}")))?;
        Ok(Self {
            api_host,
            http: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, path: &str, websocket: bool) -> Result<url::Url> {
        let mut url = self
            .api_host
            .join(path)
            .map_err(|e| Error::Configuration(format!("invalid API endpoint: {e}")))?;
        if websocket {
            let scheme = match url.scheme() {
                "https" | "wss" => "wss",
                _ => "ws",
            };
            url.set_scheme(scheme)
                .map_err(|_| Error::Configuration(format!("cannot derive ws scheme for {url}")))?;
        }
        Ok(url)
    }

    async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize,
    {
        let url = self.endpoint(path, false)?;
        let response = self.http.post(url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!("{path}: {status}: {detail}")));
        }
        Ok(response.json().await?)
    }
}

fn encode_request(request: StreamRequest) -> Result<Message> {
    match request {
        StreamRequest::Audio(audio) => Ok(Message::Binary(audio)),
        StreamRequest::Start(start) => {
            let payload = serde_json::to_string(&ControlRequest::Start(start))?;
            Ok(Message::Text(payload.into()))
        }
        StreamRequest::Eof => {
            let payload = serde_json::to_string(&ControlRequest::Eof)?;
            Ok(Message::Text(payload.into()))
        }
    }
}

fn decode_frame<T: serde::de::DeserializeOwned>(
    frame: std::result::Result<Message, tokio_tungstenite::tungstenite::Error>,
) -> Option<Result<T>> {
    match frame {
        Ok(Message::Text(text)) => Some(serde_json::from_str(&text).map_err(Error::from)),
        // Close is the normal end of stream; control frames are noise.
        Ok(_) => None,
        Err(e) => Some(Err(e.into())),
    }
}

impl SpeechTransport for WsTransport {
    fn transcribe(&self, request: TranscribeRequest) -> TransportFuture<'_, TranscribeResponse> {
        Box::pin(async move { self.post_json(TRANSCRIBE_PATH, &request).await })
    }

    fn open_duplex(&self) -> TransportFuture<'_, DuplexCall> {
        Box::pin(async move {
            let url = self.endpoint(STREAM_PATH, true)?;
            tracing::debug!(%url, "opening duplex stream");
            let (socket, _) = connect_async(url.as_str()).await?;
            let (sink, stream) = socket.split();

            let requests: super::RequestSink = Box::pin(
                sink.with(|request: StreamRequest| std::future::ready(encode_request(request))),
            );
            let responses: ResponseStream =
                Box::pin(stream.filter_map(|frame| std::future::ready(decode_frame(frame))));

            Ok(DuplexCall {
                requests,
                responses,
            })
        })
    }

    fn open_result_stream(&self, query: ResultQuery) -> TransportFuture<'_, PartialResultStream> {
        Box::pin(async move {
            let url = self.endpoint(RESULT_PATH, true)?;
            tracing::debug!(%url, file_id = %query.file_id, "opening result stream");
            let (socket, _) = connect_async(url.as_str()).await?;
            let (mut sink, stream) = socket.split();

            let payload = serde_json::to_string(&query)?;
            sink.send(Message::Text(payload.into())).await?;

            let partials: PartialResultStream =
                Box::pin(stream.filter_map(|frame| std::future::ready(decode_frame(frame))));
            Ok(partials)
        })
    }

    fn get_status(&self, query: StatusQuery) -> TransportFuture<'_, StatusResponse> {
        Box::pin(async move { self.post_json(STATUS_PATH, &query).await })
    }

    fn delete_file(&self, query: DeleteQuery) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            let _: serde_json::Value = self.post_json(DELETE_PATH, &query).await?;
            Ok(())
        })
    }
}
