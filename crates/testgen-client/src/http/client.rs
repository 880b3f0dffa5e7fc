use std::pin::Pin;

use futures::StreamExt as _;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::backend::GenerationBackend;
use crate::channel::{ChannelMessage, EventChannel};
use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::request::TaskHandle;

use super::transport::SseDecoder;

pub(crate) const ASSISTED_PATH: &str = "/generate-ai-tests";
pub(crate) const TASK_PATH: &str = "/generate-tests";
pub(crate) const STREAM_PATH: &str = "/generate-tests/stream";

type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static>>;

#[derive(serde::Serialize)]
struct GenerateBody<'a> {
    code: &'a str,
}

#[derive(serde::Deserialize)]
struct AssistedResponse {
    test_code: String,
}

#[derive(serde::Deserialize)]
struct TaskResponse {
    task_id: String,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    error: String,
}

/// [`GenerationBackend`] talking to the service over HTTP.
pub struct HttpBackend {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpBackend {
    /// Creates a backend from explicit configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        // No overall timeout on the client: it would also cut the event stream.
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Creates a backend configured from the environment.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn post_code<T: DeserializeOwned>(
        &self,
        path: &'static str,
        source: &str,
    ) -> Result<T, ClientError> {
        let url = self.config.endpoint_url(path);
        debug!(endpoint = path, bytes = source.len(), "posting generation request");
        let mut request = self.client.post(&url).json(&GenerateBody { code: source });
        if let Some(timeout) = self.config.request_timeout {
            request = request.timeout(timeout);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::transport(path, format!("request failed: {e}")))?;
        let response = check_status(path, response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::protocol(path, format!("unexpected response body: {e}")))
    }

    fn stream_url(&self, task: &TaskHandle) -> Result<reqwest::Url, ClientError> {
        let mut url = reqwest::Url::parse(&self.config.endpoint_url(STREAM_PATH))
            .map_err(|e| ClientError::Config(format!("invalid base_url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Config("base_url cannot carry a path".into()))?
            .push(task.as_str());
        Ok(url)
    }
}

#[async_trait::async_trait]
impl GenerationBackend for HttpBackend {
    async fn generate_assisted(&self, source: &str) -> Result<String, ClientError> {
        let body: AssistedResponse = self.post_code(ASSISTED_PATH, source).await?;
        Ok(body.test_code)
    }

    async fn start_task(&self, source: &str) -> Result<TaskHandle, ClientError> {
        let body: TaskResponse = self.post_code(TASK_PATH, source).await?;
        Ok(TaskHandle::new(body.task_id))
    }

    async fn open_stream(&self, task: &TaskHandle) -> Result<EventChannel, ClientError> {
        let url = self.stream_url(task)?;
        debug!(task_id = %task, "opening task event stream");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| ClientError::transport(STREAM_PATH, format!("request failed: {e}")))?;
        let response = check_status(STREAM_PATH, response).await?;

        let (tx, rx) = mpsc::channel(self.config.stream_buffer_capacity);
        let bytes_stream: ByteStream = Box::pin(response.bytes_stream());
        let reader = tokio::spawn(read_event_stream(task.clone(), bytes_stream, tx));
        Ok(EventChannel::with_reader(rx, reader))
    }
}

async fn check_status(
    path: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(ErrorBody { error }) => format!("status {status}: {error}"),
        Err(_) if body.trim().is_empty() => format!("status {status}"),
        Err(_) => format!("status {status}: {}", body.trim()),
    };
    Err(ClientError::http(path, message, Some(status.as_u16())))
}

/// Pumps decoded frames into `tx` until the stream fails or ends. The end of
/// the HTTP body is reported as a failure: only a `done` event ends a session
/// cleanly, and the consumer stops reading once it sees one.
async fn read_event_stream(
    task: TaskHandle,
    mut bytes_stream: ByteStream,
    tx: mpsc::Sender<ChannelMessage>,
) {
    let mut decoder = SseDecoder::default();
    loop {
        let failure = match bytes_stream.next().await {
            Some(Ok(chunk)) => {
                for frame in decoder.push_chunk(&chunk) {
                    trace!(task_id = %task, event = ?frame.event, "stream frame");
                    if tx.send(ChannelMessage::Payload(frame.data)).await.is_err() {
                        return;
                    }
                }
                continue;
            }
            Some(Err(e)) => format!("stream read failed: {e}"),
            None => "stream ended by server".to_string(),
        };
        warn!(task_id = %task, reason = %failure, "task event stream stopped");
        let _ = tx.send(ChannelMessage::Failed(failure)).await;
        return;
    }
}
