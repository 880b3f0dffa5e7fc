use crate::channel::EventChannel;
use crate::errors::ClientError;
use crate::request::TaskHandle;

/// Contract with the external generation service.
///
/// Implementations perform exactly one outbound call per method and never
/// retry. [`crate::http::HttpBackend`] is the production implementation; tests
/// substitute in-memory fakes.
#[async_trait::async_trait]
pub trait GenerationBackend: Send + Sync {
    /// One-shot model-assisted generation. Returns the generated test code.
    async fn generate_assisted(&self, source: &str) -> Result<String, ClientError>;

    /// Starts a long-running generation task.
    async fn start_task(&self, source: &str) -> Result<TaskHandle, ClientError>;

    /// Opens the event channel for `task`.
    ///
    /// An error here means the channel never opened.
    async fn open_stream(&self, task: &TaskHandle) -> Result<EventChannel, ClientError>;
}
