use tracing::{debug, info};

use crate::backend::GenerationBackend;
use crate::errors::ClientError;
use crate::request::{GenerationMode, GenerationRequest, TaskHandle};

/// Outcome of a successful launch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Launch {
    /// Assisted mode: the artifact is already here.
    Completed { artifact: String },
    /// Automatic mode: a task is running; its events must be streamed.
    Streaming { task: TaskHandle },
}

/// Issues the single outbound call that `request.mode` calls for.
pub async fn launch(
    backend: &dyn GenerationBackend,
    request: &GenerationRequest,
) -> Result<Launch, ClientError> {
    debug!(mode = %request.mode, "launching generation");
    match request.mode {
        GenerationMode::Assisted => {
            let artifact = backend.generate_assisted(&request.source).await?;
            info!(bytes = artifact.len(), "assisted generation returned artifact");
            Ok(Launch::Completed { artifact })
        }
        GenerationMode::Automatic => {
            let task = backend.start_task(&request.source).await?;
            info!(task_id = %task, "generation task started");
            Ok(Launch::Streaming { task })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::EventChannel;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingBackend {
        assisted_calls: AtomicUsize,
        task_calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl GenerationBackend for CountingBackend {
        async fn generate_assisted(&self, source: &str) -> Result<String, ClientError> {
            self.assisted_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ClientError::http("/generate-ai-tests", "boom", Some(500)));
            }
            Ok(format!("tests for {source}"))
        }

        async fn start_task(&self, _source: &str) -> Result<TaskHandle, ClientError> {
            self.task_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ClientError::transport("/generate-tests", "refused"));
            }
            Ok(TaskHandle::new("abc123"))
        }

        async fn open_stream(&self, _task: &TaskHandle) -> Result<EventChannel, ClientError> {
            unreachable!("launch never opens a stream")
        }
    }

    #[tokio::test]
    async fn assisted_mode_makes_one_assisted_call() {
        let backend = CountingBackend::default();
        let outcome = launch(&backend, &GenerationRequest::assisted("def f(): pass"))
            .await
            .expect("launch");
        assert_eq!(
            outcome,
            Launch::Completed {
                artifact: "tests for def f(): pass".into()
            }
        );
        assert_eq!(backend.assisted_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.task_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn automatic_mode_returns_task_handle() {
        let backend = CountingBackend::default();
        let outcome = launch(&backend, &GenerationRequest::automatic("x = 1"))
            .await
            .expect("launch");
        assert_eq!(
            outcome,
            Launch::Streaming {
                task: TaskHandle::new("abc123")
            }
        );
        assert_eq!(backend.task_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.assisted_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failures_are_returned_without_retry() {
        let backend = CountingBackend {
            fail: true,
            ..Default::default()
        };
        let err = launch(&backend, &GenerationRequest::automatic("x"))
            .await
            .expect_err("should fail");
        assert!(matches!(err, ClientError::Transport { .. }));
        assert_eq!(backend.task_calls.load(Ordering::SeqCst), 1);
    }
}
