use std::sync::Arc;

use tracing::{Instrument as _, Span, debug, warn};

use crate::backend::GenerationBackend;
use crate::consumer::{Step, StreamConsumer};
use crate::errors::ClientError;
use crate::launcher::{Launch, launch};
use crate::observability::{record_task_id, session_span};
use crate::request::GenerationRequest;
use crate::session::SessionState;

/// Owns the current session and at most one open task stream.
///
/// Every [`TestGenerator::submit`] replaces the previous session and releases
/// its channel before anything else happens.
pub struct TestGenerator {
    backend: Arc<dyn GenerationBackend>,
    session: Option<SessionState>,
    consumer: Option<StreamConsumer>,
    span: Span,
}

impl TestGenerator {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            session: None,
            consumer: None,
            span: Span::none(),
        }
    }

    /// The current session, if anything has been submitted.
    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    /// Whether a task stream is currently open.
    pub fn is_streaming(&self) -> bool {
        self.consumer.as_ref().is_some_and(StreamConsumer::is_open)
    }

    /// Starts a new session for `request`.
    ///
    /// Assisted requests complete before this returns. Automatic requests
    /// return once the task stream is open (or has failed to open, which closes
    /// the session with a connection diagnostic); drive it with
    /// [`TestGenerator::next_step`] or [`TestGenerator::run_to_end`].
    ///
    /// A launch failure is returned as an error and leaves a closed, empty
    /// session behind; calling `submit` again is always allowed.
    pub async fn submit(
        &mut self,
        request: GenerationRequest,
    ) -> Result<&SessionState, ClientError> {
        self.release_stream();
        let session = self.session.insert(SessionState::new(request.mode));
        self.span = session_span(session.id(), request.mode);

        self.consumer = start_session(self.backend.as_ref(), session, &request)
            .instrument(self.span.clone())
            .await?;
        Ok(&*session)
    }

    /// Processes the next stream message of the current session.
    ///
    /// Returns `None` when no stream is open.
    pub async fn next_step(&mut self) -> Option<Step> {
        let consumer = self.consumer.as_mut()?;
        let session = self.session.as_mut()?;
        let step = consumer.step(session).instrument(self.span.clone()).await;
        if !consumer.is_open() {
            self.consumer = None;
        }
        step
    }

    /// Drives the current stream until it is released.
    pub async fn run_to_end(&mut self) -> Option<&SessionState> {
        while self.next_step().await.is_some() {}
        self.session.as_ref()
    }

    fn release_stream(&mut self) {
        if let Some(mut consumer) = self.consumer.take() {
            let _entered = self.span.enter();
            debug!(task_id = %consumer.task(), "releasing previous task stream");
            consumer.close();
        }
    }
}

/// Launches `request` into a fresh `session`. Returns the consumer when a task
/// stream was opened and is still live.
async fn start_session(
    backend: &dyn GenerationBackend,
    session: &mut SessionState,
    request: &GenerationRequest,
) -> Result<Option<StreamConsumer>, ClientError> {
    debug!(mode = %request.mode, "submitting");
    match launch(backend, request).await {
        Ok(Launch::Completed { artifact }) => {
            session.complete_with(artifact);
            Ok(None)
        }
        Ok(Launch::Streaming { task }) => {
            record_task_id(&task);
            let consumer = StreamConsumer::open(backend, task, session).await;
            Ok(consumer.is_open().then_some(consumer))
        }
        Err(err) => {
            warn!(error = %err, "launch failed");
            session.launch_failed();
            Err(err)
        }
    }
}
