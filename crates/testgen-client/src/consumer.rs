use tracing::{debug, info, warn};

use crate::backend::GenerationBackend;
use crate::channel::{ChannelMessage, EventChannel};
use crate::request::TaskHandle;
use crate::session::{Applied, SessionState};
use crate::stream::classify;

/// Result of one consumer step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// An event was folded into the session.
    Applied(Applied),
    /// The transport failed; the session is closed.
    ConnectionLost,
}

/// Drives one task's event channel into a [`SessionState`].
///
/// Owns the channel for the lifetime of the streaming session and releases it
/// on `done`, on transport failure, on [`StreamConsumer::close`], and on drop.
pub struct StreamConsumer {
    task: TaskHandle,
    channel: Option<EventChannel>,
}

impl StreamConsumer {
    /// Opens the task's channel and moves `session` from idle to streaming.
    ///
    /// If the channel cannot be opened the session is closed with the
    /// connection-lost diagnostic and the returned consumer is already closed.
    pub async fn open(
        backend: &dyn GenerationBackend,
        task: TaskHandle,
        session: &mut SessionState,
    ) -> Self {
        match backend.open_stream(&task).await {
            Ok(channel) => {
                session.stream_opened();
                debug!(session_id = %session.id(), task_id = %task, "task stream open");
                Self {
                    task,
                    channel: Some(channel),
                }
            }
            Err(err) => {
                warn!(session_id = %session.id(), task_id = %task, error = %err, "failed to open task stream");
                session.connection_lost();
                Self {
                    task,
                    channel: None,
                }
            }
        }
    }

    /// Wraps an already open channel.
    pub fn from_channel(
        task: TaskHandle,
        channel: EventChannel,
        session: &mut SessionState,
    ) -> Self {
        session.stream_opened();
        Self {
            task,
            channel: Some(channel),
        }
    }

    pub fn task(&self) -> &TaskHandle {
        &self.task
    }

    pub fn is_open(&self) -> bool {
        self.channel.is_some()
    }

    /// Waits for the next channel message and folds it into `session`.
    ///
    /// Returns `None` once the channel has been released.
    pub async fn step(&mut self, session: &mut SessionState) -> Option<Step> {
        let channel = self.channel.as_mut()?;
        match channel.recv().await {
            Some(ChannelMessage::Payload(payload)) => {
                let applied = session.apply(classify(&payload));
                if matches!(applied, Applied::Finished | Applied::Ignored) {
                    info!(session_id = %session.id(), task_id = %self.task, logs = session.logs().len(), "task stream finished");
                    self.close();
                }
                Some(Step::Applied(applied))
            }
            Some(ChannelMessage::Failed(reason)) => {
                warn!(session_id = %session.id(), task_id = %self.task, %reason, "connection to task stream lost");
                self.lose_connection(session);
                Some(Step::ConnectionLost)
            }
            None => {
                warn!(session_id = %session.id(), task_id = %self.task, "task stream closed without done");
                self.lose_connection(session);
                Some(Step::ConnectionLost)
            }
        }
    }

    /// Steps until the channel is released.
    pub async fn run(&mut self, session: &mut SessionState) {
        while self.step(session).await.is_some() {}
    }

    /// Releases the channel without touching the session.
    pub fn close(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            channel.close();
        }
    }

    fn lose_connection(&mut self, session: &mut SessionState) {
        session.connection_lost();
        self.close();
    }
}
