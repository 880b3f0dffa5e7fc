use crate::request::GenerationMode;
use crate::stream::{Incoming, StreamEvent};

/// Prefix for `error` events appended to the log.
pub const ERROR_LINE_PREFIX: &str = "ERROR: ";
/// Line appended when the event channel fails.
pub const CONNECTION_LOST_LINE: &str = "Connection to server lost.";

/// Where a session is in its stream lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamPhase {
    /// No channel open yet.
    Idle,
    /// Channel open, events are being folded in.
    Streaming,
    /// Terminal. Nothing mutates the session after this.
    Closed,
}

/// What applying one incoming payload did to the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Applied {
    LogAppended,
    ArtifactStored,
    /// `done` was received; the session is now closed.
    Finished,
    /// The session was already closed; nothing changed.
    Ignored,
}

/// State of one generation request, from submission to its terminal event.
///
/// Log lines are append-only. Once [`StreamPhase::Closed`] is reached the
/// session never becomes in-progress again; a new submission gets a new
/// `SessionState`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    id: uuid::Uuid,
    mode: GenerationMode,
    logs: Vec<String>,
    artifact: Option<String>,
    in_progress: bool,
    phase: StreamPhase,
}

impl SessionState {
    /// Starts a fresh in-progress session for a submission.
    pub fn new(mode: GenerationMode) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            mode,
            logs: Vec::new(),
            artifact: None,
            in_progress: true,
            phase: StreamPhase::Idle,
        }
    }

    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn artifact(&self) -> Option<&str> {
        self.artifact.as_deref()
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    pub fn is_closed(&self) -> bool {
        self.phase == StreamPhase::Closed
    }

    /// Records a one-shot result. Used for assisted mode, where no stream is
    /// opened.
    pub(crate) fn complete_with(&mut self, artifact: String) {
        if self.is_closed() {
            return;
        }
        self.artifact = Some(artifact);
        self.close();
    }

    /// Marks a failed launch. No stream was started and nothing is retained.
    pub(crate) fn launch_failed(&mut self) {
        if self.is_closed() {
            return;
        }
        self.close();
    }

    /// `idle -> streaming`. Returns `false` if the session is not idle.
    pub(crate) fn stream_opened(&mut self) -> bool {
        if self.phase != StreamPhase::Idle {
            return false;
        }
        self.phase = StreamPhase::Streaming;
        true
    }

    /// Folds one classified payload into the session.
    pub fn apply(&mut self, incoming: Incoming) -> Applied {
        if self.is_closed() {
            return Applied::Ignored;
        }
        match incoming {
            Incoming::Event(StreamEvent::Log { line }) | Incoming::Raw(line) => {
                self.logs.push(line);
                Applied::LogAppended
            }
            Incoming::Event(StreamEvent::Error { message }) => {
                self.logs.push(format!("{ERROR_LINE_PREFIX}{message}"));
                Applied::LogAppended
            }
            Incoming::Event(StreamEvent::Result { artifact }) => {
                self.artifact = Some(artifact);
                Applied::ArtifactStored
            }
            Incoming::Event(StreamEvent::Done) => {
                self.close();
                Applied::Finished
            }
        }
    }

    /// Transport failure: appends the connectivity diagnostic once and closes.
    /// Returns `false` if the session was already closed.
    pub fn connection_lost(&mut self) -> bool {
        if self.is_closed() {
            return false;
        }
        self.logs.push(CONNECTION_LOST_LINE.to_string());
        self.close();
        true
    }

    fn close(&mut self) {
        self.in_progress = false;
        self.phase = StreamPhase::Closed;
    }
}
