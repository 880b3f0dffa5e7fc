//! Typed events carried by the task event stream.

/// One event emitted by the service for a running task.
///
/// Wire shape: a JSON object discriminated by `type`. The `result` variant
/// carries the artifact under `test_code`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// One line of task output.
    Log { line: String },
    /// The generated artifact. A later `Result` replaces an earlier one.
    Result {
        #[serde(rename = "test_code")]
        artifact: String,
    },
    /// Task-side failure report. Does not end the stream.
    Error { message: String },
    /// Terminal event.
    Done,
}

/// A raw channel payload after classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Incoming {
    Event(StreamEvent),
    /// Payload that is not a well-formed event; kept verbatim as a log line.
    Raw(String),
}

/// Classifies one payload. Never fails: anything that does not parse into a
/// known event comes back as [`Incoming::Raw`].
pub fn classify(payload: &str) -> Incoming {
    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(event) => Incoming::Event(event),
        Err(_) => Incoming::Raw(payload.to_string()),
    }
}
