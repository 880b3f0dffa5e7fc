use std::fmt;

/// Which remote strategy generates the tests.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Long-running task on the service, progress reported over an event stream.
    Automatic,
    /// Single synchronous model-assisted request.
    Assisted,
}

impl GenerationMode {
    /// Returns the lowercase name used in logs and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Automatic => "automatic",
            GenerationMode::Assisted => "assisted",
        }
    }

    /// Whether this mode ends in a streaming session.
    pub fn is_streaming(&self) -> bool {
        matches!(self, GenerationMode::Automatic)
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One submit action: the source to generate tests for and the mode.
///
/// The source text is sent as-is; the service decides what it accepts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GenerationRequest {
    pub source: String,
    pub mode: GenerationMode,
}

impl GenerationRequest {
    pub fn new(source: impl Into<String>, mode: GenerationMode) -> Self {
        Self {
            source: source.into(),
            mode,
        }
    }

    pub fn automatic(source: impl Into<String>) -> Self {
        Self::new(source, GenerationMode::Automatic)
    }

    pub fn assisted(source: impl Into<String>) -> Self {
        Self::new(source, GenerationMode::Assisted)
    }
}

/// Opaque identifier of a long-running task on the service.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TaskHandle(String);

impl TaskHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
