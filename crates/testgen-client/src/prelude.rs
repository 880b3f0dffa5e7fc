//! Common imports for typical client usage.
pub use crate::{
    ClientConfig, ClientError, GenerationBackend, GenerationMode, GenerationRequest, HttpBackend,
    SessionState, Step, StreamEvent, TaskHandle, TestGenerator, save_artifact,
};
