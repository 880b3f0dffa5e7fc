//! Client for a remote test-generation service.
//!
//! Two request modes are supported. `Assisted` is a single request that returns
//! generated test code directly. `Automatic` starts a task on the service and
//! follows its server-sent event stream, folding log lines and the final
//! artifact into a [`SessionState`] until the task reports `done` or the
//! connection drops.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use testgen_client::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ClientError> {
//! let backend = HttpBackend::new(ClientConfig::new("http://127.0.0.1:5000"))?;
//! let mut generator = TestGenerator::new(Arc::new(backend));
//!
//! generator
//!     .submit(GenerationRequest::automatic("def add(a, b):\n    return a + b\n"))
//!     .await?;
//! while let Some(_step) = generator.next_step().await {
//!     if let Some(line) = generator.session().and_then(|s| s.logs().last()) {
//!         println!("{line}");
//!     }
//! }
//! if let Some(code) = generator.session().and_then(SessionState::artifact) {
//!     save_artifact(code, std::path::Path::new("."))?;
//! }
//! # Ok(())
//! # }
//! ```

/// Saving generated test code to disk.
pub mod artifact;
/// Contract with the generation service.
pub mod backend;
/// Single-consumer channel of raw event payloads.
pub mod channel;
/// Client configuration.
pub mod config;
/// Drives one task's event channel into a session.
pub mod consumer;
/// Public error types.
pub mod errors;
/// Session owner: submission, stream replacement, stepping.
pub mod generator;
/// HTTP backend and event-stream decoding.
pub mod http;
/// One-call launch for either mode.
pub mod launcher;
/// Tracing subscriber setup.
pub mod observability;
/// Common imports.
pub mod prelude;
/// Request, mode and task handle types.
pub mod request;
/// Session state and its event reducer.
pub mod session;
/// Wire events and payload classification.
pub mod stream;

pub use artifact::{DEFAULT_ARTIFACT_FILE_NAME, save_artifact};
pub use backend::GenerationBackend;
pub use channel::{ChannelMessage, EventChannel};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use consumer::{Step, StreamConsumer};
pub use errors::ClientError;
pub use generator::TestGenerator;
pub use http::HttpBackend;
pub use launcher::{Launch, launch};
pub use observability::{init_observability, session_span};
pub use request::{GenerationMode, GenerationRequest, TaskHandle};
pub use session::{Applied, CONNECTION_LOST_LINE, ERROR_LINE_PREFIX, SessionState, StreamPhase};
pub use stream::{Incoming, StreamEvent, classify};
