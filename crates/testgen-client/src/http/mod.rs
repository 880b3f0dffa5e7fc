//! HTTP implementation of the generation backend.
//!
//! Launch requests are plain JSON POSTs; the task stream is read as
//! `text/event-stream` by a reader task feeding an [`crate::EventChannel`].
mod client;
pub(crate) mod transport;

pub use client::HttpBackend;
