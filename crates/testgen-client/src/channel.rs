use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Message pushed by an event source into an [`EventChannel`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelMessage {
    /// Raw `data` payload of one event, unparsed.
    Payload(String),
    /// The underlying transport failed or ended. Nothing follows.
    Failed(String),
}

/// Single-consumer channel of raw event payloads for one task.
///
/// An external source (usually a reader task spawned by the HTTP backend)
/// pushes messages; the consumer pulls them with [`EventChannel::recv`].
/// [`EventChannel::close`] releases the channel: the receiver is closed and the
/// reader task, if any, is aborted. Dropping the channel does the same.
pub struct EventChannel {
    rx: mpsc::Receiver<ChannelMessage>,
    reader: Option<JoinHandle<()>>,
    closed: bool,
}

impl EventChannel {
    /// Wraps a receiver fed by some other party.
    pub fn new(rx: mpsc::Receiver<ChannelMessage>) -> Self {
        Self {
            rx,
            reader: None,
            closed: false,
        }
    }

    /// Wraps a receiver fed by `reader`; the task is aborted on close.
    pub fn with_reader(rx: mpsc::Receiver<ChannelMessage>, reader: JoinHandle<()>) -> Self {
        Self {
            rx,
            reader: Some(reader),
            closed: false,
        }
    }

    /// Waits for the next message.
    ///
    /// Returns `None` once the channel is closed or every sender is gone.
    pub async fn recv(&mut self) -> Option<ChannelMessage> {
        if self.closed {
            return None;
        }
        self.rx.recv().await
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Releases the channel. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.rx.close();
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

impl Drop for EventChannel {
    fn drop(&mut self) {
        self.close();
    }
}
