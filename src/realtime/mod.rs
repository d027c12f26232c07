//! Push channel for new messages. Every inserted message is published once;
//! subscribers filter by project.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::{Stream, StreamExt};

use crate::types::Message;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct MessageHub {
    tx: broadcast::Sender<Arc<Message>>,
}

impl MessageHub {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Returns how many subscribers received the message. Zero is not an error.
    pub fn publish(&self, message: Message) -> usize {
        self.tx.send(Arc::new(message)).unwrap_or(0)
    }

    pub fn subscribe(&self, project_id: &str) -> ProjectSubscription {
        ProjectSubscription {
            project_id: project_id.to_string(),
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for MessageHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Receives inserts for a single project. Dropping it unsubscribes.
pub struct ProjectSubscription {
    project_id: String,
    rx: broadcast::Receiver<Arc<Message>>,
}

impl ProjectSubscription {
    /// Stream of this project's messages. Lagged receivers skip what they missed.
    /// Ends when the hub is dropped.
    pub fn into_stream(self) -> impl Stream<Item = Arc<Message>> + Send + 'static {
        let project_id = self.project_id;
        BroadcastStream::new(self.rx).filter_map(move |item| match item {
            Ok(msg) if msg.project_id == project_id => Some(msg),
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(project_id = %project_id, skipped, "message subscriber lagged");
                None
            }
        })
    }
}
