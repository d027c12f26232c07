//! Project chat shared by the admin and client routes. Callers check access to
//! the project before reaching these helpers.

use std::convert::Infallible;
use std::sync::Arc;

use axum::response::sse::{Event, KeepAlive, Sse};
use chrono::Utc;
use tokio_stream::{Stream, StreamExt};
use uuid::Uuid;

use crate::server::AppState;
use crate::server::response::{ApiError, StoreResultExt};
use crate::types::Message;

pub const MESSAGE_EVENT: &str = "message";

pub fn list(state: &AppState, project_id: &str) -> Result<Vec<Message>, ApiError> {
    state
        .store
        .list_project_messages(project_id)
        .api_err("Failed to list messages")
}

/// Inserts one message and publishes it to live subscribers.
pub fn send(
    state: &AppState,
    project_id: &str,
    sender_id: &str,
    content: &str,
) -> Result<Message, ApiError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ApiError::bad_request("Message content is required"));
    }

    let message = Message {
        id: Uuid::new_v4().to_string(),
        project_id: project_id.to_string(),
        sender_id: sender_id.to_string(),
        content: content.to_string(),
        is_read: false,
        created_at: Utc::now(),
    };

    state
        .store
        .create_message(&message)
        .api_err("Failed to send message")?;

    let delivered = state.hub.publish(message.clone());
    tracing::debug!(project_id, message_id = %message.id, delivered, "Message published");

    Ok(message)
}

/// Server-sent events for new messages in one project. The SSE id is the
/// message id so clients can drop rows they already fetched.
pub fn stream(
    state: &Arc<AppState>,
    project_id: &str,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + use<>> {
    let events = state
        .hub
        .subscribe(project_id)
        .into_stream()
        .filter_map(|message| {
            match Event::default()
                .event(MESSAGE_EVENT)
                .id(message.id.clone())
                .json_data(message.as_ref())
            {
                Ok(event) => Some(Ok(event)),
                Err(e) => {
                    tracing::warn!(
                        message_id = %message.id,
                        error = %e,
                        "Failed to encode message event"
                    );
                    None
                }
            }
        });

    Sse::new(events).keep_alive(KeepAlive::default())
}
