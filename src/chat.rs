//! Doctor-patient messaging: persisted history plus live delivery.
//!
//! Messages are stored first, then pushed through `ChatHub` to the
//! recipient's live session if one exists. Live delivery is at most once:
//! a full or closed channel drops the push, the stored copy remains.
//!
//! The HTTP API only publishes. `ChatHub::subscribe` is the seam for a live
//! transport such as a WebSocket adapter, which would hold the receiver for
//! each connected user and forward what arrives.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::core_state::{require_user, CoreError};
use crate::db::sqlite::timestamp_now;
use crate::db::CareStore;
use crate::models::{ChatMessage, User};

/// Messages returned by a conversation query.
pub const CONVERSATION_LIMIT: usize = 50;

/// Per-session buffer before live pushes are dropped.
const SESSION_BUFFER: usize = 64;

// ═══════════════════════════════════════════
// ChatHub
// ═══════════════════════════════════════════

/// Live sessions keyed by recipient.
#[derive(Clone, Default)]
pub struct ChatHub {
    sessions: Arc<Mutex<HashMap<Uuid, mpsc::Sender<ChatMessage>>>>,
}

impl ChatHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a live session for `user_id`, replacing any previous one.
    pub fn subscribe(&self, user_id: Uuid) -> mpsc::Receiver<ChatMessage> {
        let (tx, rx) = mpsc::channel(SESSION_BUFFER);
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.insert(user_id, tx);
        }
        rx
    }

    pub fn unsubscribe(&self, user_id: &Uuid) {
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.remove(user_id);
        }
    }

    pub fn is_online(&self, user_id: &Uuid) -> bool {
        self.sessions
            .lock()
            .map(|s| s.get(user_id).is_some_and(|tx| !tx.is_closed()))
            .unwrap_or(false)
    }

    /// Push to the recipient's live session. Returns whether it was handed over.
    pub fn publish(&self, message: &ChatMessage) -> bool {
        let Ok(mut sessions) = self.sessions.lock() else {
            return false;
        };
        let Some(tx) = sessions.get(&message.recipient_id) else {
            return false;
        };
        match tx.try_send(message.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(recipient = %message.recipient_id, "Live chat buffer full, push dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                sessions.remove(&message.recipient_id);
                false
            }
        }
    }
}

// ═══════════════════════════════════════════
// Operations
// ═══════════════════════════════════════════

/// Store a message between two connected users and push it live.
pub fn send_message(
    store: &dyn CareStore,
    hub: &ChatHub,
    sender: &User,
    recipient_id: &Uuid,
    content: &str,
) -> Result<ChatMessage, CoreError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(CoreError::BadRequest("message content is required".into()));
    }
    let recipient = require_user(store, recipient_id)?;
    if !store.are_connected(&sender.id, &recipient.id)? {
        return Err(CoreError::Forbidden(
            "you can only message users you are connected with".into(),
        ));
    }

    let message = ChatMessage {
        id: Uuid::new_v4(),
        sender_id: sender.id,
        recipient_id: recipient.id,
        content: content.to_string(),
        sent_at: timestamp_now(),
    };
    store.insert_chat_message(&message)?;
    store.set_active_chat(&sender.id, true)?;
    store.set_active_chat(&recipient.id, true)?;

    let delivered = hub.publish(&message);
    tracing::debug!(message_id = %message.id, delivered, "Chat message stored");
    Ok(message)
}

/// Recent messages between `viewer` and `other_id`, oldest first.
pub fn conversation(
    store: &dyn CareStore,
    viewer: &User,
    other_id: &Uuid,
) -> Result<Vec<ChatMessage>, CoreError> {
    if !store.are_connected(&viewer.id, other_id)? {
        return Err(CoreError::Forbidden(
            "you can only read conversations with connected users".into(),
        ));
    }
    Ok(store.conversation(&viewer.id, other_id, CONVERSATION_LIMIT)?)
}
