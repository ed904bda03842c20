//! The session manager: busy-gated sends, unified failure handling, reset.

use crate::config::WidgetConfig;
use crate::session::{ChatMessage, Role, Session};
use crate::transport::{ChatRequest, ReplyTransport, UserInfo, WebhookTransport};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

/// Assistant reply appended when the exchange fails for any reason (network,
/// non-2xx status, malformed body — the user sees one outcome for all three).
pub const FALLBACK_REPLY: &str = "Sorry, I'm having trouble connecting right now. \
    Please try again in a moment, or reach out to us directly.";

/// Out-of-band notifications for the host UI (toasts).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetEvent {
    ConnectionError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// A request was issued and has settled (reply or fallback appended).
    Sent,
    /// Empty input or a request already in flight; nothing happened.
    Ignored,
}

/// Public handle to the widget's session. Cheap to clone; all clones share
/// the same session state.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Mutex<ManagerInner>>,
    transport: Arc<dyn ReplyTransport>,
    config: WidgetConfig,
    events: mpsc::UnboundedSender<WidgetEvent>,
}

struct ManagerInner {
    session: Session,
    busy: bool,
    // Bumped by clear_chat; a reply settling against a stale epoch is dropped.
    epoch: u64,
}

impl SessionManager {
    /// Builds a manager over any transport. Returns the manager plus the
    /// receiver for toast events.
    pub fn new(
        config: WidgetConfig,
        transport: Arc<dyn ReplyTransport>,
    ) -> (Self, mpsc::UnboundedReceiver<WidgetEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let manager = Self {
            inner: Arc::new(Mutex::new(ManagerInner {
                session: Session::new(),
                busy: false,
                epoch: 0,
            })),
            transport,
            config,
            events,
        };
        (manager, receiver)
    }

    /// Convenience constructor wiring the reqwest-backed webhook transport.
    pub fn connect(
        config: WidgetConfig,
    ) -> anyhow::Result<(Self, mpsc::UnboundedReceiver<WidgetEvent>)> {
        let transport = WebhookTransport::new(&config)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    /// Appends the trimmed user message, performs exactly one webhook
    /// exchange, and appends the assistant reply (or the fallback).
    ///
    /// No-ops when the trimmed text is empty or a request is in flight. The
    /// history sent to the endpoint includes the message being sent; the
    /// snapshot is taken after the append, so the payload is deterministic.
    #[instrument(skip(self, text))]
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        // Append + snapshot under one lock acquisition; the lock is never
        // held across the network await.
        let (request, epoch) = {
            let mut inner = self.inner.lock().unwrap();
            if inner.busy {
                return SendOutcome::Ignored;
            }
            inner.busy = true;
            inner.session.push(ChatMessage::new(Role::User, text));
            (self.build_request(&inner.session, text), inner.epoch)
        };

        debug!(session = %request.session_id, history = request.conversation_history.len(), "dispatching chat message");
        let result = self.transport.exchange(&request).await;

        let mut inner = self.inner.lock().unwrap();
        if inner.epoch != epoch {
            // The session was cleared mid-flight; clear_chat already reset
            // busy, and this reply belongs to a session that no longer exists.
            warn!(session = %request.session_id, "discarding reply for a cleared session");
            return SendOutcome::Sent;
        }
        inner.busy = false;

        match result {
            Ok(reply) => {
                debug!(session = %request.session_id, "assistant reply received");
                inner.session.push(ChatMessage::new(Role::Assistant, reply.text));
            }
            Err(error) => {
                warn!(session = %request.session_id, %error, "webhook exchange failed");
                inner
                    .session
                    .push(ChatMessage::new(Role::Assistant, FALLBACK_REPLY));
                // Receiver may be gone if the host dropped it; nothing to do.
                let _ = self.events.send(WidgetEvent::ConnectionError);
            }
        }
        SendOutcome::Sent
    }

    /// Replaces the session wholesale: fresh id, empty log. Never touches the
    /// network. Any in-flight reply is orphaned and will be discarded.
    pub fn clear_chat(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.session = Session::new();
        inner.epoch += 1;
        inner.busy = false;
    }

    pub fn session_id(&self) -> String {
        self.inner.lock().unwrap().session.id.clone()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.inner.lock().unwrap().session.messages.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.inner.lock().unwrap().busy
    }

    fn build_request(&self, session: &Session, text: &str) -> ChatRequest {
        ChatRequest {
            message: text.to_string(),
            session_id: session.id.clone(),
            user_info: UserInfo {
                page: self.config.page_path.clone(),
                timestamp: Utc::now(),
                url: self.config.page_url.clone(),
            },
            conversation_history: session.messages.iter().map(Into::into).collect(),
        }
    }
}
