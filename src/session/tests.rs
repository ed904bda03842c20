//! Session manager behavior: busy gating, fallback path, clear-during-flight.

use crate::config::WidgetConfig;
use crate::session::{Role, SendOutcome, SessionManager, WidgetEvent, FALLBACK_REPLY};
use crate::transport::{ChatReply, ChatRequest, ReplyTransport, TransportError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Answers immediately with a canned result, counting calls.
struct CannedTransport {
    reply: Result<&'static str, u16>,
    calls: AtomicUsize,
}

impl CannedTransport {
    fn ok(text: &'static str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err(502),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReplyTransport for CannedTransport {
    async fn exchange(&self, _request: &ChatRequest) -> Result<ChatReply, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            Ok(text) => Ok(ChatReply { text: text.to_string() }),
            Err(status) => Err(TransportError::Status(status)),
        }
    }
}

/// Blocks the exchange until the test releases the gate.
struct GatedTransport {
    gate: Notify,
    calls: AtomicUsize,
}

impl GatedTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ReplyTransport for GatedTransport {
    async fn exchange(&self, _request: &ChatRequest) -> Result<ChatReply, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(ChatReply {
            text: "late reply".to_string(),
        })
    }
}

fn manager_with(
    transport: Arc<dyn ReplyTransport>,
) -> (
    SessionManager,
    tokio::sync::mpsc::UnboundedReceiver<WidgetEvent>,
) {
    SessionManager::new(WidgetConfig::default(), transport)
}

#[tokio::test]
async fn successful_send_appends_user_then_assistant() {
    let transport = CannedTransport::ok("Hello");
    let (manager, _events) = manager_with(transport.clone());

    let outcome = manager.send_message("  hi there  ").await;

    assert_eq!(outcome, SendOutcome::Sent);
    assert_eq!(transport.calls(), 1);
    assert!(!manager.is_busy());
    let messages = manager.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "hi there");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, "Hello");
}

#[tokio::test]
async fn empty_and_whitespace_input_is_ignored() {
    let transport = CannedTransport::ok("unused");
    let (manager, _events) = manager_with(transport.clone());

    assert_eq!(manager.send_message("").await, SendOutcome::Ignored);
    assert_eq!(manager.send_message("   \n\t ").await, SendOutcome::Ignored);
    assert_eq!(transport.calls(), 0);
    assert!(manager.messages().is_empty());
}

#[tokio::test]
async fn failure_appends_fallback_and_fires_toast() {
    let transport = CannedTransport::failing();
    let (manager, mut events) = manager_with(transport.clone());

    manager.send_message("anyone there?").await;

    assert!(!manager.is_busy());
    let messages = manager.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, FALLBACK_REPLY);
    assert_eq!(events.try_recv().unwrap(), WidgetEvent::ConnectionError);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn second_send_while_busy_is_ignored() {
    let transport = GatedTransport::new();
    let (manager, _events) = manager_with(transport.clone());

    let background = manager.clone();
    let first = tokio::spawn(async move { background.send_message("first").await });

    // Let the first send reach its suspension point.
    while !manager.is_busy() {
        tokio::task::yield_now().await;
    }
    // User message is already appended while the exchange is pending.
    assert_eq!(manager.messages().len(), 1);

    assert_eq!(manager.send_message("second").await, SendOutcome::Ignored);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    assert_eq!(manager.messages().len(), 1);

    transport.gate.notify_one();
    assert_eq!(first.await.unwrap(), SendOutcome::Sent);
    assert_eq!(manager.messages().len(), 2);
    assert!(!manager.is_busy());
}

#[tokio::test]
async fn clear_chat_resets_log_and_rotates_id() {
    let transport = CannedTransport::ok("Hello");
    let (manager, _events) = manager_with(transport);
    manager.send_message("hi").await;

    let old_id = manager.session_id();
    manager.clear_chat();

    assert!(manager.messages().is_empty());
    assert_ne!(manager.session_id(), old_id);
}

#[tokio::test]
async fn reply_arriving_after_clear_is_discarded() {
    let transport = GatedTransport::new();
    let (manager, _events) = manager_with(transport.clone());

    let background = manager.clone();
    let inflight = tokio::spawn(async move { background.send_message("hello").await });
    while !manager.is_busy() {
        tokio::task::yield_now().await;
    }

    manager.clear_chat();
    assert!(!manager.is_busy());

    transport.gate.notify_one();
    assert_eq!(inflight.await.unwrap(), SendOutcome::Sent);

    // The late reply never leaks into the fresh session.
    assert!(manager.messages().is_empty());
    assert!(!manager.is_busy());
}

#[tokio::test]
async fn clear_chat_issues_no_network_calls() {
    let transport = CannedTransport::ok("unused");
    let (manager, _events) = manager_with(transport.clone());

    manager.clear_chat();
    assert_eq!(transport.calls(), 0);
}
