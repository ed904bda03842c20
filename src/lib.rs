//! # Embedchat
//!
//! Core of an embeddable website chat widget. The host page owns the
//! presentation; this crate owns the two pieces with actual behavior:
//! - `session`: the in-memory conversation log plus the send/clear operations
//!   that exchange messages with a remote webhook
//! - `format`: the pure transformation of reply text into renderable
//!   text/hyperlink segments
//!
//! ```text
//! UI input → SessionManager (append, POST webhook, append reply) → format → host renders
//! ```

pub mod config;
pub mod format;
pub mod session;
pub mod transport;

pub use config::WidgetConfig;
pub use format::{format_message, render_html, Line, Segment};
pub use session::{ChatMessage, Role, SendOutcome, Session, SessionManager, WidgetEvent};
pub use transport::{ChatReply, ChatRequest, ReplyTransport, TransportError, WebhookTransport};
