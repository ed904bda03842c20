//! Session state: the message log and the manager that mutates it.

pub mod manager;
pub mod message;

#[cfg(test)]
mod tests;

pub use manager::{SendOutcome, SessionManager, WidgetEvent, FALLBACK_REPLY};
pub use message::{ChatMessage, Role, Session};
