//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients and adapters for object storage, outgoing mail and the
//! chat-completion provider.

pub mod llm;
pub mod mailer;
pub mod storage;
