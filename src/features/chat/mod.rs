//! Support chat between site visitors, the back-office and the assistant.
//!
//! Visitors poll for new messages by session id. When auto-reply is on and a
//! model is configured, each visitor message schedules an assistant reply in
//! the background.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
