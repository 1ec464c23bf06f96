mod admin_chat_handler;
mod chat_handler;

pub use admin_chat_handler::*;
pub use chat_handler::*;
