mod assistant;
mod chat_service;
mod context;

pub use chat_service::ChatService;
