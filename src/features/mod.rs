pub mod admin;
pub mod articles;
pub mod auth;
pub mod categories;
pub mod chat;
pub mod comments;
pub mod contact;
pub mod settings;
pub mod subscribers;
pub mod uploads;
