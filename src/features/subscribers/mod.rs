//! Newsletter subscriptions.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
