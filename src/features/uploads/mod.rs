//! Image uploads for article bodies and featured images.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
