//! Contact form relayed to the site owner by email.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;
