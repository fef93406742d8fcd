#![deny(clippy::all, clippy::pedantic, clippy::nursery, dead_code)]

pub mod diagnostics;
pub mod jwt;
pub mod middleware;
pub mod notification_consumer;
pub mod notification_processor;
pub mod registry;
pub mod routes;
pub mod server;
pub mod types;
