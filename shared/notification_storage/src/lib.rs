//! Notification storage services for the notification pipeline
//!
//! This crate provides the durable side of the pipeline: the DynamoDB-backed
//! notification store and the SQS queue the consumer reads inbound messages
//! from, shared between the service binary and external producers.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Per-user notification records in DynamoDB
pub mod notification;
/// Inbound message queue operations
pub mod queue;
