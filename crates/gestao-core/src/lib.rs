//! Core types and trait definitions for the gestao business-management
//! client.
//!
//! This crate is deliberately free of HTTP and WebSocket dependencies. It
//! mirrors the records the server owns, the push-message unions exchanged
//! over the live connection, and the REST contract the client consumes.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod api;
pub mod dashboard;
pub mod employee;
pub mod error;
pub mod message;
pub mod page;
pub mod site;

pub use error::{Error, Result};
