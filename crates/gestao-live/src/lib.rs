//! Live-update client for the employee-management API.
//!
//! A [`ConnectionManager`] keeps one WebSocket open and retries on failure.
//! Inbound frames go through the [`Reconciler`] into the [`Store`], which
//! the presentation layer reads through a [`StoreReader`]. REST mutations
//! made through [`Actions`] land in the same store, on the same queue.

pub mod config;
pub mod error;
pub mod event;
pub mod manager;
pub mod notice;
pub mod reconcile;
pub mod rest;
pub mod session;
pub mod state;
pub mod store;
pub mod transport;
pub mod views;

pub use config::LiveConfig;
pub use error::{Error, Result};
pub use manager::ConnectionManager;
pub use notice::{Notice, NoticeLevel};
pub use reconcile::{Applied, Reconciler};
pub use rest::ApiClient;
pub use session::{Actions, LiveSession};
pub use state::ConnectionState;
pub use store::{Store, StoreReader, ViewState};
pub use transport::{Socket, Transport, WsTransport};

#[cfg(test)]
mod tests;
