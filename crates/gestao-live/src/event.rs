//! Everything that can mutate view state arrives as a [`LiveEvent`] on one
//! queue, so the store sees a single serialised stream of writes.

use tokio::sync::oneshot;

use crate::{state::ConnectionState, store::Completion};

#[derive(Debug)]
pub enum LiveEvent {
  /// The connection manager changed state.
  Connection(ConnectionState),
  /// A raw inbound text frame, not yet parsed.
  Frame(String),
  /// A finished REST call. `applied` receives `false` if the result was
  /// superseded by newer data and discarded.
  Completion {
    completion: Completion,
    applied:    oneshot::Sender<bool>,
  },
}
