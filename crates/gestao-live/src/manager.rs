//! Owns the single live socket and its reconnect policy.
//!
//! A background driver task opens the socket, forwards inbound frames as
//! [`LiveEvent::Frame`], and on an unexpected close retries at a fixed
//! interval until the attempt budget is spent. Every successful open resets
//! the budget. [`ConnectionManager::disconnect`] stops the driver and
//! guarantees no further retries fire.

use std::sync::{
  Arc, Mutex, MutexGuard, PoisonError,
  atomic::{AtomicU32, Ordering},
};

use gestao_core::message::ClientMessage;
use tokio::{
  sync::{mpsc, watch},
  task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
  config::LiveConfig,
  event::LiveEvent,
  state::ConnectionState,
  transport::{Socket, Transport},
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ─── Shared state ────────────────────────────────────────────────────────────

/// State visible to both the public handle and the driver task.
struct Shared<T> {
  transport: T,
  config:    LiveConfig,
  events:    mpsc::UnboundedSender<LiveEvent>,
  state:     watch::Sender<ConnectionState>,
  attempts:  AtomicU32,
  /// Present only while a socket is open.
  outbound:  Mutex<Option<mpsc::UnboundedSender<String>>>,
}

impl<T> Shared<T> {
  /// Publish a state change. Repeats of the current state are swallowed.
  fn set_state(&self, next: ConnectionState) {
    let changed = self.state.send_if_modified(|current| {
      if *current == next {
        false
      } else {
        *current = next;
        true
      }
    });
    if changed {
      debug!(state = %next, "connection state changed");
      let _ = self.events.send(LiveEvent::Connection(next));
    }
  }
}

enum SessionEnd {
  Cancelled,
  Lost,
}

struct Driver {
  cancel: CancellationToken,
  handle: JoinHandle<()>,
}

// ─── ConnectionManager ───────────────────────────────────────────────────────

pub struct ConnectionManager<T: Transport> {
  shared: Arc<Shared<T>>,
  driver: Mutex<Option<Driver>>,
  url:    Mutex<Option<String>>,
}

impl<T: Transport> ConnectionManager<T> {
  /// Lifecycle and frame events are delivered to `events`.
  pub fn new(
    transport: T,
    config: LiveConfig,
    events: mpsc::UnboundedSender<LiveEvent>,
  ) -> Self {
    let (state, _) = watch::channel(ConnectionState::Closed);
    Self {
      shared: Arc::new(Shared {
        transport,
        config,
        events,
        state,
        attempts: AtomicU32::new(0),
        outbound: Mutex::new(None),
      }),
      driver: Mutex::new(None),
      url:    Mutex::new(None),
    }
  }

  pub fn state(&self) -> ConnectionState { *self.shared.state.borrow() }

  pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
    self.shared.state.subscribe()
  }

  /// Consecutive failed opens since the last successful one.
  pub fn attempts(&self) -> u32 { self.shared.attempts.load(Ordering::SeqCst) }

  /// Start connecting to `url`. A no-op while a socket is open, being
  /// opened, or waiting out a retry delay.
  pub fn connect(&self, url: &str) {
    let mut driver = lock(&self.driver);
    if let Some(running) = driver.as_ref()
      && !running.handle.is_finished()
    {
      debug!(url, state = %self.state(), "connect ignored; connection already active");
      return;
    }

    *lock(&self.url) = Some(url.to_string());
    self.shared.attempts.store(0, Ordering::SeqCst);

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(drive(
      Arc::clone(&self.shared),
      url.to_string(),
      cancel.clone(),
    ));
    *driver = Some(Driver { cancel, handle });
  }

  /// Connect again to the last URL, typically after retries ran out.
  pub fn reconnect(&self) {
    let url = lock(&self.url).clone();
    match url {
      Some(url) => self.connect(&url),
      None => warn!("reconnect requested before any connect"),
    }
  }

  /// Queue `message` for the open socket. When there is none the message is
  /// dropped with a warning and `false` is returned.
  pub fn send(&self, message: &ClientMessage) -> bool {
    let state = self.state();
    if !state.is_open() {
      warn!(?message, %state, "not connected; dropping outbound message");
      return false;
    }
    let text = match message.to_json() {
      Ok(text) => text,
      Err(e) => {
        warn!(?message, error = %e, "could not encode outbound message");
        return false;
      }
    };
    match lock(&self.shared.outbound).as_ref() {
      Some(tx) if tx.send(text).is_ok() => true,
      _ => {
        warn!(?message, "socket went away; dropping outbound message");
        false
      }
    }
  }

  /// Close the socket and cancel any pending retry. Safe to call any
  /// number of times, connected or not.
  pub async fn disconnect(&self) {
    let driver = lock(&self.driver).take();
    if let Some(Driver { cancel, handle }) = driver {
      cancel.cancel();
      if let Err(e) = handle.await
        && e.is_panic()
      {
        error!(error = %e, "connection driver panicked");
      }
    }
    *lock(&self.shared.outbound) = None;
    self.shared.set_state(ConnectionState::Closed);
  }
}

impl<T: Transport> Drop for ConnectionManager<T> {
  fn drop(&mut self) {
    let driver = self
      .driver
      .get_mut()
      .unwrap_or_else(PoisonError::into_inner)
      .take();
    if let Some(driver) = driver {
      driver.cancel.cancel();
    }
  }
}

// ─── Driver ──────────────────────────────────────────────────────────────────

async fn drive<T: Transport>(
  shared: Arc<Shared<T>>,
  url: String,
  cancel: CancellationToken,
) {
  let max_attempts = shared.config.reconnect_attempts;
  let interval = shared.config.reconnect_interval();

  loop {
    shared.set_state(ConnectionState::Connecting);
    let opened = tokio::select! {
      _ = cancel.cancelled() => break,
      opened = shared.transport.open(&url) => opened,
    };

    match opened {
      Ok(socket) => {
        shared.attempts.store(0, Ordering::SeqCst);
        info!(url = %url, "live connection open");
        if let SessionEnd::Cancelled = run_socket(&shared, socket, &cancel).await
        {
          break;
        }
      }
      Err(e) => warn!(url = %url, error = %e, "live connection failed"),
    }

    shared.set_state(ConnectionState::Closed);

    let attempt = shared.attempts.load(Ordering::SeqCst);
    if attempt >= max_attempts {
      error!(
        url = %url,
        attempts = attempt,
        "giving up on live connection; reconnect manually to retry"
      );
      break;
    }
    let attempt = attempt + 1;
    shared.attempts.store(attempt, Ordering::SeqCst);
    info!(
      attempt,
      max_attempts,
      delay_ms = interval.as_millis() as u64,
      "scheduling reconnect"
    );

    tokio::select! {
      _ = cancel.cancelled() => break,
      _ = tokio::time::sleep(interval) => {}
    }
  }

  *lock(&shared.outbound) = None;
  shared.set_state(ConnectionState::Closed);
}

/// Pump one open socket until it closes or the driver is cancelled.
async fn run_socket<T: Transport>(
  shared: &Shared<T>,
  mut socket: T::Socket,
  cancel: &CancellationToken,
) -> SessionEnd {
  let (tx, mut rx) = mpsc::unbounded_channel::<String>();
  *lock(&shared.outbound) = Some(tx);
  shared.set_state(ConnectionState::Open);

  let end = loop {
    tokio::select! {
      _ = cancel.cancelled() => {
        if let Err(e) = socket.close().await {
          debug!(error = %e, "error closing socket");
        }
        break SessionEnd::Cancelled;
      }
      Some(text) = rx.recv() => {
        if let Err(e) = socket.send(text).await {
          warn!(error = %e, "send failed; dropping connection");
          break SessionEnd::Lost;
        }
      }
      frame = socket.recv() => match frame {
        Some(Ok(text)) => {
          let _ = shared.events.send(LiveEvent::Frame(text));
        }
        Some(Err(e)) => {
          warn!(error = %e, "live connection error");
          break SessionEnd::Lost;
        }
        None => {
          info!("live connection closed by server");
          break SessionEnd::Lost;
        }
      },
    }
  };

  *lock(&shared.outbound) = None;
  end
}
