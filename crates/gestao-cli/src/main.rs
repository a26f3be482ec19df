//! `gestao`: live terminal view of the employee-management backend.
//!
//! # Usage
//!
//! ```
//! gestao --ws-url ws://localhost:8000/ws/employees/ --api-url http://localhost:8000/api/employees
//! gestao --config ~/.config/gestao/config.toml
//! gestao --plain    # log updates to stdout instead of drawing a TUI
//! ```

mod app;
mod prefs;
mod ui;

use std::{
  io,
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::{Context, Result};
use app::{App, Session};
use clap::Parser;
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use gestao_live::{ApiClient, LiveConfig, LiveSession, NoticeLevel, WsTransport};
use prefs::Prefs;
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, info, level_filters::LevelFilter, warn};
use tracing_appender::{
  non_blocking::WorkerGuard,
  rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "gestao.log";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "gestao", version, about = "Live view of the employee-management backend")]
struct Args {
  /// Path to a TOML config file. Defaults to `$XDG_CONFIG_HOME/gestao/config.toml`.
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// WebSocket endpoint for push updates.
  #[arg(long, env = "GESTAO_WS_URL")]
  ws_url: Option<String>,

  /// Base URL of the REST API.
  #[arg(long, env = "GESTAO_API_URL")]
  api_url: Option<String>,

  /// Where to write logs while the TUI owns the terminal.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,

  /// Print updates as log lines instead of drawing the TUI.
  #[arg(long)]
  plain: bool,
}

// ─── Config ───────────────────────────────────────────────────────────────────

/// File, then `GESTAO_*` environment, then command-line flags.
fn load_config(args: &Args) -> Result<LiveConfig> {
  let file = match &args.config {
    Some(path) => config::File::from(path.clone()).required(true),
    None => match prefs::config_dir() {
      Some(dir) => config::File::from(dir.join("config.toml")).required(false),
      None => config::File::from(PathBuf::from("gestao.toml")).required(false),
    },
  };

  let settings = config::Config::builder()
    .add_source(file)
    .add_source(config::Environment::with_prefix("GESTAO"))
    .build()
    .context("failed to read config file")?;

  let mut cfg: LiveConfig = settings
    .try_deserialize()
    .context("failed to deserialize config")?;

  if let Some(url) = &args.ws_url {
    cfg = cfg.with_ws_url(url);
  }
  if let Some(url) = &args.api_url {
    cfg = cfg.with_api_url(url);
  }
  Ok(cfg)
}

// ─── Logging ──────────────────────────────────────────────────────────────────

/// Returns the file writer's guard in TUI mode; dropping it flushes and
/// stops the background writer.
fn init_tracing(args: &Args) -> Result<Option<WorkerGuard>> {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();

  if args.plain {
    tracing_subscriber::fmt().with_env_filter(filter).init();
    return Ok(None);
  }

  // The TUI owns stdout, so logs go to a file.
  let path = match &args.log_file {
    Some(path) => path.clone(),
    None => prefs::state_dir()
      .unwrap_or_else(std::env::temp_dir)
      .join(LOG_FILE),
  };
  let dir = path
    .parent()
    .filter(|p| !p.as_os_str().is_empty())
    .map(Path::to_path_buf)
    .unwrap_or_else(|| PathBuf::from("."));
  let name = path
    .file_name()
    .and_then(|n| n.to_str())
    .unwrap_or(LOG_FILE);

  let appender = RollingFileAppender::builder()
    .rotation(Rotation::NEVER)
    .filename_prefix(name)
    .build(&dir)
    .with_context(|| format!("opening log file {}", path.display()))?;
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .init();
  Ok(Some(guard))
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let _log_guard = init_tracing(&args)?;

  let cfg = load_config(&args)?;
  info!(ws_url = %cfg.ws_url, api_url = %cfg.api_url, "starting live session");

  let api = ApiClient::new(&cfg).context("building REST client")?;
  let transport = WsTransport::new(cfg.connect_timeout());
  let session = LiveSession::start(cfg, transport, api);

  if args.plain {
    return run_plain(session).await;
  }

  let prefs_path = Prefs::default_path();
  let prefs = prefs_path.as_deref().map(Prefs::load).unwrap_or_default();
  let mut app = App::new(session, prefs, prefs_path);
  app.refresh();

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  app.shutdown().await;
  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    app.sync();
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key)
    {
      break;
    }
  }

  Ok(())
}

// ─── Plain mode ───────────────────────────────────────────────────────────────

async fn run_plain(session: Session) -> Result<()> {
  let mut reader = session.store();
  let mut state = session.connection_state();
  let mut notices = session.subscribe();

  if let Err(e) = session.actions().refresh_all().await {
    warn!(error = %e, "initial load failed");
  }

  loop {
    tokio::select! {
      _ = tokio::signal::ctrl_c() => break,
      Ok(()) = state.changed() => {
        let current = *state.borrow_and_update();
        info!(state = %current, attempts = session.connection().attempts(), "connection");
      }
      Ok(()) = reader.changed() => {
        reader.with(|v| info!(
          employees = v.employees.len(),
          departments = v.departments.len(),
          constructions = v.constructions.len(),
          sectors = v.sectors.len(),
          dashboard = v.dashboard.is_some(),
          "view updated"
        ));
      }
      Ok(notice) = notices.recv() => match notice.level {
        NoticeLevel::Error => error!(%notice, "notice"),
        _ => info!(level = %notice.level, %notice, "notice"),
      },
      else => break,
    }
  }

  session.shutdown().await;
  Ok(())
}
