//! TUI rendering: header, sidebar, active screen and status bar.

pub mod constructions;
pub mod dashboard;
pub mod employees;

use chrono::Local;
use gestao_core::employee::PaymentStatus;
use gestao_live::{ConnectionState, NoticeLevel};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, Paragraph},
};
use rust_decimal::Decimal;

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);

  let body = if app.prefs.sidebar_collapsed {
    rows[1]
  } else {
    let cols = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Length(20), Constraint::Min(0)])
      .split(rows[1]);
    draw_sidebar(f, cols[0], app);
    cols[1]
  };

  match app.screen {
    Screen::Dashboard => dashboard::draw(f, body, app),
    Screen::Employees => employees::draw(f, body, app),
    Screen::Constructions => constructions::draw(f, body, app),
  }

  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    format!(" gestao · {}", app.screen.title()),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let dot = Span::styled(
    format!("● {} ", app.connection),
    Style::default().fg(connection_color(app.connection)),
  );
  let right = Span::styled(format!(" {date} "), Style::default().fg(Color::Gray));

  let used = left.width() + dot.width() + right.width();
  let pad = (area.width as usize).saturating_sub(used);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad)), dot, right]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::DarkGray)),
    area,
  );
}

fn connection_color(state: ConnectionState) -> Color {
  match state {
    ConnectionState::Open => Color::Green,
    ConnectionState::Connecting => Color::Yellow,
    ConnectionState::Closed => Color::Red,
  }
}

// ─── Sidebar ──────────────────────────────────────────────────────────────────

fn draw_sidebar(f: &mut Frame, area: Rect, app: &App) {
  let items: Vec<ListItem> = Screen::ALL
    .iter()
    .enumerate()
    .map(|(i, screen)| {
      let style = if *screen == app.screen {
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD)
      } else {
        Style::default()
      };
      ListItem::new(Line::from(Span::styled(
        format!(" {} {}", i + 1, screen.title()),
        style,
      )))
    })
    .collect();

  let block = Block::default()
    .borders(Borders::RIGHT)
    .border_style(Style::default().fg(Color::DarkGray));
  f.render_widget(List::new(items).block(block), area);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match app.screen {
    Screen::Employees if app.filter_active => {
      ("SEARCH", "Type to filter  Esc cancel  Enter keep")
    }
    Screen::Dashboard => ("VIEW", "1-3 screens  r refresh  R reconnect  b sidebar  q quit"),
    Screen::Employees => (
      "VIEW",
      "/ search  f dept  o work  s/m/t pay  d delete  r refresh  q quit",
    ),
    Screen::Constructions => ("VIEW", "Enter sectors  d delete  r refresh  q quit"),
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );

  let message = if !app.status_msg.is_empty() {
    Span::styled(format!("  {}", app.status_msg), Style::default().fg(Color::Gray))
  } else if let Some(notice) = &app.notice {
    let color = match notice.level {
      NoticeLevel::Success => Color::Green,
      NoticeLevel::Info => Color::Cyan,
      NoticeLevel::Error => Color::Red,
    };
    Span::styled(format!("  {notice}"), Style::default().fg(color))
  } else {
    Span::styled(format!("  {hints}"), Style::default().fg(Color::DarkGray))
  };

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, message]))
      .style(Style::default().bg(Color::Black)),
    area,
  );
}

// ─── Shared helpers ───────────────────────────────────────────────────────────

/// Brazilian real, two decimal places.
pub fn money(value: Decimal) -> String { format!("R$ {:.2}", value) }

pub fn status_style(status: PaymentStatus) -> Style {
  match status {
    PaymentStatus::Paid => Style::default().fg(Color::Green),
    PaymentStatus::Partial => Style::default().fg(Color::Yellow),
    PaymentStatus::Pending => Style::default().fg(Color::Red),
  }
}

pub fn dim() -> Style { Style::default().fg(Color::DarkGray) }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn money_rounds_to_cents() {
    assert_eq!(money(Decimal::new(123_456, 2)), "R$ 1234.56");
    assert_eq!(money(Decimal::from(5)), "R$ 5.00");
  }
}
