//! Dashboard screen: totals, executive metrics and per-work progress.

use gestao_live::views::{self, ExecutiveMetrics, WorkLevel};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};
use rust_decimal::Decimal;

use super::{dim, money};
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(dashboard) = &app.view.dashboard else {
    let block = Block::default()
      .title(" Dashboard ")
      .borders(Borders::ALL)
      .border_style(dim());
    f.render_widget(
      Paragraph::new("Waiting for dashboard data…").style(dim()).block(block),
      area,
    );
    return;
  };

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(9), Constraint::Min(0)])
    .split(area);
  let top = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
    .split(rows[0]);

  // ── Totals ──

  let label = |s: &str| Span::styled(format!("{s:<22}"), dim());
  let salary = views::salary_status_breakdown(dashboard);
  let mut totals = vec![
    Line::from(vec![
      label("Employees"),
      Span::raw(dashboard.total_employees.to_string()),
    ]),
    Line::from(vec![
      label("Works"),
      Span::raw(dashboard.total_constructions.to_string()),
    ]),
    Line::from(vec![
      label("Departments"),
      Span::raw(dashboard.total_departments.to_string()),
    ]),
    Line::from(""),
  ];
  for slice in &salary {
    totals.push(Line::from(vec![
      label(&format!("Salary {}", slice.status)),
      Span::styled(slice.count.to_string(), super::status_style(slice.status)),
    ]));
  }
  f.render_widget(
    Paragraph::new(totals).block(
      Block::default()
        .title(" Summary ")
        .borders(Borders::ALL)
        .border_style(dim()),
    ),
    top[0],
  );

  // ── Executive metrics ──

  let metrics = ExecutiveMetrics::from_dashboard(dashboard);
  let burn_color = if metrics.burn_rate >= Decimal::from(90) {
    Color::Green
  } else if metrics.burn_rate >= Decimal::from(50) {
    Color::Yellow
  } else {
    Color::Red
  };
  let exec = vec![
    Line::from(vec![label("Budget"), Span::raw(money(metrics.total_budget))]),
    Line::from(vec![label("Executed"), Span::raw(money(metrics.total_executed))]),
    Line::from(vec![label("Remaining"), Span::raw(money(metrics.total_remaining))]),
    Line::from(vec![
      label("Burn rate"),
      Span::styled(
        format!("{:.1}%", metrics.burn_rate),
        Style::default().fg(burn_color),
      ),
    ]),
    Line::from(vec![
      label("Critical works"),
      Span::raw(metrics.critical_works.to_string()),
    ]),
    Line::from(vec![
      label("With pendencies"),
      Span::raw(metrics.employees_with_pendencies.to_string()),
    ]),
  ];
  f.render_widget(
    Paragraph::new(exec).block(
      Block::default()
        .title(" Executive ")
        .borders(Borders::ALL)
        .border_style(dim()),
    ),
    top[1],
  );

  // ── Works ──

  let works = views::works_status(dashboard);
  let table_rows: Vec<Row> = works
    .iter()
    .map(|w| {
      Row::new(vec![
        Cell::from(w.construction_name.clone()),
        Cell::from(money(w.total_to_pay)),
        Cell::from(money(w.total_paid)),
        Cell::from(money(w.remaining)),
        Cell::from(Span::styled(
          format!("{:>5.1}% {}", w.percentage, w.level),
          Style::default().fg(level_color(w.level)),
        )),
      ])
    })
    .collect();

  let table = Table::new(table_rows, [
    Constraint::Min(20),
    Constraint::Length(16),
    Constraint::Length(16),
    Constraint::Length(16),
    Constraint::Length(18),
  ])
  .header(
    Row::new(vec!["Work", "To pay", "Paid", "Remaining", "Progress"])
      .style(Style::default().add_modifier(Modifier::BOLD)),
  )
  .row_highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
  .block(
    Block::default()
      .title(format!(" Works ({}) ", works.len()))
      .borders(Borders::ALL)
      .border_style(dim()),
  );

  let mut state = TableState::default();
  state.select((!works.is_empty()).then_some(app.cursor));
  f.render_stateful_widget(table, rows[1], &mut state);
}

fn level_color(level: WorkLevel) -> Color {
  match level {
    WorkLevel::Excellent => Color::Green,
    WorkLevel::Good => Color::Cyan,
    WorkLevel::Warning => Color::Yellow,
    WorkLevel::Critical => Color::Red,
  }
}
