//! Employee table with per-kind payment badges.

use gestao_core::employee::{Employee, PaymentType};
use gestao_live::views;
use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use super::{dim, money, status_style};
use crate::app::App;

const PAYMENT_KINDS: [(PaymentType, &str); 3] = [
  (PaymentType::Salary, "SAL"),
  (PaymentType::MealAllowance, "VA"),
  (PaymentType::TransportAllowance, "VT"),
];

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let visible = app.visible_employees();
  let total = app.view.employees.len();

  let mut title = if visible.len() == total {
    format!(" Employees ({total}) ")
  } else {
    format!(" Employees ({}/{total}) ", visible.len())
  };
  if let Some(d) = &app.department_filter {
    title.push_str(&format!("· dept {d} "));
  }
  if let Some(c) = &app.construction_filter {
    title.push_str(&format!("· work {c} "));
  }

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(dim());
  let mut inner = block.inner(area);
  f.render_widget(block, area);

  // Filter bar along the bottom edge.
  if (app.filter_active || !app.filter.is_empty()) && inner.height > 2 {
    let bar = Rect { y: inner.y + inner.height - 1, height: 1, ..inner };
    inner.height -= 1;
    let text = if app.filter_active {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(text).style(Style::default().fg(Color::Yellow)),
      bar,
    );
  }

  if visible.is_empty() {
    f.render_widget(Paragraph::new("No employees.").style(dim()), inner);
    return;
  }

  let rows: Vec<Row> = visible.iter().map(|e| row(e)).collect();
  let table = Table::new(rows, [
    Constraint::Min(20),
    Constraint::Length(18),
    Constraint::Length(18),
    Constraint::Length(14),
    Constraint::Length(20),
  ])
  .header(
    Row::new(vec!["Name", "Position", "Work", "Total", "Payments"])
      .style(Style::default().add_modifier(Modifier::BOLD)),
  )
  .row_highlight_style(
    Style::default()
      .bg(Color::Blue)
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );

  let mut state = TableState::default();
  state.select(Some(app.cursor));
  f.render_stateful_widget(table, inner, &mut state);
}

fn row(e: &Employee) -> Row<'static> {
  let mut badges = Vec::with_capacity(PAYMENT_KINDS.len() * 2);
  for (kind, tag) in PAYMENT_KINDS {
    badges.push(Span::styled(tag, status_style(e.status(kind))));
    badges.push(Span::raw(" "));
  }

  let name_style = if views::has_pendencies(e) {
    Style::default()
  } else {
    dim()
  };

  Row::new(vec![
    Cell::from(Span::styled(e.name.clone(), name_style)),
    Cell::from(e.position.clone()),
    Cell::from(e.construction_name.clone().unwrap_or_default()),
    Cell::from(money(views::total_compensation(e))),
    Cell::from(Line::from(badges)),
  ])
}
