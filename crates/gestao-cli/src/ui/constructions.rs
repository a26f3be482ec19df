//! Construction list with the sectors of the selected work.

use gestao_core::site::Construction;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::dim;
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
    .split(area);

  draw_list(f, cols[0], app);
  draw_detail(f, cols[1], app);
}

fn draw_list(f: &mut Frame, area: Rect, app: &App) {
  let listed = app.listed_constructions();
  let active = listed.iter().filter(|c| c.is_active).count();

  let items: Vec<ListItem> = listed
    .iter()
    .map(|c| {
      let (mark, style) = if c.is_active {
        ("●", Style::default().fg(Color::Green))
      } else {
        ("○", dim())
      };
      ListItem::new(Line::from(vec![
        Span::styled(format!("{mark} "), style),
        Span::raw(c.name.clone()),
      ]))
    })
    .collect();

  let block = Block::default()
    .title(format!(" Works ({active} active / {}) ", listed.len()))
    .borders(Borders::ALL)
    .border_style(dim());

  let mut state = ListState::default();
  state.select((!listed.is_empty()).then_some(app.cursor));
  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    area,
    &mut state,
  );
}

fn draw_detail(f: &mut Frame, area: Rect, app: &App) {
  let Some(c) = app.selected_construction() else {
    let block = Block::default()
      .title(" Detail ")
      .borders(Borders::ALL)
      .border_style(dim());
    f.render_widget(Paragraph::new("No works.").style(dim()).block(block), area);
    return;
  };

  let mut lines = summary(c);
  lines.push(Line::from(""));

  let sectors: Vec<_> = app.view.sectors_of(c.id).collect();
  if sectors.is_empty() {
    lines.push(Line::from(Span::styled("Press Enter to load sectors.", dim())));
  } else {
    lines.push(Line::from(Span::styled(
      "Sectors",
      Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.extend(sectors.iter().map(|s| Line::from(format!("  {}", s.name))));
  }

  let block = Block::default()
    .title(format!(" {} ", c.name))
    .borders(Borders::ALL)
    .border_style(dim());
  f.render_widget(Paragraph::new(lines).block(block), area);
}

fn summary(c: &Construction) -> Vec<Line<'static>> {
  let date = |d: Option<chrono::NaiveDate>| {
    d.map(|d| d.format("%d/%m/%Y").to_string())
      .unwrap_or_else(|| "—".into())
  };
  let field = |label: &str, value: String| {
    Line::from(vec![Span::styled(format!("{label:<10}"), dim()), Span::raw(value)])
  };

  vec![
    field("Address", c.address.clone().unwrap_or_else(|| "—".into())),
    field("Start", date(c.start_date)),
    field("End", date(c.end_date)),
    field("Status", if c.is_active { "active" } else { "inactive" }.into()),
  ]
}
