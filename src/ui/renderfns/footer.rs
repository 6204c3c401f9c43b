use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the footer bar with the view breadcrumb and a right-aligned status
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String], status: Option<&str>) {
  let mut spans = vec![Span::raw(" ")];

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }

    let style = if i == breadcrumb.len() - 1 {
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };

    spans.push(Span::styled(part.clone(), style));
  }

  let status = status.map(|s| format!("{} ", s)).unwrap_or_default();
  let [left, right] = Layout::horizontal([
    Constraint::Min(0),
    Constraint::Length(status.chars().count() as u16),
  ])
  .areas(area);

  let breadcrumb = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(breadcrumb, left);

  let status = Paragraph::new(status).style(Style::default().fg(Color::Yellow).bg(Color::Black));
  frame.render_widget(status, right);
}
