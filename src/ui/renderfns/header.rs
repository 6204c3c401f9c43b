use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use url::Url;

use crate::ui::view::ShortcutInfo;

/// Draw the header bar with logo, API host, and shortcuts
pub fn draw_header(frame: &mut Frame, area: Rect, base_url: &Url, shortcuts: &[ShortcutInfo]) {
  let mut spans = vec![
    Span::styled(" feedline ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", display_host(base_url)),
      Style::default().fg(Color::White),
    ),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::raw(" "),
  ];

  // Keys highlighted, descriptions dimmed
  for shortcut in shortcuts {
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}   ", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}

/// Host and port of the API, or the whole URL if it has no host
fn display_host(url: &Url) -> String {
  match (url.host_str(), url.port()) {
    (Some(host), Some(port)) => format!("{}:{}", host, port),
    (Some(host), None) => host.to_string(),
    _ => url.to_string(),
  }
}
