pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let [header, content, footer] = Layout::vertical([
    Constraint::Length(1), // Header
    Constraint::Min(1),    // Main content
    Constraint::Length(1), // Breadcrumb
  ])
  .areas(frame.area());

  let shortcuts = app
    .current_view()
    .map(|view| view.shortcuts())
    .unwrap_or_default();
  renderfns::draw_header(frame, header, app.base_url(), &shortcuts);

  if let Some(view) = app.current_view_mut() {
    view.render(frame, content);
  }

  renderfns::draw_footer(frame, footer, &app.view_breadcrumb(), app.status());
}
