use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use std::sync::Arc;

use crate::api::FeedImage;
use crate::cache::{ImageDataStore, SnapshotStore};
use crate::composer::{CommentsAdapter, FeedComposer};
use crate::loader::HttpClient;
use crate::presentation::{ImageCommentViewModel, ImageCommentsPresenter, LatestState};
use crate::ui::renderfns::{state_color, state_suffix, truncate};
use crate::ui::view::{View, ViewAction};

/// Comments for one feed image
pub struct CommentsView<C: HttpClient> {
  adapter: CommentsAdapter<C>,
  state: Arc<LatestState<Vec<ImageCommentViewModel>>>,
  image_label: String,
  list_state: ListState,
}

impl<C: HttpClient> CommentsView<C> {
  pub fn new<S>(composer: &FeedComposer<S, C>, image: &FeedImage) -> Self
  where
    S: SnapshotStore<FeedImage> + ImageDataStore,
  {
    let state = LatestState::<Vec<ImageCommentViewModel>>::shared();
    let adapter = composer.comments_adapter(image.id, state.clone());
    adapter.load();

    Self {
      adapter,
      state,
      image_label: image_label(image),
      list_state: ListState::default(),
    }
  }
}

/// Breadcrumb name for an image: its description, its location, or a short id.
fn image_label(image: &FeedImage) -> String {
  image
    .description
    .as_deref()
    .or(image.location.as_deref())
    .map(|s| truncate(s, 24))
    .unwrap_or_else(|| image.id.simple().to_string().chars().take(8).collect())
}

impl<C: HttpClient> View for CommentsView<C> {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('r') => {
        self.adapter.load();
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let state = self.state.get();
    let block = Block::default()
      .title(format!(
        " {} {} ",
        ImageCommentsPresenter::title(),
        state_suffix(&state)
      ))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(state_color(&state)));

    let comments = state.content.unwrap_or_default();
    if comments.is_empty() {
      let content = match (&state.error_message, state.is_loading) {
        (_, true) => "",
        (Some(_), false) => "Failed to load comments. Press 'r' to retry.",
        (None, false) => "No comments yet.",
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = comments
      .into_iter()
      .map(|comment| {
        ListItem::new(vec![
          Line::from(vec![
            Span::styled(comment.username, Style::default().fg(Color::Cyan)),
            Span::raw("  "),
            Span::styled(comment.date, Style::default().fg(Color::DarkGray)),
          ]),
          Line::from(format!("  {}", comment.message)),
        ])
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::DarkGray))
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }

  fn breadcrumb_label(&self) -> String {
    format!("{} [{}]", ImageCommentsPresenter::title(), self.image_label)
  }
}
