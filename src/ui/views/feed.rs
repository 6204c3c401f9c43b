use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::FeedImage;
use crate::cache::{ImageDataStore, SnapshotStore};
use crate::composer::{FeedAdapter, FeedComposer};
use crate::loader::HttpClient;
use crate::presentation::{
  FeedPresenter, ImageCellAdapter, ImageDataLoader, ImagePreview, LatestState,
  ResourceViewState,
};
use crate::ui::renderfns::{state_color, state_suffix, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::CommentsView;

/// Rows rendered per feed item
const ROW_HEIGHT: usize = 2;

struct FeedCell {
  adapter: ImageCellAdapter<ImagePreview>,
  image: Arc<LatestState<ImagePreview>>,
}

/// The feed list. Image requests are issued for visible rows only and
/// cancelled when a row scrolls out of view.
pub struct FeedView<S, C>
where
  S: SnapshotStore<FeedImage> + ImageDataStore,
  C: HttpClient,
{
  composer: Arc<FeedComposer<S, C>>,
  adapter: FeedAdapter<S, C>,
  state: Arc<LatestState<Vec<FeedImage>>>,
  image_loader: Arc<dyn ImageDataLoader>,
  cells: HashMap<Uuid, FeedCell>,
  list_state: ListState,
}

impl<S, C> FeedView<S, C>
where
  S: SnapshotStore<FeedImage> + ImageDataStore,
  C: HttpClient,
{
  pub fn new(composer: Arc<FeedComposer<S, C>>) -> Self {
    let state = LatestState::<Vec<FeedImage>>::shared();
    let adapter = composer.feed_adapter(state.clone());
    let image_loader = composer.image_loader();

    adapter.load();

    Self {
      composer,
      adapter,
      state,
      image_loader,
      cells: HashMap::new(),
      list_state: ListState::default(),
    }
  }

  fn selected_image(&self, images: &[FeedImage]) -> Option<FeedImage> {
    self
      .list_state
      .selected()
      .and_then(|idx| images.get(idx))
      .cloned()
  }

  /// Keep exactly one live image request per visible row.
  fn sync_cells(&mut self, images: &[FeedImage], visible: Range<usize>) {
    let visible_ids: Vec<Uuid> = images
      .get(visible.start.min(images.len())..visible.end.min(images.len()))
      .unwrap_or(&[])
      .iter()
      .map(|image| image.id)
      .collect();

    self.cells.retain(|id, cell| {
      let keep = visible_ids.contains(id);
      if !keep {
        cell.adapter.cancel_image_request();
      }
      keep
    });

    for image in images.iter().filter(|image| visible_ids.contains(&image.id)) {
      if self.cells.contains_key(&image.id) {
        continue;
      }
      let view = LatestState::<ImagePreview>::shared();
      let adapter = ImageCellAdapter::new(
        Arc::clone(&self.image_loader),
        image.url.clone(),
        ImagePreview::decode,
        view.clone(),
      );
      adapter.request_image();
      self.cells.insert(image.id, FeedCell { adapter, image: view });
    }
  }

  fn retry_selected_image(&mut self) {
    let images = self.state.get().content.unwrap_or_default();
    if let Some(image) = self.selected_image(&images) {
      if let Some(cell) = self.cells.get(&image.id) {
        cell.adapter.request_image();
      }
    }
  }

  fn image_span(&self, image: &FeedImage) -> Span<'static> {
    let state = self
      .cells
      .get(&image.id)
      .map(|cell| cell.image.get())
      .unwrap_or_else(ResourceViewState::idle);

    if state.is_loading {
      Span::styled("[ ... ]", Style::default().fg(Color::DarkGray))
    } else if let Some(preview) = state.content {
      Span::styled(format!("[{}]", preview), Style::default().fg(Color::Green))
    } else if let Some(message) = state.error_message {
      Span::styled(format!("[{} ↻]", message), Style::default().fg(Color::Red))
    } else {
      Span::raw("")
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let state = self.state.get();
    let images = state.content.clone().unwrap_or_default();

    let block = Block::default()
      .title(format!(" {} {} ", FeedPresenter::title(), state_suffix(&state)))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(state_color(&state)));

    if images.is_empty() {
      self.sync_cells(&images, 0..0);
      let content = if state.is_loading {
        ""
      } else if state.error_message.is_some() {
        "No cached feed available. Press 'r' to retry."
      } else {
        "The feed is empty."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    if self.list_state.selected().map_or(true, |idx| idx >= images.len()) {
      self.list_state.select(Some(0));
    }

    let items: Vec<ListItem> = images
      .iter()
      .map(|image| {
        let vm = FeedPresenter::map(image);
        let description = vm.description.as_deref().unwrap_or("");
        let mut first = vec![Span::raw(truncate(description, 70))];
        if vm.has_location() {
          first.insert(
            0,
            Span::styled(
              format!("{}  ", vm.location.as_deref().unwrap_or("")),
              Style::default().fg(Color::Yellow),
            ),
          );
        }
        let second = Line::from(vec![Span::raw("  "), self.image_span(image)]);
        ListItem::new(vec![Line::from(first), second])
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);

    let first = self.list_state.offset();
    let rows = (area.height.saturating_sub(2) as usize).div_ceil(ROW_HEIGHT);
    self.sync_cells(&images, first..first + rows);
  }
}

impl<S, C> View for FeedView<S, C>
where
  S: SnapshotStore<FeedImage> + ImageDataStore,
  C: HttpClient,
{
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
      }
      KeyCode::Char('r') => {
        self.adapter.load();
      }
      KeyCode::Char('i') => self.retry_selected_image(),
      KeyCode::Enter => {
        let images = self.state.get().content.unwrap_or_default();
        if let Some(image) = self.selected_image(&images) {
          return ViewAction::Push(Box::new(CommentsView::new(&self.composer, &image)));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    FeedPresenter::title().to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("enter", "comments"),
      ShortcutInfo::new("r", "reload"),
      ShortcutInfo::new("i", "retry image"),
      ShortcutInfo::new("q", "quit"),
    ]
  }
}
