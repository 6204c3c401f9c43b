use crate::event::{Event, EventHandler};
use crate::loader::MainQueueRunner;
use crate::ui;
use crate::ui::view::{View, ViewAction};
use color_eyre::Result;
use crossterm::event::{DisableFocusChange, EnableFocusChange, KeyCode, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::info;
use url::Url;

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// Called when the app moves to the background and on exit
  on_background: Box<dyn Fn()>,

  /// API root, shown in the header
  base_url: Url,

  /// Set while the terminal is unfocused
  backgrounded: bool,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(root: Box<dyn View>, base_url: Url, on_background: Box<dyn Fn()>) -> Self {
    Self {
      view_stack: vec![root],
      on_background,
      base_url,
      backgrounded: false,
      should_quit: false,
    }
  }

  /// Run the UI loop on the current thread, which must own `runner`'s queue.
  pub async fn run(&mut self, mut runner: MainQueueRunner) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableFocusChange)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(Duration::from_millis(250));

    let result = async {
      while !self.should_quit {
        terminal.draw(|frame| ui::draw(frame, self))?;

        // Redraw after every input event and every main-queue delivery
        tokio::select! {
          event = events.next() => match event {
            Some(event) => self.handle_event(event),
            None => self.should_quit = true,
          },
          alive = runner.run_next() => {
            if !alive {
              self.should_quit = true;
            }
          }
        }
        runner.run_pending();
      }
      Ok::<(), color_eyre::Report>(())
    }
    .await;

    (self.on_background)();

    // Cleanup terminal
    stdout().execute(DisableFocusChange)?;
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::FocusLost => {
        if !self.backgrounded {
          self.backgrounded = true;
          info!("entering background");
          (self.on_background)();
        }
      }
      Event::FocusGained => self.backgrounded = false,
      Event::Tick => {} // UI refresh happens automatically
    }
  }

  fn handle_key(&mut self, key: crossterm::event::KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let Some(view) = self.view_stack.last_mut() else {
      return;
    };
    match view.handle_key(key) {
      ViewAction::None => {}
      ViewAction::Push(next) => self.view_stack.push(next),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  // Accessors for UI rendering
  pub fn current_view(&self) -> Option<&dyn View> {
    self.view_stack.last().map(|v| v.as_ref())
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  pub fn status(&self) -> Option<&str> {
    self.backgrounded.then_some("background")
  }

  pub fn view_breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }
}
