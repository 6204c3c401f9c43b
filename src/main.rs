use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use feedline::api::{FeedImage, ReqwestHttpClient};
use feedline::app::App;
use feedline::cache::{ImageDataStore, InMemoryStorage, SnapshotStore, SqliteStorage, SystemClock};
use feedline::composer::FeedComposer;
use feedline::config::{CacheBackend, Config};
use feedline::loader::MainQueue;
use feedline::ui::views::FeedView;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "feedline")]
#[command(about = "An offline-first image feed reader for the terminal")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/feedline/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Feed API root, overriding api.base_url
  #[arg(short, long)]
  base_url: Option<Url>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = Config::load(args.config.as_deref())?;
  if let Some(base_url) = args.base_url {
    config.api.base_url = Some(base_url);
  }

  let cache_path = config.cache_path()?;
  let log_dir = cache_path
    .parent()
    .ok_or_else(|| eyre!("Invalid cache path: {}", cache_path.display()))?;
  let _guard = init_logging(log_dir)?;

  let client = Arc::new(ReqwestHttpClient::new(config.timeout())?);

  match config.cache.backend {
    CacheBackend::Sqlite => {
      let store = Arc::new(SqliteStorage::open(Some(cache_path.as_path()))?);
      run(store, client, &config).await
    }
    CacheBackend::Memory => {
      let store = Arc::new(InMemoryStorage::<FeedImage>::new());
      run(store, client, &config).await
    }
  }
}

/// Log to a daily file next to the cache; the terminal belongs to the UI.
fn init_logging(dir: &Path) -> Result<WorkerGuard> {
  std::fs::create_dir_all(dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::daily(dir, "feedline.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);
  let filter = EnvFilter::try_from_env("FEEDLINE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(guard)
}

async fn run<S>(store: Arc<S>, client: Arc<ReqwestHttpClient>, config: &Config) -> Result<()>
where
  S: SnapshotStore<FeedImage> + ImageDataStore,
{
  let base_url = config.base_url()?.clone();
  info!(%base_url, backend = ?config.cache.backend, "starting");

  // This thread owns the UI; loads deliver here.
  let (queue, runner) = MainQueue::for_current_thread();
  let composer = Arc::new(FeedComposer::new(
    store,
    client,
    base_url.clone(),
    config.cache_policy(),
    Arc::new(SystemClock),
    queue,
  ));

  let root = Box::new(FeedView::new(Arc::clone(&composer)));
  let on_background = Box::new(move || composer.enter_background());

  let mut app = App::new(root, base_url, on_background);
  app.run(runner).await
}
