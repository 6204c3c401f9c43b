use bytes::Bytes;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::debug;
use url::Url;

use super::adapter::{ResourceView, ResourceViewState};
use super::strings::{localized, Table, IMAGE_DATA_ERROR};
use crate::error::{LoadError, LoadResult};
use crate::loader::{Loader, MainQueueDispatch, TaskHandle, TaskLoader};

pub type ImageDataCompletion = Box<dyn FnOnce(LoadResult<Bytes>) + Send + 'static>;

/// Cancellable image payload loads, completing on the UI context.
pub trait ImageDataLoader: Send + Sync + 'static {
  fn load_image_data(&self, url: Url, completion: ImageDataCompletion) -> TaskHandle;
}

impl<L, F> ImageDataLoader for MainQueueDispatch<TaskLoader<Url, F>>
where
  L: Loader<Output = Bytes>,
  F: Fn(Url) -> L + Send + Sync + 'static,
{
  fn load_image_data(&self, url: Url, completion: ImageDataCompletion) -> TaskHandle {
    self.load_task(url, completion)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
  Png,
  Jpeg,
  Gif,
}

/// What the terminal can show for an image: its format and size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePreview {
  pub format: ImageFormat,
  pub size: usize,
}

impl ImagePreview {
  /// Sniff the payload's magic bytes. Anything unrecognised is not an image.
  pub fn decode(data: Bytes) -> LoadResult<Self> {
    let format = if data.starts_with(b"\x89PNG\r\n\x1a\n") {
      ImageFormat::Png
    } else if data.starts_with(&[0xff, 0xd8, 0xff]) {
      ImageFormat::Jpeg
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
      ImageFormat::Gif
    } else {
      return Err(LoadError::InvalidImage);
    };
    Ok(Self {
      format,
      size: data.len(),
    })
  }
}

impl fmt::Display for ImagePreview {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let format = match self.format {
      ImageFormat::Png => "PNG",
      ImageFormat::Jpeg => "JPEG",
      ImageFormat::Gif => "GIF",
    };
    if self.size >= 1024 {
      write!(f, "{} {:.1} KB", format, self.size as f64 / 1024.0)
    } else {
      write!(f, "{} {} B", format, self.size)
    }
  }
}

/// Loads the image for one feed cell and forwards its states to the cell view.
pub struct ImageCellAdapter<I> {
  loader: Arc<dyn ImageDataLoader>,
  url: Url,
  decode: fn(Bytes) -> LoadResult<I>,
  view: Arc<dyn ResourceView<I>>,
  task: Mutex<Option<TaskHandle>>,
}

impl<I: Send + 'static> ImageCellAdapter<I> {
  pub fn new(
    loader: Arc<dyn ImageDataLoader>,
    url: Url,
    decode: fn(Bytes) -> LoadResult<I>,
    view: Arc<dyn ResourceView<I>>,
  ) -> Self {
    Self {
      loader,
      url,
      decode,
      view,
      task: Mutex::new(None),
    }
  }

  /// Start (or restart) the image load. A previous request is cancelled first.
  pub fn request_image(&self) {
    self.cancel_image_request();
    self.view.display(ResourceViewState::loading());

    let view = Arc::clone(&self.view);
    let decode = self.decode;
    let url = self.url.clone();
    let handle = self.loader.load_image_data(
      self.url.clone(),
      Box::new(move |result: LoadResult<Bytes>| {
        let state = match result.and_then(decode) {
          Ok(image) => ResourceViewState::loaded(image),
          Err(error) => {
            debug!(%url, %error, "image unavailable");
            ResourceViewState::failed(localized(Table::Shared, IMAGE_DATA_ERROR))
          }
        };
        view.display(state);
      }),
    );

    match self.task.lock() {
      Ok(mut task) => *task = Some(handle),
      Err(poisoned) => *poisoned.into_inner() = Some(handle),
    }
  }

  /// Cancel the in-flight load, if any. Its outcome is never displayed.
  pub fn cancel_image_request(&self) {
    let handle = match self.task.lock() {
      Ok(mut task) => task.take(),
      Err(poisoned) => poisoned.into_inner().take(),
    };
    if let Some(handle) = handle {
      handle.cancel();
    }
  }
}

impl<I> Drop for ImageCellAdapter<I> {
  fn drop(&mut self) {
    if let Ok(mut task) = self.task.lock() {
      if let Some(handle) = task.take() {
        handle.cancel();
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::loader::testing::{GatedLoader, StubLoader};
  use crate::loader::MainQueue;
  use crate::presentation::adapter::LatestState;
  use rstest::rstest;
  use std::time::Duration;

  const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

  fn url() -> Url {
    Url::parse("https://a-url.com/image.png").unwrap()
  }

  #[rstest]
  #[case(PNG, ImageFormat::Png)]
  #[case(&[0xff, 0xd8, 0xff, 0xe0, 0x00], ImageFormat::Jpeg)]
  #[case(b"GIF89a\x01\x00", ImageFormat::Gif)]
  fn test_decode_known_formats(#[case] data: &'static [u8], #[case] format: ImageFormat) {
    let preview = ImagePreview::decode(Bytes::from_static(data)).unwrap();

    assert_eq!(preview.format, format);
    assert_eq!(preview.size, data.len());
  }

  #[test]
  fn test_decode_rejects_unknown_data() {
    let result = ImagePreview::decode(Bytes::from_static(b"any data"));

    assert!(matches!(result, Err(LoadError::InvalidImage)));
  }

  #[test]
  fn test_preview_label() {
    let small = ImagePreview {
      format: ImageFormat::Png,
      size: 512,
    };
    let large = ImagePreview {
      format: ImageFormat::Jpeg,
      size: 2048,
    };

    assert_eq!(small.to_string(), "PNG 512 B");
    assert_eq!(large.to_string(), "JPEG 2.0 KB");
  }

  #[tokio::test]
  async fn test_request_image_displays_decoded_preview() {
    let (queue, _runner) = MainQueue::for_current_thread();
    let loader = MainQueueDispatch::new(
      TaskLoader::new(|_: Url| StubLoader::succeeding(Bytes::from_static(PNG))),
      queue,
    );
    let view = LatestState::<ImagePreview>::shared();
    let sut = ImageCellAdapter::new(Arc::new(loader), url(), ImagePreview::decode, view.clone());

    sut.request_image();
    assert!(view.get().is_loading);
    tokio::time::sleep(Duration::from_millis(10)).await;

    let state = view.get();
    assert!(!state.is_loading);
    assert_eq!(state.content.map(|p| p.format), Some(ImageFormat::Png));
  }

  #[tokio::test]
  async fn test_invalid_image_data_shows_error() {
    let (queue, _runner) = MainQueue::for_current_thread();
    let loader = MainQueueDispatch::new(
      TaskLoader::new(|_: Url| StubLoader::succeeding(Bytes::from_static(b"not an image"))),
      queue,
    );
    let view = LatestState::<ImagePreview>::shared();
    let sut = ImageCellAdapter::new(Arc::new(loader), url(), ImagePreview::decode, view.clone());

    sut.request_image();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(view.get(), ResourceViewState::failed("Image unavailable"));
  }

  #[tokio::test]
  async fn test_cancelled_request_never_displays_outcome() {
    let (queue, _runner) = MainQueue::for_current_thread();
    let gated = GatedLoader::new(StubLoader::succeeding(Bytes::from_static(PNG)));
    let source = gated.clone();
    let loader = MainQueueDispatch::new(TaskLoader::new(move |_: Url| source.clone()), queue);
    let view = LatestState::<ImagePreview>::shared();
    let sut = ImageCellAdapter::new(Arc::new(loader), url(), ImagePreview::decode, view.clone());

    sut.request_image();
    tokio::time::sleep(Duration::from_millis(10)).await;
    sut.cancel_image_request();
    gated.release();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(view.get(), ResourceViewState::loading());
  }
}
