//! View-facing side of the loaders: adapters that drive view state, per-cell
//! image requests, presenters, and localized strings.

mod adapter;
mod image_cell;
mod presenters;
mod strings;

pub use adapter::{
  LatestState, Mapper, ResourcePresentationAdapter, ResourceView, ResourceViewState,
};
pub use image_cell::{
  ImageCellAdapter, ImageDataCompletion, ImageDataLoader, ImageFormat, ImagePreview,
};
pub use presenters::{
  generic_error, relative_date, FeedImageViewModel, FeedPresenter, ImageCommentViewModel,
  ImageCommentsPresenter,
};
pub use strings::{localized, Table};
