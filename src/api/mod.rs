//! Feed API: domain types, endpoints, and response mapping.

mod api_types;
mod client;
mod endpoint;
mod types;

pub use api_types::{map_feed, map_image_comments, map_image_data};
pub use client::ReqwestHttpClient;
pub use endpoint::Endpoint;
pub use types::{FeedImage, ImageComment};
