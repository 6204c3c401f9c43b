mod comments;
mod feed;

pub use comments::CommentsView;
pub use feed::FeedView;
