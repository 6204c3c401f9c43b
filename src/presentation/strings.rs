//! Localized strings, looked up by table and key.

/// String tables, one per resource plus a shared table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
  Shared,
  Feed,
  ImageComments,
}

pub const GENERIC_CONNECTION_ERROR: &str = "GENERIC_CONNECTION_ERROR";
pub const IMAGE_DATA_ERROR: &str = "IMAGE_DATA_ERROR";
pub const FEED_VIEW_TITLE: &str = "FEED_VIEW_TITLE";
pub const IMAGE_COMMENTS_VIEW_TITLE: &str = "IMAGE_COMMENTS_VIEW_TITLE";

const SHARED: &[(&str, &str)] = &[
  (GENERIC_CONNECTION_ERROR, "Couldn't connect to server"),
  (IMAGE_DATA_ERROR, "Image unavailable"),
];

const FEED: &[(&str, &str)] = &[(FEED_VIEW_TITLE, "My Feed")];

const IMAGE_COMMENTS: &[(&str, &str)] = &[(IMAGE_COMMENTS_VIEW_TITLE, "Comments")];

/// Look up `key` in `table`, falling back to the key itself.
pub fn localized(table: Table, key: &'static str) -> &'static str {
  let entries = match table {
    Table::Shared => SHARED,
    Table::Feed => FEED,
    Table::ImageComments => IMAGE_COMMENTS,
  };
  entries
    .iter()
    .find(|(k, _)| *k == key)
    .map(|(_, v)| *v)
    .unwrap_or(key)
}
