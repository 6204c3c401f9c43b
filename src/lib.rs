//! Offline-first image feed reader.
//!
//! The core is a set of composable loaders ([`loader`]) backed by a
//! timestamped local snapshot store ([`cache`]); [`composer`] assembles them
//! for the feed API ([`api`]) and [`presentation`] turns their outcomes into
//! view state for the terminal front end.

pub mod api;
pub mod app;
pub mod cache;
pub mod composer;
pub mod config;
pub mod error;
pub mod event;
pub mod loader;
pub mod presentation;
pub mod ui;
