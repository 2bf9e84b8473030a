pub mod config;
pub mod error;

// Matching core
pub mod matching;
pub mod recipe;

// Record store and snapshot cache
pub mod cache;
pub mod store;

// Chat flow
pub mod chat;
pub mod completion;

// HTTP surface
pub mod api;
pub mod web;

pub mod cli;

// Utilities
pub mod utils;

// Re-exports
pub use config::Settings;
pub use error::{Error, Result};
