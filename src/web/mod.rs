// HTML rendering of chat replies

pub mod reply;

pub use reply::{render_reply, NOT_FOUND_REPLY};
