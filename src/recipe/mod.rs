// Recipe records and the free-text pipeline that turns a raw body into lists

pub mod render;
pub mod segment;

pub use render::{render, RenderedRecipe};
pub use segment::{Section, SegmentedRecipe, Segmenter};

use serde::{Deserialize, Serialize};

/// A recipe row as loaded from the store. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    pub raw_text: String,
}

impl Recipe {
    pub fn new(title: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            raw_text: raw_text.into(),
        }
    }
}
