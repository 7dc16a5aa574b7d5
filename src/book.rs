//! Minimal serde model of the mdBook tree handed to preprocessors.
//!
//! Only the fields the scanner touches are typed. Everything else is kept in a flattened map so
//! the book round-trips without loss.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub sections: Vec<BookItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A section or sub-item. Non-chapter variants (`"Separator"`, `{"PartTitle": ..}`) pass through.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BookItem {
    Chapter {
        #[serde(rename = "Chapter")]
        chapter: Chapter,
    },
    Other(Value),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub content: String,
    #[serde(default)]
    pub sub_items: Vec<BookItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Book {
    pub fn chapters_mut(&mut self) -> impl Iterator<Item = &mut Chapter> {
        self.sections.iter_mut().filter_map(BookItem::as_chapter_mut)
    }
}

impl BookItem {
    pub fn as_chapter_mut(&mut self) -> Option<&mut Chapter> {
        match self {
            BookItem::Chapter { chapter } => Some(chapter),
            BookItem::Other(_) => None,
        }
    }

    pub fn as_chapter(&self) -> Option<&Chapter> {
        match self {
            BookItem::Chapter { chapter } => Some(chapter),
            BookItem::Other(_) => None,
        }
    }
}

impl Chapter {
    pub fn sub_chapters_mut(&mut self) -> impl Iterator<Item = &mut Chapter> {
        self.sub_items.iter_mut().filter_map(BookItem::as_chapter_mut)
    }
}
