//! `mdbook-stories` is an mdBook preprocessor that renders terminal stories on demand.
//!
//! Chapters reference a story with `{{story [<name>.]<png|gif> <command>}}`. The preprocessor:
//!
//! - Rewrites each directive into `![<command>](images/<file>)`
//! - Collects one render job per distinct output file
//! - Records any file missing from `src/images/` with `vhs`
//!
//! Existing files are never re-rendered; delete a file to refresh it.
#![forbid(unsafe_code)]

mod foundation;

/// mdBook tree model.
pub mod book;
/// Runtime configuration.
pub mod config;
/// Directive grammar and file naming.
pub mod directive;
/// stdin/stdout pipeline.
pub mod preprocess;
/// Recorder backends.
pub mod record;
/// Job rendering.
pub mod render;
/// Directive scanning and job collection.
pub mod scan;
/// Recorder tape scripts.
pub mod tape;

pub use crate::book::{Book, BookItem, Chapter};
pub use crate::config::{BookConfig, PREPROCESSOR_NAME, StoriesConfig};
pub use crate::directive::{MediaKind, StoryRef, command_digest, find_stories};
pub use crate::foundation::error::{StoriesError, StoriesResult};
pub use crate::preprocess::{Preprocessor, StoriesInput, run};
pub use crate::record::{Recorder, VhsRecorder};
pub use crate::render::{RenderStats, Renderer};
pub use crate::scan::{Job, JobSet, Scanner};
pub use crate::tape::{Tape, TapeCommand};
