use std::io::{Read, Write};

use anyhow::Context as _;
use serde_json::Value;

use crate::book::Book;
use crate::config::{BookConfig, StoriesConfig};
use crate::foundation::error::StoriesResult;
use crate::record::Recorder;
use crate::render::{RenderStats, Renderer};
use crate::scan::{JobSet, Scanner};

/// The `[context, book]` pair mdBook writes to a preprocessor's stdin.
#[derive(Clone, Debug)]
pub struct StoriesInput {
    pub context: Value,
    pub book: Book,
}

pub fn read_input(reader: impl Read) -> StoriesResult<StoriesInput> {
    let (context, book): (Value, Book) = serde_json::from_reader(reader)?;
    Ok(StoriesInput { context, book })
}

pub fn write_output(mut writer: impl Write, book: &Book) -> StoriesResult<()> {
    let bytes = serde_json::to_vec(book)?;
    writer
        .write_all(&bytes)
        .context("failed to write book to output")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

/// Overlay the book's `[preprocessor.stories]` table (if any) on `base` and validate the result.
pub fn resolve_config(mut base: StoriesConfig, context: &Value) -> StoriesResult<StoriesConfig> {
    if let Some(book_cfg) = BookConfig::from_context(context)? {
        base.apply(&book_cfg);
    }
    base.validate()?;
    Ok(base)
}

/// Scan-then-render pipeline over one book.
#[derive(Clone, Debug)]
pub struct Preprocessor {
    cfg: StoriesConfig,
    scanner: Scanner,
}

impl Preprocessor {
    pub fn new(cfg: StoriesConfig) -> StoriesResult<Self> {
        cfg.validate()?;
        let scanner = Scanner::new(cfg.src_dir.clone(), cfg.images_dir.clone());
        Ok(Self { cfg, scanner })
    }

    /// Rewrite every directive in `book` and collect the render jobs.
    pub fn scan(&self, book: &mut Book) -> JobSet {
        let mut jobs = JobSet::new();
        self.scanner.scan_book(book, &mut jobs);
        jobs
    }

    /// Rewrite `book` in place and render whatever is missing on disk.
    pub fn process<R: Recorder>(&self, book: &mut Book, recorder: R) -> StoriesResult<RenderStats> {
        let jobs = self.scan(book);
        tracing::debug!(jobs = jobs.len(), "collected story jobs");
        Renderer::new(&self.cfg, recorder).render_all(&jobs)
    }
}

/// Full stdin-to-stdout run.
///
/// Nothing is written to `output` unless every job rendered.
pub fn run<R, F>(
    input: impl Read,
    output: impl Write,
    base: StoriesConfig,
    make_recorder: F,
) -> StoriesResult<RenderStats>
where
    R: Recorder,
    F: FnOnce(&StoriesConfig) -> R,
{
    let StoriesInput { context, mut book } = read_input(input)?;
    let cfg = resolve_config(base, &context)?;
    let recorder = make_recorder(&cfg);

    let preprocessor = Preprocessor::new(cfg)?;
    let stats = preprocessor.process(&mut book, recorder)?;
    write_output(output, &book)?;
    Ok(stats)
}
