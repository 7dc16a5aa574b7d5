use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;

use crate::config::StoriesConfig;
use crate::foundation::error::{StoriesError, StoriesResult};
use crate::record::Recorder;
use crate::scan::{Job, JobSet};
use crate::tape::{Tape, tape_path};

/// Counters reported after a render pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Jobs whose output was produced in this pass.
    pub rendered: usize,
    /// Jobs whose output already existed on disk.
    pub skipped: usize,
    /// Recorder invocations, including retries.
    pub attempts: u32,
}

/// Realizes a [`JobSet`] as media files, skipping any output that already exists.
///
/// File existence is the only cache key. Changing the command behind an explicit file name has no
/// effect until the old file is deleted.
pub struct Renderer<R: Recorder> {
    recorder: R,
    output_dir: PathBuf,
    story_program: String,
    max_attempts: u32,
    retry_backoff: Duration,
    begun: bool,
}

impl<R: Recorder> Renderer<R> {
    pub fn new(cfg: &StoriesConfig, recorder: R) -> Self {
        Self {
            recorder,
            output_dir: cfg.output_dir(),
            story_program: cfg.story_program.clone(),
            max_attempts: cfg.max_attempts.max(1),
            retry_backoff: cfg.retry_backoff,
            begun: false,
        }
    }

    #[tracing::instrument(skip_all, fields(jobs = jobs.len()))]
    pub fn render_all(&mut self, jobs: &JobSet) -> StoriesResult<RenderStats> {
        ensure_dir(&self.output_dir)?;

        let mut stats = RenderStats::default();
        for job in jobs {
            if job.output.exists() {
                tracing::debug!(output = %job.output.display(), "story already rendered");
                stats.skipped += 1;
                continue;
            }
            self.render_job(job, &mut stats)?;
        }

        tracing::debug!(
            rendered = stats.rendered,
            skipped = stats.skipped,
            attempts = stats.attempts,
            "render pass finished"
        );
        Ok(stats)
    }

    fn render_job(&mut self, job: &Job, stats: &mut RenderStats) -> StoriesResult<()> {
        if !self.begun {
            self.recorder.begin()?;
            self.begun = true;
        }

        tracing::info!(
            output = %job.output.display(),
            command = %job.command,
            "~> building story"
        );

        let tape = Tape::for_job(job, &self.story_program)?;
        if let Some(parent) = job.output.parent() {
            ensure_dir(parent)?;
        }
        let tape_file = tape_path(&job.output);
        std::fs::write(&tape_file, tape.to_string())
            .with_context(|| format!("failed to write tape '{}'", tape_file.display()))?;
        tracing::debug!(tape = %tape_file.display(), "wrote tape");

        // A failed recorder run propagates immediately and leaves the tape for inspection. Only a
        // clean exit that produced nothing is retried.
        let mut attempt = 0u32;
        while !job.output.exists() && attempt < self.max_attempts {
            if attempt > 0 {
                tracing::warn!(
                    output = %job.output.display(),
                    attempt,
                    "recorder exited cleanly without output; retrying"
                );
                std::thread::sleep(self.retry_backoff * attempt);
            }
            attempt += 1;
            stats.attempts += 1;
            self.recorder.record(&tape_file)?;
        }

        std::fs::remove_file(&tape_file)
            .with_context(|| format!("failed to remove tape '{}'", tape_file.display()))?;

        if !job.output.exists() {
            return Err(StoriesError::missing_output(&job.output));
        }
        stats.rendered += 1;
        Ok(())
    }
}

fn ensure_dir(dir: &Path) -> StoriesResult<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverCalled;

    impl Recorder for NeverCalled {
        fn begin(&mut self) -> StoriesResult<()> {
            panic!("begin must not run when nothing needs rendering");
        }

        fn record(&mut self, _tape: &Path) -> StoriesResult<()> {
            panic!("record must not run when nothing needs rendering");
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "mdbook_stories_{name}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ))
    }

    #[test]
    fn empty_job_set_only_creates_output_dir() {
        let tmp = temp_dir("render_empty");
        let mut cfg = StoriesConfig::default();
        cfg.src_dir = tmp.join("src");

        let mut renderer = Renderer::new(&cfg, NeverCalled);
        let stats = renderer.render_all(&JobSet::new()).unwrap();

        assert_eq!(stats, RenderStats::default());
        assert!(tmp.join("src").join("images").is_dir());
        std::fs::remove_dir_all(&tmp).ok();
    }

    #[test]
    fn existing_outputs_are_skipped_without_touching_recorder() {
        let tmp = temp_dir("render_cached");
        let mut cfg = StoriesConfig::default();
        cfg.src_dir = tmp.join("src");
        std::fs::create_dir_all(cfg.output_dir()).unwrap();
        let output = cfg.output_dir().join("demo.png");
        std::fs::write(&output, b"png").unwrap();

        let mut jobs = JobSet::new();
        jobs.insert(Job {
            output,
            command: "cy".to_string(),
            kind: crate::directive::MediaKind::Png,
        });

        let mut renderer = Renderer::new(&cfg, NeverCalled);
        let stats = renderer.render_all(&jobs).unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.rendered, 0);
        assert_eq!(stats.attempts, 0);
        std::fs::remove_dir_all(&tmp).ok();
    }
}
