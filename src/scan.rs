use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::book::{Book, Chapter};
use crate::directive::{MediaKind, find_stories};

/// A pending render: one output file and the story command that produces it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    pub output: PathBuf,
    pub command: String,
    pub kind: MediaKind,
}

/// Render jobs keyed by output path, in first-registration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JobSet {
    jobs: IndexMap<PathBuf, Job>,
}

impl JobSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `job`. Returns `false` when a job for the same output already existed.
    ///
    /// The first registration wins. Hash-derived names cannot disagree; explicit names can, and
    /// that case is logged.
    pub fn insert(&mut self, job: Job) -> bool {
        match self.jobs.entry(job.output.clone()) {
            Entry::Occupied(existing) => {
                if existing.get().command != job.command {
                    tracing::warn!(
                        output = %job.output.display(),
                        kept = %existing.get().command,
                        ignored = %job.command,
                        "story file name reused with a different command"
                    );
                }
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(job);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn get(&self, output: &Path) -> Option<&Job> {
        self.jobs.get(output)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }
}

impl<'a> IntoIterator for &'a JobSet {
    type Item = &'a Job;
    type IntoIter = indexmap::map::Values<'a, PathBuf, Job>;

    fn into_iter(self) -> Self::IntoIter {
        self.jobs.values()
    }
}

/// Rewrites story directives into image embeds and collects the matching jobs.
#[derive(Clone, Debug)]
pub struct Scanner {
    src_dir: PathBuf,
    images_dir: String,
}

impl Scanner {
    /// `images_dir` is relative to `src_dir` and is what the markdown embeds point at.
    pub fn new(src_dir: impl Into<PathBuf>, images_dir: impl Into<String>) -> Self {
        Self {
            src_dir: src_dir.into(),
            images_dir: images_dir.into(),
        }
    }

    pub fn scan_book(&self, book: &mut Book, jobs: &mut JobSet) {
        for chapter in book.chapters_mut() {
            self.scan_chapter(chapter, jobs);
        }
    }

    pub fn scan_chapter(&self, chapter: &mut Chapter, jobs: &mut JobSet) {
        chapter.content = self.rewrite(&chapter.content, jobs);
        for sub in chapter.sub_chapters_mut() {
            self.scan_chapter(sub, jobs);
        }
    }

    /// Replace every directive in `content` and register its job.
    pub fn rewrite(&self, content: &str, jobs: &mut JobSet) -> String {
        let refs = find_stories(content);
        if refs.is_empty() {
            return content.to_string();
        }

        let mut replacements = Vec::with_capacity(refs.len());
        for r in &refs {
            let file_name = r.file_name();
            let embed_path = format!("{}/{}", self.images_dir.trim_end_matches('/'), file_name);
            replacements.push((r.span.clone(), format!("![{}]({})", r.command, embed_path)));

            jobs.insert(Job {
                output: self.src_dir.join(&self.images_dir).join(&file_name),
                command: r.command.to_string(),
                kind: r.kind,
            });
        }

        // Apply back to front so earlier spans stay valid.
        let mut out = content.to_string();
        for (span, text) in replacements.into_iter().rev() {
            out.replace_range(span, &text);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::command_digest;

    fn scanner() -> Scanner {
        Scanner::new("./src", "images")
    }

    #[test]
    fn content_without_directives_is_untouched() {
        let mut jobs = JobSet::new();
        let text = "# Title\n\nNo stories {{here}} or {{#include x.md}}.";
        assert_eq!(scanner().rewrite(text, &mut jobs), text);
        assert!(jobs.is_empty());
    }

    #[test]
    fn anonymous_png_becomes_hashed_embed() {
        let mut jobs = JobSet::new();
        let out = scanner().rewrite("see {{story png cy test foo}}", &mut jobs);
        let hash = command_digest("cy test foo");
        assert_eq!(out, format!("see ![cy test foo](images/{hash}.png)"));

        let job = jobs.iter().next().unwrap();
        assert_eq!(
            job.output,
            PathBuf::from(format!("./src/images/{hash}.png"))
        );
        assert_eq!(job.command, "cy test foo");
        assert_eq!(job.kind, MediaKind::Png);
    }

    #[test]
    fn explicit_gif_keeps_its_name() {
        let mut jobs = JobSet::new();
        let out = scanner().rewrite("{{story demo.gif cy test bar}}", &mut jobs);
        assert_eq!(out, "![cy test bar](images/demo.gif)");
        assert!(jobs.get(Path::new("./src/images/demo.gif")).is_some());
    }

    #[test]
    fn multiple_directives_preserve_surrounding_text() {
        let mut jobs = JobSet::new();
        let text = "a {{story one.png x}} b\nc {{story gif y}} d {{story two.png z}} e";
        let out = scanner().rewrite(text, &mut jobs);
        let y = command_digest("y");
        assert_eq!(
            out,
            format!("a ![x](images/one.png) b\nc ![y](images/{y}.gif) d ![z](images/two.png) e")
        );
        let outputs: Vec<_> = jobs.iter().map(|j| j.output.clone()).collect();
        assert_eq!(
            outputs,
            vec![
                PathBuf::from("./src/images/one.png"),
                PathBuf::from(format!("./src/images/{y}.gif")),
                PathBuf::from("./src/images/two.png"),
            ]
        );
    }

    #[test]
    fn blank_command_is_left_in_place() {
        let mut jobs = JobSet::new();
        let text = "{{story png   }}";
        assert_eq!(scanner().rewrite(text, &mut jobs), text);
        assert!(jobs.is_empty());
    }

    #[test]
    fn same_command_and_kind_registers_once() {
        let mut jobs = JobSet::new();
        scanner().rewrite("{{story png cy}} {{story png cy}}", &mut jobs);
        assert_eq!(jobs.len(), 1);
    }

    #[test]
    fn same_command_different_kind_registers_twice() {
        let mut jobs = JobSet::new();
        scanner().rewrite("{{story png cy}} {{story gif cy}}", &mut jobs);
        assert_eq!(jobs.len(), 2);
    }

    #[test]
    fn first_registration_wins_on_name_conflict() {
        let mut jobs = JobSet::new();
        scanner().rewrite("{{story demo.png first}} {{story demo.png second}}", &mut jobs);
        assert_eq!(jobs.len(), 1);
        assert_eq!(
            jobs.get(Path::new("./src/images/demo.png")).unwrap().command,
            "first"
        );
    }

    #[test]
    fn custom_images_dir_flows_into_embed_and_output() {
        let mut jobs = JobSet::new();
        let out = Scanner::new("book", "media/stories").rewrite("{{story a.png b}}", &mut jobs);
        assert_eq!(out, "![b](media/stories/a.png)");
        assert!(jobs.get(Path::new("book/media/stories/a.png")).is_some());
    }
}
