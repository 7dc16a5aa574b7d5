use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::foundation::error::{StoriesError, StoriesResult};

/// Preprocessor name as it appears under `[preprocessor.*]` in `book.toml`.
pub const PREPROCESSOR_NAME: &str = "stories";

/// Environment variable whose presence marks a continuous-integration run.
pub const CI_ENV_VAR: &str = "CI";

/// Shell command that builds the story binary outside of CI.
pub const DEFAULT_BUILD_COMMAND: &str = "go build -o storybook ../cmd/stories/main.go";

/// Runtime configuration, resolved once at startup.
///
/// Nothing downstream of this struct inspects the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoriesConfig {
    /// Book source directory, relative to the book root.
    pub src_dir: PathBuf,
    /// Directory under `src_dir` that receives rendered media. Used verbatim in embeds.
    pub images_dir: String,
    /// Recorder executable (`vhs`).
    pub recorder: PathBuf,
    /// Program typed into the recorded terminal to play a story.
    pub story_program: String,
    /// Shell command run once before the first render, if any.
    pub build_command: Option<String>,
    /// Upper bound on recorder runs per job when a run exits cleanly without output.
    pub max_attempts: u32,
    /// Base delay between attempts; attempt `n` waits `n * retry_backoff`.
    pub retry_backoff: Duration,
}

impl Default for StoriesConfig {
    fn default() -> Self {
        Self::for_environment(false)
    }
}

impl StoriesConfig {
    /// Defaults for a local run (`ci == false`) or a CI run.
    ///
    /// CI images ship a vendored `./vhs` and a prebuilt story binary, so the build step is
    /// disabled there.
    pub fn for_environment(ci: bool) -> Self {
        Self {
            src_dir: PathBuf::from("./src"),
            images_dir: "images".to_string(),
            recorder: PathBuf::from(if ci { "./vhs" } else { "vhs" }),
            story_program: "./storybook".to_string(),
            build_command: (!ci).then(|| DEFAULT_BUILD_COMMAND.to_string()),
            max_attempts: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }

    pub fn from_env() -> Self {
        Self::for_environment(std::env::var_os(CI_ENV_VAR).is_some())
    }

    /// Directory, relative to the book root, that rendered files land in.
    pub fn output_dir(&self) -> PathBuf {
        self.src_dir.join(&self.images_dir)
    }

    /// Overlay values from the book's `[preprocessor.stories]` table.
    pub fn apply(&mut self, book: &BookConfig) {
        if let Some(src_dir) = &book.src_dir {
            self.src_dir = src_dir.clone();
        }
        if let Some(images_dir) = &book.images_dir {
            self.images_dir = images_dir.clone();
        }
        if let Some(recorder) = &book.recorder {
            self.recorder = recorder.clone();
        }
        if let Some(story_program) = &book.story_program {
            self.story_program = story_program.clone();
        }
        match &book.build_command {
            Some(BuildCommandSetting::Command(cmd)) => self.build_command = Some(cmd.clone()),
            Some(BuildCommandSetting::Enabled(false)) => self.build_command = None,
            Some(BuildCommandSetting::Enabled(true)) | None => {}
        }
        if let Some(max_attempts) = book.max_attempts {
            self.max_attempts = max_attempts;
        }
    }

    pub fn validate(&self) -> StoriesResult<()> {
        if self.max_attempts == 0 {
            return Err(StoriesError::config("max-attempts must be at least 1"));
        }
        let images = Path::new(&self.images_dir);
        if self.images_dir.trim().is_empty() || images.is_absolute() {
            return Err(StoriesError::config(format!(
                "images-dir must be a non-empty relative path, got '{}'",
                self.images_dir
            )));
        }
        if self.story_program.trim().is_empty() {
            return Err(StoriesError::config("story-program must not be empty"));
        }
        Ok(())
    }
}

/// `build-command = "..."` replaces the command, `build-command = false` disables it.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum BuildCommandSetting {
    Command(String),
    Enabled(bool),
}

/// The `[preprocessor.stories]` table of `book.toml`, as forwarded in the mdBook context.
///
/// Keys mdBook itself understands (`command`, `renderers`, ...) are ignored.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct BookConfig {
    pub src_dir: Option<PathBuf>,
    pub images_dir: Option<String>,
    pub recorder: Option<PathBuf>,
    pub story_program: Option<String>,
    pub build_command: Option<BuildCommandSetting>,
    pub max_attempts: Option<u32>,
}

impl BookConfig {
    /// Extract `config.preprocessor.stories` from the context value.
    pub fn from_context(context: &serde_json::Value) -> StoriesResult<Option<Self>> {
        let pointer = format!("/config/preprocessor/{PREPROCESSOR_NAME}");
        let Some(table) = context.pointer(&pointer) else {
            return Ok(None);
        };
        let cfg = serde_json::from_value(table.clone()).map_err(|e| {
            StoriesError::config(format!("invalid [preprocessor.stories] table: {e}"))
        })?;
        Ok(Some(cfg))
    }
}
