use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::StoriesConfig;
use crate::foundation::error::{StoriesError, StoriesResult};
use crate::record::build::run_build_command;
use crate::record::recorder::Recorder;

/// Recorder that runs `vhs -q <tape>` for each tape.
#[derive(Clone, Debug)]
pub struct VhsRecorder {
    program: PathBuf,
    build_command: Option<String>,
}

impl VhsRecorder {
    pub fn new(program: impl Into<PathBuf>, build_command: Option<String>) -> Self {
        Self {
            program: program.into(),
            build_command,
        }
    }

    pub fn from_config(cfg: &StoriesConfig) -> Self {
        Self::new(cfg.recorder.clone(), cfg.build_command.clone())
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Recorder for VhsRecorder {
    fn begin(&mut self) -> StoriesResult<()> {
        if let Some(cmd) = &self.build_command {
            run_build_command(cmd)?;
        }

        if !is_recorder_available(&self.program) {
            return Err(StoriesError::recorder(format!(
                "'{}' is required to render stories, but it could not be run",
                self.program.display()
            )));
        }
        Ok(())
    }

    fn record(&mut self, tape: &Path) -> StoriesResult<()> {
        // stdout is discarded: ours carries the book JSON.
        let output = Command::new(&self.program)
            .arg("-q")
            .arg(tape)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                StoriesError::recorder(format!(
                    "failed to spawn '{}': {e}",
                    self.program.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StoriesError::recorder(format!(
                "'{}' exited with status {} on '{}': {}",
                self.program.display(),
                output.status,
                tape.display(),
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Return `true` when `program --version` runs and succeeds.
pub fn is_recorder_available(program: &Path) -> bool {
    Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
