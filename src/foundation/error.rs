use std::path::{Path, PathBuf};

pub type StoriesResult<T> = Result<T, StoriesError>;

#[derive(thiserror::Error, Debug)]
pub enum StoriesError {
    #[error("config error: {0}")]
    Config(String),

    #[error("build error: {0}")]
    Build(String),

    #[error("recorder error: {0}")]
    Recorder(String),

    #[error("missing output: recorder finished but '{}' was never written", .0.display())]
    MissingOutput(PathBuf),

    #[error("directive error: {0}")]
    Directive(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoriesError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn build(msg: impl Into<String>) -> Self {
        Self::Build(msg.into())
    }

    pub fn recorder(msg: impl Into<String>) -> Self {
        Self::Recorder(msg.into())
    }

    pub fn missing_output(path: &Path) -> Self {
        Self::MissingOutput(path.to_path_buf())
    }

    pub fn directive(msg: impl Into<String>) -> Self {
        Self::Directive(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for StoriesError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}
