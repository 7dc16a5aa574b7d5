//! Recorder backends.
//!
//! The renderer drives a [`Recorder`] one tape at a time. [`VhsRecorder`] shells out to the
//! system `vhs`; tests supply their own implementation.

/// Story binary build step run before the first recording.
pub mod build;
/// Generic recorder trait.
pub mod recorder;
/// `vhs`-based recorder.
pub mod vhs;

pub use build::run_build_command;
pub use recorder::Recorder;
pub use vhs::{VhsRecorder, is_recorder_available};
