use std::path::Path;

use crate::foundation::error::StoriesResult;

/// Recorder contract for turning tape files into media.
///
/// Ordering contract: `begin` is called at most once per run, before the first `record`, and only
/// when at least one job actually needs rendering.
pub trait Recorder {
    /// Prepare everything a recording needs (build the story binary, probe the recorder).
    fn begin(&mut self) -> StoriesResult<()>;
    /// Run `tape` to completion. A failed run must be reported as an error.
    ///
    /// Returning `Ok` does not promise the output exists; the caller checks.
    fn record(&mut self, tape: &Path) -> StoriesResult<()>;
}

impl<R: Recorder + ?Sized> Recorder for &mut R {
    fn begin(&mut self) -> StoriesResult<()> {
        (**self).begin()
    }

    fn record(&mut self, tape: &Path) -> StoriesResult<()> {
        (**self).record(tape)
    }
}
