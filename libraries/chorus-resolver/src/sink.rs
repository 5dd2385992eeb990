//! Result delivery

use chorus_core::Resolution;

/// Receives the result of a successful resolution
///
/// Called at most once per request and never for failed or cancelled ones.
pub trait ResultSink {
    fn deliver(&mut self, resolution: Resolution);
}

impl<F> ResultSink for F
where
    F: FnMut(Resolution),
{
    fn deliver(&mut self, resolution: Resolution) {
        self(resolution);
    }
}
