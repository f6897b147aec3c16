use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Operations the filesystem layer forwards for a video output path, after it
/// has mapped the path to a frame number.
///
/// Every method is called from the driver's worker pool, so calls for
/// different frames run in parallel. None of them report failure: anomalies
/// are absorbed by the implementation.
pub trait VideoHandler: Send + Sync {
    /// A file for `frame_number` was created.
    fn create(&self, frame_number: u64);

    /// Store `bytes` at `offset`; returns the number of bytes consumed.
    fn write(&self, frame_number: u64, bytes: &[u8], offset: u64) -> usize;

    /// The file's length was set to `length`.
    fn truncate(&self, frame_number: u64, length: u64);

    /// The renderer finished with `frame_number`.
    fn close(&self, frame_number: u64);

    /// Tear down all state. Called once at unmount.
    fn destroy(&self);

    /// Size to report for `frame_number`'s file.
    fn frame_size(&self, frame_number: u64) -> u64;

    /// Whether any internal lock is currently held.
    fn is_locked(&self) -> bool;

    /// Hook for rewriting a directory listing. Default leaves it untouched.
    fn modify_find_results(&self, _path: &Path, _existing_files: &mut Vec<String>) {}
}

/// Source of driver-level file handle numbers, starting at 1.
#[derive(Debug)]
pub struct HandleCounter {
    next: AtomicU64,
}

impl Default for HandleCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleCounter {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn next_handle(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}
