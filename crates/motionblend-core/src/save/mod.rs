mod image_queue;
mod memory;

pub use image_queue::{ImageSaveQueue, SaveStats};
pub use memory::InMemoryQueue;

use crate::error::Result;
use crate::frame::BlendedFrame;

/// Sink for finished output frames.
///
/// `enqueue` must return without waiting for the frame to be persisted: it is
/// called from a filesystem close path. Implementations should process frames
/// in FIFO order, though the blender does not rely on it.
pub trait SaveQueue: Send + Sync {
    /// Hand over a finished frame. Fails with `QueueClosed` once the queue has
    /// been shut down or interrupted.
    fn enqueue(&self, frame: BlendedFrame) -> Result<()>;

    /// Stop accepting work, finish what is queued, and release the worker.
    fn shutdown(&self);

    /// Stop accepting work and drop whatever has not been saved yet.
    fn interrupt(&self);
}
