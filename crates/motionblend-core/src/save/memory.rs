use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::{BlendError, Result};
use crate::frame::BlendedFrame;

use super::SaveQueue;

/// In-memory queue for tests and debugging. Frames are kept in enqueue order.
#[derive(Debug, Default)]
pub struct InMemoryQueue {
    frames: Mutex<Vec<BlendedFrame>>,
    closed: AtomicBool,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every frame received so far.
    pub fn frames(&self) -> Vec<BlendedFrame> {
        self.frames.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl SaveQueue for InMemoryQueue {
    fn enqueue(&self, frame: BlendedFrame) -> Result<()> {
        if self.is_closed() {
            return Err(BlendError::QueueClosed);
        }
        self.frames.lock().push(frame);
        Ok(())
    }

    fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn interrupt(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
