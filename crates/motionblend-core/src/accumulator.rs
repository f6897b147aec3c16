use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::cache::FrameSizeCache;
use crate::consts::INITIAL_BUFFER_CAPACITY;

/// Raw bytes of every accepted sub-frame that is still being written.
///
/// Not synchronized on its own: `FrameBlender` keeps it behind the buffer
/// mutex together with the size cache it owns.
#[derive(Debug)]
pub struct FrameAccumulator {
    frames: HashMap<u64, Vec<u8>>,
    sizes: FrameSizeCache,
    /// Largest finalized payload so far; new buffers reserve this up front.
    capacity_hint: usize,
}

impl Default for FrameAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAccumulator {
    pub fn new() -> Self {
        Self::with_sizes(FrameSizeCache::new())
    }

    pub fn with_size_ttl(ttl: Duration) -> Self {
        Self::with_sizes(FrameSizeCache::with_ttl(ttl))
    }

    fn with_sizes(sizes: FrameSizeCache) -> Self {
        Self {
            frames: HashMap::new(),
            sizes,
            capacity_hint: INITIAL_BUFFER_CAPACITY,
        }
    }

    /// Place `bytes` at `offset` in the frame's buffer, creating it on first use.
    ///
    /// Writing past the end zero-fills the gap, as long as the gap is no larger
    /// than the capacity hint. Returns the number of bytes consumed, or 0 if the
    /// write was refused or the buffer could not grow; a refused write leaves
    /// no buffer or size behind.
    pub fn write(&mut self, frame_number: u64, bytes: &[u8], offset: u64) -> usize {
        let Some((start, end)) = byte_range(offset, bytes.len()) else {
            warn!(frame_number, offset, len = bytes.len(), "write range overflows address space");
            return 0;
        };

        let capacity_hint = self.capacity_hint;
        let placed = match self.frames.entry(frame_number) {
            Entry::Occupied(mut e) => place(frame_number, e.get_mut(), start, bytes, capacity_hint),
            Entry::Vacant(e) => {
                let mut buf = Vec::new();
                if start <= capacity_hint {
                    // A failed hint is not fatal; the exact reservation in `place` decides.
                    let _ = buf.try_reserve_exact(capacity_hint.max(end));
                }
                let placed = place(frame_number, &mut buf, start, bytes, capacity_hint);
                if placed {
                    debug!(frame_number, capacity = buf.capacity(), "allocated sub-frame buffer");
                    e.insert(buf);
                }
                placed
            }
        };
        if !placed {
            return 0;
        }

        self.extend_size(frame_number, end as u64);
        bytes.len()
    }

    /// Grow the recorded logical size to cover `end` without buffering anything.
    pub fn extend_size(&mut self, frame_number: u64, end: u64) {
        let size = self.sizes.get(frame_number).unwrap_or(0).max(end);
        self.sizes.put(frame_number, size);
    }

    pub fn truncate(&mut self, frame_number: u64, length: u64) {
        self.sizes.put(frame_number, length);
    }

    /// Remove the frame's buffer and hand over its bytes. `None` if the frame
    /// was never written or has already been taken.
    pub fn take(&mut self, frame_number: u64) -> Option<Vec<u8>> {
        let buffer = self.frames.remove(&frame_number)?;
        self.capacity_hint = self.capacity_hint.max(buffer.len());
        Some(buffer)
    }

    /// Logical size of the frame, 0 if unknown or expired.
    pub fn frame_size(&self, frame_number: u64) -> u64 {
        self.sizes.get(frame_number).unwrap_or(0)
    }

    pub fn contains(&self, frame_number: u64) -> bool {
        self.frames.contains_key(&frame_number)
    }

    /// Number of frames currently holding a buffer.
    pub fn pending(&self) -> usize {
        self.frames.len()
    }

    pub fn capacity_hint(&self) -> usize {
        self.capacity_hint
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.sizes.clear();
    }
}

/// Copy `bytes` into `buffer` at `start`, growing it first if needed.
fn place(
    frame_number: u64,
    buffer: &mut Vec<u8>,
    start: usize,
    bytes: &[u8],
    max_gap: usize,
) -> bool {
    let end = start + bytes.len();
    if start > buffer.len() && start - buffer.len() > max_gap {
        warn!(
            frame_number,
            offset = start,
            buffered = buffer.len(),
            max_gap,
            "write leaves a gap larger than any frame seen, refusing"
        );
        return false;
    }
    if end > buffer.len() {
        if let Err(e) = buffer.try_reserve(end - buffer.len()) {
            error!(frame_number, needed = end, error = %e, "failed to grow sub-frame buffer");
            return false;
        }
        buffer.resize(end, 0);
    }
    buffer[start..end].copy_from_slice(bytes);
    true
}

fn byte_range(offset: u64, len: usize) -> Option<(usize, usize)> {
    let start = usize::try_from(offset).ok()?;
    let end = start.checked_add(len)?;
    Some((start, end))
}
