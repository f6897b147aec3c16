use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::consts::FRAME_SIZE_TTL;

/// Logical byte length claimed for each in-flight or ignored frame.
///
/// Entries expire `ttl` after their last `put`. Expiry is checked lazily on
/// `get`; `put` additionally sweeps the whole map at most once per TTL period,
/// so keys that are written but never read again do not accumulate.
#[derive(Debug)]
pub struct FrameSizeCache {
    ttl: Duration,
    entries: HashMap<u64, SizeEntry>,
    last_sweep: Instant,
}

#[derive(Clone, Copy, Debug)]
struct SizeEntry {
    size: u64,
    touched: Instant,
}

impl Default for FrameSizeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSizeCache {
    pub fn new() -> Self {
        Self::with_ttl(FRAME_SIZE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
            last_sweep: Instant::now(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Insert or overwrite, refreshing the entry's timer.
    pub fn put(&mut self, frame_number: u64, size: u64) {
        self.put_at(frame_number, size, Instant::now());
    }

    /// Cached size, or `None` if never set or expired.
    pub fn get(&self, frame_number: u64) -> Option<u64> {
        self.get_at(frame_number, Instant::now())
    }

    /// Number of entries currently held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop every expired entry.
    pub fn sweep(&mut self) {
        self.sweep_at(Instant::now());
    }

    fn put_at(&mut self, frame_number: u64, size: u64, now: Instant) {
        if now.saturating_duration_since(self.last_sweep) >= self.ttl {
            self.sweep_at(now);
        }
        self.entries.insert(
            frame_number,
            SizeEntry {
                size,
                touched: now,
            },
        );
    }

    fn get_at(&self, frame_number: u64, now: Instant) -> Option<u64> {
        self.entries
            .get(&frame_number)
            .filter(|entry| now.saturating_duration_since(entry.touched) <= self.ttl)
            .map(|entry| entry.size)
    }

    fn sweep_at(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.touched) <= ttl);
        self.last_sweep = now;
    }
}
