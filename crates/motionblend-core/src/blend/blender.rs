use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, error, info, trace, warn};

use crate::accumulator::FrameAccumulator;
use crate::config::BlendConfig;
use crate::error::Result;
use crate::handler::VideoHandler;
use crate::io::decode::FrameDecoder;
use crate::io::tga::TgaDecoder;
use crate::save::SaveQueue;
use crate::shutter::ShutterWindow;

use super::engine::{BlendEngine, GroupPhase};

/// State guarded by the merge mutex.
struct MergeStage {
    engine: BlendEngine,
    queue: Option<Arc<dyn SaveQueue>>,
}

/// Video handler that blends each shutter window of sub-frames into one
/// motion-blurred output frame.
///
/// Two locks, always taken in this order when both are needed:
/// 1. the buffer mutex, around sub-frame buffers and sizes, held only for
///    lookups, inserts and removals;
/// 2. the merge mutex, around the blend engine, held for the whole
///    decode, merge and emit of one finalized sub-frame.
///
/// Only `destroy` ever holds both.
pub struct FrameBlender {
    window: ShutterWindow,
    buffers: Mutex<FrameAccumulator>,
    merge: Mutex<MergeStage>,
    destroyed: AtomicBool,
}

impl FrameBlender {
    pub fn new(
        config: &BlendConfig,
        decoder: Box<dyn FrameDecoder>,
        queue: Arc<dyn SaveQueue>,
    ) -> Result<Self> {
        let window = config.window()?;
        info!(
            blend_rate = window.blend_rate(),
            shutter_angle = config.shutter_angle,
            min_accepted = window.min_accepted(),
            max_accepted = window.max_accepted(),
            "frame blender ready"
        );
        Ok(Self {
            window,
            buffers: Mutex::new(FrameAccumulator::new()),
            merge: Mutex::new(MergeStage {
                engine: BlendEngine::new(window, decoder),
                queue: Some(queue),
            }),
            destroyed: AtomicBool::new(false),
        })
    }

    /// Blender for TGA sub-frames.
    pub fn with_tga(config: &BlendConfig, queue: Arc<dyn SaveQueue>) -> Result<Self> {
        Self::new(config, Box::new(TgaDecoder::new()), queue)
    }

    /// Replace the frame-size TTL. Any sizes recorded so far are dropped.
    pub fn with_size_ttl(self, ttl: Duration) -> Self {
        *self.buffers.lock() = FrameAccumulator::with_size_ttl(ttl);
        self
    }

    pub fn window(&self) -> &ShutterWindow {
        &self.window
    }

    /// Whether `frame_number` currently owns a sub-frame buffer.
    pub fn has_buffer(&self, frame_number: u64) -> bool {
        self.buffers.lock().contains(frame_number)
    }

    /// Number of sub-frames written but not yet closed.
    pub fn pending_frames(&self) -> usize {
        self.buffers.lock().pending()
    }

    pub fn frames_merged(&self) -> u32 {
        self.merge.lock().engine.frames_merged()
    }

    pub fn phase(&self) -> GroupPhase {
        self.merge.lock().engine.phase()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    fn finalize(&self, frame_number: u64, payload: Vec<u8>) {
        let mut stage = self.merge.lock();
        if self.is_destroyed() {
            debug!(frame_number, "blender destroyed while sub-frame was closing, dropping");
            return;
        }
        trace!(frame_number, thread = ?std::thread::current().id(), "merging sub-frame");
        let Some(output) = stage.engine.process(frame_number, &payload) else {
            return;
        };

        let index = output.index;
        match stage.queue.as_ref() {
            Some(queue) => {
                if let Err(e) = queue.enqueue(output) {
                    error!(index, error = %e, "failed to queue output frame");
                }
            }
            None => warn!(index, "no save queue, dropping output frame"),
        }
    }
}

impl VideoHandler for FrameBlender {
    fn create(&self, frame_number: u64) {
        trace!(frame_number, "create");
    }

    fn write(&self, frame_number: u64, bytes: &[u8], offset: u64) -> usize {
        if self.is_destroyed() {
            return 0;
        }
        if self.window.should_ignore(frame_number) {
            self.buffers
                .lock()
                .extend_size(frame_number, offset.saturating_add(bytes.len() as u64));
            return bytes.len();
        }
        self.buffers.lock().write(frame_number, bytes, offset)
    }

    fn truncate(&self, frame_number: u64, length: u64) {
        if self.is_destroyed() {
            return;
        }
        self.buffers.lock().truncate(frame_number, length);
    }

    fn close(&self, frame_number: u64) {
        if self.window.should_ignore(frame_number) {
            debug!(frame_number, "sub-frame closed, outside shutter window");
            return;
        }
        if self.is_destroyed() {
            return;
        }

        let payload = self.buffers.lock().take(frame_number);
        match payload {
            Some(payload) => {
                debug!(frame_number, bytes = payload.len(), "sub-frame closed, processing");
                self.finalize(frame_number, payload);
            }
            None => debug!(frame_number, "duplicate close, ignoring"),
        }
    }

    fn destroy(&self) {
        let mut buffers = self.buffers.lock();
        let mut stage = self.merge.lock();
        self.destroyed.store(true, Ordering::Release);

        let dropped = buffers.pending();
        buffers.clear();
        stage.engine.reset();
        if let Some(queue) = stage.queue.take() {
            queue.interrupt();
        }
        info!(dropped_sub_frames = dropped, "frame blender destroyed");
    }

    fn frame_size(&self, frame_number: u64) -> u64 {
        self.buffers.lock().frame_size(frame_number)
    }

    fn is_locked(&self) -> bool {
        self.buffers.is_locked() || self.merge.is_locked()
    }
}
