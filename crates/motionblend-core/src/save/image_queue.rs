use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::config::OutputConfig;
use crate::error::{BlendError, Result};
use crate::frame::BlendedFrame;
use crate::io::image_io::save_blended_as;

use super::SaveQueue;

/// Snapshot of what the save worker has done so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SaveStats {
    pub queued: u64,
    pub saved: u64,
    pub failed: u64,
    pub discarded: u64,
}

#[derive(Debug, Default)]
struct Counters {
    queued: AtomicU64,
    saved: AtomicU64,
    failed: AtomicU64,
    discarded: AtomicU64,
}

/// Writes blended frames to image files on a dedicated worker thread.
///
/// Files are named by `OutputConfig::frame_path`. Dropping the queue behaves
/// like `shutdown`.
pub struct ImageSaveQueue {
    sender: Mutex<Option<mpsc::Sender<BlendedFrame>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    interrupted: Arc<AtomicBool>,
    counters: Arc<Counters>,
}

impl ImageSaveQueue {
    /// Create the output directory and start the worker.
    pub fn spawn(output: OutputConfig) -> Result<Self> {
        std::fs::create_dir_all(&output.directory)?;

        let (tx, rx) = mpsc::channel::<BlendedFrame>();
        let interrupted = Arc::new(AtomicBool::new(false));
        let counters = Arc::new(Counters::default());

        let worker = std::thread::Builder::new()
            .name("motionblend-saver".into())
            .spawn({
                let interrupted = Arc::clone(&interrupted);
                let counters = Arc::clone(&counters);
                move || save_loop(rx, output, interrupted, counters)
            })?;

        Ok(Self {
            sender: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
            interrupted,
            counters,
        })
    }

    pub fn stats(&self) -> SaveStats {
        SaveStats {
            queued: self.counters.queued.load(Ordering::Relaxed),
            saved: self.counters.saved.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            discarded: self.counters.discarded.load(Ordering::Relaxed),
        }
    }

    fn close_intake(&self) -> bool {
        self.sender.lock().take().is_some()
    }
}

impl SaveQueue for ImageSaveQueue {
    fn enqueue(&self, frame: BlendedFrame) -> Result<()> {
        let guard = self.sender.lock();
        let tx = guard.as_ref().ok_or(BlendError::QueueClosed)?;
        tx.send(frame).map_err(|_| BlendError::QueueClosed)?;
        self.counters.queued.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn shutdown(&self) {
        if self.close_intake() {
            debug!("save queue closed, draining");
        }
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("save worker panicked");
            }
            let stats = self.stats();
            info!(saved = stats.saved, failed = stats.failed, discarded = stats.discarded, "save queue finished");
        }
    }

    fn interrupt(&self) {
        self.interrupted.store(true, Ordering::Release);
        if self.close_intake() {
            info!("save queue interrupted, pending frames dropped");
        }
    }
}

impl Drop for ImageSaveQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn save_loop(
    rx: mpsc::Receiver<BlendedFrame>,
    output: OutputConfig,
    interrupted: Arc<AtomicBool>,
    counters: Arc<Counters>,
) {
    while let Ok(frame) = rx.recv() {
        if interrupted.load(Ordering::Acquire) {
            counters.discarded.fetch_add(1, Ordering::Relaxed);
            continue;
        }

        let path = output.frame_path(frame.index);
        match save_blended_as(&frame, &path, output.format) {
            Ok(()) => {
                counters.saved.fetch_add(1, Ordering::Relaxed);
                debug!(index = frame.index, path = %path.display(), "saved output frame");
            }
            Err(e) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                error!(index = frame.index, path = %path.display(), error = %e, "failed to save output frame");
            }
        }
    }
    debug!("save worker exiting");
}
