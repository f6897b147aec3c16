use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::consts::{COLOR_CHANNEL_COUNT, PARALLEL_PIXEL_THRESHOLD};
use crate::error::BlendError;
use crate::frame::{BlendedFrame, DecodedFrame};
use crate::io::decode::FrameDecoder;
use crate::shutter::ShutterWindow;

/// Where the engine is in the current blend group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupPhase {
    /// No group started yet, or state was torn down.
    Idle,
    /// The group's first accepted slot has arrived; sums are being collected.
    Accumulating { group: u64 },
    /// The group's last accepted slot has arrived and its output was produced
    /// (or there was nothing to produce).
    Emitted { group: u64 },
}

/// Running per-channel sums for the group currently being blended.
///
/// Only one group is live at a time. Sub-frames are folded in as they are
/// finalized; the last accepted slot of the group turns the sums into an
/// averaged output frame.
pub struct BlendEngine {
    window: ShutterWindow,
    decoder: Box<dyn FrameDecoder>,
    sums: Vec<u32>,
    frames_merged: u32,
    width: u32,
    height: u32,
    phase: GroupPhase,
}

impl BlendEngine {
    pub fn new(window: ShutterWindow, decoder: Box<dyn FrameDecoder>) -> Self {
        Self {
            window,
            decoder,
            sums: Vec::new(),
            frames_merged: 0,
            width: 0,
            height: 0,
            phase: GroupPhase::Idle,
        }
    }

    pub fn window(&self) -> &ShutterWindow {
        &self.window
    }

    pub fn phase(&self) -> GroupPhase {
        self.phase
    }

    /// Sub-frames folded into the current sums.
    pub fn frames_merged(&self) -> u32 {
        self.frames_merged
    }

    /// Number of channel values the merge buffer currently holds.
    pub fn merge_buffer_len(&self) -> usize {
        self.sums.len()
    }

    /// Decode a finalized accepted sub-frame and fold it into its group.
    ///
    /// Returns the finished output frame when `frame_number` is the group's
    /// last accepted slot and at least one sub-frame was merged.
    pub fn process(&mut self, frame_number: u64, payload: &[u8]) -> Option<BlendedFrame> {
        let group = self.window.group(frame_number);
        let decoded = self.decoder.decode(payload);

        if self.window.is_first_of_group(frame_number) {
            let needed = decoded.as_ref().ok().map(DecodedFrame::channel_count);
            self.begin_group(group, needed);
        }

        match decoded {
            Ok(frame) => self.accumulate(frame_number, group, &frame),
            Err(e) => {
                error!(frame_number, decoder = self.decoder.name(), error = %e, "failed to decode sub-frame, skipping");
            }
        }

        if self.window.is_last_of_group(frame_number) {
            return self.finish_group(group);
        }
        None
    }

    /// Drop the merge buffer and forget the current group.
    pub fn reset(&mut self) {
        self.sums = Vec::new();
        self.frames_merged = 0;
        self.width = 0;
        self.height = 0;
        self.phase = GroupPhase::Idle;
    }

    fn begin_group(&mut self, group: u64, needed: Option<usize>) {
        if let GroupPhase::Accumulating { group: open } = self.phase {
            if open != group {
                warn!(
                    group = open,
                    frames_merged = self.frames_merged,
                    "group never reached its last slot, discarding"
                );
            }
        }

        match needed {
            Some(len) if len != self.sums.len() => {
                debug!(group, needed = len, current = self.sums.len(), "reallocating merge buffer");
                self.sums = vec![0; len];
            }
            _ => self.sums.fill(0),
        }
        self.frames_merged = 0;
        self.phase = GroupPhase::Accumulating { group };
        debug!(group, "starting blend group");
    }

    fn accumulate(&mut self, frame_number: u64, group: u64, frame: &DecodedFrame) {
        if self.phase != (GroupPhase::Accumulating { group }) {
            warn!(frame_number, group, phase = ?self.phase, "sub-frame outside an open group, skipping");
            return;
        }

        let got = frame.channels.len();
        if got != self.sums.len() || got != frame.channel_count() {
            let e = BlendError::SizeMismatch {
                frame: frame_number,
                expected: self.sums.len(),
                got,
            };
            error!(frame_number, group, error = %e, "invalid sub-frame size, skipping");
            return;
        }

        if frame.pixel_count() >= PARALLEL_PIXEL_THRESHOLD {
            self.sums
                .par_iter_mut()
                .zip(frame.channels.par_iter())
                .for_each(|(sum, &c)| *sum += u32::from(c));
        } else {
            for (sum, &c) in self.sums.iter_mut().zip(&frame.channels) {
                *sum += u32::from(c);
            }
        }

        self.frames_merged += 1;
        self.width = frame.width;
        self.height = frame.height;
        debug!(frame_number, group, frames_merged = self.frames_merged, "merged sub-frame");
    }

    fn finish_group(&mut self, group: u64) -> Option<BlendedFrame> {
        if self.phase != (GroupPhase::Accumulating { group }) {
            warn!(group, phase = ?self.phase, "last slot arrived for a group that is not open");
            return None;
        }
        self.phase = GroupPhase::Emitted { group };

        let n = self.frames_merged;
        if n == 0 {
            warn!(group, "no sub-frames merged, nothing to emit");
            return None;
        }

        let pixels = average(&self.sums, n);
        info!(group, frames_merged = n, width = self.width, height = self.height, "blended output frame");
        Some(BlendedFrame {
            index: group,
            pixels,
            width: self.width,
            height: self.height,
        })
    }
}

/// Divide each channel sum by `n` and pack the stored `[c0, c1, c2]` as
/// `c2 << 16 | c1 << 8 | c0`, i.e. `0xRRGGBB` for BGR input.
fn average(sums: &[u32], n: u32) -> Vec<u32> {
    let pack = |c: &[u32]| ((c[2] / n) << 16) | ((c[1] / n) << 8) | (c[0] / n);
    if sums.len() / COLOR_CHANNEL_COUNT >= PARALLEL_PIXEL_THRESHOLD {
        sums.par_chunks_exact(COLOR_CHANNEL_COUNT).map(pack).collect()
    } else {
        sums.chunks_exact(COLOR_CHANNEL_COUNT).map(pack).collect()
    }
}
