use crate::consts::COLOR_CHANNEL_COUNT;

/// A decoded sub-frame.
///
/// `channels` is row-major in the order the source stored it, three values per
/// pixel. For raw captures that order is `[blue, green, red]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedFrame {
    pub width: u32,
    pub height: u32,
    pub channels: Vec<u8>,
}

impl DecodedFrame {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of channel values the merge buffer needs to hold this frame.
    pub fn channel_count(&self) -> usize {
        self.pixel_count() * COLOR_CHANNEL_COUNT
    }
}

/// One finished motion-blurred output frame, ready to be persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlendedFrame {
    /// Output frame index (`frame_number / blend_rate`).
    pub index: u64,
    /// Packed `0xRRGGBB`, row-major.
    pub pixels: Vec<u32>,
    pub width: u32,
    pub height: u32,
}

impl BlendedFrame {
    /// Unpack pixel `i` into `(r, g, b)`.
    pub fn rgb(&self, i: usize) -> (u8, u8, u8) {
        let p = self.pixels[i];
        ((p >> 16) as u8, (p >> 8) as u8, p as u8)
    }

    /// Interleaved RGB bytes, suitable for an `image::RgbImage`.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * COLOR_CHANNEL_COUNT);
        for &p in &self.pixels {
            out.push((p >> 16) as u8);
            out.push((p >> 8) as u8);
            out.push(p as u8);
        }
        out
    }
}
