use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::consts::COLOR_CHANNEL_COUNT;
use crate::error::{BlendError, Result};
use crate::frame::DecodedFrame;
use crate::io::decode::FrameDecoder;

pub const TGA_HEADER_SIZE: usize = 18;

const IMAGE_TYPE_TRUE_COLOR: u8 = 2;
const IMAGE_TYPE_RLE_TRUE_COLOR: u8 = 10;

const DESCRIPTOR_RIGHT_TO_LEFT: u8 = 0x10;
const DESCRIPTOR_TOP_TO_BOTTOM: u8 = 0x20;

const RLE_RUN_FLAG: u8 = 0x80;

/// TGA file header (18 bytes).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TgaHeader {
    pub id_length: u8,
    pub color_map_type: u8,
    pub image_type: u8,
    pub color_map_length: u16,
    pub color_map_entry_size: u8,
    pub width: u16,
    pub height: u16,
    pub pixel_depth: u8,
    pub descriptor: u8,
}

impl TgaHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < TGA_HEADER_SIZE {
            return Err(BlendError::InvalidTga(format!(
                "payload too small for header: {} bytes",
                bytes.len()
            )));
        }

        let mut cursor = Cursor::new(&bytes[..TGA_HEADER_SIZE]);
        let id_length = cursor.read_u8()?;
        let color_map_type = cursor.read_u8()?;
        let image_type = cursor.read_u8()?;
        let _color_map_first = cursor.read_u16::<LittleEndian>()?;
        let color_map_length = cursor.read_u16::<LittleEndian>()?;
        let color_map_entry_size = cursor.read_u8()?;
        let _x_origin = cursor.read_u16::<LittleEndian>()?;
        let _y_origin = cursor.read_u16::<LittleEndian>()?;
        let width = cursor.read_u16::<LittleEndian>()?;
        let height = cursor.read_u16::<LittleEndian>()?;
        let pixel_depth = cursor.read_u8()?;
        let descriptor = cursor.read_u8()?;

        if width == 0 || height == 0 {
            return Err(BlendError::InvalidDimensions {
                width: u32::from(width),
                height: u32::from(height),
            });
        }

        Ok(Self {
            id_length,
            color_map_type,
            image_type,
            color_map_length,
            color_map_entry_size,
            width,
            height,
            pixel_depth,
            descriptor,
        })
    }

    pub fn is_rle(&self) -> bool {
        self.image_type == IMAGE_TYPE_RLE_TRUE_COLOR
    }

    pub fn bytes_per_pixel(&self) -> usize {
        usize::from(self.pixel_depth).div_ceil(8)
    }

    pub fn pixel_count(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// Row 0 of the stored data is the top of the image.
    pub fn origin_top(&self) -> bool {
        self.descriptor & DESCRIPTOR_TOP_TO_BOTTOM != 0
    }

    /// Column 0 of the stored data is the right edge of the image.
    pub fn origin_right(&self) -> bool {
        self.descriptor & DESCRIPTOR_RIGHT_TO_LEFT != 0
    }

    /// Offset of the first pixel byte: header, image ID, then colour map.
    pub fn data_offset(&self) -> usize {
        let color_map_bytes = if self.color_map_type == 0 {
            0
        } else {
            usize::from(self.color_map_length) * usize::from(self.color_map_entry_size).div_ceil(8)
        };
        TGA_HEADER_SIZE + usize::from(self.id_length) + color_map_bytes
    }

    /// Reject anything the decoder can't turn into channel triples.
    pub fn check_supported(&self) -> Result<()> {
        if self.image_type != IMAGE_TYPE_TRUE_COLOR && self.image_type != IMAGE_TYPE_RLE_TRUE_COLOR {
            return Err(BlendError::UnsupportedTga(format!(
                "image type {} (only true-colour 2 and 10 are supported)",
                self.image_type
            )));
        }
        if self.pixel_depth != 24 && self.pixel_depth != 32 {
            return Err(BlendError::UnsupportedTga(format!(
                "{} bits per pixel (expected 24 or 32)",
                self.pixel_depth
            )));
        }
        Ok(())
    }
}

/// Decoder for true-colour TGA captures, raw or run-length encoded.
///
/// Channel triples keep the stored `B, G, R` order; alpha is dropped. Rows are
/// normalized to top-down, left-to-right regardless of the header's origin bits.
#[derive(Clone, Copy, Debug, Default)]
pub struct TgaDecoder;

impl TgaDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl FrameDecoder for TgaDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedFrame> {
        let header = TgaHeader::parse(bytes)?;
        header.check_supported()?;

        let offset = header.data_offset();
        if offset > bytes.len() {
            return Err(BlendError::InvalidTga(format!(
                "pixel data offset {offset} beyond payload of {} bytes",
                bytes.len()
            )));
        }
        let data = &bytes[offset..];

        let stored = if header.is_rle() {
            expand_rle(data, &header)?
        } else {
            strip_alpha(data, &header)?
        };

        let channels = reorient(stored, &header);
        Ok(DecodedFrame {
            width: u32::from(header.width),
            height: u32::from(header.height),
            channels,
        })
    }

    fn name(&self) -> &str {
        "tga"
    }
}

/// Copy raw pixels into packed triples, in stored order.
fn strip_alpha(data: &[u8], header: &TgaHeader) -> Result<Vec<u8>> {
    let bpp = header.bytes_per_pixel();
    let pixels = header.pixel_count();
    let needed = pixels * bpp;
    if data.len() < needed {
        return Err(BlendError::InvalidTga(format!(
            "truncated pixel data: expected {needed} bytes, got {}",
            data.len()
        )));
    }

    let mut out = Vec::with_capacity(pixels * COLOR_CHANNEL_COUNT);
    for px in data[..needed].chunks_exact(bpp) {
        out.extend_from_slice(&px[..COLOR_CHANNEL_COUNT]);
    }
    Ok(out)
}

/// Expand run-length packets into packed triples, in stored order.
/// Packets may span scanlines.
fn expand_rle(data: &[u8], header: &TgaHeader) -> Result<Vec<u8>> {
    let bpp = header.bytes_per_pixel();
    let pixels = header.pixel_count();
    let mut out = Vec::with_capacity(pixels * COLOR_CHANNEL_COUNT);
    let mut pos = 0usize;
    let truncated = || BlendError::InvalidTga("truncated run-length data".into());

    while out.len() < pixels * COLOR_CHANNEL_COUNT {
        let packet = *data.get(pos).ok_or_else(truncated)?;
        pos += 1;
        let count = usize::from(packet & !RLE_RUN_FLAG) + 1;
        let remaining = pixels - out.len() / COLOR_CHANNEL_COUNT;
        if count > remaining {
            return Err(BlendError::InvalidTga(format!(
                "run-length packet of {count} pixels overruns image ({remaining} left)"
            )));
        }

        if packet & RLE_RUN_FLAG != 0 {
            let px = data.get(pos..pos + bpp).ok_or_else(truncated)?;
            pos += bpp;
            for _ in 0..count {
                out.extend_from_slice(&px[..COLOR_CHANNEL_COUNT]);
            }
        } else {
            let run = data.get(pos..pos + count * bpp).ok_or_else(truncated)?;
            pos += count * bpp;
            for px in run.chunks_exact(bpp) {
                out.extend_from_slice(&px[..COLOR_CHANNEL_COUNT]);
            }
        }
    }

    Ok(out)
}

fn reorient(stored: Vec<u8>, header: &TgaHeader) -> Vec<u8> {
    let flip_rows = !header.origin_top();
    let flip_cols = header.origin_right();
    if !flip_rows && !flip_cols {
        return stored;
    }

    let w = usize::from(header.width);
    let h = usize::from(header.height);
    let mut out = vec![0u8; stored.len()];
    for row in 0..h {
        let dst_row = if flip_rows { h - 1 - row } else { row };
        for col in 0..w {
            let dst_col = if flip_cols { w - 1 - col } else { col };
            let src = (row * w + col) * COLOR_CHANNEL_COUNT;
            let dst = (dst_row * w + dst_col) * COLOR_CHANNEL_COUNT;
            out[dst..dst + COLOR_CHANNEL_COUNT]
                .copy_from_slice(&stored[src..src + COLOR_CHANNEL_COUNT]);
        }
    }
    out
}
