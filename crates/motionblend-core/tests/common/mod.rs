use std::sync::Arc;

use motionblend_core::blend::FrameBlender;
use motionblend_core::config::BlendConfig;
use motionblend_core::handler::VideoHandler;
use motionblend_core::io::tga::TGA_HEADER_SIZE;
use motionblend_core::save::InMemoryQueue;

/// Descriptor bit marking row 0 as the top of the image.
pub const TOP_LEFT: u8 = 0x20;
/// Default TGA orientation: row 0 is the bottom of the image.
pub const BOTTOM_LEFT: u8 = 0x00;

/// Build an 18-byte TGA header.
pub fn build_tga_header(
    image_type: u8,
    width: u16,
    height: u16,
    pixel_depth: u8,
    descriptor: u8,
    id_length: u8,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(TGA_HEADER_SIZE);
    buf.push(id_length);
    buf.push(0); // no colour map
    buf.push(image_type);
    buf.extend_from_slice(&0u16.to_le_bytes()); // colour map first entry
    buf.extend_from_slice(&0u16.to_le_bytes()); // colour map length
    buf.push(0); // colour map entry size
    buf.extend_from_slice(&0u16.to_le_bytes()); // x origin
    buf.extend_from_slice(&0u16.to_le_bytes()); // y origin
    buf.extend_from_slice(&width.to_le_bytes());
    buf.extend_from_slice(&height.to_le_bytes());
    buf.push(pixel_depth);
    buf.push(descriptor);
    assert_eq!(buf.len(), TGA_HEADER_SIZE);
    buf
}

/// Uncompressed 24-bit TGA with `[b, g, r]` pixels given in stored order.
pub fn build_tga(width: u16, height: u16, descriptor: u8, pixels: &[[u8; 3]]) -> Vec<u8> {
    assert_eq!(pixels.len(), width as usize * height as usize);
    let mut buf = build_tga_header(2, width, height, 24, descriptor, 0);
    for px in pixels {
        buf.extend_from_slice(px);
    }
    buf
}

/// Uncompressed 24-bit top-left TGA where every pixel is `bgr`.
pub fn solid_tga(width: u16, height: u16, bgr: [u8; 3]) -> Vec<u8> {
    let pixels = vec![bgr; width as usize * height as usize];
    build_tga(width, height, TOP_LEFT, &pixels)
}

/// Blender writing into an in-memory queue.
pub fn blender(blend_rate: u32, shutter_angle: u32) -> (FrameBlender, Arc<InMemoryQueue>) {
    let queue = Arc::new(InMemoryQueue::new());
    let config = BlendConfig {
        blend_rate,
        shutter_angle,
    };
    let blender = FrameBlender::with_tga(&config, queue.clone()).expect("valid blend config");
    (blender, queue)
}

/// Write `payload` in `chunk`-sized pieces at increasing offsets.
pub fn write_chunked(handler: &dyn VideoHandler, frame_number: u64, payload: &[u8], chunk: usize) {
    let mut offset = 0u64;
    for piece in payload.chunks(chunk) {
        let written = handler.write(frame_number, piece, offset);
        assert_eq!(written, piece.len());
        offset += piece.len() as u64;
    }
}

/// Create, write and close one sub-frame the way the driver would.
pub fn deliver(handler: &dyn VideoHandler, frame_number: u64, payload: &[u8]) {
    handler.create(frame_number);
    write_chunked(handler, frame_number, payload, 7);
    handler.close(frame_number);
}
