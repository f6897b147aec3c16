use std::path::Path;

use motionblend_core::config::OutputConfig;
use motionblend_core::error::BlendError;
use motionblend_core::frame::BlendedFrame;
use motionblend_core::io::image_io::{save_blended, OutputFormat};
use motionblend_core::save::{ImageSaveQueue, InMemoryQueue, SaveQueue};

fn gradient(index: u64, width: u32, height: u32) -> BlendedFrame {
    let pixels = (0..width * height)
        .map(|i| ((i % 256) << 16) | (((i * 3) % 256) << 8) | 0x40)
        .collect();
    BlendedFrame {
        index,
        pixels,
        width,
        height,
    }
}

fn output(dir: &Path, format: OutputFormat) -> OutputConfig {
    OutputConfig {
        directory: dir.to_path_buf(),
        format,
        file_prefix: "blend_".into(),
    }
}

#[test]
fn test_save_blended_png_roundtrip() {
    let frame = gradient(0, 5, 3);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.png");

    save_blended(&frame, &path).unwrap();
    let img = image::open(&path).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (5, 3));
    for (i, px) in img.pixels().enumerate() {
        let (r, g, b) = frame.rgb(i);
        assert_eq!(px.0, [r, g, b]);
    }
}

#[test]
fn test_save_blended_rejects_bad_dimensions() {
    let frame = BlendedFrame {
        index: 0,
        pixels: vec![0; 3],
        width: 2,
        height: 2,
    };
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        save_blended(&frame, &dir.path().join("bad.png")),
        Err(BlendError::InvalidDimensions { .. })
    ));
}

#[test]
fn test_save_blended_rejects_extra_pixels() {
    let frame = BlendedFrame {
        index: 0,
        pixels: vec![0; 5],
        width: 2,
        height: 2,
    };
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("extra.png");
    assert!(matches!(
        save_blended(&frame, &path),
        Err(BlendError::InvalidDimensions { width: 2, height: 2 })
    ));
    assert!(!path.exists());
}

#[test]
fn test_image_queue_saves_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let queue = ImageSaveQueue::spawn(output(dir.path(), OutputFormat::Png)).unwrap();

    for index in 0..3 {
        queue.enqueue(gradient(index, 4, 4)).unwrap();
    }
    queue.shutdown();

    let stats = queue.stats();
    assert_eq!(stats.queued, 3);
    assert_eq!(stats.saved, 3);
    assert_eq!(stats.failed, 0);
    for index in 0..3 {
        assert!(dir.path().join(format!("blend_{index:06}.png")).exists());
    }
}

#[test]
fn test_image_queue_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let queue = ImageSaveQueue::spawn(output(&nested, OutputFormat::Bmp)).unwrap();
    queue.enqueue(gradient(12, 2, 2)).unwrap();
    queue.shutdown();
    assert!(nested.join("blend_000012.bmp").exists());
}

#[test]
fn test_image_queue_rejects_after_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let queue = ImageSaveQueue::spawn(output(dir.path(), OutputFormat::Png)).unwrap();
    queue.shutdown();
    assert!(matches!(
        queue.enqueue(gradient(0, 1, 1)),
        Err(BlendError::QueueClosed)
    ));
    // Idempotent.
    queue.shutdown();
}

#[test]
fn test_image_queue_interrupt() {
    let dir = tempfile::tempdir().unwrap();
    let queue = ImageSaveQueue::spawn(output(dir.path(), OutputFormat::Png)).unwrap();
    for index in 0..20 {
        queue.enqueue(gradient(index, 64, 64)).unwrap();
    }
    queue.interrupt();
    assert!(queue.enqueue(gradient(99, 1, 1)).is_err());
    queue.shutdown();

    let stats = queue.stats();
    assert_eq!(stats.queued, 20);
    assert_eq!(stats.saved + stats.failed + stats.discarded, 20);
}

#[test]
fn test_image_queue_counts_failures() {
    let dir = tempfile::tempdir().unwrap();
    let queue = ImageSaveQueue::spawn(output(dir.path(), OutputFormat::Png)).unwrap();
    queue
        .enqueue(BlendedFrame {
            index: 0,
            pixels: vec![0; 5],
            width: 2,
            height: 2,
        })
        .unwrap();
    queue.shutdown();
    assert_eq!(queue.stats().failed, 1);
}

#[test]
fn test_in_memory_queue() {
    let queue = InMemoryQueue::new();
    assert!(queue.is_empty());
    queue.enqueue(gradient(1, 1, 1)).unwrap();
    queue.enqueue(gradient(2, 1, 1)).unwrap();
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.frames()[1].index, 2);

    queue.shutdown();
    assert!(queue.enqueue(gradient(3, 1, 1)).is_err());
    assert_eq!(queue.len(), 2);
}

#[test]
fn test_rgb_bytes() {
    let frame = BlendedFrame {
        index: 0,
        pixels: vec![0x112233, 0xAABBCC],
        width: 2,
        height: 1,
    };
    assert_eq!(frame.to_rgb_bytes(), vec![0x11, 0x22, 0x33, 0xAA, 0xBB, 0xCC]);
}
