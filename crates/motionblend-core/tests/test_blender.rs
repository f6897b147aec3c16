#[allow(dead_code)]
mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use motionblend_core::blend::GroupPhase;
use motionblend_core::handler::{HandleCounter, VideoHandler};
use motionblend_core::save::SaveQueue;

use common::{blender, deliver, solid_tga, write_chunked};

#[test]
fn test_full_group_emits_once() {
    let (b, queue) = blender(4, 360);
    let payload = solid_tga(4, 4, [10, 20, 30]);
    for frame in 0..4 {
        deliver(&b, frame, &payload);
    }

    let frames = queue.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].index, 0);
    assert!(frames[0].pixels.iter().all(|&p| p == 0x1E140A));
    assert_eq!(b.pending_frames(), 0);
}

#[test]
fn test_ignored_write_never_buffers() {
    let (b, queue) = blender(4, 180);
    // Slots 0 and 3 are outside the 1..=2 window.
    let big = vec![0xAB; 1 << 20];
    assert_eq!(b.write(0, &big, 0), big.len());
    assert_eq!(b.write(3, &big, 0), big.len());
    assert_eq!(b.write(7, b"tiny", 0), 4);

    assert!(!b.has_buffer(0));
    assert!(!b.has_buffer(3));
    assert!(!b.has_buffer(7));
    assert_eq!(b.pending_frames(), 0);

    b.close(0);
    b.close(3);
    assert!(queue.is_empty());
}

#[test]
fn test_ignored_write_still_reports_size() {
    let (b, _queue) = blender(4, 180);
    b.write(0, &[0u8; 100], 0);
    b.write(0, &[0u8; 50], 100);
    assert_eq!(b.frame_size(0), 150);
}

#[test]
fn test_duplicate_close_is_noop() {
    let (b, queue) = blender(2, 360);
    let payload = solid_tga(2, 2, [1, 2, 3]);
    deliver(&b, 0, &payload);
    deliver(&b, 1, &payload);
    assert_eq!(queue.len(), 1);

    b.close(1);
    b.close(1);
    b.close(0);
    assert_eq!(queue.len(), 1);
    assert_eq!(b.frames_merged(), 2);
}

#[test]
fn test_close_without_write_is_noop() {
    let (b, queue) = blender(1, 360);
    b.create(5);
    b.close(5);
    assert!(queue.is_empty());
    assert_eq!(b.phase(), GroupPhase::Idle);
}

#[test]
fn test_frame_size_tracks_writes_and_truncate() {
    let (b, _queue) = blender(2, 360);
    assert_eq!(b.frame_size(0), 0);
    b.truncate(0, 1000);
    assert_eq!(b.frame_size(0), 1000);
    assert!(!b.has_buffer(0));

    b.write(1, b"abcd", 0);
    assert_eq!(b.frame_size(1), 4);
    b.truncate(1, 2);
    assert_eq!(b.frame_size(1), 2);
}

#[test]
fn test_frame_size_expires() {
    let (b, _queue) = blender(2, 360);
    let b = b.with_size_ttl(Duration::from_millis(20));
    b.truncate(0, 64);
    assert_eq!(b.frame_size(0), 64);
    thread::sleep(Duration::from_millis(60));
    assert_eq!(b.frame_size(0), 0);
}

#[test]
fn test_shutter_window_excludes_slots() {
    let (b, queue) = blender(4, 180);
    for frame in 0..4u64 {
        // Ignored slots carry a colour that would skew the mean.
        let bgr = if frame == 1 || frame == 2 { [100, 100, 100] } else { [0, 0, 0] };
        deliver(&b, frame, &solid_tga(2, 2, bgr));
    }
    let frames = queue.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].rgb(0), (100, 100, 100));
}

#[test]
fn test_consecutive_groups() {
    let (b, queue) = blender(3, 360);
    for frame in 0..9u64 {
        let v = (frame / 3) as u8 * 50;
        deliver(&b, frame, &solid_tga(1, 1, [v, v, v]));
    }
    let indices: Vec<u64> = queue.frames().iter().map(|f| f.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert_eq!(queue.frames()[2].rgb(0), (100, 100, 100));
}

#[test]
fn test_concurrent_writes_then_closes() {
    let (b, queue) = blender(4, 360);
    let b = Arc::new(b);
    let frames: Vec<u64> = (0..16).collect();

    let handles: Vec<_> = frames
        .iter()
        .map(|&frame| {
            let b = Arc::clone(&b);
            thread::spawn(move || {
                let v = (frame % 4) as u8 * 10;
                b.create(frame);
                write_chunked(b.as_ref(), frame, &solid_tga(8, 8, [v, v, v]), 13);
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(b.pending_frames(), 16);

    for &frame in &frames {
        b.close(frame);
    }

    let out = queue.frames();
    assert_eq!(out.len(), 4);
    for f in &out {
        // (0 + 10 + 20 + 30) / 4
        assert_eq!(f.rgb(0), (15, 15, 15));
    }
    assert_eq!(b.pending_frames(), 0);
}

#[test]
fn test_concurrent_closes_of_distinct_slots() {
    for _ in 0..20 {
        let (b, queue) = blender(8, 360);
        let b = Arc::new(b);
        for frame in 0..8u64 {
            let v = frame as u8 * 10;
            write_chunked(b.as_ref(), frame, &solid_tga(6, 5, [v, v, v]), 32);
        }

        b.close(0);
        let handles: Vec<_> = (1..=6u64)
            .map(|frame| {
                let b = Arc::clone(&b);
                thread::spawn(move || b.close(frame))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(queue.is_empty());
        b.close(7);

        let out = queue.frames();
        assert_eq!(out.len(), 1);
        // (0 + 10 + ... + 70) / 8
        assert!(out[0].pixels.iter().all(|&p| p == 0x232323));
        assert_eq!(b.pending_frames(), 0);
    }
}

#[test]
fn test_refused_write_creates_no_buffer() {
    let (b, _queue) = blender(2, 360);
    assert_eq!(b.write(1, b"x", 1u64 << 46), 0);
    assert!(!b.has_buffer(1));
    assert_eq!(b.write(1, b"x", u64::MAX), 0);
    assert_eq!(b.pending_frames(), 0);
    assert_eq!(b.frame_size(1), 0);
}

#[test]
fn test_concurrent_duplicate_closes_emit_once() {
    let (b, queue) = blender(1, 360);
    let b = Arc::new(b);
    write_chunked(b.as_ref(), 0, &solid_tga(16, 16, [1, 1, 1]), 64);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let b = Arc::clone(&b);
            thread::spawn(move || b.close(0))
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(queue.len(), 1);
}

#[test]
fn test_is_locked_at_rest() {
    let (b, _queue) = blender(2, 360);
    assert!(!b.is_locked());
    b.write(0, b"x", 0);
    assert!(!b.is_locked());
}

#[test]
fn test_destroy_clears_state_and_interrupts_queue() {
    let (b, queue) = blender(2, 360);
    deliver(&b, 0, &solid_tga(1, 1, [1, 1, 1]));
    b.write(2, b"partial", 0);

    b.destroy();
    assert!(b.is_destroyed());
    assert!(queue.is_closed());
    assert_eq!(b.pending_frames(), 0);
    assert_eq!(b.phase(), GroupPhase::Idle);
    assert_eq!(b.frame_size(2), 0);

    // Everything after teardown is inert.
    assert_eq!(b.write(1, b"late", 0), 0);
    b.close(1);
    assert!(queue.is_empty());
    assert!(queue.enqueue(motionblend_core::frame::BlendedFrame {
        index: 0,
        pixels: vec![],
        width: 0,
        height: 0,
    })
    .is_err());
}

#[test]
fn test_find_results_untouched() {
    let (b, _queue) = blender(2, 360);
    let mut listing = vec!["a.tga".to_string(), "b.tga".to_string()];
    b.modify_find_results(std::path::Path::new("/"), &mut listing);
    assert_eq!(listing, vec!["a.tga", "b.tga"]);
}

#[test]
fn test_handle_counter() {
    let counter = Arc::new(HandleCounter::new());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let counter = Arc::clone(&counter);
            thread::spawn(move || (0..100).map(|_| counter.next_handle()).collect::<Vec<_>>())
        })
        .collect();
    let mut all: Vec<u64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
    all.sort_unstable();
    assert_eq!(all, (1..=400).collect::<Vec<u64>>());
}
