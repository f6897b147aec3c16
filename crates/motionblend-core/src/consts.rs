use std::time::Duration;

/// Inactivity period after which a frame-size entry is forgotten.
pub const FRAME_SIZE_TTL: Duration = Duration::from_secs(30);

/// Initial capacity reserved for a new sub-frame buffer before any frame
/// has been finalized. Grows to the largest payload seen.
pub const INITIAL_BUFFER_CAPACITY: usize = 1_048_576;

/// Minimum pixel count to use Rayon parallelism for merge and averaging loops.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Number of channels carried per pixel in a decoded sub-frame.
pub const COLOR_CHANNEL_COUNT: usize = 3;

/// Upper bound on the blend rate. Keeps `255 * blend_rate` inside a `u32`
/// channel sum with plenty of headroom.
pub const MAX_BLEND_RATE: u32 = 65_536;

/// Full shutter, in degrees.
pub const FULL_SHUTTER_ANGLE: u32 = 360;
