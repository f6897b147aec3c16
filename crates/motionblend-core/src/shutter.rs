use crate::consts::{FULL_SHUTTER_ANGLE, MAX_BLEND_RATE};
use crate::error::{BlendError, Result};

/// Range of slot positions inside a blend group whose sub-frames are kept.
///
/// A group of `blend_rate` consecutive sub-frames models one output frame's
/// exposure interval; the shutter angle decides how much of it the virtual
/// shutter is open for. A partially open shutter skips slot 0 so the kept
/// slots sit one step into the interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShutterWindow {
    blend_rate: u32,
    min_accepted: u32,
    max_accepted: u32,
}

impl ShutterWindow {
    /// Compute the window for `blend_rate` sub-frames per output frame and a
    /// shutter angle in whole degrees, `0 < shutter_angle <= 360`.
    pub fn new(blend_rate: u32, shutter_angle: u32) -> Result<Self> {
        if blend_rate == 0 || blend_rate > MAX_BLEND_RATE {
            return Err(BlendError::InvalidConfig(format!(
                "blend rate must be in 1..={MAX_BLEND_RATE}, got {blend_rate}"
            )));
        }
        if shutter_angle == 0 || shutter_angle > FULL_SHUTTER_ANGLE {
            return Err(BlendError::InvalidConfig(format!(
                "shutter angle must be in 1..={FULL_SHUTTER_ANGLE} degrees, got {shutter_angle}"
            )));
        }

        // ceil(angle * rate / 360) - 1, in integers.
        let open_slots = (u64::from(shutter_angle) * u64::from(blend_rate))
            .div_ceil(u64::from(FULL_SHUTTER_ANGLE)) as u32;
        let mut max_accepted = open_slots - 1;
        let min_accepted = if max_accepted < blend_rate - 1 {
            max_accepted += 1;
            1
        } else {
            0
        };

        Ok(Self {
            blend_rate,
            min_accepted,
            max_accepted,
        })
    }

    pub fn blend_rate(&self) -> u32 {
        self.blend_rate
    }

    pub fn min_accepted(&self) -> u32 {
        self.min_accepted
    }

    pub fn max_accepted(&self) -> u32 {
        self.max_accepted
    }

    /// Number of slots per group that contribute to the output.
    pub fn accepted_count(&self) -> u32 {
        self.max_accepted - self.min_accepted + 1
    }

    /// Position of `frame_number` inside its blend group.
    pub fn slot(&self, frame_number: u64) -> u32 {
        (frame_number % u64::from(self.blend_rate)) as u32
    }

    /// Output frame index that `frame_number` contributes to.
    pub fn group(&self, frame_number: u64) -> u64 {
        frame_number / u64::from(self.blend_rate)
    }

    pub fn should_ignore(&self, frame_number: u64) -> bool {
        let slot = self.slot(frame_number);
        slot < self.min_accepted || slot > self.max_accepted
    }

    pub fn is_first_of_group(&self, frame_number: u64) -> bool {
        self.slot(frame_number) == self.min_accepted
    }

    pub fn is_last_of_group(&self, frame_number: u64) -> bool {
        self.slot(frame_number) == self.max_accepted
    }
}

impl std::fmt::Display for ShutterWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "slots {}..={} of {}",
            self.min_accepted, self.max_accepted, self.blend_rate
        )
    }
}
