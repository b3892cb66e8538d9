use std::time::{Duration, Instant};

use super::{DEFAULT_ROTATION_DIVISOR, SpokeBearing};

///
/// Decides when the renderer should redraw.
///
/// This is a heuristic and not an exact 360 degree detector: a boundary is
/// reported whenever the azimuth is a multiple of the divisor. Dropped packets
/// can carry azimuth 0, so waiting for the literal start of the sweep would
/// trigger on every dropped packet.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RotationDetector {
    divisor: u16,
}

impl RotationDetector {
    /// Returns `None` for a zero divisor.
    pub fn new(divisor: u16) -> Option<Self> {
        if divisor == 0 {
            return None;
        }
        Some(RotationDetector { divisor })
    }

    pub fn divisor(&self) -> u16 {
        self.divisor
    }

    pub fn is_boundary(&self, azimuth: SpokeBearing) -> bool {
        azimuth % self.divisor == 0
    }
}

impl Default for RotationDetector {
    fn default() -> Self {
        RotationDetector {
            divisor: DEFAULT_ROTATION_DIVISOR,
        }
    }
}

/// Wall clock time between two rotation boundaries.
#[derive(Debug)]
pub struct RotationTimer {
    rotation_timestamp: Option<Instant>,
}

impl RotationTimer {
    pub fn new() -> Self {
        RotationTimer {
            rotation_timestamp: None,
        }
    }

    /// Returns the time since the previous boundary, `None` on the first one.
    pub fn full_rotation(&mut self) -> Option<Duration> {
        self.full_rotation_at(Instant::now())
    }

    pub fn full_rotation_at(&mut self, now: Instant) -> Option<Duration> {
        let diff = self
            .rotation_timestamp
            .map(|previous| now.saturating_duration_since(previous));
        self.rotation_timestamp = Some(now);

        if let Some(diff) = diff {
            log::debug!("rotation elapsed {} ms = {:.0} RPM", diff.as_millis(), rpm(diff));
        }
        diff
    }
}

impl Default for RotationTimer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn rpm(rotation: Duration) -> f64 {
    let millis = rotation.as_secs_f64() * 1000.;
    if millis > 0. { 60_000. / millis } else { 0. }
}
