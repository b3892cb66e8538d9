use serde::{Deserialize, Serialize};

use super::SpokeBearing;

pub type GenericSpoke = Vec<u8>;

/// One scan line as delivered by the radar transport.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpokeReading {
    /// 1/4096th turn ticks, `None` when the transport did not fill it in
    pub azimuth: Option<SpokeBearing>,
    /// Maximum sensed distance, informational only
    pub range: u32,
    /// Intensity samples at increasing distance
    pub data: GenericSpoke,
}

impl SpokeReading {
    pub fn new(azimuth: SpokeBearing, range: u32, data: GenericSpoke) -> Self {
        SpokeReading {
            azimuth: Some(azimuth),
            range,
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
