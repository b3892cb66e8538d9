use thiserror::Error;

pub mod cartesian;
pub mod decoder;
pub mod frame;
pub mod rotation;
pub mod spoke;

// A "native to radar" bearing, [0..4096> for the Navico units this decodes
pub type SpokeBearing = u16;

pub const SPOKES_PER_REVOLUTION: usize = 4096; // raw azimuth ticks per rotation
pub const MAX_AZIMUTH: SpokeBearing = (SPOKES_PER_REVOLUTION - 1) as SpokeBearing;
pub const LOOKUP_SPOKES: usize = SPOKES_PER_REVOLUTION / 2; // two raw ticks share one bucket
pub const MAX_SPOKE_LEN: usize = 512; // furthest distance index in the lookup
pub const LOOKUP_SPOKE_LEN: usize = MAX_SPOKE_LEN + 1;
pub const BYTES_PER_PIXEL: usize = 4;

pub const DEFAULT_ORIGIN: u16 = 512;
pub const DEFAULT_ROTATION_DIVISOR: u16 = 170;

///
/// Everything that can go wrong while rasterizing a single spoke.
/// None of these are fatal; the spoke is dropped and the next one is processed.
///
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Empty packet")]
    EmptyPacket,
    #[error("Frame buffer '{0}' is not usable")]
    InvalidMemory(String),
    #[error("Invalid canvas {width}x{height} (frame buffer row width {row_width})")]
    InvalidCanvas {
        width: u16,
        height: u16,
        row_width: u16,
    },
    #[error("Canvas origin {origin} is outside canvas {width}x{height}")]
    OriginOutOfBounds { origin: u16, width: u16, height: u16 },
    #[error("Azimuth is not set")]
    AzimuthInvalid,
    #[error("Azimuth {0} is corrupted")]
    AzimuthCorrupted(u16),
    #[error("Point ({x}, {y}) for distance {distance} is outside the canvas")]
    CoordinateOutOfBounds { distance: usize, x: u16, y: u16 },
    #[error("Pixel index {index} exceeds frame buffer length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

impl DecodeError {
    /// True for errors that abort a spoke halfway, after earlier pixels were written.
    pub fn is_partial_write(&self) -> bool {
        matches!(
            self,
            DecodeError::CoordinateOutOfBounds { .. } | DecodeError::IndexOutOfBounds { .. }
        )
    }
}

#[derive(Error, Debug)]
pub enum RadarError {
    #[error("I/O operation failed")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Decode(#[from] DecodeError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Spoke channel closed")]
    ChannelClosed,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Statistics {
    pub received_spokes: usize, // this rotation
    pub broken_spokes: usize,   // this rotation, rejected before any write
    pub partial_spokes: usize,  // this rotation, aborted halfway
    pub total_rotations: usize, // total number of rotations
}

impl Statistics {
    pub fn new() -> Self {
        Statistics {
            received_spokes: 0,
            broken_spokes: 0,
            partial_spokes: 0,
            total_rotations: 0,
        }
    }

    pub fn record(&mut self, result: &Result<SpokeBearing, DecodeError>) {
        match result {
            Ok(_) => self.received_spokes += 1,
            Err(e) if e.is_partial_write() => self.partial_spokes += 1,
            Err(_) => self.broken_spokes += 1,
        }
    }

    pub fn full_rotation(&mut self, key: &str) {
        self.total_rotations += 1;
        log::debug!(
            "{}: Full rotation #{}, {} spokes received, {} partial and {} broken spokes",
            key,
            self.total_rotations,
            self.received_spokes,
            self.partial_spokes,
            self.broken_spokes
        );
        self.received_spokes = 0;
        self.partial_spokes = 0;
        self.broken_spokes = 0;
    }
}
