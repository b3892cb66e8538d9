use ndarray::Array2;

use super::{LOOKUP_SPOKE_LEN, LOOKUP_SPOKES, SPOKES_PER_REVOLUTION, SpokeBearing};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointInt {
    pub x: u16,
    pub y: u16,
}

///
/// Maps (azimuth bucket, distance) onto a pixel of a square canvas of 2 * origin pixels,
/// with distance 0 in the center and north up.
///
/// Computing this once saves four trigonometric evaluations per received byte.
/// The distance axis is cut off at the canvas edge, so every point in the table
/// lies within [0, 2 * origin] on both axes.
///
pub struct PolarToCartesianLookup {
    origin: u16,
    spoke_len: usize,
    xyi: Array2<PointInt>,
}

impl PolarToCartesianLookup {
    pub fn new(origin: u16) -> Self {
        let spoke_len = LOOKUP_SPOKE_LEN.min(origin as usize + 1);

        // Each bucket holds the geometry of the second of its two raw ticks
        let xyi = Array2::from_shape_fn((LOOKUP_SPOKES, spoke_len), |(bucket, radius)| {
            polar_to_point(origin, bucket * 2 + 1, radius)
        });

        log::info!(
            "Built polar to cartesian lookup for origin {}: {} buckets x {} distances ({} bytes)",
            origin,
            LOOKUP_SPOKES,
            spoke_len,
            xyi.len() * size_of::<PointInt>()
        );

        PolarToCartesianLookup {
            origin,
            spoke_len,
            xyi,
        }
    }

    pub fn origin(&self) -> u16 {
        self.origin
    }

    pub fn spoke_len(&self) -> usize {
        self.spoke_len
    }

    /// Returns `None` when the distance lies beyond the edge of the table.
    pub fn get_point_int(&self, azimuth: SpokeBearing, radius: usize) -> Option<&PointInt> {
        let bucket = (azimuth as usize / 2) % LOOKUP_SPOKES;
        self.xyi.get([bucket, radius])
    }
}

fn polar_to_point(origin: u16, tick: usize, radius: usize) -> PointInt {
    let angle = tick as f64 / SPOKES_PER_REVOLUTION as f64 * 360.;
    let (sine, cosine) = (angle % 90.).to_radians().sin_cos();
    let origin = origin as f64;
    let radius = radius as f64;

    let (x, y) = match (angle / 90.) as u32 {
        0 => (origin + sine * radius, origin - cosine * radius),
        1 => (origin + cosine * radius, origin + sine * radius),
        2 => (origin - sine * radius, origin + cosine * radius),
        _ => (origin - cosine * radius, origin - sine * radius),
    };

    PointInt {
        x: x.round() as u16,
        y: y.round() as u16,
    }
}
