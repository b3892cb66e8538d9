use super::cartesian::PolarToCartesianLookup;
use super::frame::FrameBuffer;
use super::spoke::SpokeReading;
use super::{DecodeError, MAX_AZIMUTH, SpokeBearing};
use crate::util::PrintableSpoke;

///
/// Rasterize one spoke into the shared frame buffer.
///
/// Inputs are validated in a fixed order so the same bad spoke always yields the same error.
/// A failure halfway through the samples leaves the pixels already written in place.
/// On success the azimuth of the spoke is returned.
///
pub fn decode(
    reading: SpokeReading,
    frame: &FrameBuffer,
    lookup: &PolarToCartesianLookup,
    origin: u16,
    canvas_width: u16,
    canvas_height: u16,
) -> Result<SpokeBearing, DecodeError> {
    if reading.is_empty() {
        return Err(DecodeError::EmptyPacket);
    }

    if !frame.is_valid() {
        return Err(DecodeError::InvalidMemory(frame.name().to_owned()));
    }

    if canvas_width == 0 || canvas_height == 0 || frame.width() != canvas_width {
        return Err(DecodeError::InvalidCanvas {
            width: canvas_width,
            height: canvas_height,
            row_width: frame.width(),
        });
    }

    if origin == 0 || origin > canvas_width || origin > canvas_height {
        return Err(DecodeError::OriginOutOfBounds {
            origin,
            width: canvas_width,
            height: canvas_height,
        });
    }

    let azimuth = match reading.azimuth {
        None => return Err(DecodeError::AzimuthInvalid),
        Some(azimuth) if azimuth > MAX_AZIMUTH => {
            return Err(DecodeError::AzimuthCorrupted(azimuth));
        }
        Some(azimuth) => azimuth,
    };

    log::trace!(
        "Spoke azimuth {} range {} len {} {}",
        azimuth,
        reading.range,
        reading.len(),
        PrintableSpoke::new(&reading.data)
    );

    for distance in sample_indices(reading.len()) {
        let strength = reading.data[distance];

        let point = match lookup.get_point_int(azimuth, distance) {
            Some(point) if point.x <= canvas_width && point.y <= canvas_height => *point,
            Some(point) => {
                return Err(DecodeError::CoordinateOutOfBounds {
                    distance,
                    x: point.x,
                    y: point.y,
                });
            }
            None => {
                return Err(DecodeError::CoordinateOutOfBounds {
                    distance,
                    x: u16::MAX,
                    y: u16::MAX,
                });
            }
        };

        let index = frame.pixel_index(point.x, point.y);
        log::trace!(
            "distance {} strength {} -> ({}, {}) index {}",
            distance,
            strength,
            point.x,
            point.y,
            index
        );

        frame.write_pixel(index, strength).inspect_err(|e| {
            if matches!(e, DecodeError::IndexOutOfBounds { .. }) {
                log::warn!("{}: {}", frame.name(), e);
            }
        })?;
    }

    Ok(azimuth)
}

///
/// The distances visited for a spoke of `len` samples.
///
/// Every sample in the near two thirds is drawn; once past that only every second
/// sample is, as the radar resolution drops at long range anyway.
///
pub fn sample_indices(len: usize) -> impl Iterator<Item = usize> {
    let threshold = len / 3 * 2;
    let mut next = 0;
    std::iter::from_fn(move || {
        if next >= len {
            return None;
        }
        let distance = next;
        next += if distance > threshold { 2 } else { 1 };
        Some(distance)
    })
}
