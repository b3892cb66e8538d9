use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard};

use tokio::sync::Notify;

use super::{BYTES_PER_PIXEL, DecodeError};

// Byte order within a single pixel
pub const RED: usize = 0;
pub const GREEN: usize = 1;
pub const BLUE: usize = 2;
pub const ALPHA: usize = 3;

///
/// The brightness shown on the red and green channels.
/// Only the extremes are inverted, everything in between passes through.
///
pub fn display_strength(strength: u8) -> u8 {
    match strength {
        u8::MAX => 0,
        0 => u8::MAX,
        s => s,
    }
}

pub fn encode_pixel(strength: u8) -> [u8; BYTES_PER_PIXEL] {
    let display = display_strength(strength);
    let mut pixel = [0u8; BYTES_PER_PIXEL];
    pixel[RED] = display;
    pixel[GREEN] = display;
    pixel[BLUE] = strength;
    pixel[ALPHA] = 0;
    pixel
}

struct Inner {
    name: String,
    width: u16,
    len: usize,
    valid: AtomicBool,
    generation: AtomicU64,
    changed: Notify,
    data: RwLock<Vec<u8>>,
}

///
/// Handle to the shared PPI image, row-major, four bytes per pixel.
///
/// The decoder and the renderer each hold a clone; the buffer is never resized
/// after creation. Every pixel write takes the lock, writes four bytes and
/// releases it again before waking up anybody waiting for changes.
///
#[derive(Clone)]
pub struct FrameBuffer {
    inner: Arc<Inner>,
}

impl FrameBuffer {
    pub fn new(name: &str, width: u16, height: u16) -> Self {
        let len = width as usize * height as usize * BYTES_PER_PIXEL;
        Self::from_bytes(name, width, vec![0; len])
    }

    /// Wraps an existing region, for instance one that is smaller than the canvas.
    pub fn from_bytes(name: &str, width: u16, data: Vec<u8>) -> Self {
        log::debug!(
            "Frame buffer '{}' row width {} length {}",
            name,
            width,
            data.len()
        );
        FrameBuffer {
            inner: Arc::new(Inner {
                name: name.to_owned(),
                width,
                len: data.len(),
                valid: AtomicBool::new(true),
                generation: AtomicU64::new(0),
                changed: Notify::new(),
                data: RwLock::new(data),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Row width in pixels; the row stride in bytes is four times this.
    pub fn width(&self) -> u16 {
        self.inner.width
    }

    pub fn len(&self) -> usize {
        self.inner.len
    }

    pub fn is_empty(&self) -> bool {
        self.inner.len == 0
    }

    pub fn is_valid(&self) -> bool {
        self.inner.valid.load(Ordering::Acquire)
            && self.inner.len > 0
            && !self.inner.data.is_poisoned()
    }

    /// Marks the region as detached; the decoder will refuse to touch it.
    pub fn invalidate(&self) {
        log::info!("Frame buffer '{}' invalidated", self.inner.name);
        self.inner.valid.store(false, Ordering::Release);
    }

    pub fn pixel_index(&self, x: u16, y: u16) -> usize {
        BYTES_PER_PIXEL * x as usize + BYTES_PER_PIXEL * self.inner.width as usize * y as usize
    }

    ///
    /// Write one encoded pixel at the given byte index.
    /// The index is checked against the buffer before the first byte is touched.
    ///
    pub fn write_pixel(&self, index: usize, strength: u8) -> Result<(), DecodeError> {
        {
            let mut data = self
                .inner
                .data
                .write()
                .map_err(|_| DecodeError::InvalidMemory(self.inner.name.clone()))?;

            if index + (BYTES_PER_PIXEL - 1) >= data.len() {
                return Err(DecodeError::IndexOutOfBounds {
                    index,
                    len: data.len(),
                });
            }

            data[index..index + BYTES_PER_PIXEL].copy_from_slice(&encode_pixel(strength));
        }
        self.notify();
        Ok(())
    }

    /// Bump the change counter and wake up all waiting readers.
    pub fn notify(&self) {
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
        self.inner.changed.notify_waiters();
    }

    /// Number of change notifications raised so far.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    pub async fn changed(&self) {
        self.inner.changed.notified().await
    }

    pub fn read(&self) -> Result<RwLockReadGuard<'_, Vec<u8>>, DecodeError> {
        self.inner
            .data
            .read()
            .map_err(|_| DecodeError::InvalidMemory(self.inner.name.clone()))
    }

    pub fn snapshot(&self) -> Result<Vec<u8>, DecodeError> {
        Ok(self.read()?.clone())
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("name", &self.inner.name)
            .field("width", &self.inner.width)
            .field("len", &self.inner.len)
            .field("valid", &self.is_valid())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_inverts_only_at_extremes() {
        assert_eq!(display_strength(0), 255);
        assert_eq!(display_strength(255), 0);
        for s in 1..255u8 {
            assert_eq!(display_strength(s), s);
        }
    }

    #[test]
    fn pixel_layout() {
        assert_eq!(encode_pixel(0x9c), [0x9c, 0x9c, 0x9c, 0]);
        assert_eq!(encode_pixel(0), [255, 255, 0, 0]);
        assert_eq!(encode_pixel(255), [0, 0, 255, 0]);
    }

    #[test]
    fn stride_follows_width() {
        let frame = FrameBuffer::new("/test.argb", 800, 600);
        assert_eq!(frame.len(), 800 * 600 * 4);
        assert_eq!(frame.pixel_index(0, 0), 0);
        assert_eq!(frame.pixel_index(3, 0), 12);
        assert_eq!(frame.pixel_index(0, 1), 3200);
        assert_eq!(frame.pixel_index(5, 2), 20 + 6400);
    }

    #[test]
    fn write_pixel_notifies() {
        let frame = FrameBuffer::new("/test.argb", 4, 4);
        assert_eq!(frame.generation(), 0);
        frame.write_pixel(frame.pixel_index(1, 1), 0x42).unwrap();
        assert_eq!(frame.generation(), 1);

        let data = frame.snapshot().unwrap();
        assert_eq!(&data[20..24], &[0x42, 0x42, 0x42, 0]);
        assert!(data[..20].iter().all(|b| *b == 0));
        assert!(data[24..].iter().all(|b| *b == 0));
    }

    #[test]
    fn write_pixel_checks_bounds_before_writing() {
        let frame = FrameBuffer::from_bytes("/small.argb", 1024, vec![0; 6]);
        assert_eq!(
            frame.write_pixel(4, 1),
            Err(DecodeError::IndexOutOfBounds { index: 4, len: 6 })
        );
        assert_eq!(frame.snapshot().unwrap(), vec![0; 6]);
        assert_eq!(frame.generation(), 0);

        assert!(frame.write_pixel(0, 1).is_ok());
        assert_eq!(frame.snapshot().unwrap(), vec![1, 1, 1, 0, 0, 0]);
    }

    #[test]
    fn validity() {
        assert!(FrameBuffer::from_bytes("/one.argb", 1024, vec![0]).is_valid());
        assert!(!FrameBuffer::from_bytes("/none.argb", 1024, Vec::new()).is_valid());

        let frame = FrameBuffer::new("/test.argb", 2, 2);
        let clone = frame.clone();
        assert!(clone.is_valid());
        frame.invalidate();
        assert!(!clone.is_valid());
    }

    #[tokio::test]
    async fn changed_wakes_reader() {
        let frame = FrameBuffer::new("/test.argb", 2, 2);
        let reader = frame.clone();
        let waiter = tokio::spawn(async move {
            reader.changed().await;
            reader.generation()
        });
        // Keep writing until the spawned reader has registered and woken up
        while !waiter.is_finished() {
            frame.write_pixel(0, 7).unwrap();
            tokio::task::yield_now().await;
        }
        assert!(waiter.await.unwrap() >= 1);
    }
}
