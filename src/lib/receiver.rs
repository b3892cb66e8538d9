use tokio::sync::{broadcast, mpsc};
use tokio_graceful_shutdown::SubsystemHandle;

use crate::config::CanvasConfig;
use crate::radar::cartesian::PolarToCartesianLookup;
use crate::radar::decoder::decode;
use crate::radar::frame::FrameBuffer;
use crate::radar::rotation::{RotationDetector, RotationTimer, rpm};
use crate::radar::spoke::SpokeReading;
use crate::radar::{RadarError, SpokeBearing, Statistics};

/// Sent to the renderer whenever enough of a sweep has been drawn to redraw the display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameReady {
    pub azimuth: SpokeBearing,
    pub rotation: usize,
}

///
/// Takes spokes off the transport channel and draws them into the frame buffer,
/// one at a time. Failed spokes are counted and dropped.
///
pub struct PpiReceiver {
    key: String,
    config: CanvasConfig,
    lookup: PolarToCartesianLookup,
    frame: FrameBuffer,
    detector: RotationDetector,
    timer: RotationTimer,
    timings: bool,
    pub statistics: Statistics,
    spoke_rx: mpsc::Receiver<SpokeReading>,
    frame_tx: broadcast::Sender<FrameReady>,
}

impl PpiReceiver {
    pub fn new(
        config: CanvasConfig,
        frame: FrameBuffer,
        spoke_rx: mpsc::Receiver<SpokeReading>,
        frame_tx: broadcast::Sender<FrameReady>,
        timings: bool,
    ) -> Result<Self, RadarError> {
        config.validate()?;
        let detector = RotationDetector::new(config.rotation_divisor).ok_or_else(|| {
            RadarError::InvalidConfig(format!("rotation divisor {}", config.rotation_divisor))
        })?;
        let lookup = PolarToCartesianLookup::new(config.origin);

        Ok(PpiReceiver {
            key: frame.name().to_owned(),
            config,
            lookup,
            frame,
            detector,
            timer: RotationTimer::new(),
            timings,
            statistics: Statistics::new(),
            spoke_rx,
            frame_tx,
        })
    }

    pub async fn run(mut self, subsys: SubsystemHandle) -> Result<(), RadarError> {
        log::info!(
            "{}: Decoding spokes onto {}x{} canvas, origin {}",
            self.key,
            self.config.width,
            self.config.height,
            self.config.origin
        );

        loop {
            tokio::select! { biased;
                _ = subsys.on_shutdown_requested() => {
                    return Ok(());
                },
                r = self.spoke_rx.recv() => {
                    match r {
                        Some(reading) => {
                            self.process_spoke(reading);
                        }
                        None => {
                            log::warn!("{}: Spoke transport closed", self.key);
                            subsys.request_shutdown();
                            return Ok(());
                        }
                    }
                },
            }
        }
    }

    pub fn process_spoke(&mut self, reading: SpokeReading) -> Option<FrameReady> {
        let result = decode(
            reading,
            &self.frame,
            &self.lookup,
            self.config.origin,
            self.config.width,
            self.config.height,
        );
        self.statistics.record(&result);

        let azimuth = match result {
            Ok(azimuth) => azimuth,
            Err(e) => {
                log::debug!("{}: Spoke dropped: {}", self.key, e);
                return None;
            }
        };

        if !self.detector.is_boundary(azimuth) {
            return None;
        }

        self.frame.notify();
        self.statistics.full_rotation(&self.key);
        if let Some(elapsed) = self.timer.full_rotation() {
            if self.timings {
                log::info!(
                    "{}: {} ms since previous frame ({:.1} RPM)",
                    self.key,
                    elapsed.as_millis(),
                    rpm(elapsed)
                );
            }
        }

        let ready = FrameReady {
            azimuth,
            rotation: self.statistics.total_rotations,
        };
        match self.frame_tx.send(ready) {
            Err(_) => {
                log::trace!("{}: No renderer for frame at azimuth {}", self.key, azimuth);
            }
            Ok(count) => {
                log::trace!("{}: Frame ready sent to {} receivers", self.key, count);
            }
        }
        Some(ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receiver() -> (
        PpiReceiver,
        mpsc::Sender<SpokeReading>,
        broadcast::Receiver<FrameReady>,
    ) {
        let config = CanvasConfig::default();
        let frame = FrameBuffer::new(&config.frame_buffer_name(), config.width, config.height);
        let (spoke_tx, spoke_rx) = mpsc::channel(4);
        let (frame_tx, frame_rx) = broadcast::channel(4);
        let receiver = PpiReceiver::new(config, frame, spoke_rx, frame_tx, false).unwrap();
        (receiver, spoke_tx, frame_rx)
    }

    #[test]
    fn frame_ready_on_boundary_only() {
        let (mut receiver, _spoke_tx, mut frame_rx) = receiver();

        assert_eq!(receiver.process_spoke(SpokeReading::new(169, 1500, vec![1, 2])), None);
        let ready = receiver.process_spoke(SpokeReading::new(170, 1500, vec![1, 2]));
        assert_eq!(
            ready,
            Some(FrameReady {
                azimuth: 170,
                rotation: 1
            })
        );
        assert_eq!(frame_rx.try_recv().unwrap(), ready.unwrap());
        assert!(frame_rx.try_recv().is_err());
    }

    #[test]
    fn failed_spoke_never_signals() {
        let (mut receiver, _spoke_tx, mut frame_rx) = receiver();

        assert_eq!(receiver.process_spoke(SpokeReading::new(340, 1500, Vec::new())), None);
        assert_eq!(receiver.process_spoke(SpokeReading::new(5000, 1500, vec![1])), None);
        assert!(frame_rx.try_recv().is_err());
        assert_eq!(receiver.statistics.broken_spokes, 2);
        assert_eq!(receiver.statistics.total_rotations, 0);
    }

    #[test]
    fn statistics_per_rotation() {
        let (mut receiver, _spoke_tx, _frame_rx) = receiver();

        for azimuth in 1..170 {
            receiver.process_spoke(SpokeReading::new(azimuth, 1500, vec![7; 16]));
        }
        assert_eq!(receiver.statistics.received_spokes, 169);
        receiver.process_spoke(SpokeReading::new(170, 1500, vec![7; 16]));
        assert_eq!(receiver.statistics.received_spokes, 0);
        assert_eq!(receiver.statistics.total_rotations, 1);
    }

    #[test]
    fn rejects_zero_divisor() {
        let mut config = CanvasConfig::default();
        config.rotation_divisor = 0;
        let frame = FrameBuffer::new("/x.argb", config.width, config.height);
        let (_spoke_tx, spoke_rx) = mpsc::channel(1);
        let (frame_tx, _) = broadcast::channel(1);
        assert!(matches!(
            PpiReceiver::new(config, frame, spoke_rx, frame_tx, false),
            Err(RadarError::InvalidConfig(_))
        ));
    }
}
