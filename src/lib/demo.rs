use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tokio_graceful_shutdown::SubsystemHandle;

use crate::radar::spoke::SpokeReading;
use crate::radar::{RadarError, SPOKES_PER_REVOLUTION, SpokeBearing};

pub const DEMO_RANGE: u32 = 1500;
// 4096 spokes at this pace is roughly one rotation per second
pub const DEMO_SPOKE_INTERVAL: Duration = Duration::from_micros(250);

const DEMO_PATTERN: [u8; 24] = [
    0xe7, 0x9c, 0x95, 0x95, 0x08, 0x00, 0x7c, 0x0e, //
    0x00, 0x06, 0x81, 0xfe, 0x45, 0x00, 0x00, 0xf4, //
    0x00, 0x00, 0xaa, 0xff, 0xff, 0x04, 0xc2, 0x92,
];
const DEMO_REPEAT: usize = 12;

pub fn demo_payload() -> Vec<u8> {
    DEMO_PATTERN
        .iter()
        .cycle()
        .take(DEMO_PATTERN.len() * DEMO_REPEAT)
        .copied()
        .collect()
}

/// Synthetic radar that sweeps the same spoke around forever.
pub struct DemoGenerator {
    spoke_tx: mpsc::Sender<SpokeReading>,
    spoke_interval: Duration,
    azimuth: SpokeBearing,
    payload: Vec<u8>,
}

impl DemoGenerator {
    pub fn new(spoke_tx: mpsc::Sender<SpokeReading>) -> Self {
        Self::with_interval(spoke_tx, DEMO_SPOKE_INTERVAL)
    }

    pub fn with_interval(spoke_tx: mpsc::Sender<SpokeReading>, spoke_interval: Duration) -> Self {
        DemoGenerator {
            spoke_tx,
            spoke_interval,
            azimuth: 0,
            payload: demo_payload(),
        }
    }

    pub fn next_spoke(&mut self) -> SpokeReading {
        self.azimuth = (self.azimuth + 1) % SPOKES_PER_REVOLUTION as SpokeBearing;
        SpokeReading::new(self.azimuth, DEMO_RANGE, self.payload.clone())
    }

    pub async fn run(mut self, subsys: SubsystemHandle) -> Result<(), RadarError> {
        log::warn!("Demo mode activated, spokes are synthetic");

        let mut ticker = interval(self.spoke_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! { biased;
                _ = subsys.on_shutdown_requested() => {
                    return Ok(());
                },
                _ = ticker.tick() => {
                    let spoke = self.next_spoke();
                    log::trace!("Demo spoke azimuth {}", self.azimuth);
                    if self.spoke_tx.send(spoke).await.is_err() {
                        return Err(RadarError::ChannelClosed);
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_repeats_pattern() {
        let payload = demo_payload();
        assert_eq!(payload.len(), 288);
        assert_eq!(&payload[..3], &[0xe7, 0x9c, 0x95]);
        assert_eq!(&payload[264..], &DEMO_PATTERN);
    }

    #[test]
    fn azimuth_wraps() {
        let (spoke_tx, _spoke_rx) = mpsc::channel(1);
        let mut demo = DemoGenerator::new(spoke_tx);

        let first = demo.next_spoke();
        assert_eq!(first.azimuth, Some(1));
        assert_eq!(first.range, DEMO_RANGE);

        for _ in 1..4095 {
            demo.next_spoke();
        }
        assert_eq!(demo.next_spoke().azimuth, Some(0));
        assert_eq!(demo.next_spoke().azimuth, Some(1));
    }
}
