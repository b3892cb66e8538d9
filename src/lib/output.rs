use std::io::Write;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio_graceful_shutdown::SubsystemHandle;

use crate::radar::RadarError;
use crate::radar::frame::FrameBuffer;
use crate::receiver::FrameReady;

///
/// Stand-in for the display: every time a frame is ready the whole frame buffer
/// is written to stdout, so it can be piped into a viewer.
///
pub struct FrameOutput {
    frame: FrameBuffer,
    frame_rx: broadcast::Receiver<FrameReady>,
}

impl FrameOutput {
    pub fn new(frame: FrameBuffer, frame_rx: broadcast::Receiver<FrameReady>) -> Self {
        FrameOutput { frame, frame_rx }
    }

    pub fn write_frame<W: Write>(&self, out: &mut W) -> Result<usize, RadarError> {
        // Copy first so the decoder is not held up by a slow pipe
        let data = self.frame.snapshot()?;
        out.write_all(&data)?;
        out.flush()?;
        Ok(data.len())
    }

    pub async fn run(mut self, subsys: SubsystemHandle) -> Result<(), RadarError> {
        log::warn!("Output mode activated; raw frames are sent to stdout");

        loop {
            tokio::select! { biased;
                _ = subsys.on_shutdown_requested() => {
                    return Ok(());
                },
                r = self.frame_rx.recv() => {
                    match r {
                        Ok(ready) => {
                            log::trace!("Writing frame #{} at azimuth {}", ready.rotation, ready.azimuth);
                            let written = self.write_frame(&mut std::io::stdout().lock());
                            if let Err(e) = written {
                                log::error!("Cannot write frame: {}", e);
                                subsys.request_shutdown();
                                return Err(e);
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            log::debug!("Output skipped {} frames", skipped);
                        }
                        Err(RecvError::Closed) => {
                            return Ok(());
                        }
                    }
                },
            }
        }
    }
}
