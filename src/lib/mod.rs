use clap::Parser;
use tokio::sync::{broadcast, mpsc};
use tokio_graceful_shutdown::{SubsystemBuilder, SubsystemHandle};

pub mod config;
pub mod demo;
pub mod output;
pub mod radar;
pub mod receiver;
pub mod util;

use config::CanvasConfig;
use demo::DemoGenerator;
use output::FrameOutput;
use radar::RadarError;
use radar::frame::FrameBuffer;
use radar::spoke::SpokeReading;
use receiver::{FrameReady, PpiReceiver};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PACKAGE: &str = env!("CARGO_PKG_NAME");

// Spokes waiting to be decoded before the transport is held up
const SPOKE_QUEUE_LEN: usize = 256;
const FRAME_QUEUE_LEN: usize = 4;

#[derive(Parser, Clone, Debug)]
#[command(about = "Draws navigation radar spokes onto a Plan Position Indicator frame buffer")]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,

    /// Distance in pixels from the canvas edge to its center
    #[arg(short, long, default_value_t = radar::DEFAULT_ORIGIN)]
    pub origin: u16,

    /// Name of the frame buffer, '.argb' is appended
    #[arg(short, long, default_value_t = config::DEFAULT_NAME.to_string())]
    pub name: String,

    /// Redraw whenever the azimuth is a multiple of this value
    #[arg(long, default_value_t = radar::DEFAULT_ROTATION_DIVISOR)]
    pub rotation_divisor: u16,

    /// Generate synthetic spokes instead of waiting for a radar
    #[arg(long, default_value_t = false)]
    pub demo: bool,

    /// Log the time between redraws
    #[arg(long, default_value_t = false)]
    pub timings: bool,

    /// Write every completed frame to stdout
    #[arg(long, default_value_t = false)]
    pub output: bool,
}

/// The running decoder as seen by transports and renderers.
pub struct Session {
    pub config: CanvasConfig,
    pub frame: FrameBuffer,
    pub spoke_tx: mpsc::Sender<SpokeReading>,
    pub frame_tx: broadcast::Sender<FrameReady>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("frame", &self.frame)
            .finish()
    }
}

pub fn start_session(subsystem: &SubsystemHandle, args: Cli) -> Result<Session, RadarError> {
    let config = CanvasConfig::from_args(&args)?;
    let frame = FrameBuffer::new(&config.frame_buffer_name(), config.width, config.height);

    let (spoke_tx, spoke_rx) = mpsc::channel(SPOKE_QUEUE_LEN);
    let (frame_tx, _) = broadcast::channel(FRAME_QUEUE_LEN);

    let receiver = PpiReceiver::new(
        config.clone(),
        frame.clone(),
        spoke_rx,
        frame_tx.clone(),
        args.timings,
    )?;
    subsystem.start(SubsystemBuilder::new("Receiver", |s| receiver.run(s)));

    if args.output {
        let output = FrameOutput::new(frame.clone(), frame_tx.subscribe());
        subsystem.start(SubsystemBuilder::new("stdout", |s| output.run(s)));
    }

    if args.demo {
        let demo = DemoGenerator::new(spoke_tx.clone());
        subsystem.start(SubsystemBuilder::new("Demo", |s| demo.run(s)));
    }

    Ok(Session {
        config,
        frame,
        spoke_tx,
        frame_tx,
    })
}
