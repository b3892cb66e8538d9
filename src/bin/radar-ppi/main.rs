extern crate tokio;

use clap::Parser;
use env_logger::Env;
use log::{info, warn};
use miette::Result;
use std::time::Duration;
use tokio_graceful_shutdown::{SubsystemBuilder, SubsystemHandle, Toplevel};

use radar_ppi::radar::RadarError;
use radar_ppi::{Cli, VERSION, start_session};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let log_level = args.verbose.log_level_filter();
    env_logger::Builder::from_env(Env::default())
        .filter_level(log_level)
        .init();

    warn!("Radar transmitters are dangerous! Ensure that a safe working environment is maintained.");
    info!("Radar PPI {} loglevel {}", VERSION, log_level);

    Toplevel::new(|s| async move {
        s.start(SubsystemBuilder::new("Session", |subsys| session(subsys, args)));
    })
    .catch_signals()
    .handle_shutdown_requests(Duration::from_millis(5000))
    .await
    .map_err(Into::into)
}

async fn session(subsys: SubsystemHandle, args: Cli) -> Result<(), RadarError> {
    let session = start_session(&subsys, args)?;
    info!(
        "Frame buffer '{}' ready, {} bytes",
        session.frame.name(),
        session.frame.len()
    );
    if !session.frame.is_valid() {
        warn!("Frame buffer '{}' is not usable", session.frame.name());
    }

    // Keep the transport side of the spoke channel alive until shutdown
    subsys.on_shutdown_requested().await;
    drop(session);
    Ok(())
}
