use anyhow::Context;
use gazebo_bridge::*;
use log::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shared::init_logging();
    info!("Gazebo bridge {}", shared::VERSION_STR);
    let config = config::Config::load(std::path::Path::new("./config.json"))
        .context("Failed to load ./config.json")?;
    let bridge = Bridge::from_config(config);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        match async_ctrlc::CtrlC::new() {
            Ok(ctrlc) => {
                ctrlc.await;
                let _ = shutdown_tx.send(());
            }
            Err(e) => {
                warn!("Ctrl-C handler unavailable, use the process manager to stop: {}", e);
                futures::future::pending::<()>().await;
            }
        }
    });

    bridge.run(true, shutdown_rx).await
}
