extern crate pretty_env_logger;

pub mod record;
pub mod state;
pub mod vehicle;

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::io::Write;

pub use log::{error, info, warn};
pub use record::*;
pub use state::*;
pub use vehicle::*;

pub const VERSION_STR: &str = "0.3.0";

/// Messages pushed to host engine clients connected to the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RelayMessage {
    Record(TelemetryRecord),
    VehicleRemoved(VehicleIdentity),
    VehiclesCleared,
}

pub fn init_logging()
{
    // pretty_env_logger doesn't appear to print anything without using
    // a filter in the builder.
    let filter = match std::env::var("RUST_LOG")
    {
      Ok(f) => f,
      Err(_e) => "info".to_owned()
    };

    let _ = pretty_env_logger::formatted_builder().
    parse_filters(&filter)
    .default_format()
    .format(|buf, record| {
        let level = { buf.default_styled_level(record.level()) };
        let mut module_path = record.module_path().unwrap_or("unknown");

        // keep only the crate name (gazebo_bridge::udp -> gazebo_bridge)
        if let Some(c_index) = module_path.find(':') {
            module_path = &module_path[..c_index];
        }

        writeln!(buf, "[{}] [{}] [{}]: {}", Local::now().format("%H:%M:%S%.3f"), module_path, format_args!("{:>5}", level), record.args())
    })
    .try_init();
}
