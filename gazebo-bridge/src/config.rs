use crate::error::ConfigError;
use crate::protocol::ProtocolGeneration;
use crate::result::ConfigResult;
use serde::{Deserialize, Serialize};
use shared::VehicleTypeConfig;
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

pub const MIN_BATCH_SIZE: usize = 1;
pub const MAX_BATCH_SIZE: usize = 100;
pub const MIN_BATCH_INTERVAL_MS: u64 = 1;
pub const MAX_BATCH_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchConfig {
    pub enabled: bool,
    pub batch_size: usize,
    pub interval_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            batch_size: 10,
            interval_ms: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub listen_address: IpAddr,
    pub listen_port: u16,
    /// Empty accepts every sender.
    pub expected_sender_ip: String,
    pub protocol_generation: ProtocolGeneration,
    pub batch_processing: BatchConfig,
    pub stats_interval_secs: u64,
    pub log_parsed_data: bool,
    pub relay_port: Option<u16>,
    pub vehicle_types: Vec<VehicleTypeConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            listen_port: 8888,
            expected_sender_ip: String::new(),
            protocol_generation: ProtocolGeneration::default(),
            batch_processing: BatchConfig::default(),
            stats_interval_secs: 1,
            log_parsed_data: false,
            relay_port: None,
            vehicle_types: vec![
                VehicleTypeConfig::new(0, "Iris", 4, 0),
                VehicleTypeConfig::new(1, "Rover", 4, 0),
            ],
        }
    }
}

impl Config {
    /// Reads `path`, writing a default file there first if it is missing.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            Self::write_default(path)?;
        }
        let config_file = std::fs::File::open(path).map_err(ConfigError::Open)?;
        let reader = std::io::BufReader::new(config_file);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn write_default(path: &Path) -> ConfigResult<()> {
        let config_str = serde_json::to_vec_pretty(&Config::default())?;
        std::fs::write(path, config_str).map_err(ConfigError::Write)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_address, self.listen_port)
    }

    pub fn relay_addr(&self) -> Option<SocketAddr> {
        self.relay_port
            .map(|port| SocketAddr::new(self.listen_address, port))
    }

    /// `None` when unset or unparsable; `validate` reports the latter.
    pub fn expected_sender(&self) -> Option<IpAddr> {
        let ip = self.expected_sender_ip.trim();
        if ip.is_empty() {
            None
        } else {
            ip.parse().ok()
        }
    }

    /// Clamps out of range values and returns what was wrong.
    pub fn validate(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.listen_port == 0 {
            warnings.push("listen_port is 0, the OS will pick a random port".to_string());
        } else if self.listen_port < 1024 {
            warnings.push(format!(
                "listen_port {} is privileged and may need elevated rights",
                self.listen_port
            ));
        }
        if let Some(port) = self.relay_port {
            if port == self.listen_port {
                warnings.push(format!("relay_port {} equals listen_port", port));
            }
        }

        let ip = self.expected_sender_ip.trim();
        if !ip.is_empty() && ip.parse::<IpAddr>().is_err() {
            warnings.push(format!(
                "expected_sender_ip \"{}\" is not an IP address, accepting all senders",
                ip
            ));
        }

        let batch = &mut self.batch_processing;
        let clamped = batch.batch_size.max(MIN_BATCH_SIZE).min(MAX_BATCH_SIZE);
        if clamped != batch.batch_size {
            warnings.push(format!(
                "batch_size {} out of range, using {}",
                batch.batch_size, clamped
            ));
            batch.batch_size = clamped;
        }
        let clamped = batch
            .interval_ms
            .max(MIN_BATCH_INTERVAL_MS)
            .min(MAX_BATCH_INTERVAL_MS);
        if clamped != batch.interval_ms {
            warnings.push(format!(
                "interval_ms {} out of range, using {}",
                batch.interval_ms, clamped
            ));
            batch.interval_ms = clamped;
        }

        if self.stats_interval_secs == 0 {
            warnings.push("stats_interval_secs is 0, using 1".to_string());
            self.stats_interval_secs = 1;
        }
        if self.vehicle_types.is_empty() {
            warnings.push("no vehicle types configured, every packet will be rejected".to_string());
        }
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for row in &self.vehicle_types {
            if !seen.insert(row.type_code) && reported.insert(row.type_code) {
                warnings.push(format!(
                    "type_code {} is defined more than once, the last row wins",
                    row.type_code
                ));
            }
        }

        warnings
    }
}
