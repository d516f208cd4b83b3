use crate::*;
use log::{info, warn};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Stats,
    Reset,
    Vehicles,
    Remove(VehicleIdentity),
    Clear,
    Help,
}

impl FromStr for ConsoleCommand {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        use ConsoleCommand::*;
        let mut words = input.split_whitespace();
        let command = match words.next() {
            Some(word) => word.to_ascii_lowercase(),
            None => return Err(String::from("empty command")),
        };
        match command.as_str() {
            "stats" => Ok(Stats),
            "reset" => Ok(Reset),
            "vehicles" => Ok(Vehicles),
            "clear" => Ok(Clear),
            "help" => Ok(Help),
            "remove" => {
                let mut next_u8 = || words.next().and_then(|w| w.parse::<u8>().ok());
                match (next_u8(), next_u8()) {
                    (Some(vehicle_type), Some(vehicle_num)) => {
                        Ok(Remove(VehicleIdentity::new(vehicle_num, vehicle_type)))
                    }
                    _ => Err(String::from("usage: remove <type> <num>")),
                }
            }
            other => Err(format!("unknown command \"{}\", try help", other)),
        }
    }
}

const HELP: &str = "commands: stats, reset, vehicles, remove <type> <num>, clear, help";

impl Bridge {
    pub fn on_console_input(&mut self, input: String) {
        if input.trim().is_empty() {
            return;
        }
        match input.parse::<ConsoleCommand>() {
            Ok(command) => {
                for line in self.execute(command) {
                    info!("{}", line);
                }
            }
            Err(e) => warn!("{}", e),
        }
    }

    /// Runs a console command and returns the lines to print.
    pub fn execute(&mut self, command: ConsoleCommand) -> Vec<String> {
        use ConsoleCommand::*;
        match command {
            Stats => {
                let stats = self.dispatcher.statistics();
                vec![
                    format!(
                        "pose {}/{} motor {}/{} servo {}/{} (valid/invalid), rejected {}",
                        stats.valid_pose,
                        stats.invalid_pose,
                        stats.valid_motor_speed,
                        stats.invalid_motor_speed,
                        stats.valid_servo,
                        stats.invalid_servo,
                        stats.rejected
                    ),
                    format!(
                        "{:.1} packets/s, {} batches, {:.3} ms per batch, {} vehicles",
                        stats.packets_per_second,
                        stats.processed_batches,
                        stats.average_batch_time_ms,
                        self.vehicles.len()
                    ),
                ]
            }
            Reset => {
                self.dispatcher.reset_statistics();
                vec![String::from("statistics reset")]
            }
            Vehicles => {
                if self.vehicles.is_empty() {
                    return vec![String::from("no vehicles")];
                }
                self.vehicles
                    .get_all()
                    .iter()
                    .map(|state| {
                        let identity = state.identity;
                        format!(
                            "{}_{} pos ({:.1}, {:.1}, {:.1}) motors {:?} servos {} updated {}",
                            self.dispatcher.registry().display_name(identity.vehicle_type),
                            identity.vehicle_num,
                            state.position.x,
                            state.position.y,
                            state.position.z,
                            state.motor_speeds,
                            state.servo_positions.len(),
                            state.last_update_time.format("%H:%M:%S%.3f")
                        )
                    })
                    .collect()
            }
            Remove(identity) => {
                if self.remove_vehicle(&identity) {
                    vec![format!("removed vehicle {}", identity)]
                } else {
                    vec![format!("no vehicle {}", identity)]
                }
            }
            Clear => vec![format!("removed {} vehicles", self.clear_vehicles())],
            Help => vec![String::from(HELP)],
        }
    }
}
