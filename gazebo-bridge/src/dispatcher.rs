use crate::error::PacketError;
use crate::protocol::{self, ProtocolGeneration};
use crate::registry::VehicleTypeRegistry;
use crate::udp::RawPacket;
use log::{debug, info};
use serde::Serialize;
use shared::{MessageId, TelemetryRecord};
use std::time::{Duration, Instant};

pub type Subscriber = Box<dyn FnMut(&TelemetryRecord) + Send>;

/// Point-in-time copy of the dispatcher counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DispatcherStats {
    pub valid_pose: u64,
    pub invalid_pose: u64,
    pub valid_motor_speed: u64,
    pub invalid_motor_speed: u64,
    pub valid_servo: u64,
    pub invalid_servo: u64,
    /// Short header, unknown vehicle type or unknown message id.
    pub rejected: u64,
    pub packets_per_second: f32,
    pub processed_batches: u64,
    pub average_batch_time_ms: f32,
}

impl DispatcherStats {
    pub fn valid_total(&self) -> u64 {
        self.valid_pose + self.valid_motor_speed + self.valid_servo
    }

    pub fn invalid_total(&self) -> u64 {
        self.invalid_pose + self.invalid_motor_speed + self.invalid_servo + self.rejected
    }
}

pub struct TelemetryDispatcher {
    registry: VehicleTypeRegistry,
    generation: ProtocolGeneration,
    subscribers: Vec<Subscriber>,
    stats: DispatcherStats,
    log_parsed_data: bool,
    packets_since_rate_update: u64,
    last_rate_update: Instant,
    batch_time_total: Duration,
}

impl TelemetryDispatcher {
    pub fn new(registry: VehicleTypeRegistry, generation: ProtocolGeneration) -> Self {
        Self {
            registry,
            generation,
            subscribers: Vec::new(),
            stats: DispatcherStats::default(),
            log_parsed_data: false,
            packets_since_rate_update: 0,
            last_rate_update: Instant::now(),
            batch_time_total: Duration::default(),
        }
    }

    pub fn set_log_parsed_data(&mut self, enabled: bool) {
        self.log_parsed_data = enabled;
    }

    pub fn generation(&self) -> ProtocolGeneration {
        self.generation
    }

    pub fn registry(&self) -> &VehicleTypeRegistry {
        &self.registry
    }

    pub fn subscribe(&mut self, subscriber: Subscriber) {
        self.subscribers.push(subscriber);
    }

    /// Classify, resolve, decode and broadcast one datagram.
    ///
    /// Never fails: every rejection is counted and the packet is dropped.
    /// The decoded record is handed back so the caller can update its own
    /// state after the subscribers have seen it.
    pub fn on_packet_received(&mut self, packet: &RawPacket) -> Option<TelemetryRecord> {
        let header = match protocol::classify(&packet.bytes) {
            Ok(header) => header,
            Err(e) => return self.reject(packet, e),
        };
        let message_id = match MessageId::from_u8(header.message_id) {
            Some(message_id) => message_id,
            None => return self.reject(packet, PacketError::UnknownMessageId(header.message_id)),
        };
        let config = match self.registry.lookup(header.vehicle_type) {
            Some(config) => config,
            None => return self.reject(packet, PacketError::UnknownVehicleType(header.vehicle_type)),
        };

        let decoded = match message_id {
            MessageId::Pose => protocol::decode_pose(&packet.bytes, config, self.generation)
                .map(TelemetryRecord::Pose),
            MessageId::MotorSpeed => {
                protocol::decode_motor_speed(&packet.bytes, config, self.generation)
                    .map(TelemetryRecord::MotorSpeed)
            }
            MessageId::Servo => protocol::decode_servo(&packet.bytes, config, self.generation)
                .map(TelemetryRecord::Servo),
        };

        match decoded {
            Ok(record) => {
                *self.valid_counter(message_id) += 1;
                if self.log_parsed_data {
                    info!(
                        "{}_{} - {}",
                        self.registry.display_name(header.vehicle_type),
                        header.vehicle_num,
                        describe(&record)
                    );
                }
                for subscriber in self.subscribers.iter_mut() {
                    subscriber(&record);
                }
                Some(record)
            }
            Err(e) => {
                *self.invalid_counter(message_id) += 1;
                debug!("Dropped {:?} packet from {}: {}", message_id, packet.sender, e);
                None
            }
        }
    }

    /// Counts a datagram toward packets/second. Called on arrival, before
    /// any batching, so the rate does not lag behind the queue.
    pub fn record_arrival(&mut self) {
        self.packets_since_rate_update += 1;
    }

    /// Process a whole batch in arrival order.
    pub fn process_batch(&mut self, batch: &[RawPacket]) -> Vec<TelemetryRecord> {
        if batch.is_empty() {
            return Vec::new();
        }
        let started = Instant::now();
        let records = batch
            .iter()
            .filter_map(|packet| self.on_packet_received(packet))
            .collect();
        self.batch_time_total += started.elapsed();
        self.stats.processed_batches += 1;
        records
    }

    /// Recompute packets/second from what arrived since the previous call.
    pub fn update_packet_rate(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_rate_update);
        if elapsed.as_secs_f32() > 0.0 {
            self.stats.packets_per_second =
                self.packets_since_rate_update as f32 / elapsed.as_secs_f32();
        }
        self.packets_since_rate_update = 0;
        self.last_rate_update = now;
    }

    pub fn statistics(&self) -> DispatcherStats {
        let mut stats = self.stats;
        if stats.processed_batches > 0 {
            stats.average_batch_time_ms = self.batch_time_total.as_secs_f32() * 1000.0
                / stats.processed_batches as f32;
        }
        stats
    }

    pub fn reset_statistics(&mut self) {
        self.stats = DispatcherStats::default();
        self.packets_since_rate_update = 0;
        self.last_rate_update = Instant::now();
        self.batch_time_total = Duration::default();
    }

    fn reject(&mut self, packet: &RawPacket, error: PacketError) -> Option<TelemetryRecord> {
        self.stats.rejected += 1;
        debug!("Dropped packet from {}: {}", packet.sender, error);
        None
    }

    fn valid_counter(&mut self, message_id: MessageId) -> &mut u64 {
        match message_id {
            MessageId::Pose => &mut self.stats.valid_pose,
            MessageId::MotorSpeed => &mut self.stats.valid_motor_speed,
            MessageId::Servo => &mut self.stats.valid_servo,
        }
    }

    fn invalid_counter(&mut self, message_id: MessageId) -> &mut u64 {
        match message_id {
            MessageId::Pose => &mut self.stats.invalid_pose,
            MessageId::MotorSpeed => &mut self.stats.invalid_motor_speed,
            MessageId::Servo => &mut self.stats.invalid_servo,
        }
    }
}

fn describe(record: &TelemetryRecord) -> String {
    match record {
        TelemetryRecord::Pose(pose) => {
            let rotation = pose.rotation.to_euler();
            format!(
                "Pos({:.2},{:.2},{:.2}) Rot({:.2},{:.2},{:.2})",
                pose.position.x,
                pose.position.y,
                pose.position.z,
                rotation.roll,
                rotation.pitch,
                rotation.yaw
            )
        }
        TelemetryRecord::MotorSpeed(motors) => motors
            .motor_speeds_deg_per_sec
            .iter()
            .enumerate()
            .map(|(i, speed)| format!("M{}:{:.1}deg/s", i, speed))
            .collect::<Vec<_>>()
            .join(" "),
        TelemetryRecord::Servo(servos) => servos
            .servo_positions
            .iter()
            .zip(servos.servo_rotations.iter())
            .enumerate()
            .map(|(i, (position, rotation))| {
                let rotation = rotation.to_euler();
                format!(
                    "S{}:[P:{:.2},{:.2},{:.2} R:{:.1},{:.1},{:.1}]",
                    i, position.x, position.y, position.z, rotation.roll, rotation.pitch, rotation.yaw
                )
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}
