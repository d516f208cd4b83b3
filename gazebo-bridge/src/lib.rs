#![recursion_limit = "1024"]

pub mod batch;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod protocol;
pub mod registry;
pub mod relay;
pub mod result;
pub mod state_table;
pub mod udp;

use batch::PacketBatcher;
use config::Config;
use dispatcher::{DispatcherStats, Subscriber, TelemetryDispatcher};
use registry::VehicleTypeRegistry;
use relay::{HostRelay, RelayClient};
use state_table::VehicleStateTable;
use udp::{RawPacket, UdpReceiver};

use shared::{RelayMessage, TelemetryRecord, VehicleIdentity};

use anyhow::Context;
use futures::stream::{self, BoxStream};
use futures::{select, FutureExt, StreamExt};
use log::{debug, error, info, warn};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::{IntervalStream, ReceiverStream};
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};

const PACKET_QUEUE_SIZE: usize = 1024;

/// Owns the whole pipeline for one session: registry and dispatcher, the
/// vehicle table, the optional batch queue and the host relay.
pub struct Bridge {
    config: Config,
    dispatcher: TelemetryDispatcher,
    vehicles: VehicleStateTable,
    batcher: Option<PacketBatcher>,
    relay: HostRelay,
}

impl Bridge {
    pub fn from_config(mut config: Config) -> Self {
        for warning in config.validate() {
            warn!("Config: {}", warning);
        }
        let registry = VehicleTypeRegistry::new(config.vehicle_types.clone());
        let mut dispatcher = TelemetryDispatcher::new(registry, config.protocol_generation);
        dispatcher.set_log_parsed_data(config.log_parsed_data);
        let batcher = if config.batch_processing.enabled {
            Some(PacketBatcher::new(config.batch_processing.batch_size))
        } else {
            None
        };
        Self {
            config,
            dispatcher,
            vehicles: VehicleStateTable::new(),
            batcher,
            relay: HostRelay::new(),
        }
    }

    pub fn vehicles(&self) -> &VehicleStateTable {
        &self.vehicles
    }

    pub fn statistics(&self) -> DispatcherStats {
        self.dispatcher.statistics()
    }

    pub fn subscribe(&mut self, subscriber: Subscriber) {
        self.dispatcher.subscribe(subscriber);
    }

    pub fn add_relay_client(&mut self, client: RelayClient) {
        self.relay.add_client(client);
    }

    /// Entry point for the receiver. With batching on the packet is only
    /// queued; it is decoded when the batch fills or the timer flushes.
    pub fn on_packet_received(&mut self, packet: RawPacket) {
        self.dispatcher.record_arrival();
        if let Some(batcher) = self.batcher.as_mut() {
            if let Some(batch) = batcher.push(packet) {
                self.process_batch(&batch);
            }
            return;
        }
        if let Some(record) = self.dispatcher.on_packet_received(&packet) {
            self.apply_record(&record);
        }
    }

    pub fn flush_batch(&mut self) {
        if let Some(batcher) = self.batcher.as_mut() {
            let batch = batcher.take();
            self.process_batch(&batch);
        }
    }

    pub fn pending_packets(&self) -> usize {
        self.batcher.as_ref().map_or(0, PacketBatcher::len)
    }

    fn process_batch(&mut self, batch: &[RawPacket]) {
        for record in self.dispatcher.process_batch(batch) {
            self.apply_record(&record);
        }
    }

    /// Updates the vehicle table and forwards whatever it accepted.
    pub fn apply_record(&mut self, record: &TelemetryRecord) {
        let identity = record.identity();
        let is_new = self.vehicles.get(&identity).is_none();
        if !self.vehicles.apply(record) {
            debug!(
                "No pose seen yet for {}_{}, {:?} record dropped",
                self.dispatcher.registry().display_name(identity.vehicle_type),
                identity.vehicle_num,
                record.message_id()
            );
            return;
        }
        if is_new {
            info!(
                "New vehicle {}_{}",
                self.dispatcher.registry().display_name(identity.vehicle_type),
                identity.vehicle_num
            );
        }
        self.publish(RelayMessage::Record(record.clone()));
    }

    pub fn remove_vehicle(&mut self, identity: &VehicleIdentity) -> bool {
        if self.vehicles.remove(identity).is_none() {
            return false;
        }
        info!("Removed vehicle {}", identity);
        self.publish(RelayMessage::VehicleRemoved(*identity));
        true
    }

    pub fn clear_vehicles(&mut self) -> usize {
        let removed = self.vehicles.remove_all();
        self.publish(RelayMessage::VehiclesCleared);
        removed
    }

    fn publish(&mut self, message: RelayMessage) {
        if let Err(e) = self.relay.publish(&message) {
            warn!("Failed to relay {:?}: {}", message, e);
        }
    }

    fn on_stats_tick(&mut self, now: Instant) {
        self.dispatcher.update_packet_rate(now);
        let stats = self.dispatcher.statistics();
        debug!(
            "{:.1} packets/s, {} valid, {} invalid, {} vehicles",
            stats.packets_per_second,
            stats.valid_total(),
            stats.invalid_total(),
            self.vehicles.len()
        );
    }

    fn log_statistics(&self) {
        let stats = self.dispatcher.statistics();
        info!(
            "Processed {} valid and {} invalid packets ({} rejected before decoding)",
            stats.valid_total(),
            stats.invalid_total(),
            stats.rejected
        );
    }

    /// Runs until `shutdown` fires or its sender is dropped.
    pub async fn run(
        mut self,
        enable_console: bool,
        shutdown: oneshot::Receiver<()>,
    ) -> anyhow::Result<()> {
        let receiver = UdpReceiver::bind(self.config.listen_addr(), self.config.expected_sender())
            .await
            .context("Failed to start the UDP receiver")?;
        // Bind everything before spawning so a failed bind drops the UDP socket.
        let relay_listener = match self.config.relay_addr() {
            Some(addr) => Some(relay::bind(addr).await?),
            None => None,
        };

        let (packet_tx, packet_rx) = mpsc::channel(PACKET_QUEUE_SIZE);
        let receiver_task = tokio::spawn(receiver.run(packet_tx));
        let mut packets = ReceiverStream::new(packet_rx).fuse();

        let (relay_tx, relay_rx) = mpsc::channel(16);
        let relay_task = relay_listener
            .map(|listener| tokio::spawn(relay::accept_clients(listener, relay_tx)));
        let mut relay_clients = ReceiverStream::new(relay_rx).fuse();

        let mut batch_ticks = IntervalStream::new(tokio::time::interval(Duration::from_millis(
            self.config.batch_processing.interval_ms,
        )))
        .fuse();
        let mut stats_ticks = IntervalStream::new(tokio::time::interval(Duration::from_secs(
            self.config.stats_interval_secs,
        )))
        .fuse();

        let console: BoxStream<'static, Result<String, LinesCodecError>> = if enable_console {
            FramedRead::new(tokio::io::stdin(), LinesCodec::new()).boxed()
        } else {
            stream::empty().boxed()
        };
        let mut console = console.fuse();
        let mut shutdown = shutdown.fuse();

        info!(
            "Bridge is running ({:?} protocol, {} vehicle types, batching {})",
            self.dispatcher.generation(),
            self.dispatcher.registry().len(),
            if self.batcher.is_some() { "on" } else { "off" }
        );
        'main: loop {
            select! {
                packet = packets.next() => {
                    match packet {
                        Some(packet) => self.on_packet_received(packet),
                        None => {
                            error!("UDP receiver stopped");
                            break 'main;
                        }
                    }
                },
                _ = batch_ticks.next() => {
                    if self.pending_packets() > 0 {
                        self.flush_batch();
                    }
                },
                _ = stats_ticks.next() => {
                    self.on_stats_tick(Instant::now());
                },
                client = relay_clients.select_next_some() => {
                    self.add_relay_client(client);
                },
                line = console.select_next_some() => {
                    match line {
                        Ok(line) => self.on_console_input(line),
                        Err(e) => warn!("Console input error: {}", e),
                    }
                },
                _ = shutdown => {
                    info!("Bridge shutdown requested. Shutting down");
                    break 'main;
                },
            }
        }

        receiver_task.abort();
        if let Some(task) = relay_task {
            task.abort();
        }
        self.flush_batch();
        self.log_statistics();

        if let Ok(Err(e)) = receiver_task.await {
            return Err(anyhow::Error::new(e).context("UDP receiver failed"));
        }
        Ok(())
    }
}
