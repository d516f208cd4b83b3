use crate::udp::RawPacket;

/// Collects packets until `batch_size` is reached or the caller's timer
/// flushes. Only changes when packets are processed, never the outcome.
#[derive(Debug)]
pub struct PacketBatcher {
    batch: Vec<RawPacket>,
    batch_size: usize,
}

impl PacketBatcher {
    pub fn new(batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            batch: Vec::with_capacity(batch_size),
            batch_size,
        }
    }

    /// Queue a packet, returning the full batch once the threshold is hit.
    pub fn push(&mut self, packet: RawPacket) -> Option<Vec<RawPacket>> {
        self.batch.push(packet);
        if self.batch.len() >= self.batch_size {
            Some(self.take())
        } else {
            None
        }
    }

    pub fn take(&mut self) -> Vec<RawPacket> {
        std::mem::replace(&mut self.batch, Vec::with_capacity(self.batch_size))
    }

    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }
}
