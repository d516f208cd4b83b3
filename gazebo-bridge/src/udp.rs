use crate::error::ReceiverError;
use crate::result::ReceiverResult;
use log::{info, trace, warn};
use std::net::{IpAddr, SocketAddr};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

/// Datagrams longer than this are truncated by the socket read.
pub const RECEIVE_BUFFER_SIZE: usize = 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct RawPacket {
    pub bytes: Vec<u8>,
    pub sender: SocketAddr,
}

impl RawPacket {
    pub fn new(bytes: Vec<u8>, sender: SocketAddr) -> Self {
        Self { bytes, sender }
    }
}

/// Owns the socket and hands every accepted datagram to one consumer.
pub struct UdpReceiver {
    socket: UdpSocket,
    expected_sender: Option<IpAddr>,
}

impl UdpReceiver {
    pub async fn bind(addr: SocketAddr, expected_sender: Option<IpAddr>) -> ReceiverResult<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| ReceiverError::Bind { addr, source })?;
        match expected_sender {
            Some(ip) => info!("Listening on {}, accepting packets from {} only", addr, ip),
            None => info!("Listening on {}, accepting packets from any sender", addr),
        }
        Ok(Self {
            socket,
            expected_sender,
        })
    }

    pub fn local_addr(&self) -> ReceiverResult<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub fn accepts(&self, sender: &SocketAddr) -> bool {
        match self.expected_sender {
            Some(ip) => sender.ip() == ip,
            None => true,
        }
    }

    /// Receive until the consumer goes away. Socket errors end the loop.
    pub async fn run(self, packets: mpsc::Sender<RawPacket>) -> ReceiverResult<()> {
        let mut buf = [0u8; RECEIVE_BUFFER_SIZE];
        loop {
            let (len, sender) = self.socket.recv_from(&mut buf).await?;
            if len == 0 {
                warn!("Received 0 bytes from {}", sender);
                continue;
            }
            if !self.accepts(&sender) {
                trace!("Filtered {} byte packet from {}", len, sender);
                continue;
            }
            trace!("Received {} bytes from {}", len, sender);
            if packets
                .send(RawPacket::new(buf[..len].to_vec(), sender))
                .await
                .is_err()
            {
                info!("Packet consumer closed, receiver stopping");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn forwards_datagrams_in_order() {
        let receiver = UdpReceiver::bind("127.0.0.1:0".parse().unwrap(), None)
            .await
            .unwrap();
        let addr = receiver.local_addr().unwrap();
        let (tx, mut rx) = mpsc::channel(8);
        tokio::spawn(receiver.run(tx));

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender.send_to(&[0, 0, 1], addr).await.unwrap();
        sender.send_to(&[0, 0, 2, 9], addr).await.unwrap();

        let first = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let second = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.bytes, vec![0, 0, 1]);
        assert_eq!(second.bytes, vec![0, 0, 2, 9]);
        assert_eq!(first.sender, sender.local_addr().unwrap());
    }

    #[tokio::test]
    async fn sender_filter() {
        let receiver = UdpReceiver::bind(
            "127.0.0.1:0".parse().unwrap(),
            Some("10.1.2.3".parse().unwrap()),
        )
        .await
        .unwrap();
        assert!(receiver.accepts(&"10.1.2.3:5000".parse().unwrap()));
        assert!(!receiver.accepts(&"127.0.0.1:5000".parse().unwrap()));
    }
}
