use crate::error::RelayError;
use crate::result::RelayResult;
use futures::{Stream, StreamExt};
use log::{debug, info, warn};
use shared::RelayMessage;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_stream::wrappers::TcpListenerStream;

/// Frame kind for JSON payloads.
pub const FRAME_KIND_JSON: u8 = 1;
const CLIENT_QUEUE_SIZE: usize = 128;
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// `[kind u8][len u32 LE][payload]`
pub fn encode_frame(message: &RelayMessage) -> RelayResult<Vec<u8>> {
    let mut data = serde_json::to_vec(message)?;
    let mut result = vec![FRAME_KIND_JSON];
    result.append(&mut (data.len() as u32).to_le_bytes().to_vec());
    result.append(&mut data);
    Ok(result)
}

pub struct RelayClient {
    pub addr: SocketAddr,
    sender: mpsc::Sender<Vec<u8>>,
}

impl RelayClient {
    /// Spawns the writer task that owns the socket.
    pub fn spawn(stream: TcpStream, addr: SocketAddr) -> Self {
        let (sender, mut frames) = mpsc::channel::<Vec<u8>>(CLIENT_QUEUE_SIZE);
        tokio::spawn(async move {
            let mut stream = stream;
            while let Some(frame) = frames.recv().await {
                if let Err(e) = stream.write_all(&frame).await {
                    info!("Relay client {} disconnected: {}", addr, e);
                    break;
                }
            }
        });
        Self { addr, sender }
    }
}

/// Fans state changes out to every connected host engine.
#[derive(Default)]
pub struct HostRelay {
    clients: Vec<RelayClient>,
}

impl HostRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_client(&mut self, client: RelayClient) {
        info!("Relay client {} connected", client.addr);
        self.clients.push(client);
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Never blocks. Slow clients miss frames, closed clients are dropped.
    pub fn publish(&mut self, message: &RelayMessage) -> RelayResult<()> {
        if self.clients.is_empty() {
            return Ok(());
        }
        let frame = encode_frame(message)?;
        self.clients
            .retain(|client| match client.sender.try_send(frame.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    debug!("Relay client {} is lagging, frame dropped", client.addr);
                    true
                }
                Err(TrySendError::Closed(_)) => {
                    info!("Removing relay client {}", client.addr);
                    false
                }
            });
        Ok(())
    }
}

pub async fn bind(addr: SocketAddr) -> RelayResult<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| RelayError::Bind { addr, source })?;
    info!("Relay listening on {}", addr);
    Ok(listener)
}

/// Accepts host connections until the receiving side is gone.
pub async fn accept_clients(listener: TcpListener, clients: mpsc::Sender<RelayClient>) {
    forward_clients(TcpListenerStream::new(listener), clients).await
}

/// Backs off after a failed accept; errors like EMFILE repeat immediately.
async fn forward_clients<S>(mut incoming: S, clients: mpsc::Sender<RelayClient>)
where
    S: Stream<Item = io::Result<TcpStream>> + Unpin,
{
    while let Some(conn) = incoming.next().await {
        let stream = match conn {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Relay accept failed: {}", e);
                tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                continue;
            }
        };
        let addr = match stream.peer_addr() {
            Ok(addr) => addr,
            Err(e) => {
                debug!("Relay client dropped before setup: {}", e);
                continue;
            }
        };
        if let Err(e) = stream.set_nodelay(true) {
            debug!("Could not disable Nagle for relay client {}: {}", addr, e);
        }
        if clients.send(RelayClient::spawn(stream, addr)).await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::VehicleIdentity;
    use std::time::Instant;
    use tokio::io::AsyncReadExt;

    #[test]
    fn frame_layout() {
        let frame = encode_frame(&RelayMessage::VehiclesCleared).unwrap();
        assert_eq!(frame[0], FRAME_KIND_JSON);
        let len = u32::from_le_bytes([frame[1], frame[2], frame[3], frame[4]]) as usize;
        assert_eq!(len, frame.len() - 5);
        assert_eq!(&frame[5..], b"\"VehiclesCleared\"");
    }

    #[test]
    fn publish_without_clients_is_a_no_op() {
        let mut relay = HostRelay::new();
        relay.publish(&RelayMessage::VehiclesCleared).unwrap();
        assert_eq!(relay.client_count(), 0);
    }

    #[tokio::test]
    async fn connected_client_receives_frames() {
        let listener = bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, mut rx) = mpsc::channel(4);
        tokio::spawn(accept_clients(listener, tx));

        let mut host = TcpStream::connect(addr).await.unwrap();
        let client = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let mut relay = HostRelay::new();
        relay.add_client(client);

        let message = RelayMessage::VehicleRemoved(VehicleIdentity::new(3, 1));
        relay.publish(&message).unwrap();

        let mut header = [0u8; 5];
        host.read_exact(&mut header).await.unwrap();
        assert_eq!(header[0], FRAME_KIND_JSON);
        let len = u32::from_le_bytes([header[1], header[2], header[3], header[4]]) as usize;
        let mut payload = vec![0u8; len];
        host.read_exact(&mut payload).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(value["VehicleRemoved"]["vehicle_num"], 3);
        assert_eq!(value["VehicleRemoved"]["vehicle_type"], 1);
    }

    #[tokio::test]
    async fn failed_accepts_back_off_before_retrying() {
        let failures = (0..3).map(|_| Err::<TcpStream, _>(io::Error::from_raw_os_error(24)));
        let (tx, mut rx) = mpsc::channel(4);
        let started = Instant::now();
        forward_clients(futures::stream::iter(failures), tx).await;
        assert!(started.elapsed() >= ACCEPT_RETRY_DELAY * 3);
        assert!(rx.recv().await.is_none());
    }
}
