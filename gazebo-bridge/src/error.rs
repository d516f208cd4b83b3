use std::net::SocketAddr;
use thiserror::Error;

use crate::protocol::ProtocolGeneration;
use shared::MessageId;

/// Why a datagram did not produce a record. Never leaves the dispatcher.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PacketError {
    #[error("packet of {len} bytes is shorter than the 3 byte header")]
    TooShort { len: usize },
    #[error("vehicle type {0} is not registered")]
    UnknownVehicleType(u8),
    #[error("unknown message id {0}")]
    UnknownMessageId(u8),
    #[error("message id {actual} handed to the {expected:?} decoder")]
    MessageIdMismatch { expected: MessageId, actual: u8 },
    #[error("expected a {expected} byte packet, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("servo block {index} runs past the end of a {len} byte packet")]
    TruncatedServoBlock { index: usize, len: usize },
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("rotation does not match the {expected:?} protocol generation")]
    GenerationMismatch { expected: ProtocolGeneration },
    #[error("serializing the payload failed")]
    Serialize(#[from] Box<bincode::ErrorKind>),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not open the config file")]
    Open(std::io::Error),
    #[error("could not write the default config file")]
    Write(std::io::Error),
    #[error("parsing the config failed: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ReceiverError {
    #[error("could not bind the UDP socket to {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("reading from the socket failed")]
    Receive(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("could not bind the relay listener to {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("serializing relay message failed")]
    Encode(#[from] serde_json::Error),
}
