use crate::error::*;

pub type PacketResult<T> = Result<T, PacketError>;
pub type EncodeResult = Result<Vec<u8>, EncodeError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type ReceiverResult<T> = Result<T, ReceiverError>;
pub type RelayResult<T> = Result<T, RelayError>;
