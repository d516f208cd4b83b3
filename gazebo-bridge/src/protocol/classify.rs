use crate::error::PacketError;
use crate::result::PacketResult;
use shared::VehicleIdentity;

/// The fixed three byte header every message kind starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    pub vehicle_num: u8,
    pub vehicle_type: u8,
    pub message_id: u8,
}

impl PacketHeader {
    pub fn identity(&self) -> VehicleIdentity {
        VehicleIdentity::new(self.vehicle_num, self.vehicle_type)
    }
}

pub fn classify(bytes: &[u8]) -> PacketResult<PacketHeader> {
    match *bytes {
        [vehicle_num, vehicle_type, message_id, ..] => Ok(PacketHeader {
            vehicle_num,
            vehicle_type,
            message_id,
        }),
        _ => Err(PacketError::TooShort { len: bytes.len() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_header_bytes() {
        let header = classify(&[7, 1, 3, 0xAA]).unwrap();
        assert_eq!(header.vehicle_num, 7);
        assert_eq!(header.vehicle_type, 1);
        assert_eq!(header.message_id, 3);
        assert_eq!(header.identity(), VehicleIdentity::new(7, 1));
    }

    #[test]
    fn bare_header_is_enough() {
        assert!(classify(&[0, 0, 9]).is_ok());
    }

    #[test]
    fn rejects_short_packets() {
        assert_eq!(classify(&[]), Err(PacketError::TooShort { len: 0 }));
        assert_eq!(classify(&[1, 2]), Err(PacketError::TooShort { len: 2 }));
    }
}
