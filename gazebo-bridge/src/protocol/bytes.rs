/// Little-endian f32 at `offset`.
///
/// Returns `0.0` when fewer than four bytes remain. Decoders check the packet
/// length before reading, so this only guards against a bad offset.
pub fn decode_f32_le(buffer: &[u8], offset: usize) -> f32 {
    match offset
        .checked_add(4)
        .and_then(|end| buffer.get(offset..end))
    {
        Some(bytes) => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_one() {
        assert_eq!(decode_f32_le(&[0x00, 0x00, 0x80, 0x3F], 0), 1.0);
    }

    #[test]
    fn honours_offset() {
        let buffer = [0xFF, 0x00, 0x00, 0x20, 0xC1];
        assert_eq!(decode_f32_le(&buffer, 1), -10.0);
    }

    #[test]
    fn out_of_bounds_reads_zero() {
        let buffer = [0x00, 0x00, 0x80, 0x3F];
        assert_eq!(decode_f32_le(&buffer, 1), 0.0);
        assert_eq!(decode_f32_le(&buffer, 4), 0.0);
        assert_eq!(decode_f32_le(&[], 0), 0.0);
        assert_eq!(decode_f32_le(&buffer, usize::MAX), 0.0);
    }
}
