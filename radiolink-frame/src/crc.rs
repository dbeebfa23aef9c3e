use crate::consts::{FRAME_CRC_INIT, FRAME_CRC_ZERO_SUBSTITUTE};

/// Polynomial 0x5B in Koopman notation, i.e. x^7 + x^5 + x^4 + x^2 + x + 1
/// (0x37 in normal form). Hamming distance 4 for the short payloads used here.
const CRC7_5B_POLY: u8 = 0x37;

/// Fold one byte into a 7-bit CRC, most significant bit first.
///
/// Pure and reentrant; safe to call from interrupt context.
#[must_use]
pub const fn crc7_5b_update(mut crc: u8, datum: u8) -> u8 {
    let mut mask = 0x80u8;
    while mask != 0 {
        let mut bit = crc & 0x40 != 0;
        if datum & mask != 0 {
            bit = !bit;
        }
        crc <<= 1;
        if bit {
            crc ^= CRC7_5B_POLY;
        }
        mask >>= 1;
    }
    crc & 0x7f
}

/// CRC-7/5B over `data` starting from `init`.
#[must_use]
pub fn crc7_5b(init: u8, data: &[u8]) -> u8 {
    data.iter().fold(init, |crc, &b| crc7_5b_update(crc, b))
}

/// Trailer CRC for a plain (non-secure) frame, over header and body.
///
/// Never zero: a computed zero is replaced by 0x80.
#[must_use]
pub fn frame_crc(header_and_body: &[u8]) -> u8 {
    match crc7_5b(FRAME_CRC_INIT, header_and_body) {
        0 => FRAME_CRC_ZERO_SUBSTITUTE,
        crc => crc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_data_has_zero_crc() {
        assert_eq!(crc7_5b(0, &[0, 0, 0]), 0);
        assert_eq!(crc7_5b(0, &[0; 6]), 0);
    }

    #[test]
    fn test_known_values() {
        assert_eq!(crc7_5b(0, &[0, 0, 1]), 0x37);
        assert_eq!(crc7_5b(0, &[0xff, 0xff, 0xff]), 0x6a);
        assert_eq!(crc7_5b(0, b"123456789"), 0x04);
        assert_eq!(crc7_5b(0, &[0, 0, 0, 0, 0, 5]), 0x5c);
    }

    #[test]
    fn test_result_fits_seven_bits() {
        for b in 0..=u8::MAX {
            assert!(crc7_5b_update(0x7f, b) <= 0x7f);
        }
    }

    #[test]
    fn test_single_bit_flips_detected() {
        let data = [0x12u8, 0x34, 0x56, 0x78, 0x9a, 0xbc];
        let good = crc7_5b(0, &data);
        for byte in 0..data.len() {
            for bit in 0..8 {
                let mut flipped = data;
                flipped[byte] ^= 1 << bit;
                assert_ne!(crc7_5b(0, &flipped), good, "byte {byte} bit {bit}");
            }
        }
    }

    #[test]
    fn test_frame_crc_never_zero() {
        assert_ne!(frame_crc(&[]), 0);
        assert_eq!(frame_crc(&[0x05, 0x01, 0x00, 0x00, 0x00]), 0x24);
    }
}
