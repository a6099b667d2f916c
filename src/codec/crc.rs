//! CRC-16 checksum engine
//!
//! QRIS uses CRC-16/IBM-3740 (also known as CRC-16/CCITT-FALSE):
//! width 16, poly 0x1021, init 0xFFFF, no reflection, xor-out 0x0000.
//! The checksum covers the payload up to and including the `6304` header of
//! the CRC field itself.

use crc::{Algorithm, CRC_16_IBM_3740, Crc};

/// Header of the checksum field (`63` tag + `04` length)
pub const CRC_HEADER: &str = "6304";

/// Number of hex digits in the checksum value
pub const CRC_HEX_LEN: usize = 4;

/// Checksum calculator bound to one CRC-16 parameterization
pub struct CrcEngine {
    crc: Crc<u16>,
}

impl CrcEngine {
    /// Create an engine for any 16-bit algorithm
    pub const fn new(algorithm: &'static Algorithm<u16>) -> Self {
        Self {
            crc: Crc::<u16>::new(algorithm),
        }
    }

    /// Parameters this engine was built with
    pub fn algorithm(&self) -> &'static Algorithm<u16> {
        self.crc.algorithm
    }

    /// Checksum of raw bytes
    #[inline]
    pub fn compute(&self, bytes: &[u8]) -> u16 {
        self.crc.checksum(bytes)
    }

    /// Checksum as 4 uppercase, zero-padded hex characters
    pub fn compute_hex(&self, bytes: &[u8]) -> String {
        format_hex(self.compute(bytes))
    }

    /// Compare against an expected value
    pub fn verify(&self, bytes: &[u8], expected: u16) -> bool {
        self.compute(bytes) == expected
    }

    /// Compare against a hex string; malformed hex never verifies
    pub fn verify_hex(&self, bytes: &[u8], expected: &str) -> bool {
        parse_hex(expected).is_some_and(|value| self.verify(bytes, value))
    }
}

/// Engine used for all QRIS payloads
pub static QRIS_CRC: CrcEngine = CrcEngine::new(&CRC_16_IBM_3740);

/// QRIS checksum of `bytes`
pub fn checksum(bytes: &[u8]) -> u16 {
    QRIS_CRC.compute(bytes)
}

/// QRIS checksum of `bytes` as 4 uppercase hex characters
pub fn checksum_hex(bytes: &[u8]) -> String {
    QRIS_CRC.compute_hex(bytes)
}

/// Verify a QRIS checksum
pub fn verify(bytes: &[u8], expected: u16) -> bool {
    QRIS_CRC.verify(bytes, expected)
}

/// Format a checksum the way it appears in tag 63
pub fn format_hex(value: u16) -> String {
    format!("{:04X}", value)
}

/// Parse exactly four hex digits (either case)
pub fn parse_hex(text: &str) -> Option<u16> {
    if text.len() != CRC_HEX_LEN || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(text, 16).ok()
}

/// Split a payload into its checksummed prefix (ending in `6304`) and the
/// four characters that follow it.
///
/// A trailing `6304XXXX` is preferred; otherwise the last `6304` with at
/// least four characters after it is used. Returns `None` when no checksum
/// field can be located.
pub fn split_checksum(payload: &str) -> Option<(&str, &str)> {
    let bytes = payload.as_bytes();
    let tail = CRC_HEADER.len() + CRC_HEX_LEN;

    if bytes.len() >= tail && &bytes[bytes.len() - tail..bytes.len() - CRC_HEX_LEN] == CRC_HEADER.as_bytes() {
        let split = bytes.len() - CRC_HEX_LEN;
        return Some((payload.get(..split)?, payload.get(split..)?));
    }

    let pos = payload.rfind(CRC_HEADER)?;
    let split = pos + CRC_HEADER.len();
    if split + CRC_HEX_LEN > bytes.len() {
        return None;
    }
    Some((payload.get(..split)?, payload.get(split..split + CRC_HEX_LEN)?))
}
