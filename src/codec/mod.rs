//! QRIS wire format
//!
//! - CRC-16/IBM-3740 checksum engine
//! - Tag-length-value parser and serializer
//! - Tag table (names, composite set, sub-tag constants)

/// CRC-16 checksum engine and checksum-field location
pub mod crc;
/// QRIS tag constants and human labels
pub mod tags;
/// Tag-length-value parser/serializer
pub mod tlv;

pub use crc::{CrcEngine, QRIS_CRC};
pub use tlv::{CompositeTags, TlvCodec, parse, serialize};
