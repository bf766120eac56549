//! CRC-16/MODBUS checksum used by every frame on the wire.
//!
//! Parameters: polynomial 0x8005 (reflected form 0xA001), initial value
//! 0xFFFF, input and output reflected, no final XOR. Check value for
//! `"123456789"` is 0x4B37. The checksum is appended to frames LSB first.

use crc::{CRC_16_MODBUS, Crc};

const CRC_COMPUTER: Crc<u16> = Crc::<u16>::new(&CRC_16_MODBUS);

/// Calculate the CRC-16/MODBUS value of `data`.
///
/// Total over every finite byte sequence; the empty sequence yields the
/// seed value 0xFFFF.
#[inline]
pub fn crc16_modbus(data: &[u8]) -> u16 {
    CRC_COMPUTER.checksum(data)
}
