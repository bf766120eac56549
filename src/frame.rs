//! Frame construction and response decoding for the wire protocol.
//!
//! Every frame on the link, in either direction, has the shape
//! `[payload bytes][crc-low][crc-high][0xFD]` where the CRC is the
//! CRC-16/MODBUS of all preceding bytes and the payload always begins with
//! the device address `0xF7`.

use crate::crc::crc16_modbus;
use crate::register::{Register, StatusFlags};
use crate::scaling;

/// Address byte every frame starts with.
pub const DEVICE_ADDRESS: u8 = 0xF7;
/// Terminator byte every frame ends with.
pub const TERMINATOR: u8 = 0xFD;
/// Length of a complete measurement response frame.
pub const RESPONSE_LEN: usize = 14;

/// Fixed unit identifier; these links are point-to-point.
const UNIT_ID: u8 = 0x01;
/// Opcode of the measurement block read request.
const OP_READ: u8 = 0x03;
/// Opcode of a single-register write.
const OP_WRITE: u8 = 0x0A;
/// First register of the measurement block requested by a read.
const READ_BASE: u8 = 0x04;
/// Number of registers in the measurement block.
const READ_COUNT: u8 = 0x03;
/// Register count carried by a single-register write.
const WRITE_COUNT: u8 = 0x01;

// Measurement response layout. The CRC bytes sit at offsets 11..13 and the
// terminator at 13.
const STATUS_HIGH: usize = 5;
const VOLTAGE_HIGH: usize = 7;
const CURRENT_HIGH: usize = 9;
const CRC_LOW: usize = 11;

/// A request to the device. Immutable once built; encoding the same command
/// twice yields identical bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Request the measurement block (output state, voltage, current).
    ReadValues,
    /// Switch the output on or off.
    SetOutput(bool),
    /// Program the voltage setpoint, in volts.
    SetVoltage(f64),
    /// Program the current limit setpoint, in amps.
    SetCurrent(f64),
}

impl Command {
    /// Encode this command as a complete wire frame.
    pub fn frame(&self) -> Vec<u8> {
        let mut frame = match *self {
            Command::ReadValues => {
                vec![DEVICE_ADDRESS, UNIT_ID, OP_READ, READ_BASE, READ_COUNT]
            }
            Command::SetOutput(on) => write_payload(Register::OnOff, on as u16),
            Command::SetVoltage(volts) => {
                write_payload(Register::VSet, scaling::volts_to_raw(volts))
            }
            Command::SetCurrent(amps) => {
                write_payload(Register::ISet, scaling::amps_to_raw(amps))
            }
        };
        let crc = crc16_modbus(&frame);
        frame.extend_from_slice(&crc.to_le_bytes());
        frame.push(TERMINATOR);
        frame
    }
}

/// All writes share one shape: address, unit, opcode, register, count, and
/// the value as a big-endian u16.
fn write_payload(register: Register, value: u16) -> Vec<u8> {
    let value = value.to_be_bytes();
    vec![
        DEVICE_ADDRESS,
        UNIT_ID,
        OP_WRITE,
        register.into(),
        WRITE_COUNT,
        value[0],
        value[1],
    ]
}

/// A decoded measurement response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Response {
    /// Whether the output is switched on.
    pub output_state: bool,
    /// Measured output voltage in volts, 0.01 V resolution.
    pub voltage: f64,
    /// Measured output current in amps, 0.001 A resolution.
    pub current: f64,
}

impl Response {
    /// Decode a candidate frame carved out of the receive stream.
    ///
    /// Malformed or truncated candidates yield `None` rather than an error;
    /// line noise is an ordinary control path on this link. A CRC mismatch
    /// on an otherwise well-formed frame is logged but does not reject the
    /// decode, matching the lenient behavior observed in device traces.
    pub fn decode(candidate: &[u8]) -> Option<Self> {
        if candidate.len() < RESPONSE_LEN
            || candidate[0] != DEVICE_ADDRESS
            || candidate[RESPONSE_LEN - 1] != TERMINATOR
        {
            return None;
        }
        let received = u16::from_le_bytes([candidate[CRC_LOW], candidate[CRC_LOW + 1]]);
        let computed = crc16_modbus(&candidate[..CRC_LOW]);
        if received != computed {
            log::warn!("response CRC mismatch: received={received:04X} computed={computed:04X}");
        }
        let status = StatusFlags::from_bytes([candidate[STATUS_HIGH]]);
        Some(Self {
            output_state: status.output_on(),
            voltage: scaling::raw_to_volts(u16::from_be_bytes([
                candidate[VOLTAGE_HIGH],
                candidate[VOLTAGE_HIGH + 1],
            ])),
            current: scaling::raw_to_amps(u16::from_be_bytes([
                candidate[CURRENT_HIGH],
                candidate[CURRENT_HIGH + 1],
            ])),
        })
    }
}
