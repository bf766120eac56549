//! This crate provides a driver for laboratory bench power supplies reachable
//! over a point-to-point serial link, using the binary protocol in which
//! every frame is addressed to `0xF7`, terminated by `0xFD`, and carries a
//! CRC-16/MODBUS checksum.
//!
//! The driver issues read/write commands, frames and checksums them, and
//! decodes the asynchronously arriving byte stream back into structured
//! measurements (output state, voltage, current). A [`session::Session`]
//! owns the connection lifecycle, polls the device on a schedule, dispatches
//! setpoint commands, and notifies subscribers with each decoded measurement.
//! Display and logging front ends are expected to attach as subscribers;
//! they never touch the wire format.
//!
//! The serial port used for PSU comms should be configured like so:
//! * Baud rate: 9600
//! * Data bits: 8
//! * Stop bits: 1
//! * Parity: None
//! * Flow control: None
//!
//! [`transport::SerialLink::open`] applies exactly these parameters; the link
//! is byte-transparent with no line-ending translation.

pub mod crc;
pub mod error;
pub mod frame;
pub mod register;
pub mod scaling;
pub mod session;
pub mod stream;
pub mod transport;

#[cfg(test)]
mod mock_serial;
