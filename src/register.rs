//! This module defines the writable setting registers on the PSU and the
//! layout of the status byte carried by measurement responses.

use modular_bitfield::prelude::*;
use strum_macros::EnumIter;

/// Registers reachable through the single-register write opcode.
///
/// Read-back never addresses registers individually: the status read request
/// returns the whole measurement block in one frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter)]
#[repr(u8)]
pub enum Register {
    /// __W__ - Voltage setpoint.
    ///
    /// Value is u16 in centi-volts. E.g. 5.0 V => `500`.
    VSet = 0x09,
    /// __W__ - Current limit setpoint.
    ///
    /// Value is u16 in milli-amps. E.g. 1.5 A => `1500`.
    ISet = 0x0A,
    /// __W__ - Switched output.
    /// * `0` - Off.
    /// * `1` - On.
    OnOff = 0x1E,
}

impl From<Register> for u8 {
    fn from(value: Register) -> Self {
        value as u8
    }
}

/// "Status-high" byte of a measurement response.
///
/// Only the output bit is documented for these supplies; the remaining bits
/// are reserved and ignored.
#[bitfield]
#[derive(Clone, Copy)]
pub struct StatusFlags {
    #[skip]
    __: B5,
    pub output_on: bool,
    #[skip]
    __: B2,
}

/// Used to be less ambiguous about whether the output is on or off.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum State {
    /// Output disabled.
    #[default]
    Off = 0x00,
    /// Output enabled.
    On = 0x01,
}

impl From<State> for bool {
    fn from(value: State) -> Self {
        match value {
            State::Off => false,
            State::On => true,
        }
    }
}

impl From<bool> for State {
    fn from(value: bool) -> Self {
        match value {
            true => State::On,
            false => State::Off,
        }
    }
}
