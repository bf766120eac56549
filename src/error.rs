//! Our error types for the bench PSU driver.

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Errors surfaced to callers of the driver.
///
/// Malformed or truncated incoming frames are deliberately absent here: the
/// receive path drops them and keeps running, so they are not errors at all
/// from the caller's point of view.
#[derive(Error, Debug)]
pub enum Error {
    /// Opening the serial connection failed. Non-fatal; the session stays
    /// disconnected and a later connect may succeed.
    #[error("serial connection failed: {0}")]
    Connection(#[from] serialport::Error),
    /// A setpoint outside the device's accepted range. Rejected before
    /// anything is transmitted.
    #[error("{quantity} setpoint {value} outside accepted range 0..={max}")]
    Range {
        quantity: &'static str,
        value: f64,
        max: f64,
    },
}
