//! Device session: state ownership, poll scheduling, and command dispatch.
//!
//! A [`Session`] owns the transport, the receive reassembler, and the
//! last-known [`DeviceState`], and is the only thing that mutates any of
//! them. It is driven cooperatively: the host calls [`Session::service`]
//! from its event loop, and byte arrival plus deadline passage are the only
//! sources of progress. Commands are fire-and-forget; confirmation comes
//! from the next scheduled read, never from blocking on a reply.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::frame::{Command, Response};
use crate::register::State;
use crate::stream::Reassembler;
use crate::transport::{SerialLink, Transport};

/// Poll cadence used when the caller does not pick one.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Delay before the read that confirms an output toggle.
const OUTPUT_CONFIRM_DELAY: Duration = Duration::from_millis(500);
/// Delay before the read that confirms a setpoint write.
const SETPOINT_CONFIRM_DELAY: Duration = Duration::from_millis(300);

/// Accepted voltage setpoint range, volts.
pub const VOLTAGE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=60.0;
/// Accepted current setpoint range, amps.
pub const CURRENT_RANGE: std::ops::RangeInclusive<f64> = 0.0..=6.0;

/// Last-known measurements and targets for the connected device.
///
/// Mutated only by the session: on every decoded response, and optimistically
/// when a set command goes out. Reset when a connection is (re)established.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DeviceState {
    /// Measured output voltage in volts.
    pub voltage: f64,
    /// Measured output current in amps.
    pub current: f64,
    /// Whether the output is switched on.
    pub output_state: bool,
    /// Most recently requested voltage setpoint.
    pub set_voltage: f64,
    /// Most recently requested current limit.
    pub set_current: f64,
}

/// Callback invoked with `(voltage, current, output_state)` after every
/// decoded response. It runs on the pump path, so keep it quick.
pub type Subscriber = Box<dyn FnMut(f64, f64, bool)>;

/// A driver session for one PSU on one serial port.
///
/// Generic over the byte interface so tests (and unusual transports) can
/// supply their own; [`Session::connect`] on the serialport-backed flavor is
/// the everyday entry point.
pub struct Session<S: embedded_io::Read + embedded_io::Write> {
    transport: Transport<S>,
    rx: Reassembler,
    state: DeviceState,
    port: Option<String>,
    poll_interval: Duration,
    next_poll: Option<Instant>,
    confirm_at: Option<Instant>,
    subscribers: Vec<Subscriber>,
    trace: bool,
}

impl Session<SerialLink> {
    /// Open `port` and enter the connected state.
    ///
    /// Any prior connection is closed first. On failure the session remains
    /// disconnected and can simply try again later.
    pub fn connect(&mut self, port: &str) -> Result<()> {
        self.disconnect();
        let link = SerialLink::open(port)?;
        self.port = Some(port.to_owned());
        self.attach(link);
        Ok(())
    }
}

impl<S: embedded_io::Read + embedded_io::Write> Session<S> {
    pub fn new() -> Self {
        Self {
            transport: Transport::new(),
            rx: Reassembler::new(),
            state: DeviceState::default(),
            port: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            next_poll: None,
            confirm_at: None,
            subscribers: Vec::new(),
            trace: false,
        }
    }

    /// Adopt an already-open byte interface as the connection, resetting all
    /// per-connection state.
    pub fn attach(&mut self, link: S) {
        self.rx.clear();
        self.state = DeviceState::default();
        self.transport.attach(link);
    }

    /// Cancel the poll schedule and release the connection. Idempotent.
    pub fn disconnect(&mut self) {
        self.next_poll = None;
        self.confirm_at = None;
        self.transport.close();
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_live()
    }

    /// Last-known device state.
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Port name of the most recent successful connect, if any.
    pub fn port_name(&self) -> Option<&str> {
        self.port.as_deref()
    }

    /// Enable hex dumps of every frame sent and received, at debug level.
    pub fn set_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    /// Register a measurement subscriber.
    ///
    /// A panicking subscriber is logged and skipped; it cannot take the
    /// polling loop down with it.
    pub fn subscribe(&mut self, subscriber: impl FnMut(f64, f64, bool) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Begin polling the measurement block every `interval`.
    ///
    /// Replaces any existing schedule and issues one read immediately;
    /// subsequent reads go out as [`Session::service`] observes each
    /// deadline pass.
    pub fn start_polling(&mut self, interval: Duration) {
        self.poll_interval = interval;
        self.issue(Command::ReadValues);
        self.next_poll = Some(Instant::now() + interval);
    }

    /// Encode and transmit `command`.
    ///
    /// Setpoints are range-checked before anything is transmitted. While
    /// disconnected every command is a no-op, so callers do not need to
    /// track connection state themselves. Set commands update local state
    /// optimistically and schedule a delayed read to reconcile with the
    /// device's ground truth.
    pub fn send(&mut self, command: Command) -> Result<()> {
        match command {
            Command::SetVoltage(volts) if !VOLTAGE_RANGE.contains(&volts) => {
                return Err(Error::Range {
                    quantity: "voltage",
                    value: volts,
                    max: *VOLTAGE_RANGE.end(),
                });
            }
            Command::SetCurrent(amps) if !CURRENT_RANGE.contains(&amps) => {
                return Err(Error::Range {
                    quantity: "current",
                    value: amps,
                    max: *CURRENT_RANGE.end(),
                });
            }
            _ => {}
        }
        if !self.transport.is_live() {
            return Ok(());
        }
        match command {
            Command::SetOutput(on) => {
                // Applied before the device confirms; the delayed read
                // reconciles if the device disagrees.
                self.state.output_state = on;
                self.confirm_at = Some(Instant::now() + OUTPUT_CONFIRM_DELAY);
            }
            Command::SetVoltage(volts) => {
                self.state.set_voltage = volts;
                self.confirm_at = Some(Instant::now() + SETPOINT_CONFIRM_DELAY);
            }
            Command::SetCurrent(amps) => {
                self.state.set_current = amps;
                self.confirm_at = Some(Instant::now() + SETPOINT_CONFIRM_DELAY);
            }
            Command::ReadValues => {}
        }
        self.issue(command);
        Ok(())
    }

    /// Request the measurement block once, outside the poll schedule.
    pub fn read_values(&mut self) -> Result<()> {
        self.send(Command::ReadValues)
    }

    /// Switch the output on or off.
    pub fn set_output(&mut self, state: impl Into<State>) -> Result<()> {
        self.send(Command::SetOutput(state.into().into()))
    }

    /// Program the voltage setpoint. Accepted range 0 - 60 V.
    pub fn set_voltage(&mut self, volts: f64) -> Result<()> {
        self.send(Command::SetVoltage(volts))
    }

    /// Program the current limit. Accepted range 0 - 6 A.
    pub fn set_current(&mut self, amps: f64) -> Result<()> {
        self.send(Command::SetCurrent(amps))
    }

    /// Run one pump pass at `now`: fire reads whose deadline has passed,
    /// ingest whatever bytes have arrived, decode, and publish.
    ///
    /// All work triggered by a pass runs to completion inside it, so
    /// subscribers never observe a partial update.
    pub fn service(&mut self, now: Instant) {
        if self.confirm_at.is_some_and(|at| at <= now) {
            self.confirm_at = None;
            self.issue(Command::ReadValues);
        }
        if self.next_poll.is_some_and(|at| at <= now) {
            self.next_poll = Some(now + self.poll_interval);
            self.issue(Command::ReadValues);
        }
        self.transport.drain(&mut self.rx);
        while let Some(candidate) = self.rx.next_candidate() {
            if self.trace {
                log::debug!("rx {candidate:02X?}");
            }
            if let Some(response) = Response::decode(&candidate) {
                self.apply(response);
            }
        }
    }

    fn issue(&mut self, command: Command) {
        if !self.transport.is_live() {
            return;
        }
        let frame = command.frame();
        if self.trace {
            log::debug!("tx {frame:02X?}");
        }
        self.transport.send(&frame);
    }

    /// The sole mutation path for measured values.
    fn apply(&mut self, response: Response) {
        self.state.voltage = response.voltage;
        self.state.current = response.current;
        self.state.output_state = response.output_state;
        self.notify();
    }

    fn notify(&mut self) {
        let DeviceState {
            voltage,
            current,
            output_state,
            ..
        } = self.state;
        for subscriber in &mut self.subscribers {
            let call = AssertUnwindSafe(|| subscriber(voltage, current, output_state));
            if catch_unwind(call).is_err() {
                log::warn!("measurement subscriber panicked; continuing");
            }
        }
    }
}

impl<S: embedded_io::Read + embedded_io::Write> Default for Session<S> {
    fn default() -> Self {
        Self::new()
    }
}
