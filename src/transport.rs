//! Serial connection ownership and raw byte movement.
//!
//! The [`Transport`] is the sole reader and writer of raw bytes. It accepts
//! any interface implementing [`embedded_io::Read`] and [`embedded_io::Write`];
//! [`SerialLink`] is the serialport-backed implementation used against real
//! hardware.

use std::io;
use std::time::Duration;

use embedded_io::Error;
use serialport::{DataBits, FlowControl, Parity, StopBits};

use crate::error::Result;
use crate::stream::Reassembler;

/// The one baud rate these supplies speak.
pub const BAUD_RATE: u32 = 9600;

/// Read timeout on the port. Short, so that one drain pass over an idle line
/// returns promptly instead of stalling the event pump.
const READ_TIMEOUT: Duration = Duration::from_millis(25);

/// A serial port exposed as an [`embedded_io`] byte interface.
///
/// The port is opened 9600-8-N-1 with no flow control and byte-transparent:
/// no line-ending translation happens anywhere on this path.
pub struct SerialLink {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialLink {
    /// Open `port` with the fixed link parameters.
    pub fn open(port: &str) -> Result<Self> {
        let port = serialport::new(port, BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()?;
        Ok(Self { port })
    }
}

impl embedded_io::ErrorType for SerialLink {
    type Error = io::Error;
}

impl embedded_io::Read for SerialLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(&mut self.port, buf)
    }
}

impl embedded_io::Write for SerialLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(&mut self.port, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::Write::flush(&mut self.port)
    }
}

/// Owns the optional link and moves bytes across it.
///
/// Every operation besides [`Transport::attach`] is a deliberate no-op while
/// no link is present, so a disconnected session can still be polled and
/// commanded without tripping over its transport.
pub struct Transport<S: embedded_io::Read + embedded_io::Write> {
    link: Option<S>,
}

impl<S: embedded_io::Read + embedded_io::Write> Transport<S> {
    pub fn new() -> Self {
        Self { link: None }
    }

    /// Adopt an open link as the active connection.
    pub fn attach(&mut self, link: S) {
        self.link = Some(link);
    }

    /// Whether a link is currently attached.
    pub fn is_live(&self) -> bool {
        self.link.is_some()
    }

    /// Release the link, closing the underlying connection.
    pub fn close(&mut self) {
        self.link = None;
    }

    /// Direct access to the attached link, if any.
    pub fn link_mut(&mut self) -> Option<&mut S> {
        self.link.as_mut()
    }

    /// Write one complete frame.
    ///
    /// Commands on this link are fire-and-forget: a failed write is logged
    /// and otherwise indistinguishable from a frame lost on the wire, and
    /// the next scheduled read reconciles state either way.
    pub fn send(&mut self, frame: &[u8]) {
        let Some(link) = self.link.as_mut() else {
            return;
        };
        if let Err(e) = link.write_all(frame) {
            log::warn!("serial write failed: {:?}", e.kind());
        }
    }

    /// Move whatever bytes have already arrived into the reassembler.
    ///
    /// Reads until the link reports would-block or times out, the same way
    /// the device's replies trickle in: in arbitrary chunks, at arbitrary
    /// times.
    pub fn drain(&mut self, rx: &mut Reassembler) {
        let Some(link) = self.link.as_mut() else {
            return;
        };
        let mut chunk = [0u8; 64];
        loop {
            match link.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => rx.extend(&chunk[..n]),
                Err(e) => {
                    // A timeout just means the line is idle right now.
                    if !matches!(
                        e.kind(),
                        embedded_io::ErrorKind::TimedOut
                            | embedded_io::ErrorKind::Interrupted
                            | embedded_io::ErrorKind::Other
                    ) {
                        log::warn!("serial read failed: {:?}", e.kind());
                    }
                    break;
                }
            }
        }
    }
}

impl<S: embedded_io::Read + embedded_io::Write> Default for Transport<S> {
    fn default() -> Self {
        Self::new()
    }
}
