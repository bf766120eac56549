//! We use this mocking module in unit tests to emulate a serial port.

/// Our mock type used to emulate a serial port.
pub struct MockSerial {
    /// Everything written to the mock port, in order.
    write_buffer: Vec<u8>,
    /// Pre-loaded response data to be handed out by `read`.
    read_buffer: Vec<u8>,
    /// Current position in the read buffer.
    read_position: usize,
    /// Flag to simulate write errors.
    should_error_on_write: bool,
    /// Flag to simulate read errors.
    should_error_on_read: bool,
}

#[derive(Debug)]
pub enum MockSerialError {
    /// Simulated timeout error.
    Timeout,
    /// Generic simulated error for testing.
    SimulatedError,
    /// Would block - no data available.
    WouldBlock,
}

impl core::fmt::Display for MockSerialError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MockSerialError::Timeout => write!(f, "timeout"),
            MockSerialError::SimulatedError => write!(f, "simulated error"),
            MockSerialError::WouldBlock => write!(f, "would block"),
        }
    }
}

impl core::error::Error for MockSerialError {}

impl embedded_io::Error for MockSerialError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            MockSerialError::Timeout => embedded_io::ErrorKind::TimedOut,
            MockSerialError::SimulatedError => embedded_io::ErrorKind::Other,
            MockSerialError::WouldBlock => embedded_io::ErrorKind::Other,
        }
    }
}

impl embedded_io::ErrorType for MockSerial {
    type Error = MockSerialError;
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_write {
            return Err(MockSerialError::SimulatedError);
        }
        self.write_buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.should_error_on_write {
            return Err(MockSerialError::SimulatedError);
        }
        Ok(())
    }
}

impl embedded_io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_read {
            return Err(MockSerialError::SimulatedError);
        }
        if self.read_position >= self.read_buffer.len() {
            return Err(MockSerialError::WouldBlock);
        }

        let available = self.read_buffer.len() - self.read_position;
        let count = buf.len().min(available);
        buf[..count]
            .copy_from_slice(&self.read_buffer[self.read_position..self.read_position + count]);
        self.read_position += count;
        Ok(count)
    }
}

impl MockSerial {
    /// Create a new MockSerial instance with empty buffers.
    pub fn new() -> Self {
        Self {
            write_buffer: Vec::new(),
            read_buffer: Vec::new(),
            read_position: 0,
            should_error_on_write: false,
            should_error_on_read: false,
        }
    }

    /// Set the data that will be returned when `read` is called.
    pub fn set_read_data(&mut self, data: &[u8]) {
        self.read_buffer.clear();
        self.read_position = 0;
        self.read_buffer.extend_from_slice(data);
    }

    /// Append more incoming data without resetting the read position.
    pub fn queue_read_data(&mut self, data: &[u8]) {
        self.read_buffer.extend_from_slice(data);
    }

    /// Get a reference to the data that was written to this mock port.
    pub fn written_data(&self) -> &[u8] {
        &self.write_buffer
    }

    /// Clear the write buffer.
    pub fn clear_written_data(&mut self) {
        self.write_buffer.clear();
    }

    /// Configure whether write operations should fail with an error.
    pub fn set_write_error(&mut self, should_error: bool) {
        self.should_error_on_write = should_error;
    }

    /// Configure whether read operations should fail with an error.
    pub fn set_read_error(&mut self, should_error: bool) {
        self.should_error_on_read = should_error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Read, Write};

    #[test]
    fn write_accumulates() {
        let mut mock = MockSerial::new();
        mock.write(&[0xF7, 0x01]).unwrap();
        mock.write(&[0xFD]).unwrap();
        assert_eq!(mock.written_data(), [0xF7, 0x01, 0xFD]);

        mock.clear_written_data();
        assert!(mock.written_data().is_empty());
    }

    #[test]
    fn read_hands_out_queued_data_then_blocks() {
        let mut mock = MockSerial::new();
        mock.set_read_data(&[1, 2, 3, 4, 5]);

        let mut buf = [0u8; 3];
        assert_eq!(mock.read(&mut buf).unwrap(), 3);
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(mock.read(&mut buf).unwrap(), 2);
        assert!(matches!(
            mock.read(&mut buf),
            Err(MockSerialError::WouldBlock)
        ));
    }

    #[test]
    fn queue_appends_without_reset() {
        let mut mock = MockSerial::new();
        mock.set_read_data(&[1, 2]);
        let mut buf = [0u8; 2];
        mock.read(&mut buf).unwrap();

        mock.queue_read_data(&[3, 4]);
        assert_eq!(mock.read(&mut buf).unwrap(), 2);
        assert_eq!(buf, [3, 4]);
    }

    #[test]
    fn simulated_errors() {
        let mut mock = MockSerial::new();
        mock.set_write_error(true);
        assert!(mock.write(&[0x00]).is_err());
        assert!(mock.flush().is_err());

        mock.set_write_error(false);
        mock.set_read_data(&[1]);
        mock.set_read_error(true);
        let mut buf = [0u8; 1];
        assert!(matches!(
            mock.read(&mut buf),
            Err(MockSerialError::SimulatedError)
        ));
    }
}
