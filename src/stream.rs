//! Reassembly of delimited frames out of a fragmented, possibly noisy byte
//! stream.

use crate::frame::{DEVICE_ADDRESS, TERMINATOR};

/// Accumulates raw bytes from the transport and carves out candidate frames
/// for the codec.
///
/// Extraction is best-effort resynchronization, not guaranteed framing: the
/// slice from the first address byte to the first terminator is handed out
/// as a candidate, and everything through that terminator is discarded
/// whether or not the candidate decodes. A terminator that belongs to noise
/// or a half-received frame therefore produces one short candidate that the
/// codec drops, and framing recovers on the following chunk. Frames on this
/// link are short and low-rate, so recovery costs at most one reply.
#[derive(Debug, Default)]
pub struct Reassembler {
    buffer: Vec<u8>,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw chunk received from the transport.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Carve the next candidate frame out of the buffer.
    ///
    /// Returns `None` until the buffer holds both an address byte and a
    /// terminator. A terminator that precedes the first address byte yields
    /// an empty candidate; the bytes through it are discarded either way,
    /// which is how leading garbage leaves the buffer.
    pub fn next_candidate(&mut self) -> Option<Vec<u8>> {
        let start = self.buffer.iter().position(|&b| b == DEVICE_ADDRESS)?;
        let end = self.buffer.iter().position(|&b| b == TERMINATOR)?;
        let candidate = if end >= start {
            self.buffer[start..=end].to_vec()
        } else {
            Vec::new()
        };
        self.buffer.drain(..=end);
        Some(candidate)
    }

    /// Discard all buffered bytes.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
