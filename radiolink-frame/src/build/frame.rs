use crate::consts::MIN_TRAILER_LENGTH;
use crate::crc::frame_crc;
use crate::error::BuildError;
use crate::types::{FrameId, FrameType, SecurableFrameHeader, SequenceNumber};

/// A cursor-based writer into a caller-provided byte buffer.
pub struct FrameWriter<'buf> {
    buf: &'buf mut [u8],
    pos: usize,
}

impl<'buf> FrameWriter<'buf> {
    /// Create a new writer over the given buffer.
    pub fn new(buf: &'buf mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Returns the number of bytes written so far.
    #[must_use]
    pub fn written(&self) -> usize {
        self.pos
    }

    /// Write raw bytes to the buffer.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<(), BuildError> {
        if self.pos + data.len() > self.buf.len() {
            return Err(BuildError::buffer_too_small());
        }
        self.buf[self.pos..self.pos + data.len()].copy_from_slice(data);
        self.pos += data.len();
        Ok(())
    }

    /// Write a single byte.
    pub fn write_byte(&mut self, b: u8) -> Result<(), BuildError> {
        if self.pos >= self.buf.len() {
            return Err(BuildError::buffer_too_small());
        }
        self.buf[self.pos] = b;
        self.pos += 1;
        Ok(())
    }

    /// Write the wire form of a header.
    pub fn write_header(&mut self, header: &SecurableFrameHeader) -> Result<(), BuildError> {
        self.write_byte(header.frame_length())?;
        self.write_byte(header.frame_type().raw())?;
        self.write_byte(header.seq_il())?;
        self.write_bytes(header.id().as_slice())?;
        self.write_byte(header.body_length())
    }

    /// Everything written so far.
    #[must_use]
    pub fn as_written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }
}

/// Encode a header into `buf`. Returns the number of bytes written (`4 + il`).
///
/// Only the header is written; body and trailer are the caller's concern.
/// Pure and allocation-free; safe to call from interrupt context.
pub fn encode_header(header: &SecurableFrameHeader, buf: &mut [u8]) -> Result<usize, BuildError> {
    let mut w = FrameWriter::new(buf);
    w.write_header(header)?;
    Ok(w.written())
}

/// Encode a complete plain (non-secure) frame: header, body and a CRC-7 trailer.
///
/// Returns the number of bytes written.
pub fn encode_plain_frame(
    frame_type: FrameType,
    seq: SequenceNumber,
    id: FrameId,
    body: &[u8],
    buf: &mut [u8],
) -> Result<usize, BuildError> {
    if frame_type.is_secure() {
        return Err(BuildError::invalid_input());
    }
    let body_length = u8::try_from(body.len()).map_err(|_| BuildError::invalid_input())?;
    let header = SecurableFrameHeader::new(frame_type, seq, id, body_length, MIN_TRAILER_LENGTH)?;

    let mut w = FrameWriter::new(buf);
    w.write_header(&header)?;
    w.write_bytes(body)?;
    let crc = frame_crc(w.as_written());
    w.write_byte(crc)?;
    Ok(w.written())
}
