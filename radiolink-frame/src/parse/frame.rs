use crate::consts::{ID_LENGTH_MASK, MIN_FRAME_SIZE, MIN_HEADER_LENGTH, MIN_TRAILER_LENGTH};
use crate::crc::frame_crc;
use crate::error::{ParseError, ParseErrorKind};
use crate::types::{FrameId, SecurableFrameHeader, SequenceNumber};
use crate::validate;

/// A decoded plain (non-secure) frame. Borrows the body from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainFrame<'a> {
    pub header: SecurableFrameHeader,
    pub body: &'a [u8],
}

/// Structurally decode the header at the start of `buf`.
///
/// `buf` must hold at least the whole declared frame (`fl + 1` bytes);
/// trailing bytes beyond it are ignored. Returns the header and the number of
/// header bytes consumed. The body is never inspected.
///
/// Pure and allocation-free; safe to call from interrupt context.
pub fn decode_header(buf: &[u8]) -> Result<(SecurableFrameHeader, usize), ParseError> {
    if buf.len() < MIN_FRAME_SIZE {
        return Err(ParseError::new(ParseErrorKind::Truncated, buf.len()));
    }

    let frame_length = buf[0];
    let frame_size = frame_length as usize + 1;
    if frame_size < MIN_FRAME_SIZE {
        return Err(ParseError::new(ParseErrorKind::InvalidFrameLength, 0));
    }
    if frame_size > buf.len() {
        return Err(ParseError::new(ParseErrorKind::Truncated, buf.len()));
    }

    let frame_type = validate::validate_frame_type(buf[1], 1)?;

    let seq_il = buf[2];
    let il = validate::validate_id_length(seq_il & ID_LENGTH_MASK, 2)?;
    let header_length = MIN_HEADER_LENGTH + il;
    if header_length + MIN_TRAILER_LENGTH as usize > frame_size {
        return Err(ParseError::new(ParseErrorKind::InvalidFrameLength, 0));
    }

    let id_end = MIN_HEADER_LENGTH - 1 + il;
    let id = FrameId::new(&buf[MIN_HEADER_LENGTH - 1..id_end])
        .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidIdLength, 2))?;

    let body_length = validate::validate_body_length(buf[id_end], id_end)?;
    // fl = hl - 1 + bl + tl with tl >= 1
    if header_length + body_length as usize + MIN_TRAILER_LENGTH as usize > frame_size {
        return Err(ParseError::new(ParseErrorKind::InvalidFrameLength, 0));
    }

    let header = SecurableFrameHeader {
        frame_length,
        frame_type,
        seq: SequenceNumber::from_seq_il(seq_il),
        id,
        body_length,
    };
    Ok((header, header_length))
}

/// Decode a complete plain (non-secure) frame and verify its CRC trailer.
pub fn decode_plain_frame(buf: &[u8]) -> Result<PlainFrame<'_>, ParseError> {
    let (header, header_length) = decode_header(buf)?;
    if header.is_secure() {
        return Err(ParseError::new(ParseErrorKind::InvalidType, 1));
    }
    let trailer_offset = header.trailer_offset();
    if header.trailer_length() != MIN_TRAILER_LENGTH as usize {
        return Err(ParseError::new(ParseErrorKind::InvalidTrailer, trailer_offset));
    }
    if buf[trailer_offset] != frame_crc(&buf[..trailer_offset]) {
        return Err(ParseError::new(ParseErrorKind::InvalidTrailer, trailer_offset));
    }
    Ok(PlainFrame {
        header,
        body: &buf[header_length..trailer_offset],
    })
}
