use crate::consts::{MAX_BODY_LENGTH, MAX_ID_LENGTH};
use crate::error::{ParseError, ParseErrorKind};
use crate::types::FrameType;

/// Validate a frame type byte: low 7 bits must not be 0x00 or 0x7f.
pub fn validate_frame_type(raw: u8, pos: usize) -> Result<FrameType, ParseError> {
    let frame_type = FrameType::from_raw(raw);
    if !frame_type.is_valid() {
        return Err(ParseError::new(ParseErrorKind::InvalidType, pos));
    }
    Ok(frame_type)
}

/// Validate the ID length nibble: `[0, 8]`.
pub fn validate_id_length(il: u8, pos: usize) -> Result<usize, ParseError> {
    let il = il as usize;
    if il > MAX_ID_LENGTH {
        return Err(ParseError::new(ParseErrorKind::InvalidIdLength, pos));
    }
    Ok(il)
}

/// Validate a body length byte: `[0, 249]`.
pub fn validate_body_length(bl: u8, pos: usize) -> Result<u8, ParseError> {
    if bl > MAX_BODY_LENGTH {
        return Err(ParseError::new(ParseErrorKind::InvalidBodyLength, pos));
    }
    Ok(bl)
}
