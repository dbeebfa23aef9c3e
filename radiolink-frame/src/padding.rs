use crate::consts::{MAX_UNPADDED_BODY_SIZE, PADDED_BODY_SIZE};
use crate::error::{BuildError, ParseError, ParseErrorKind};

/// Pad `body` (at most 31 bytes) to a 32-byte block.
///
/// Unused bytes are zero and the final byte holds the number of zero bytes added.
pub fn pad_32(body: &[u8]) -> Result<[u8; PADDED_BODY_SIZE], BuildError> {
    if body.len() > MAX_UNPADDED_BODY_SIZE {
        return Err(BuildError::invalid_input());
    }
    let mut block = [0u8; PADDED_BODY_SIZE];
    block[..body.len()].copy_from_slice(body);
    block[PADDED_BODY_SIZE - 1] = (MAX_UNPADDED_BODY_SIZE - body.len()) as u8;
    Ok(block)
}

/// Recover the body length from a padded block, checking the padding bytes.
pub fn unpad_32(block: &[u8; PADDED_BODY_SIZE]) -> Result<usize, ParseError> {
    let zeros = block[PADDED_BODY_SIZE - 1] as usize;
    if zeros > MAX_UNPADDED_BODY_SIZE {
        return Err(ParseError::new(ParseErrorKind::InvalidPadding, PADDED_BODY_SIZE - 1));
    }
    let len = MAX_UNPADDED_BODY_SIZE - zeros;
    if let Some(pos) = block[len..PADDED_BODY_SIZE - 1].iter().position(|&b| b != 0) {
        return Err(ParseError::new(ParseErrorKind::InvalidPadding, len + pos));
    }
    Ok(len)
}
