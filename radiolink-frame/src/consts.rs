/// Maximum number of ID bytes carried in a frame header.
pub const MAX_ID_LENGTH: usize = 8;

/// Header length with a zero-length ID (length, type, seq/il, body length).
pub const MIN_HEADER_LENGTH: usize = 4;

/// Maximum header length (`MIN_HEADER_LENGTH + MAX_ID_LENGTH`).
pub const MAX_HEADER_LENGTH: usize = MIN_HEADER_LENGTH + MAX_ID_LENGTH;

/// Maximum body length including any padding.
pub const MAX_BODY_LENGTH: u8 = 249;

/// Every frame carries at least a one-byte trailer (CRC or security trailer).
pub const MIN_TRAILER_LENGTH: u8 = 1;

/// Smallest possible complete frame on the wire (anonymous, empty body, 1-byte trailer).
pub const MIN_FRAME_SIZE: usize = MIN_HEADER_LENGTH + MIN_TRAILER_LENGTH as usize;

/// Largest possible complete frame on the wire (length byte plus 255).
pub const MAX_FRAME_SIZE: usize = 256;

/// High bit of the frame type marks the secure variant.
pub const SECURE_FLAG: u8 = 0x80;

/// Mask for the frame type without the secure flag.
pub const FRAME_TYPE_MASK: u8 = 0x7f;

/// Sequence number occupies the high nibble of the seq/il byte.
pub const SEQ_SHIFT: u8 = 4;

/// ID length occupies the low nibble of the seq/il byte.
pub const ID_LENGTH_MASK: u8 = 0x0f;

/// Sequence numbers wrap modulo 16.
pub const SEQ_MODULUS: u8 = 16;

/// Size of a padded body block.
pub const PADDED_BODY_SIZE: usize = 32;

/// Largest body that fits in a padded block (the last byte is the pad count).
pub const MAX_UNPADDED_BODY_SIZE: usize = PADDED_BODY_SIZE - 1;

/// Initial CRC value for plain frames, so an all-zero frame has a non-zero CRC.
pub const FRAME_CRC_INIT: u8 = 0x7f;

/// A computed frame CRC of zero is sent as this value instead.
pub const FRAME_CRC_ZERO_SUBSTITUTE: u8 = 0x80;
