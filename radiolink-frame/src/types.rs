use crate::consts::{
    FRAME_TYPE_MASK, ID_LENGTH_MASK, MAX_BODY_LENGTH, MAX_ID_LENGTH, MIN_HEADER_LENGTH,
    MIN_TRAILER_LENGTH, SECURE_FLAG, SEQ_MODULUS, SEQ_SHIFT,
};
use crate::error::BuildError;

/// Frame type byte. The top bit marks the secure variant of the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameType(u8);

impl FrameType {
    /// No frame should ever carry this type.
    pub const NONE: Self = Self(0x00);
    /// "I'm alive" with an empty body.
    pub const ALIVE: Self = Self(0x01);
    /// Basic valve/sensor leaf-to-hub frame (`'O'`).
    pub const BASIC_SENSOR_OR_VALVE: Self = Self(b'O');
    /// Upper bound of the type space; reserved like `NONE`.
    pub const INVALID_HIGH: Self = Self(FRAME_TYPE_MASK);

    /// Wrap a raw type byte without validation.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Raw type byte as sent on the wire.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// `true` if the secure flag (bit 7) is set.
    #[must_use]
    pub const fn is_secure(self) -> bool {
        self.0 & SECURE_FLAG != 0
    }

    /// The type with the secure flag cleared.
    #[must_use]
    pub const fn base(self) -> Self {
        Self(self.0 & FRAME_TYPE_MASK)
    }

    /// The secure variant of this type.
    #[must_use]
    pub const fn secure(self) -> Self {
        Self(self.0 | SECURE_FLAG)
    }

    /// A type is valid unless its low 7 bits are 0x00 or 0x7f.
    ///
    /// This rejects 0x00 and 0xff (and their opposite-security twins).
    #[must_use]
    pub const fn is_valid(self) -> bool {
        let base = self.0 & FRAME_TYPE_MASK;
        base != Self::NONE.0 && base != Self::INVALID_HIGH.0
    }
}

/// Frame sequence number, modulo 16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SequenceNumber(u8);

impl SequenceNumber {
    /// Returns `None` if `value` is outside `[0, 15]`.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value < SEQ_MODULUS {
            Some(Self(value))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// The following sequence number, wrapping 15 to 0.
    #[must_use]
    pub const fn next(self) -> Self {
        Self((self.0 + 1) % SEQ_MODULUS)
    }

    /// Extract from the high nibble of a seq/il byte.
    pub(crate) const fn from_seq_il(byte: u8) -> Self {
        Self(byte >> SEQ_SHIFT)
    }
}

/// The leading bytes of a node's full ID, as carried in a frame header.
///
/// An empty ID means the frame is anonymous.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FrameId {
    bytes: [u8; MAX_ID_LENGTH],
    len: u8,
}

impl FrameId {
    /// Zero-length ID for anonymous frames.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            bytes: [0; MAX_ID_LENGTH],
            len: 0,
        }
    }

    /// Copy up to `MAX_ID_LENGTH` bytes. Returns `None` if `id` is longer.
    #[must_use]
    pub fn new(id: &[u8]) -> Option<Self> {
        if id.len() > MAX_ID_LENGTH {
            return None;
        }
        let mut bytes = [0u8; MAX_ID_LENGTH];
        bytes[..id.len()].copy_from_slice(id);
        Some(Self {
            bytes,
            len: id.len() as u8,
        })
    }

    /// Take the first `len` bytes of a full node ID.
    #[must_use]
    pub fn prefix_of(full_id: &[u8], len: usize) -> Option<Self> {
        full_id.get(..len).and_then(Self::new)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `true` if this ID is a leading prefix of `full_id` (always true when anonymous).
    #[must_use]
    pub fn matches(&self, full_id: &[u8]) -> bool {
        full_id.starts_with(self.as_slice())
    }
}

impl AsRef<[u8]> for FrameId {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl core::fmt::Debug for FrameId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.as_slice().iter()).finish()
    }
}

/// Logical header of a secureable frame.
///
/// Wire layout: `fl | type | seq<<4 | il | id[il] | bl`, followed by
/// `bl` body bytes and `fl - (hl - 1) - bl` trailer bytes, where `hl = 4 + il`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurableFrameHeader {
    pub(crate) frame_length: u8,
    pub(crate) frame_type: FrameType,
    pub(crate) seq: SequenceNumber,
    pub(crate) id: FrameId,
    pub(crate) body_length: u8,
}

impl SecurableFrameHeader {
    /// Build a header, computing the frame length from body and trailer lengths.
    ///
    /// Fails for a reserved frame type, a body over 249 bytes, an empty trailer,
    /// or a total frame that does not fit the one-byte length field.
    pub fn new(
        frame_type: FrameType,
        seq: SequenceNumber,
        id: FrameId,
        body_length: u8,
        trailer_length: u8,
    ) -> Result<Self, BuildError> {
        if !frame_type.is_valid() {
            return Err(BuildError::invalid_input());
        }
        if body_length > MAX_BODY_LENGTH || trailer_length < MIN_TRAILER_LENGTH {
            return Err(BuildError::invalid_input());
        }
        let header_length = MIN_HEADER_LENGTH + id.len();
        let frame_length = header_length - 1 + body_length as usize + trailer_length as usize;
        let frame_length = u8::try_from(frame_length).map_err(|_| BuildError::invalid_input())?;
        Ok(Self {
            frame_length,
            frame_type,
            seq,
            id,
            body_length,
        })
    }

    /// Frame length byte: number of bytes following it on the wire.
    #[must_use]
    pub fn frame_length(&self) -> u8 {
        self.frame_length
    }

    #[must_use]
    pub fn frame_type(&self) -> FrameType {
        self.frame_type
    }

    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.frame_type.is_secure()
    }

    #[must_use]
    pub fn seq(&self) -> SequenceNumber {
        self.seq
    }

    #[must_use]
    pub fn id(&self) -> &FrameId {
        &self.id
    }

    /// Number of ID bytes in the header, `[0, 8]`.
    #[must_use]
    pub fn id_length(&self) -> usize {
        self.id.len()
    }

    #[must_use]
    pub fn body_length(&self) -> u8 {
        self.body_length
    }

    /// Header size on the wire, including the leading length byte.
    #[must_use]
    pub fn header_length(&self) -> usize {
        MIN_HEADER_LENGTH + self.id.len()
    }

    /// Offset of the first body byte.
    #[must_use]
    pub fn body_offset(&self) -> usize {
        self.header_length()
    }

    /// Offset of the first trailer byte.
    #[must_use]
    pub fn trailer_offset(&self) -> usize {
        self.header_length() + self.body_length as usize
    }

    /// Trailer size, derived from `fl = hl - 1 + bl + tl`.
    #[must_use]
    pub fn trailer_length(&self) -> usize {
        self.frame_size() - self.trailer_offset()
    }

    /// Complete frame size on the wire, including the length byte.
    #[must_use]
    pub fn frame_size(&self) -> usize {
        self.frame_length as usize + 1
    }

    /// Packed seq/il byte.
    #[must_use]
    pub fn seq_il(&self) -> u8 {
        (self.seq.get() << SEQ_SHIFT) | (self.id.len() as u8 & ID_LENGTH_MASK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_type_validity() {
        assert!(!FrameType::NONE.is_valid());
        assert!(!FrameType::from_raw(0xff).is_valid());
        assert!(!FrameType::from_raw(0x7f).is_valid());
        assert!(!FrameType::from_raw(0x80).is_valid());
        assert!(FrameType::ALIVE.is_valid());
        assert!(FrameType::BASIC_SENSOR_OR_VALVE.secure().is_valid());
        assert_eq!(FrameType::BASIC_SENSOR_OR_VALVE.secure().raw(), 0xcf);
        assert_eq!(FrameType::from_raw(0xcf).base(), FrameType::BASIC_SENSOR_OR_VALVE);
    }

    #[test]
    fn test_sequence_number_wraps() {
        assert!(SequenceNumber::new(16).is_none());
        let last = SequenceNumber::new(15).unwrap();
        assert_eq!(last.next().get(), 0);
    }

    #[test]
    fn test_frame_id_bounds() {
        assert!(FrameId::new(&[0; 9]).is_none());
        let id = FrameId::new(&[0xaa, 0xbb]).unwrap();
        assert_eq!(id.len(), 2);
        assert!(id.matches(&[0xaa, 0xbb, 0xcc]));
        assert!(!id.matches(&[0xaa, 0xbc]));
        assert!(FrameId::anonymous().matches(&[1, 2, 3]));
    }

    #[test]
    fn test_header_lengths() {
        let id = FrameId::new(&[0xaa, 0xbb]).unwrap();
        let header = SecurableFrameHeader::new(
            FrameType::BASIC_SENSOR_OR_VALVE,
            SequenceNumber::new(3).unwrap(),
            id,
            10,
            1,
        )
        .unwrap();
        assert_eq!(header.header_length(), 6);
        assert_eq!(header.frame_length(), 16);
        assert_eq!(header.trailer_offset(), 16);
        assert_eq!(header.trailer_length(), 1);
        assert_eq!(header.seq_il(), 0x32);
    }

    #[test]
    fn test_header_rejects_oversize() {
        let id = FrameId::new(&[0; 8]).unwrap();
        let seq = SequenceNumber::default();
        assert!(SecurableFrameHeader::new(FrameType::ALIVE, seq, id, 249, 23).is_err());
        assert!(SecurableFrameHeader::new(FrameType::ALIVE, seq, id, 250, 1).is_err());
        assert!(SecurableFrameHeader::new(FrameType::ALIVE, seq, id, 0, 0).is_err());
        assert!(SecurableFrameHeader::new(FrameType::NONE, seq, id, 0, 1).is_err());
    }
}
