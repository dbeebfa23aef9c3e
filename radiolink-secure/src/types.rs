use crate::consts::{
    EPHEMERAL_COUNTER_SIZE, ERASED_BYTE, MESSAGE_COUNTER_SIZE, NODE_ID_SIZE, NONCE_SIZE,
    RESTART_COUNTER_SIZE, TAG_SIZE,
};

/// AEAD nonce: sender ID bytes followed by the message counter.
pub type Nonce = [u8; NONCE_SIZE];

/// Detached AEAD authentication tag.
pub type Tag = [u8; TAG_SIZE];

/// Full node ID as held in the association table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId([u8; NODE_ID_SIZE]);

impl NodeId {
    #[must_use]
    pub const fn new(bytes: [u8; NODE_ID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns `None` unless `bytes` is exactly `NODE_ID_SIZE` long.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; NODE_ID_SIZE] {
        &self.0
    }

    /// A leading 0xff is the erased state of storage and never a valid ID.
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        self.0[0] == ERASED_BYTE
    }
}

impl AsRef<[u8]> for NodeId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Persistent high-order 3 bytes of the TX message counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RestartCounter([u8; RESTART_COUNTER_SIZE]);

impl RestartCounter {
    pub const ZERO: Self = Self([0; RESTART_COUNTER_SIZE]);
    pub const MAX: Self = Self([0xff; RESTART_COUNTER_SIZE]);

    #[must_use]
    pub const fn new(bytes: [u8; RESTART_COUNTER_SIZE]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; RESTART_COUNTER_SIZE] {
        &self.0
    }

    #[must_use]
    pub fn to_u32(self) -> u32 {
        u32::from_be_bytes([0, self.0[0], self.0[1], self.0[2]])
    }

    /// Returns `None` if `value` does not fit in 24 bits.
    #[must_use]
    pub fn from_u32(value: u32) -> Option<Self> {
        let [top, a, b, c] = value.to_be_bytes();
        if top != 0 {
            return None;
        }
        Some(Self([a, b, c]))
    }

    /// The next value, or `None` when already at the maximum.
    #[must_use]
    pub fn checked_next(self) -> Option<Self> {
        Self::from_u32(self.to_u32() + 1)
    }
}

/// Full 6-byte message counter. Highest-index bytes increment fastest,
/// so byte-wise ordering is numeric ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MessageCounter([u8; MESSAGE_COUNTER_SIZE]);

impl MessageCounter {
    pub const ZERO: Self = Self([0; MESSAGE_COUNTER_SIZE]);
    /// Exhausted value; never handed out for transmission.
    pub const MAX: Self = Self([0xff; MESSAGE_COUNTER_SIZE]);

    #[must_use]
    pub const fn new(bytes: [u8; MESSAGE_COUNTER_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns `None` unless `bytes` is exactly 6 bytes long.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }

    /// Join the persistent and ephemeral halves.
    #[must_use]
    pub fn from_parts(restart: RestartCounter, ephemeral: [u8; EPHEMERAL_COUNTER_SIZE]) -> Self {
        let mut bytes = [0u8; MESSAGE_COUNTER_SIZE];
        bytes[..RESTART_COUNTER_SIZE].copy_from_slice(restart.as_bytes());
        bytes[RESTART_COUNTER_SIZE..].copy_from_slice(&ephemeral);
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; MESSAGE_COUNTER_SIZE] {
        &self.0
    }

    #[must_use]
    pub fn restart(&self) -> RestartCounter {
        RestartCounter([self.0[0], self.0[1], self.0[2]])
    }

    #[must_use]
    pub fn ephemeral(&self) -> [u8; EPHEMERAL_COUNTER_SIZE] {
        [self.0[3], self.0[4], self.0[5]]
    }

    #[must_use]
    pub fn to_u64(self) -> u64 {
        let mut wide = [0u8; 8];
        wide[2..].copy_from_slice(&self.0);
        u64::from_be_bytes(wide)
    }

    /// Returns `None` if `value` does not fit in 48 bits.
    #[must_use]
    pub fn from_u64(value: u64) -> Option<Self> {
        let wide = value.to_be_bytes();
        if wide[..2] != [0, 0] {
            return None;
        }
        Self::from_slice(&wide[2..])
    }
}
