use core::fmt;

use radiolink_frame::{BuildError, BuildErrorKind, ParseError};

/// Specific kind of secure-layer error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecureErrorKind {
    /// Both redundant copies of a stored counter are invalid.
    CounterUnavailable,
    /// The TX message counter has reached its maximum; keys must be rotated.
    CounterExhausted,
    /// Received counter is not strictly greater than the stored one.
    Replay,
    /// No association exists for the node ID.
    UnknownPeer,
    /// Every association slot is in use.
    AssociationsFull,
    /// Node ID is too short or uses the reserved erased first byte.
    InvalidId,
    /// Storage layout overlaps itself or does not fit the store.
    InvalidLayout,
    /// Key size does not match the cipher.
    InvalidKeySize,
    /// The cipher failed to encrypt.
    EncryptionFailed,
    /// No candidate authenticated the frame.
    AuthenticationFailed,
    /// No known node matches the frame's ID prefix.
    NoCandidates,
    /// Frame failed structural checks.
    MalformedFrame,
    /// Frame type does not have the secure flag set.
    NotSecure,
    /// Output buffer is too small.
    BufferTooSmall,
    /// Plaintext body does not fit a padded block.
    BodyTooLarge,
}

/// Error returned by counter, nonce and secure frame operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecureError {
    pub kind: SecureErrorKind,
}

impl SecureError {
    #[must_use]
    pub fn new(kind: SecureErrorKind) -> Self {
        Self { kind }
    }

    #[must_use]
    pub fn counter_unavailable() -> Self {
        Self::new(SecureErrorKind::CounterUnavailable)
    }

    #[must_use]
    pub fn counter_exhausted() -> Self {
        Self::new(SecureErrorKind::CounterExhausted)
    }

    #[must_use]
    pub fn replay() -> Self {
        Self::new(SecureErrorKind::Replay)
    }

    #[must_use]
    pub fn unknown_peer() -> Self {
        Self::new(SecureErrorKind::UnknownPeer)
    }

    #[must_use]
    pub fn associations_full() -> Self {
        Self::new(SecureErrorKind::AssociationsFull)
    }

    #[must_use]
    pub fn invalid_id() -> Self {
        Self::new(SecureErrorKind::InvalidId)
    }

    #[must_use]
    pub fn invalid_layout() -> Self {
        Self::new(SecureErrorKind::InvalidLayout)
    }

    #[must_use]
    pub fn invalid_key_size() -> Self {
        Self::new(SecureErrorKind::InvalidKeySize)
    }

    #[must_use]
    pub fn encryption_failed() -> Self {
        Self::new(SecureErrorKind::EncryptionFailed)
    }

    #[must_use]
    pub fn authentication_failed() -> Self {
        Self::new(SecureErrorKind::AuthenticationFailed)
    }

    #[must_use]
    pub fn no_candidates() -> Self {
        Self::new(SecureErrorKind::NoCandidates)
    }

    #[must_use]
    pub fn malformed_frame() -> Self {
        Self::new(SecureErrorKind::MalformedFrame)
    }

    #[must_use]
    pub fn not_secure() -> Self {
        Self::new(SecureErrorKind::NotSecure)
    }

    #[must_use]
    pub fn buffer_too_small() -> Self {
        Self::new(SecureErrorKind::BufferTooSmall)
    }

    #[must_use]
    pub fn body_too_large() -> Self {
        Self::new(SecureErrorKind::BodyTooLarge)
    }
}

impl From<ParseError> for SecureError {
    fn from(_: ParseError) -> Self {
        Self::malformed_frame()
    }
}

impl From<BuildError> for SecureError {
    fn from(e: BuildError) -> Self {
        match e.kind {
            BuildErrorKind::BufferTooSmall => Self::buffer_too_small(),
            BuildErrorKind::InvalidInput => Self::malformed_frame(),
        }
    }
}

impl fmt::Display for SecureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let desc = match self.kind {
            SecureErrorKind::CounterUnavailable => "message counter unavailable (storage corrupt)",
            SecureErrorKind::CounterExhausted => "message counter exhausted",
            SecureErrorKind::Replay => "message counter not newer than last received",
            SecureErrorKind::UnknownPeer => "unknown peer",
            SecureErrorKind::AssociationsFull => "no free association slot",
            SecureErrorKind::InvalidId => "invalid node ID",
            SecureErrorKind::InvalidLayout => "invalid storage layout",
            SecureErrorKind::InvalidKeySize => "invalid key size",
            SecureErrorKind::EncryptionFailed => "encryption failed",
            SecureErrorKind::AuthenticationFailed => "authentication failed",
            SecureErrorKind::NoCandidates => "no candidate node for frame ID",
            SecureErrorKind::MalformedFrame => "malformed frame",
            SecureErrorKind::NotSecure => "frame is not secure",
            SecureErrorKind::BufferTooSmall => "output buffer too small",
            SecureErrorKind::BodyTooLarge => "body too large for padded block",
        };
        f.write_str(desc)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SecureError {}
