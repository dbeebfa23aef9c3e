//! Counter sources used by the secure frame codec.

use crate::error::SecureError;
use crate::types::{MessageCounter, NodeId};

/// Issues TX message counters.
pub trait TxCounterSource {
    /// Next counter for an outgoing frame.
    ///
    /// Every value returned must be strictly greater than all values returned
    /// before under the same key, across restarts. On any error no counter is
    /// issued and the frame must not be sent.
    fn next_tx_counter(&mut self) -> Result<MessageCounter, SecureError>;
}

/// Remembers the last authenticated counter received from each peer.
pub trait RxCounterStore {
    /// Last committed counter for `id`; zero if none yet.
    fn last_rx_counter(&self, id: &NodeId) -> Result<MessageCounter, SecureError>;

    /// Record `counter` for `id` after its frame authenticated.
    ///
    /// Implementations reject a counter not strictly greater than the stored
    /// one with [`SecureError::replay`] and leave the stored value unchanged.
    fn commit_rx_counter(&mut self, id: &NodeId, counter: &MessageCounter) -> Result<(), SecureError>;

    /// Check `counter` would be accepted for `id`, without committing it.
    fn check_rx_counter(&self, id: &NodeId, counter: &MessageCounter) -> Result<(), SecureError> {
        if *counter > self.last_rx_counter(id)? {
            Ok(())
        } else {
            Err(SecureError::replay())
        }
    }
}
