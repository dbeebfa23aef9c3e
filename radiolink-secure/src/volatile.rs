//! RAM-only counter state for hosts and tests.
//!
//! Nothing survives a restart, so a TX counter must be seeded above any
//! value previously used with the same key.

use heapless::Vec;

use crate::counters::{RxCounterStore, TxCounterSource};
use crate::error::SecureError;
use crate::types::{MessageCounter, NodeId};

/// Counter state for up to `N` peers, held in RAM.
#[derive(Debug, Clone)]
pub struct VolatileCounters<const N: usize> {
    tx: MessageCounter,
    peers: Vec<(NodeId, MessageCounter), N>,
}

impl<const N: usize> Default for VolatileCounters<N> {
    fn default() -> Self {
        Self::new(MessageCounter::ZERO)
    }
}

impl<const N: usize> VolatileCounters<N> {
    /// The first TX counter issued will be `tx_start + 1`.
    #[must_use]
    pub fn new(tx_start: MessageCounter) -> Self {
        Self {
            tx: tx_start,
            peers: Vec::new(),
        }
    }

    /// Track `id` with its RX counter at zero. Idempotent.
    pub fn add_peer(&mut self, id: &NodeId) -> Result<(), SecureError> {
        if id.is_reserved() {
            return Err(SecureError::invalid_id());
        }
        if self.peers.iter().any(|(peer, _)| peer == id) {
            return Ok(());
        }
        self.peers
            .push((*id, MessageCounter::ZERO))
            .map_err(|_| SecureError::associations_full())
    }

    /// Last TX counter issued, or the starting value.
    #[must_use]
    pub fn last_tx_counter(&self) -> MessageCounter {
        self.tx
    }

    pub fn peers(&self) -> impl Iterator<Item = &NodeId> {
        self.peers.iter().map(|(id, _)| id)
    }
}

impl<const N: usize> TxCounterSource for VolatileCounters<N> {
    fn next_tx_counter(&mut self) -> Result<MessageCounter, SecureError> {
        let next = MessageCounter::from_u64(self.tx.to_u64() + 1)
            .filter(|next| *next != MessageCounter::MAX)
            .ok_or_else(SecureError::counter_exhausted)?;
        self.tx = next;
        Ok(next)
    }
}

impl<const N: usize> RxCounterStore for VolatileCounters<N> {
    fn last_rx_counter(&self, id: &NodeId) -> Result<MessageCounter, SecureError> {
        self.peers
            .iter()
            .find(|(peer, _)| peer == id)
            .map(|(_, counter)| *counter)
            .ok_or_else(SecureError::unknown_peer)
    }

    fn commit_rx_counter(&mut self, id: &NodeId, counter: &MessageCounter) -> Result<(), SecureError> {
        let (_, last) = self
            .peers
            .iter_mut()
            .find(|(peer, _)| peer == id)
            .ok_or_else(SecureError::unknown_peer)?;
        if *counter <= *last {
            return Err(SecureError::replay());
        }
        *last = *counter;
        Ok(())
    }
}
