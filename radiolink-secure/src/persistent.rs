//! Non-volatile counter state: the TX session counter and per-peer RX
//! counters, backed by a [`ByteStore`].

use log::{debug, warn};
use rand_core::RngCore;

use crate::associations::{self, Candidates};
use crate::consts::{EPHEMERAL_COUNTER_SIZE, EPHEMERAL_ENTROPY_MASK};
use crate::counters::{RxCounterStore, TxCounterSource};
use crate::error::SecureError;
use crate::layout::StorageLayout;
use crate::restart::{self, ResetMode};
use crate::rx;
use crate::store::ByteStore;
use crate::types::{MessageCounter, NodeId, RestartCounter};

#[derive(Debug, Clone, Copy)]
struct TxSession {
    restart: RestartCounter,
    ephemeral: [u8; EPHEMERAL_COUNTER_SIZE],
}

/// Counter state for a node with persistent storage.
///
/// The first TX counter request after construction (or after a reset)
/// bumps the persistent restart counter and seeds the low-order ephemeral
/// bytes from `rng`, so counters keep increasing across reboots without a
/// storage write per frame.
pub struct PersistentCounters<S, R> {
    store: S,
    layout: StorageLayout,
    rng: R,
    session: Option<TxSession>,
}

impl<S: ByteStore, R: RngCore> PersistentCounters<S, R> {
    /// Wrap `store`. Fails if `layout` does not fit it.
    pub fn new(store: S, layout: StorageLayout, rng: R) -> Result<Self, SecureError> {
        layout.validate(store.capacity())?;
        Ok(Self {
            store,
            layout,
            rng,
            session: None,
        })
    }

    #[must_use]
    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Current persistent restart counter.
    pub fn restart_counter(&self) -> Result<RestartCounter, SecureError> {
        restart::load_restart_counter(&self.store, &self.layout)
    }

    /// Bump the persistent restart counter by one.
    pub fn increment_restart_counter(&mut self) -> Result<RestartCounter, SecureError> {
        restart::increment_restart_counter(&mut self.store, &self.layout)
    }

    /// Reset the persistent restart counter and drop the TX session.
    ///
    /// See [`ResetMode`]: this reuses nonces unless the key also changes.
    pub fn reset_restart_counter(&mut self, mode: ResetMode) -> Result<RestartCounter, SecureError> {
        self.session = None;
        restart::reset_restart_counter(&mut self.store, &self.layout, mode, &mut self.rng)
    }

    pub fn add_association(&mut self, id: &NodeId) -> Result<u8, SecureError> {
        associations::add_association(&mut self.store, &self.layout, id)
    }

    #[must_use]
    pub fn find_association(&self, id: &NodeId) -> Option<u8> {
        associations::find_association(&self.store, &self.layout, id)
    }

    #[must_use]
    pub fn association(&self, slot: u8) -> Option<NodeId> {
        associations::association_id(&self.store, &self.layout, slot)
    }

    #[must_use]
    pub fn association_count(&self) -> usize {
        associations::association_count(&self.store, &self.layout)
    }

    /// Associated IDs starting with `prefix`, in slot order.
    #[must_use]
    pub fn candidates(&self, prefix: &[u8]) -> Candidates {
        associations::candidates(&self.store, &self.layout, prefix)
    }

    pub fn clear_associations(&mut self) {
        associations::clear_associations(&mut self.store, &self.layout);
    }

    fn start_session(&mut self) -> Result<TxSession, SecureError> {
        let restart = restart::increment_restart_counter(&mut self.store, &self.layout)?;
        let mut ephemeral = [0u8; EPHEMERAL_COUNTER_SIZE];
        self.rng.fill_bytes(&mut ephemeral);
        ephemeral[0] &= EPHEMERAL_ENTROPY_MASK;
        debug!("TX session started at restart counter {:#08x}", restart.to_u32());
        Ok(TxSession { restart, ephemeral })
    }
}

impl<S: ByteStore, R: RngCore> TxCounterSource for PersistentCounters<S, R> {
    fn next_tx_counter(&mut self) -> Result<MessageCounter, SecureError> {
        let session = match self.session {
            Some(session) => session,
            None => {
                let session = self.start_session()?;
                self.session = Some(session);
                session
            }
        };
        let next = match increment_ephemeral(session.ephemeral) {
            Some(ephemeral) => TxSession { ephemeral, ..session },
            None => TxSession {
                restart: restart::increment_restart_counter(&mut self.store, &self.layout)?,
                ephemeral: [0; EPHEMERAL_COUNTER_SIZE],
            },
        };
        let counter = MessageCounter::from_parts(next.restart, next.ephemeral);
        if counter == MessageCounter::MAX {
            warn!("TX message counter exhausted");
            return Err(SecureError::counter_exhausted());
        }
        self.session = Some(next);
        Ok(counter)
    }
}

impl<S: ByteStore, R: RngCore> RxCounterStore for PersistentCounters<S, R> {
    fn last_rx_counter(&self, id: &NodeId) -> Result<MessageCounter, SecureError> {
        rx::last_rx_counter(&self.store, &self.layout, id)
    }

    fn commit_rx_counter(&mut self, id: &NodeId, counter: &MessageCounter) -> Result<(), SecureError> {
        rx::commit_rx_counter(&mut self.store, &self.layout, id, counter)
    }
}

fn increment_ephemeral(ephemeral: [u8; EPHEMERAL_COUNTER_SIZE]) -> Option<[u8; EPHEMERAL_COUNTER_SIZE]> {
    let [a, b, c] = ephemeral;
    let next = u32::from_be_bytes([0, a, b, c]) + 1;
    let [overflow, a, b, c] = next.to_be_bytes();
    if overflow == 0 { Some([a, b, c]) } else { None }
}
