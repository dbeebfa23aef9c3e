//! Persistent TX restart counter: the high-order 3 bytes of the TX message
//! counter, kept as two redundant records in the byte store.
//!
//! The free functions assume a validated [`StorageLayout`];
//! [`crate::PersistentCounters`] is the public entry point.

use log::{debug, warn};
use rand_core::RngCore;

use crate::consts::RESTART_COUNTER_SIZE;
use crate::error::SecureError;
use crate::layout::StorageLayout;
use crate::record::{CounterRecord, reconcile};
use crate::store::{ByteStore, erase_record, read_record, write_record};
use crate::types::RestartCounter;

/// How to reset the restart counter.
///
/// Both modes reuse counter values and so reuse nonces; only reset when the
/// node's key or ID is also being changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    /// Erase both records to zero, freeing the most write-wear budget.
    AllZeros,
    /// Write `[0, 0, r]` with `r` a non-zero random byte.
    Entropy,
}

/// Load the restart counter, reconciling the primary and secondary copies.
pub(crate) fn load_restart_counter<S: ByteStore>(
    store: &S,
    layout: &StorageLayout,
) -> Result<RestartCounter, SecureError> {
    let primary =
        read_record::<S, RESTART_COUNTER_SIZE>(store, layout.tx_restart_primary).decode();
    let secondary =
        read_record::<S, RESTART_COUNTER_SIZE>(store, layout.tx_restart_secondary).decode();
    if let Err(fault) = primary {
        warn!("TX restart counter primary copy invalid: {fault:?}");
    }
    if let Err(fault) = secondary {
        warn!("TX restart counter secondary copy invalid: {fault:?}");
    }
    reconcile(primary, secondary)
        .map(RestartCounter::new)
        .ok_or_else(SecureError::counter_unavailable)
}

/// Increment the restart counter in storage. Returns the new value.
///
/// Refuses once the counter is at `0xffffff`, leaving storage untouched.
pub(crate) fn increment_restart_counter<S: ByteStore>(
    store: &mut S,
    layout: &StorageLayout,
) -> Result<RestartCounter, SecureError> {
    store.exclusive(|store| {
        let current = load_restart_counter(store, layout)?;
        let Some(next) = current.checked_next() else {
            warn!("TX restart counter exhausted");
            return Err(SecureError::counter_exhausted());
        };
        write_restart_counter(store, layout, next);
        debug!("TX restart counter now {:#08x}", next.to_u32());
        Ok(next)
    })
}

/// Reset the restart counter. Returns the value now stored.
///
/// In [`ResetMode::Entropy`] the random byte is drawn before entering the
/// store's exclusive section, so the entropy source may rely on interrupts.
/// The result is then guaranteed non-zero.
pub(crate) fn reset_restart_counter<S: ByteStore, R: RngCore>(
    store: &mut S,
    layout: &StorageLayout,
    mode: ResetMode,
    rng: &mut R,
) -> Result<RestartCounter, SecureError> {
    let expected = match mode {
        ResetMode::AllZeros => {
            store.exclusive(|store| {
                erase_record::<S, RESTART_COUNTER_SIZE>(store, layout.tx_restart_primary);
                erase_record::<S, RESTART_COUNTER_SIZE>(store, layout.tx_restart_secondary);
            });
            RestartCounter::ZERO
        }
        ResetMode::Entropy => {
            let low = entropy_byte(rng);
            let value = RestartCounter::new([0, 0, low]);
            store.exclusive(|store| write_restart_counter(store, layout, value));
            value
        }
    };
    warn!("TX restart counter reset ({mode:?})");
    if load_restart_counter(store, layout)? != expected {
        return Err(SecureError::counter_unavailable());
    }
    Ok(expected)
}

/// Uniform over `1..=255`.
fn entropy_byte<R: RngCore>(rng: &mut R) -> u8 {
    (rng.next_u32() % 255) as u8 + 1
}

fn write_restart_counter<S: ByteStore>(store: &mut S, layout: &StorageLayout, value: RestartCounter) {
    let record = CounterRecord::encode(value.as_bytes());
    write_record(store, layout.tx_restart_primary, &record);
    write_record(store, layout.tx_restart_secondary, &record);
}
