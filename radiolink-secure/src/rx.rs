//! Per-peer RX message counters, stored as two redundant records in each
//! association slot.

use log::warn;

use crate::associations::find_association;
use crate::consts::MESSAGE_COUNTER_SIZE;
use crate::error::SecureError;
use crate::layout::StorageLayout;
use crate::record::{CounterRecord, reconcile};
use crate::store::{ByteStore, read_record, write_record};
use crate::types::{MessageCounter, NodeId};

/// Load the last authenticated counter held in association `slot`.
pub(crate) fn load_rx_counter<S: ByteStore>(
    store: &S,
    layout: &StorageLayout,
    slot: u8,
) -> Result<MessageCounter, SecureError> {
    let primary = read_record::<S, MESSAGE_COUNTER_SIZE>(store, layout.rx_primary(slot)).decode();
    let secondary =
        read_record::<S, MESSAGE_COUNTER_SIZE>(store, layout.rx_secondary(slot)).decode();
    if let Err(fault) = primary {
        warn!("RX counter slot {slot} primary copy invalid: {fault:?}");
    }
    if let Err(fault) = secondary {
        warn!("RX counter slot {slot} secondary copy invalid: {fault:?}");
    }
    reconcile(primary, secondary)
        .map(MessageCounter::new)
        .ok_or_else(SecureError::counter_unavailable)
}

/// Last authenticated counter for node `id`.
pub(crate) fn last_rx_counter<S: ByteStore>(
    store: &S,
    layout: &StorageLayout,
    id: &NodeId,
) -> Result<MessageCounter, SecureError> {
    let slot = find_association(store, layout, id).ok_or_else(SecureError::unknown_peer)?;
    load_rx_counter(store, layout, slot)
}

/// Record `counter` as the last authenticated counter for node `id`.
///
/// Only call once the frame carrying `counter` has been authenticated.
/// Fails with [`SecureError::replay`] unless `counter` is strictly greater
/// than the stored value; on any failure storage is left unchanged.
pub(crate) fn commit_rx_counter<S: ByteStore>(
    store: &mut S,
    layout: &StorageLayout,
    id: &NodeId,
    counter: &MessageCounter,
) -> Result<(), SecureError> {
    store.exclusive(|store| {
        let slot = find_association(store, layout, id).ok_or_else(SecureError::unknown_peer)?;
        let current = load_rx_counter(store, layout, slot)?;
        if *counter <= current {
            warn!(
                "RX counter replay from slot {slot}: {:#014x} <= {:#014x}",
                counter.to_u64(),
                current.to_u64()
            );
            return Err(SecureError::replay());
        }
        let record = CounterRecord::encode(counter.as_bytes());
        write_record(store, layout.rx_primary(slot), &record);
        write_record(store, layout.rx_secondary(slot), &record);
        Ok(())
    })
}
