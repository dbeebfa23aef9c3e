//! Node association table: full node IDs against which RX counters are kept.
//!
//! A slot whose first ID byte reads as erased (0xff) is free.
//!
//! These functions assume a layout already checked by
//! [`StorageLayout::validate`]; [`crate::PersistentCounters`] is the public
//! entry point.

use heapless::Vec;
use log::{debug, warn};

use crate::consts::{MAX_ASSOCIATIONS, MESSAGE_COUNTER_SIZE, NODE_ID_SIZE};
use crate::error::SecureError;
use crate::layout::StorageLayout;
use crate::store::{ByteStore, erase_record};
use crate::types::NodeId;

/// Candidate node IDs for a frame, in slot order.
pub type Candidates = Vec<NodeId, MAX_ASSOCIATIONS>;

/// Node ID held in `slot`, or `None` if the slot is free or outside the table.
pub(crate) fn association_id<S: ByteStore>(
    store: &S,
    layout: &StorageLayout,
    slot: u8,
) -> Option<NodeId> {
    if slot >= layout.association_slots {
        return None;
    }
    let base = layout.association_id(slot);
    let mut bytes = [0u8; NODE_ID_SIZE];
    for (i, b) in bytes.iter_mut().enumerate() {
        *b = store.read_byte(base + i as u16);
    }
    let id = NodeId::new(bytes);
    if id.is_reserved() { None } else { Some(id) }
}

/// Slot holding `id`, if associated.
pub(crate) fn find_association<S: ByteStore>(store: &S, layout: &StorageLayout, id: &NodeId) -> Option<u8> {
    (0..layout.association_slots).find(|&slot| association_id(store, layout, slot) == Some(*id))
}

/// Number of occupied slots.
pub(crate) fn association_count<S: ByteStore>(store: &S, layout: &StorageLayout) -> usize {
    (0..layout.association_slots)
        .filter(|&slot| association_id(store, layout, slot).is_some())
        .count()
}

/// Associate `id`, starting its RX counter at zero. Returns the slot.
///
/// Adding an ID that is already associated returns its existing slot and
/// leaves its counter alone.
pub(crate) fn add_association<S: ByteStore>(
    store: &mut S,
    layout: &StorageLayout,
    id: &NodeId,
) -> Result<u8, SecureError> {
    if id.is_reserved() {
        return Err(SecureError::invalid_id());
    }
    store.exclusive(|store| {
        if let Some(slot) = find_association(store, layout, id) {
            return Ok(slot);
        }
        let Some(slot) =
            (0..layout.association_slots).find(|&slot| association_id(store, layout, slot).is_none())
        else {
            warn!("no free association slot");
            return Err(SecureError::associations_full());
        };
        // Byte 0 marks the slot in use, so it goes last: an interrupted add
        // leaves the slot free.
        erase_record::<S, MESSAGE_COUNTER_SIZE>(store, layout.rx_primary(slot));
        erase_record::<S, MESSAGE_COUNTER_SIZE>(store, layout.rx_secondary(slot));
        let base = layout.association_id(slot);
        let bytes = id.as_bytes();
        for (i, &b) in bytes.iter().enumerate().skip(1) {
            store.write_byte_if_different(base + i as u16, b);
        }
        store.write_byte_if_different(base, bytes[0]);
        debug!("associated node in slot {slot}");
        Ok(slot)
    })
}

/// Associated IDs that start with `prefix`, in slot order.
///
/// An empty prefix (anonymous frame) matches every association.
pub(crate) fn candidates<S: ByteStore>(store: &S, layout: &StorageLayout, prefix: &[u8]) -> Candidates {
    let mut out = Candidates::new();
    for slot in 0..layout.association_slots {
        if let Some(id) = association_id(store, layout, slot) {
            // Capacity is MAX_ASSOCIATIONS, the bound validate() puts on
            // association_slots.
            if id.as_bytes().starts_with(prefix) && out.push(id).is_err() {
                break;
            }
        }
    }
    out
}

/// Erase the whole association table, including all RX counters.
pub(crate) fn clear_associations<S: ByteStore>(store: &mut S, layout: &StorageLayout) {
    store.exclusive(|store| {
        let start = layout.associations_start;
        let len = u16::from(layout.association_slots).saturating_mul(layout.association_stride);
        for addr in start..start.saturating_add(len) {
            store.erase_byte(addr);
        }
    });
    debug!("association table cleared");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const A: NodeId = NodeId::new([0x81, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07]);
    const B: NodeId = NodeId::new([0x81, 0x99, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07]);
    const C: NodeId = NodeId::new([0x42, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07]);

    fn setup() -> (MemoryStore<128>, StorageLayout) {
        (MemoryStore::new(), StorageLayout::compact(3))
    }

    #[test]
    fn test_add_and_find() {
        let (mut store, layout) = setup();
        assert_eq!(add_association(&mut store, &layout, &A), Ok(0));
        assert_eq!(add_association(&mut store, &layout, &B), Ok(1));
        assert_eq!(add_association(&mut store, &layout, &A), Ok(0));
        assert_eq!(find_association(&store, &layout, &B), Some(1));
        assert_eq!(find_association(&store, &layout, &C), None);
        assert_eq!(association_count(&store, &layout), 2);
    }

    #[test]
    fn test_table_full() {
        let (mut store, layout) = setup();
        add_association(&mut store, &layout, &A).unwrap();
        add_association(&mut store, &layout, &B).unwrap();
        add_association(&mut store, &layout, &C).unwrap();
        let d = NodeId::new([0x10; 8]);
        assert_eq!(
            add_association(&mut store, &layout, &d),
            Err(SecureError::associations_full())
        );
    }

    #[test]
    fn test_reserved_id_rejected() {
        let (mut store, layout) = setup();
        let id = NodeId::new([0xff, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(add_association(&mut store, &layout, &id), Err(SecureError::invalid_id()));
    }

    #[test]
    fn test_candidates_by_prefix() {
        let (mut store, layout) = setup();
        add_association(&mut store, &layout, &A).unwrap();
        add_association(&mut store, &layout, &C).unwrap();
        add_association(&mut store, &layout, &B).unwrap();
        assert_eq!(candidates(&store, &layout, &[0x81]).as_slice(), &[A, B]);
        assert_eq!(candidates(&store, &layout, &[0x81, 0x99]).as_slice(), &[B]);
        assert_eq!(candidates(&store, &layout, &[]).as_slice(), &[A, C, B]);
        assert!(candidates(&store, &layout, &[0x00]).is_empty());
    }

    #[test]
    fn test_clear() {
        let (mut store, layout) = setup();
        add_association(&mut store, &layout, &A).unwrap();
        clear_associations(&mut store, &layout);
        assert_eq!(association_count(&store, &layout), 0);
        // restart counter region untouched
        assert!(store.as_bytes()[..8].iter().all(|&b| b == 0xff));
    }

    #[test]
    fn test_slot_outside_table_is_none() {
        let (mut store, layout) = (MemoryStore::<128>::new(), StorageLayout::compact(1));
        add_association(&mut store, &layout, &A).unwrap();
        // bytes past the table that would read as an ID
        store.bytes_mut()[8 + 23..8 + 31].copy_from_slice(C.as_bytes());
        assert_eq!(association_id(&store, &layout, 0), Some(A));
        assert_eq!(association_id(&store, &layout, 1), None);
        assert_eq!(association_id(&store, &layout, 255), None);
    }

    #[test]
    fn test_candidates_stop_at_capacity() {
        let mut store = MemoryStore::<512>::new();
        let layout = StorageLayout::compact(MAX_ASSOCIATIONS as u8 + 1);
        for i in 0..=MAX_ASSOCIATIONS as u8 {
            add_association(&mut store, &layout, &NodeId::new([0x10, i, 0, 0, 0, 0, 0, 0])).unwrap();
        }
        let found = candidates(&store, &layout, &[0x10]);
        assert_eq!(found.len(), MAX_ASSOCIATIONS);
        assert_eq!(found[0], NodeId::new([0x10, 0, 0, 0, 0, 0, 0, 0]));
    }

    #[test]
    fn test_slot_without_marker_byte_is_free() {
        let (mut store, layout) = setup();
        add_association(&mut store, &layout, &A).unwrap();
        // undo the marker byte: the rest of the ID alone does not occupy the slot
        store.bytes_mut()[usize::from(layout.association_id(0))] = 0xff;
        assert_eq!(association_count(&store, &layout), 0);
        assert_eq!(add_association(&mut store, &layout, &A), Ok(0));
    }
}
