use crate::consts::{
    ASSOCIATION_ID_OFFSET, ASSOCIATION_RX_PRIMARY_OFFSET, ASSOCIATION_RX_SECONDARY_OFFSET,
    DEFAULT_ASSOCIATIONS_ADDR, DEFAULT_ASSOCIATION_STRIDE, DEFAULT_TX_RESTART_PRIMARY_ADDR,
    DEFAULT_TX_RESTART_SECONDARY_ADDR, MAX_ASSOCIATIONS, MIN_ASSOCIATION_STRIDE, RESTART_COUNTER_SIZE,
};
use crate::error::SecureError;

const RESTART_RECORD_SIZE: u16 = RESTART_COUNTER_SIZE as u16 + 1;

/// Placement of persistent counter state in the byte store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageLayout {
    /// Address of the primary TX restart counter record (4 bytes).
    pub tx_restart_primary: u16,
    /// Address of the secondary TX restart counter record (4 bytes).
    pub tx_restart_secondary: u16,
    /// Address of association slot 0.
    pub associations_start: u16,
    /// Number of association slots, at most `MAX_ASSOCIATIONS`.
    pub association_slots: u8,
    /// Distance between consecutive association slots.
    pub association_stride: u16,
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self {
            tx_restart_primary: DEFAULT_TX_RESTART_PRIMARY_ADDR,
            tx_restart_secondary: DEFAULT_TX_RESTART_SECONDARY_ADDR,
            associations_start: DEFAULT_ASSOCIATIONS_ADDR,
            association_slots: MAX_ASSOCIATIONS as u8,
            association_stride: DEFAULT_ASSOCIATION_STRIDE,
        }
    }
}

impl StorageLayout {
    /// Compact layout starting at address 0, for small test stores.
    #[must_use]
    pub fn compact(association_slots: u8) -> Self {
        Self {
            tx_restart_primary: 0,
            tx_restart_secondary: RESTART_RECORD_SIZE,
            associations_start: 2 * RESTART_RECORD_SIZE,
            association_slots,
            association_stride: MIN_ASSOCIATION_STRIDE,
        }
    }

    // Saturates rather than wrapping; only meaningful for `slot <
    // association_slots` on a layout that passed `validate`.
    fn slot_base(&self, slot: u8) -> u16 {
        self.associations_start
            .saturating_add(u16::from(slot).saturating_mul(self.association_stride))
    }

    /// Address of the node ID in `slot`.
    #[must_use]
    pub fn association_id(&self, slot: u8) -> u16 {
        self.slot_base(slot).saturating_add(ASSOCIATION_ID_OFFSET)
    }

    /// Address of the primary RX counter record in `slot`.
    #[must_use]
    pub fn rx_primary(&self, slot: u8) -> u16 {
        self.slot_base(slot).saturating_add(ASSOCIATION_RX_PRIMARY_OFFSET)
    }

    /// Address of the secondary RX counter record in `slot`.
    #[must_use]
    pub fn rx_secondary(&self, slot: u8) -> u16 {
        self.slot_base(slot).saturating_add(ASSOCIATION_RX_SECONDARY_OFFSET)
    }

    /// One past the last address used.
    #[must_use]
    pub fn end(&self) -> usize {
        let restart_end = usize::from(self.tx_restart_primary.max(self.tx_restart_secondary))
            + usize::from(RESTART_RECORD_SIZE);
        let table_end = usize::from(self.associations_start)
            + usize::from(self.association_slots) * usize::from(self.association_stride);
        restart_end.max(table_end)
    }

    /// Check the layout against a store of `capacity` bytes.
    ///
    /// Regions must not overlap each other and must fit the store.
    pub fn validate(&self, capacity: usize) -> Result<(), SecureError> {
        if usize::from(self.association_slots) > MAX_ASSOCIATIONS
            || self.association_stride < MIN_ASSOCIATION_STRIDE
        {
            return Err(SecureError::invalid_layout());
        }
        if self.end() > capacity || self.end() > usize::from(u16::MAX) {
            return Err(SecureError::invalid_layout());
        }

        let primary = region(self.tx_restart_primary, RESTART_RECORD_SIZE);
        let secondary = region(self.tx_restart_secondary, RESTART_RECORD_SIZE);
        let table = (
            usize::from(self.associations_start),
            usize::from(self.associations_start)
                + usize::from(self.association_slots) * usize::from(self.association_stride),
        );
        if overlaps(primary, secondary) || overlaps(primary, table) || overlaps(secondary, table) {
            return Err(SecureError::invalid_layout());
        }
        Ok(())
    }
}

fn region(start: u16, len: u16) -> (usize, usize) {
    (usize::from(start), usize::from(start) + usize::from(len))
}

fn overlaps(a: (usize, usize), b: (usize, usize)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_fits_1k() {
        let layout = StorageLayout::default();
        assert!(layout.validate(1024).is_ok());
        assert_eq!(layout.end(), 0x0380);
        assert_eq!(layout.rx_primary(1), 0x0280 + 32 + 8);
        assert_eq!(layout.rx_secondary(0), 0x0280 + 16);
    }

    #[test]
    fn test_compact_layout() {
        let layout = StorageLayout::compact(2);
        assert!(layout.validate(64).is_ok());
        assert_eq!(layout.end(), 8 + 2 * 23);
        assert!(layout.validate(40).is_err());
    }

    #[test]
    fn test_overlap_rejected() {
        let layout = StorageLayout {
            tx_restart_secondary: 0x0202,
            ..StorageLayout::default()
        };
        assert!(layout.validate(1024).is_err());
    }

    #[test]
    fn test_too_many_slots_rejected() {
        let layout = StorageLayout {
            association_slots: MAX_ASSOCIATIONS as u8 + 1,
            ..StorageLayout::default()
        };
        assert!(layout.validate(4096).is_err());
    }

    #[test]
    fn test_table_past_end_of_address_space_rejected() {
        let layout = StorageLayout {
            associations_start: 0xfff0,
            ..StorageLayout::default()
        };
        assert_eq!(layout.validate(usize::from(u16::MAX) + 1), Err(SecureError::invalid_layout()));
        assert_eq!(layout.rx_secondary(7), u16::MAX);
    }
}
