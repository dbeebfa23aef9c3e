/// Full node ID size as held in the association table.
pub const NODE_ID_SIZE: usize = 8;

/// Minimum number of ID bytes needed to build a nonce.
pub const NONCE_ID_SIZE: usize = 6;

/// Full message counter size (restart bytes followed by ephemeral bytes).
pub const MESSAGE_COUNTER_SIZE: usize = 6;

/// Persistent (reboot/restart) part of the TX message counter.
pub const RESTART_COUNTER_SIZE: usize = 3;

/// Ephemeral (RAM-only) part of the TX message counter.
pub const EPHEMERAL_COUNTER_SIZE: usize = 3;

/// AEAD nonce size: 6 ID bytes followed by the 6-byte message counter.
pub const NONCE_SIZE: usize = NONCE_ID_SIZE + MESSAGE_COUNTER_SIZE;

/// AEAD authentication tag size.
pub const TAG_SIZE: usize = 16;

/// AES-128 key size.
pub const AES_128_KEY_SIZE: usize = 16;

/// `ChaCha20` key size.
pub const CHACHA20_KEY_SIZE: usize = 32;

/// Encrypted bodies are either empty or exactly one padded block.
pub const ENCRYPTED_BODY_SIZE: usize = 32;

/// Marker in the last trailer byte for AES-GCM style `'O'` security.
pub const AES_GCM_TRAILER_MARKER: u8 = 0x80;

/// Secure trailer: message counter, tag, marker byte.
pub const SECURE_TRAILER_SIZE: usize = MESSAGE_COUNTER_SIZE + TAG_SIZE + 1;

/// Write-complete flag in the check byte of a counter record (set when complete).
pub const RECORD_COMPLETE_FLAG: u8 = 0x80;

/// Mask for the inverted CRC-7 in the check byte of a counter record.
pub const RECORD_CRC_MASK: u8 = 0x7f;

/// Only the low 4 bits of the most significant ephemeral byte are randomised on restart.
pub const EPHEMERAL_ENTROPY_MASK: u8 = 0x0f;

/// Hard upper bound on association slots (capacity of candidate lists).
pub const MAX_ASSOCIATIONS: usize = 8;

/// Offset of the node ID within an association slot.
pub const ASSOCIATION_ID_OFFSET: u16 = 0;

/// Offset of the primary RX counter record within an association slot.
pub const ASSOCIATION_RX_PRIMARY_OFFSET: u16 = 8;

/// Offset of the secondary RX counter record within an association slot.
pub const ASSOCIATION_RX_SECONDARY_OFFSET: u16 = 16;

/// Smallest slot stride that holds the ID and both RX records.
pub const MIN_ASSOCIATION_STRIDE: u16 = ASSOCIATION_RX_SECONDARY_OFFSET + MESSAGE_COUNTER_SIZE as u16 + 1;

/// Default slot stride, matching the reference EEPROM map.
pub const DEFAULT_ASSOCIATION_STRIDE: u16 = 32;

/// Default address of the primary TX restart counter record.
pub const DEFAULT_TX_RESTART_PRIMARY_ADDR: u16 = 0x0200;

/// Default address of the secondary TX restart counter record.
pub const DEFAULT_TX_RESTART_SECONDARY_ADDR: u16 = 0x0204;

/// Default start of the node association table.
pub const DEFAULT_ASSOCIATIONS_ADDR: u16 = 0x0280;

/// Erased byte value of the non-volatile store.
pub const ERASED_BYTE: u8 = 0xff;
