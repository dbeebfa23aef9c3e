use crate::consts::{MESSAGE_COUNTER_SIZE, NONCE_ID_SIZE, NONCE_SIZE};
use crate::counters::TxCounterSource;
use crate::error::SecureError;
use crate::types::{MessageCounter, Nonce};

/// Build the 12-byte AEAD nonce: `[ID[..6]:6] [Counter:6]`.
///
/// `full_id` is the sender's full node ID (at least 6 bytes); only its first
/// 6 bytes are used. Pure and allocation-free; safe to call from interrupt
/// context.
pub fn build_nonce(full_id: &[u8], counter: &MessageCounter) -> Result<Nonce, SecureError> {
  let id = full_id.get(..NONCE_ID_SIZE).ok_or_else(SecureError::invalid_id)?;
  let mut nonce = [0u8; NONCE_SIZE];
  nonce[..NONCE_ID_SIZE].copy_from_slice(id);
  nonce[NONCE_SIZE - MESSAGE_COUNTER_SIZE..].copy_from_slice(counter.as_bytes());
  Ok(nonce)
}

/// Draw the next TX counter from `counters` and build the nonce for an
/// outbound frame from this node.
///
/// The ID is checked before a counter is drawn, so a bad ID wastes none.
pub fn tx_nonce<C: TxCounterSource + ?Sized>(
  local_id: &[u8],
  counters: &mut C,
) -> Result<(Nonce, MessageCounter), SecureError> {
  if local_id.len() < NONCE_ID_SIZE {
    return Err(SecureError::invalid_id());
  }
  let counter = counters.next_tx_counter()?;
  Ok((build_nonce(local_id, &counter)?, counter))
}
