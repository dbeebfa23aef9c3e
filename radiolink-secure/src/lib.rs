#![no_std]
#![forbid(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

mod associations;
pub mod cipher;
pub mod consts;
pub mod counters;
pub mod error;
pub mod frame;
pub mod layout;
pub mod nonce;
pub mod persistent;
pub mod record;
mod restart;
mod rx;
pub mod store;
pub mod types;
pub mod volatile;

pub use error::{SecureError, SecureErrorKind};
pub use types::{MessageCounter, NodeId, Nonce, RestartCounter, Tag};

#[cfg(feature = "aes-128-gcm")]
pub use cipher::Aes128GcmCipher;
#[cfg(feature = "chacha20-poly1305")]
pub use cipher::ChaCha20Poly1305Cipher;
pub use cipher::FrameCipher;
pub use counters::{RxCounterStore, TxCounterSource};
pub use frame::{
    DecodedSecureFrame, OutboundFrame, decode_secure_frame, decode_secure_frame_from_id,
    encode_secure_frame, receive_secure_frame,
};
pub use layout::StorageLayout;
pub use nonce::{build_nonce, tx_nonce};
pub use persistent::PersistentCounters;
pub use record::{CounterRecord, RecordFault};
pub use associations::Candidates;
pub use restart::ResetMode;
pub use store::{ByteStore, MemoryStore};
pub use volatile::VolatileCounters;
