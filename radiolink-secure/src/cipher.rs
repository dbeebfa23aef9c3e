use crate::error::SecureError;
use crate::types::{Nonce, Tag};

/// AEAD used to seal secure frame bodies: 12-byte nonce, 16-byte tag,
/// detached tag, in-place encryption.
///
/// Implementations must be safe to call with an empty `data` slice.
pub trait FrameCipher {
  /// Encrypt `data` in place and return the authentication tag.
  fn encrypt_in_place(
    &mut self,
    key: &[u8],
    nonce: &Nonce,
    aad: &[u8],
    data: &mut [u8],
  ) -> Result<Tag, SecureError>;

  /// Verify `tag` and decrypt `data` in place.
  ///
  /// On failure the contents of `data` are unspecified and must be discarded.
  fn decrypt_in_place(
    &mut self,
    key: &[u8],
    nonce: &Nonce,
    aad: &[u8],
    data: &mut [u8],
    tag: &Tag,
  ) -> Result<(), SecureError>;
}

// ---------------------------------------------------------------------------
// AES-128-GCM
// ---------------------------------------------------------------------------

/// AES-128-GCM, the default frame cipher.
#[cfg(feature = "aes-128-gcm")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Aes128GcmCipher;

#[cfg(feature = "aes-128-gcm")]
impl FrameCipher for Aes128GcmCipher {
  fn encrypt_in_place(
    &mut self,
    key: &[u8],
    nonce: &Nonce,
    aad: &[u8],
    data: &mut [u8],
  ) -> Result<Tag, SecureError> {
    use aes_gcm::aead::{AeadInPlace, KeyInit};
    use aes_gcm::Aes128Gcm;

    if key.len() != crate::consts::AES_128_KEY_SIZE {
      return Err(SecureError::invalid_key_size());
    }
    let cipher = Aes128Gcm::new_from_slice(key).map_err(|_| SecureError::invalid_key_size())?;
    let nonce = aes_gcm::aead::generic_array::GenericArray::from_slice(nonce);
    let tag = cipher
      .encrypt_in_place_detached(nonce, aad, data)
      .map_err(|_| SecureError::encryption_failed())?;
    let mut out = Tag::default();
    out.copy_from_slice(&tag);
    Ok(out)
  }

  fn decrypt_in_place(
    &mut self,
    key: &[u8],
    nonce: &Nonce,
    aad: &[u8],
    data: &mut [u8],
    tag: &Tag,
  ) -> Result<(), SecureError> {
    use aes_gcm::aead::{AeadInPlace, KeyInit};
    use aes_gcm::Aes128Gcm;

    if key.len() != crate::consts::AES_128_KEY_SIZE {
      return Err(SecureError::invalid_key_size());
    }
    let cipher = Aes128Gcm::new_from_slice(key).map_err(|_| SecureError::invalid_key_size())?;
    let nonce = aes_gcm::aead::generic_array::GenericArray::from_slice(nonce);
    let tag = aes_gcm::aead::generic_array::GenericArray::from_slice(tag);
    cipher
      .decrypt_in_place_detached(nonce, aad, data, tag)
      .map_err(|_| SecureError::authentication_failed())
  }
}

// ---------------------------------------------------------------------------
// ChaCha20-Poly1305
// ---------------------------------------------------------------------------

/// ChaCha20-Poly1305, for targets without AES hardware.
#[cfg(feature = "chacha20-poly1305")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ChaCha20Poly1305Cipher;

#[cfg(feature = "chacha20-poly1305")]
impl FrameCipher for ChaCha20Poly1305Cipher {
  fn encrypt_in_place(
    &mut self,
    key: &[u8],
    nonce: &Nonce,
    aad: &[u8],
    data: &mut [u8],
  ) -> Result<Tag, SecureError> {
    use chacha20poly1305::aead::{AeadInPlace, KeyInit};
    use chacha20poly1305::ChaCha20Poly1305;

    if key.len() != crate::consts::CHACHA20_KEY_SIZE {
      return Err(SecureError::invalid_key_size());
    }
    let cipher =
      ChaCha20Poly1305::new_from_slice(key).map_err(|_| SecureError::invalid_key_size())?;
    let nonce = chacha20poly1305::aead::generic_array::GenericArray::from_slice(nonce);
    let tag = cipher
      .encrypt_in_place_detached(nonce, aad, data)
      .map_err(|_| SecureError::encryption_failed())?;
    let mut out = Tag::default();
    out.copy_from_slice(&tag);
    Ok(out)
  }

  fn decrypt_in_place(
    &mut self,
    key: &[u8],
    nonce: &Nonce,
    aad: &[u8],
    data: &mut [u8],
    tag: &Tag,
  ) -> Result<(), SecureError> {
    use chacha20poly1305::aead::{AeadInPlace, KeyInit};
    use chacha20poly1305::ChaCha20Poly1305;

    if key.len() != crate::consts::CHACHA20_KEY_SIZE {
      return Err(SecureError::invalid_key_size());
    }
    let cipher =
      ChaCha20Poly1305::new_from_slice(key).map_err(|_| SecureError::invalid_key_size())?;
    let nonce = chacha20poly1305::aead::generic_array::GenericArray::from_slice(nonce);
    let tag = chacha20poly1305::aead::generic_array::GenericArray::from_slice(tag);
    cipher
      .decrypt_in_place_detached(nonce, aad, data, tag)
      .map_err(|_| SecureError::authentication_failed())
  }
}
