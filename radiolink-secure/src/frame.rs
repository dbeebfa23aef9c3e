//! Secure frames: AEAD-sealed bodies padded to 32 bytes, with the message
//! counter and tag carried in the trailer.
//!
//! Wire layout: `header | body (0 or 32 bytes) | counter:6 | tag:16 | 0x80`.
//! The header bytes are the associated data.

use log::debug;
use radiolink_frame::build::FrameWriter;
use radiolink_frame::consts::{MAX_HEADER_LENGTH, MAX_UNPADDED_BODY_SIZE};
use radiolink_frame::{
    FrameId, FrameType, SecurableFrameHeader, SequenceNumber, decode_header, encode_header,
    pad_32, unpad_32,
};

use crate::cipher::FrameCipher;
use crate::consts::{
    AES_GCM_TRAILER_MARKER, ENCRYPTED_BODY_SIZE, MESSAGE_COUNTER_SIZE, SECURE_TRAILER_SIZE,
    TAG_SIZE,
};
use crate::counters::{RxCounterStore, TxCounterSource};
use crate::error::{SecureError, SecureErrorKind};
use crate::nonce::{build_nonce, tx_nonce};
use crate::types::{MessageCounter, NodeId, Tag};

/// Fields of an outbound secure frame, before sealing.
#[derive(Debug, Clone, Copy)]
pub struct OutboundFrame<'a> {
    /// Frame type; the secure bit is set on the wire regardless.
    pub frame_type: FrameType,
    pub seq: SequenceNumber,
    /// Header ID: a prefix (possibly empty) of the sender's node ID.
    pub id: FrameId,
    /// Plaintext body, at most 31 bytes. Empty sends no body block.
    pub body: &'a [u8],
}

/// An authenticated secure frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedSecureFrame {
    pub header: SecurableFrameHeader,
    /// Full ID of the candidate whose nonce authenticated the frame.
    pub sender: NodeId,
    /// Message counter from the trailer. Not yet checked against RX state.
    pub counter: MessageCounter,
    /// Length of the unpadded plaintext written to the body buffer.
    pub body_len: usize,
}

/// Seal and encode a secure frame into `buf`. Returns the bytes written.
///
/// Input and buffer size are checked before a TX counter is drawn from
/// `counters`, so a rejected frame consumes no counter value.
pub fn encode_secure_frame<C, F>(
    frame: &OutboundFrame<'_>,
    sender: &NodeId,
    counters: &mut C,
    cipher: &mut F,
    key: &[u8],
    buf: &mut [u8],
) -> Result<usize, SecureError>
where
    C: TxCounterSource + ?Sized,
    F: FrameCipher + ?Sized,
{
    if frame.body.len() > MAX_UNPADDED_BODY_SIZE {
        return Err(SecureError::body_too_large());
    }
    if !frame.id.matches(sender.as_bytes()) {
        return Err(SecureError::invalid_id());
    }
    let body_length = if frame.body.is_empty() { 0 } else { ENCRYPTED_BODY_SIZE as u8 };
    let header = SecurableFrameHeader::new(
        frame.frame_type.secure(),
        frame.seq,
        frame.id,
        body_length,
        SECURE_TRAILER_SIZE as u8,
    )?;
    if buf.len() < header.frame_size() {
        return Err(SecureError::buffer_too_small());
    }

    let mut header_buf = [0u8; MAX_HEADER_LENGTH];
    let header_len = encode_header(&header, &mut header_buf)?;
    let aad = &header_buf[..header_len];

    let mut block = [0u8; ENCRYPTED_BODY_SIZE];
    if !frame.body.is_empty() {
        block = pad_32(frame.body)?;
    }
    let sealed = &mut block[..usize::from(body_length)];

    let (nonce, counter) = tx_nonce(sender.as_bytes(), counters)?;
    let tag = cipher.encrypt_in_place(key, &nonce, aad, sealed)?;

    let mut w = FrameWriter::new(buf);
    w.write_bytes(aad)?;
    w.write_bytes(sealed)?;
    w.write_bytes(counter.as_bytes())?;
    w.write_bytes(&tag)?;
    w.write_byte(AES_GCM_TRAILER_MARKER)?;
    Ok(w.written())
}

struct SealedFrame<'a> {
    header: SecurableFrameHeader,
    aad: &'a [u8],
    ciphertext: &'a [u8],
    counter: MessageCounter,
    tag: Tag,
}

fn split_secure_frame(buf: &[u8]) -> Result<SealedFrame<'_>, SecureError> {
    let (header, header_len) = decode_header(buf)?;
    if !header.is_secure() {
        return Err(SecureError::not_secure());
    }
    let body_len = usize::from(header.body_length());
    if (body_len != 0 && body_len != ENCRYPTED_BODY_SIZE)
        || header.trailer_length() != SECURE_TRAILER_SIZE
    {
        return Err(SecureError::malformed_frame());
    }

    let trailer = &buf[header.trailer_offset()..header.frame_size()];
    let (counter, rest) = trailer.split_at(MESSAGE_COUNTER_SIZE);
    let (tag, marker) = rest.split_at(TAG_SIZE);
    if marker != [AES_GCM_TRAILER_MARKER] {
        return Err(SecureError::malformed_frame());
    }
    let counter = MessageCounter::from_slice(counter).ok_or_else(SecureError::malformed_frame)?;
    let tag: Tag = tag.try_into().map_err(|_| SecureError::malformed_frame())?;

    Ok(SealedFrame {
        header,
        aad: &buf[..header_len],
        ciphertext: &buf[header.body_offset()..header.trailer_offset()],
        counter,
        tag,
    })
}

/// Authenticate and decrypt into `body_out`, returning the plaintext length.
fn open_with<F: FrameCipher + ?Sized>(
    frame: &SealedFrame<'_>,
    sender: &NodeId,
    cipher: &mut F,
    key: &[u8],
    body_out: &mut [u8; ENCRYPTED_BODY_SIZE],
) -> Result<usize, SecureError> {
    let nonce = build_nonce(sender.as_bytes(), &frame.counter)?;
    let data = &mut body_out[..frame.ciphertext.len()];
    data.copy_from_slice(frame.ciphertext);
    cipher.decrypt_in_place(key, &nonce, frame.aad, data, &frame.tag)?;
    if frame.ciphertext.is_empty() {
        return Ok(0);
    }
    Ok(unpad_32(body_out)?)
}

/// Decode a secure frame, trying each candidate sender ID in turn.
///
/// Candidates whose ID does not start with the header ID are skipped. The
/// first candidate that authenticates wins and the rest are not tried.
/// Counter state is not touched: the caller must pass the returned counter
/// to [`RxCounterStore::commit_rx_counter`] (or use
/// [`receive_secure_frame`]) before acting on the body.
///
/// On failure `body_out` is zeroed.
pub fn decode_secure_frame<'c, I, F>(
    buf: &[u8],
    candidates: I,
    cipher: &mut F,
    key: &[u8],
    body_out: &mut [u8; ENCRYPTED_BODY_SIZE],
) -> Result<DecodedSecureFrame, SecureError>
where
    I: IntoIterator<Item = &'c NodeId>,
    F: FrameCipher + ?Sized,
{
    let frame = split_secure_frame(buf)?;
    debug!(
        "secure frame header parsed: type {:#04x}, {} byte ID",
        frame.header.frame_type().raw(),
        frame.header.id_length()
    );

    let mut attempted = false;
    for sender in candidates {
        if !frame.header.id().matches(sender.as_bytes()) {
            continue;
        }
        attempted = true;
        match open_with(&frame, sender, cipher, key, body_out) {
            Ok(body_len) => {
                debug!("secure frame authenticated");
                return Ok(DecodedSecureFrame {
                    header: frame.header,
                    sender: *sender,
                    counter: frame.counter,
                    body_len,
                });
            }
            Err(e) if e.kind == SecureErrorKind::AuthenticationFailed => {}
            Err(e) => {
                body_out.fill(0);
                return Err(e);
            }
        }
    }

    body_out.fill(0);
    if attempted {
        debug!("secure frame rejected: no candidate authenticated");
        Err(SecureError::authentication_failed())
    } else {
        debug!("secure frame rejected: no candidate IDs");
        Err(SecureError::no_candidates())
    }
}

/// Decode a secure frame from one known sender.
pub fn decode_secure_frame_from_id<F: FrameCipher + ?Sized>(
    buf: &[u8],
    sender: &NodeId,
    cipher: &mut F,
    key: &[u8],
    body_out: &mut [u8; ENCRYPTED_BODY_SIZE],
) -> Result<DecodedSecureFrame, SecureError> {
    decode_secure_frame(buf, core::iter::once(sender), cipher, key, body_out)
}

/// Authenticate a secure frame, then commit its counter to `counters`.
///
/// A frame that authenticates but fails the anti-replay check is rejected
/// with [`SecureError::replay`] and `body_out` is zeroed.
pub fn receive_secure_frame<'c, I, R, F>(
    buf: &[u8],
    candidates: I,
    counters: &mut R,
    cipher: &mut F,
    key: &[u8],
    body_out: &mut [u8; ENCRYPTED_BODY_SIZE],
) -> Result<DecodedSecureFrame, SecureError>
where
    I: IntoIterator<Item = &'c NodeId>,
    R: RxCounterStore + ?Sized,
    F: FrameCipher + ?Sized,
{
    let decoded = decode_secure_frame(buf, candidates, cipher, key, body_out)?;
    if let Err(e) = counters.commit_rx_counter(&decoded.sender, &decoded.counter) {
        body_out.fill(0);
        return Err(e);
    }
    Ok(decoded)
}
