//! Cryptographic primitives: SHA-256 content hashing, ECDSA over NIST
//! P-256, and the hex codecs used to carry keys and signatures over the
//! wire.
//!
//! Keys and signatures are carried as 128-hex-character strings: X then Y
//! of the P-256 point (each zero-padded to 64 hex chars), and R then S of
//! the signature, in that order.

use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};

/// Length in bytes of the SHA-256 digests used throughout the chain.
pub const HASH_LEN: usize = 32;

/// Computes the SHA-256 digest of `bytes`.
pub fn sha256(bytes: &[u8]) -> [u8; HASH_LEN] {
    let digest = Sha256::digest(bytes);
    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(&digest);
    out
}

/// Errors produced while decoding hex-encoded key or signature material.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("expected a 128-hex-character string, got {0} characters")]
    WrongLength(usize),
    #[error("invalid hex encoding")]
    InvalidHex,
    #[error("malformed public key")]
    MalformedPublicKey,
    #[error("malformed signature")]
    MalformedSignature,
}

const HEX_LEN: usize = 128;
const HALF: usize = HEX_LEN / 2;

/// Decodes a 128-hex-char `(X, Y)` public key into a [`VerifyingKey`].
pub fn verifying_key_from_hex(hex_str: &str) -> Result<VerifyingKey, CryptoError> {
    if hex_str.len() != HEX_LEN {
        return Err(CryptoError::WrongLength(hex_str.len()));
    }
    let x = hex::decode(&hex_str[..HALF]).map_err(|_| CryptoError::InvalidHex)?;
    let y = hex::decode(&hex_str[HALF..]).map_err(|_| CryptoError::InvalidHex)?;

    // Build an uncompressed SEC1 point: 0x04 || X || Y.
    let mut sec1 = Vec::with_capacity(1 + x.len() + y.len());
    sec1.push(0x04);
    sec1.extend_from_slice(&x);
    sec1.extend_from_slice(&y);

    VerifyingKey::from_sec1_bytes(&sec1).map_err(|_| CryptoError::MalformedPublicKey)
}

/// Encodes a [`VerifyingKey`] as a 128-hex-char `(X, Y)` string.
pub fn verifying_key_to_hex(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    // Uncompressed SEC1 point is 0x04 || X || Y; drop the prefix byte.
    hex::encode(&point.as_bytes()[1..])
}

/// Decodes a 128-hex-char `(R, S)` signature into a [`Signature`].
pub fn signature_from_hex(hex_str: &str) -> Result<Signature, CryptoError> {
    if hex_str.len() != HEX_LEN {
        return Err(CryptoError::WrongLength(hex_str.len()));
    }
    let r = hex::decode(&hex_str[..HALF]).map_err(|_| CryptoError::InvalidHex)?;
    let s = hex::decode(&hex_str[HALF..]).map_err(|_| CryptoError::InvalidHex)?;

    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(&r);
    buf[32..].copy_from_slice(&s);

    Signature::try_from(buf.as_slice()).map_err(|_| CryptoError::MalformedSignature)
}

/// Encodes a [`Signature`] as a 128-hex-char `(R, S)` string.
pub fn signature_to_hex(sig: &Signature) -> String {
    hex::encode(sig.to_bytes())
}

/// Verifies `signature` against `message` under `key`.
///
/// P-256's default digest is SHA-256, so this hashes `message` internally
/// before checking the signature, matching the reference node's
/// `ecdsa.Verify(pubkey, sha256(bytes), r, s)` call.
pub fn verify_message(key: &VerifyingKey, message: &[u8], signature: &Signature) -> bool {
    key.verify(message, signature).is_ok()
}

/// Signs `message` with `key`, hashing it with SHA-256 first.
///
/// Exposed for tests and tooling that need to construct signed
/// submissions; the core admission path only ever verifies.
pub fn sign_message(key: &SigningKey, message: &[u8]) -> Signature {
    key.sign(message)
}
