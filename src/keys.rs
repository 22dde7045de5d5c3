//! Key hashing and the raw key / signature encodings carried by inputs.
//!
//! Public keys travel as 64 bytes `X ‖ Y` (the uncompressed curve point
//! without its tag byte) and signatures as 64 bytes `r ‖ s`, so both can
//! be split into two equal halves.

use ripemd::Ripemd160;
use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::types::*;

/// Tag byte of an uncompressed SEC1 point
const UNCOMPRESSED_TAG: u8 = 0x04;

/// HashPubKey: RIPEMD160(SHA256(pub_key))
pub fn hash_pub_key(pub_key: &[u8]) -> ByteString {
    let sha256_hash = Sha256::digest(pub_key);
    Ripemd160::digest(sha256_hash).to_vec()
}

/// Raw 64-byte `X ‖ Y` encoding of a public key
pub fn encode_public_key(public_key: &PublicKey) -> ByteString {
    public_key.serialize_uncompressed()[1..].to_vec()
}

/// Rebuild a public key from its two coordinates.
///
/// Returns `None` when the halves are not a point on the curve.
pub fn decode_public_key(raw: &[u8]) -> Option<PublicKey> {
    if raw.is_empty() || raw.len() % 2 != 0 {
        return None;
    }
    let mut point = Vec::with_capacity(raw.len() + 1);
    point.push(UNCOMPRESSED_TAG);
    point.extend_from_slice(raw);
    PublicKey::from_slice(&point).ok()
}

/// SHA-256 of arbitrary bytes
pub fn sha256(data: &[u8]) -> Hash {
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&Sha256::digest(data));
    hash
}

/// Sign the SHA-256 digest of `payload`, returning `r ‖ s`.
pub fn sign_payload(secret_key: &SecretKey, payload: &[u8]) -> Result<ByteString> {
    let secp = Secp256k1::signing_only();
    let message = Message::from_digest_slice(&sha256(payload))?;
    let signature = secp.sign_ecdsa(&message, secret_key);
    Ok(signature.serialize_compact().to_vec())
}

/// Verify an `r ‖ s` signature over the SHA-256 digest of `payload`.
///
/// Undecodable keys or signatures are a failed verification, not an error.
pub fn verify_payload(raw_pub_key: &[u8], signature: &[u8], payload: &[u8]) -> bool {
    let public_key = match decode_public_key(raw_pub_key) {
        Some(pk) => pk,
        None => return false,
    };
    let signature = match Signature::from_compact(signature) {
        Ok(sig) => sig,
        Err(_) => return false,
    };
    let message = match Message::from_digest_slice(&sha256(payload)) {
        Ok(msg) => msg,
        Err(_) => return false,
    };

    let secp = Secp256k1::verification_only();
    secp.verify_ecdsa(&message, &signature, &public_key).is_ok()
}
