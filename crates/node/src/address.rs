use crate::error::NodeError;
use base64::Engine;
use bech32::{ToBase32, Variant};
use sha2::{Digest, Sha256};

pub const ED25519_PUBKEY_TYPE: &str = "/cosmos.crypto.ed25519.PubKey";
const ED25519_PUBKEY_LEN: usize = 32;
const ADDRESS_LEN: usize = 20;

/// Bech32 consensus address of an ed25519 consensus pubkey given in base64.
///
/// The address bytes are the first 20 bytes of `sha256(pubkey)`.
pub fn consensus_address(pubkey_base64: &str, prefix: &str) -> Result<String, NodeError> {
    let pubkey = base64::engine::general_purpose::STANDARD
        .decode(pubkey_base64)
        .map_err(|error| NodeError::InvalidPubkey(error.to_string()))?;

    if pubkey.len() != ED25519_PUBKEY_LEN {
        return Err(NodeError::InvalidPubkey(format!(
            "expected {ED25519_PUBKEY_LEN} bytes, got {}",
            pubkey.len()
        )));
    }

    let digest = Sha256::digest(&pubkey);
    let address = digest
        .get(..ADDRESS_LEN)
        .ok_or_else(|| NodeError::InvalidPubkey("digest too short".to_owned()))?;

    Ok(bech32::encode(prefix, address.to_base32(), Variant::Bech32)?)
}
