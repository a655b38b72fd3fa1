//! Cross-chain mint payload codec.
//!
//! The relay (Nebula) and the port (IBPort) both consume the same fixed
//! 57-byte payload for one cross-chain transfer:
//!
//! ```text
//! [0]      action tag, always b'm' (mint)
//! [1..17]  swap id, 16 bytes
//! [17..25] amount, f64 little-endian
//! [25..57] receiver token account, 32 bytes
//! ```
//!
//! Nebula broadcasts a commitment to the payload; IBPort later mints from
//! the identical bytes. Any divergence between the two encodings breaks
//! the protocol, so both paths go through [`MintPayload`].

use rand::RngCore;
use solana_sdk::pubkey::Pubkey;

use crate::error::{AdapterError, Result};

/// Action tag of a mint payload.
pub const MINT_ACTION_TAG: u8 = b'm';

/// Total encoded payload length.
pub const MINT_PAYLOAD_LEN: usize = 57;

/// Length of the data-hash slot Nebula instructions carry. The payload is
/// zero-padded up to this size when it rides in a `data_hash` field.
pub const DATA_HASH_LEN: usize = 64;

/// Length of swap and subscription identifiers.
pub const ID_LEN: usize = 16;

/// One cross-chain mint, identified by its swap id.
///
/// The swap id must be unique per mint; the port rejects a replayed id,
/// which is the on-chain double-spend guard. Construct once, submit the
/// identical bytes to both the relay and the port.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MintPayload {
    pub swap_id: [u8; ID_LEN],
    pub amount: f64,
    pub receiver: Pubkey,
}

impl MintPayload {
    pub fn new(swap_id: [u8; ID_LEN], amount: f64, receiver: Pubkey) -> Self {
        Self {
            swap_id,
            amount,
            receiver,
        }
    }

    /// Build a payload with a freshly generated random swap id.
    pub fn with_random_swap_id(amount: f64, receiver: Pubkey) -> Self {
        Self::new(random_id(), amount, receiver)
    }

    /// Encode into the canonical 57-byte wire form.
    pub fn to_bytes(&self) -> [u8; MINT_PAYLOAD_LEN] {
        let mut out = [0u8; MINT_PAYLOAD_LEN];
        out[0] = MINT_ACTION_TAG;
        out[1..17].copy_from_slice(&self.swap_id);
        out[17..25].copy_from_slice(&self.amount.to_le_bytes());
        out[25..57].copy_from_slice(self.receiver.as_ref());
        out
    }

    /// Decode a payload, validating length and action tag.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != MINT_PAYLOAD_LEN {
            return Err(AdapterError::Payload(format!(
                "expected {} bytes, got {}",
                MINT_PAYLOAD_LEN,
                bytes.len()
            )));
        }
        if bytes[0] != MINT_ACTION_TAG {
            return Err(AdapterError::Payload(format!(
                "unknown action tag 0x{:02x}",
                bytes[0]
            )));
        }

        let mut swap_id = [0u8; ID_LEN];
        swap_id.copy_from_slice(&bytes[1..17]);

        let mut amount_bytes = [0u8; 8];
        amount_bytes.copy_from_slice(&bytes[17..25]);

        let mut receiver = [0u8; 32];
        receiver.copy_from_slice(&bytes[25..57]);

        Ok(Self {
            swap_id,
            amount: f64::from_le_bytes(amount_bytes),
            receiver: Pubkey::new_from_array(receiver),
        })
    }

    /// The 64-byte relay form: payload bytes, zero-padded. This is what
    /// rides in Nebula's `data_hash` slot.
    pub fn to_data_hash(&self) -> [u8; DATA_HASH_LEN] {
        let mut hash = [0u8; DATA_HASH_LEN];
        hash[..MINT_PAYLOAD_LEN].copy_from_slice(&self.to_bytes());
        hash
    }
}

/// Fresh 16-byte identifier for swaps and relay subscriptions. Uniqueness
/// is what the on-chain replay guards key on.
pub fn random_id() -> [u8; ID_LEN] {
    let mut id = [0u8; ID_LEN];
    rand::thread_rng().fill_bytes(&mut id);
    id
}
