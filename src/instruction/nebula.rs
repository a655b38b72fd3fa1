//! Nebula relay instruction encoding.
//!
//! Tag assignment follows the program's dispatch order: Init = 0,
//! UpdateOracles = 1, SendHashValue = 2, SendValueToSubs = 3,
//! Subscribe = 4. These offsets are the client-side contract and should
//! be validated against the deployed binary before relying on them.

use solana_sdk::pubkey::Pubkey;

use crate::payload::{DATA_HASH_LEN, ID_LEN};

/// Kind of value a Nebula instance relays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DataType {
    Int64 = 0,
    String = 1,
    Bytes = 2,
}

/// Operations accepted by the Nebula program.
#[derive(Debug, Clone, PartialEq)]
pub enum NebulaInstruction {
    /// Tag 0. `oracles` is the concatenated roster, same blob and order
    /// as the Gravity init referencing the same logical roster.
    Init {
        bft: u8,
        data_type: DataType,
        gravity_data_account: Pubkey,
        oracles: Vec<u8>,
    },
    /// Tag 1. BFT-co-signed roster rotation, analogous to Gravity's
    /// UpdateConsuls.
    UpdateOracles {
        new_round: u64,
        oracles: Vec<u8>,
    },
    /// Tag 2. Broadcast a commitment to a data hash; requires `bft`
    /// oracle co-signatures.
    SendHashValue { data_hash: [u8; DATA_HASH_LEN] },
    /// Tag 3. Fan a previously committed value out to one subscriber.
    SendValueToSubs {
        data_hash: [u8; DATA_HASH_LEN],
        data_type: DataType,
        pulse_id: u64,
        subscription_id: [u8; ID_LEN],
    },
    /// Tag 4. Register a consumer program. The subscription id must be
    /// unique per relay instance; a reused id is rejected on-chain.
    Subscribe {
        subscriber: Pubkey,
        min_confirmations: u8,
        reward: u64,
        subscription_id: [u8; ID_LEN],
    },
}

impl NebulaInstruction {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Init {
                bft,
                data_type,
                gravity_data_account,
                oracles,
            } => {
                let mut data = Vec::with_capacity(35 + oracles.len());
                data.push(0);
                data.push(*bft);
                data.push(*data_type as u8);
                data.extend_from_slice(gravity_data_account.as_ref());
                data.extend_from_slice(oracles);
                data
            }
            Self::UpdateOracles { new_round, oracles } => {
                let mut data = Vec::with_capacity(9 + oracles.len());
                data.push(1);
                data.extend_from_slice(&new_round.to_le_bytes());
                data.extend_from_slice(oracles);
                data
            }
            Self::SendHashValue { data_hash } => {
                let mut data = Vec::with_capacity(1 + DATA_HASH_LEN);
                data.push(2);
                data.extend_from_slice(data_hash);
                data
            }
            Self::SendValueToSubs {
                data_hash,
                data_type,
                pulse_id,
                subscription_id,
            } => {
                let mut data = Vec::with_capacity(1 + DATA_HASH_LEN + 1 + 8 + ID_LEN);
                data.push(3);
                data.extend_from_slice(data_hash);
                data.push(*data_type as u8);
                data.extend_from_slice(&pulse_id.to_le_bytes());
                data.extend_from_slice(subscription_id);
                data
            }
            Self::Subscribe {
                subscriber,
                min_confirmations,
                reward,
                subscription_id,
            } => {
                let mut data = Vec::with_capacity(1 + 32 + 1 + 8 + ID_LEN);
                data.push(4);
                data.extend_from_slice(subscriber.as_ref());
                data.push(*min_confirmations);
                data.extend_from_slice(&reward.to_le_bytes());
                data.extend_from_slice(subscription_id);
                data
            }
        }
    }
}
