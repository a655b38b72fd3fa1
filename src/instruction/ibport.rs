//! IBPort token-port instruction encoding.

use solana_sdk::pubkey::Pubkey;

use crate::payload::MintPayload;

/// Operations accepted by the IBPort program.
#[derive(Debug, Clone, PartialEq)]
pub enum IbPortInstruction {
    /// Tag 0. Bind the port to its relay data account and the token
    /// program it mints through.
    Init {
        nebula_data_account: Pubkey,
        token_data_account: Pubkey,
    },
    /// Tag 1. Burn wrapped tokens and queue an unwrap to `receiver` on
    /// the origin chain. The receiver is a raw 32-byte slot; shorter
    /// origin-chain addresses arrive left-aligned and zero-padded.
    CreateTransferUnwrapRequest { amount: f64, receiver: [u8; 32] },
    /// Tag 2. Mint against a relay-attested payload. A replayed swap id
    /// fails on-chain; that rejection is the double-spend guard.
    AttachValue { payload: MintPayload },
}

impl IbPortInstruction {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Init {
                nebula_data_account,
                token_data_account,
            } => {
                let mut data = Vec::with_capacity(65);
                data.push(0);
                data.extend_from_slice(nebula_data_account.as_ref());
                data.extend_from_slice(token_data_account.as_ref());
                data
            }
            Self::CreateTransferUnwrapRequest { amount, receiver } => {
                let mut data = Vec::with_capacity(41);
                data.push(1);
                data.extend_from_slice(&amount.to_le_bytes());
                data.extend_from_slice(receiver);
                data
            }
            Self::AttachValue { payload } => {
                let mut data = Vec::with_capacity(58);
                data.push(2);
                data.extend_from_slice(&payload.to_bytes());
                data
            }
        }
    }
}
