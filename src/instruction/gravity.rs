//! Gravity consul-registry instruction encoding.

/// Operations accepted by the Gravity program.
///
/// `consuls` is the concatenated 32-byte public keys of the roster in
/// roster order (see [`crate::roster::ConsulSet::concat_pubkeys`]); the
/// program indexes consuls by position, so the order must be stable
/// between `Init` and any later `UpdateConsuls`.
#[derive(Debug, Clone, PartialEq)]
pub enum GravityInstruction {
    /// Tag 0. One-shot initialization of a fresh state account; a second
    /// Init against the same account fails on-chain.
    Init {
        bft: u8,
        init_round: u64,
        consuls: Vec<u8>,
    },
    /// Tag 1. Replace the roster. Requires `last_round` strictly greater
    /// than the committed round and at least `bft` consul co-signatures;
    /// the program rejects stale rounds, the client surfaces that as an
    /// instruction failure.
    UpdateConsuls {
        bft: u8,
        last_round: u64,
        consuls: Vec<u8>,
    },
}

impl GravityInstruction {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Init {
                bft,
                init_round,
                consuls,
            } => {
                let mut data = Vec::with_capacity(10 + consuls.len());
                data.push(0);
                data.push(*bft);
                data.extend_from_slice(&init_round.to_le_bytes());
                data.extend_from_slice(consuls);
                data
            }
            Self::UpdateConsuls {
                bft,
                last_round,
                consuls,
            } => {
                let mut data = Vec::with_capacity(10 + consuls.len());
                data.push(1);
                data.push(*bft);
                data.extend_from_slice(&last_round.to_le_bytes());
                data.extend_from_slice(consuls);
                data
            }
        }
    }
}
