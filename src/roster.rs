//! BFT consul/oracle roster.

use solana_sdk::{
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
};

use crate::error::{AdapterError, Result};

/// One BFT participant: a keypair that co-signs registry and relay
/// operations.
#[derive(Debug)]
pub struct Consul {
    keypair: Keypair,
}

impl Consul {
    fn generate() -> Self {
        Self {
            keypair: Keypair::new(),
        }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

/// Ordered consul roster plus the BFT signing threshold.
///
/// Roster order is fixed at construction: the on-chain programs index
/// consuls by position, so the byte blob embedded in Gravity `Init` must
/// match the one referenced by any later `UpdateConsuls` for the same
/// logical roster.
#[derive(Debug)]
pub struct ConsulSet {
    consuls: Vec<Consul>,
    bft: u8,
}

impl ConsulSet {
    /// Generate `count` fresh consul identities with signing threshold
    /// `bft`. Fails fast, before any network traffic, on an empty roster
    /// or a threshold the roster cannot meet.
    pub fn generate(count: usize, bft: u8) -> Result<Self> {
        if count == 0 {
            return Err(AdapterError::Protocol(
                "consul roster cannot be empty".to_string(),
            ));
        }
        if bft == 0 {
            return Err(AdapterError::Protocol(
                "bft threshold must be at least 1".to_string(),
            ));
        }
        if usize::from(bft) > count {
            return Err(AdapterError::Protocol(format!(
                "bft threshold {} exceeds roster size {}",
                bft, count
            )));
        }

        let consuls = (0..count).map(|_| Consul::generate()).collect();
        Ok(Self { consuls, bft })
    }

    pub fn bft(&self) -> u8 {
        self.bft
    }

    pub fn len(&self) -> usize {
        self.consuls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consuls.is_empty()
    }

    pub fn consul(&self, index: usize) -> Option<&Consul> {
        self.consuls.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Consul> {
        self.consuls.iter()
    }

    /// Concatenated raw public keys, 32·N bytes in roster order. This is
    /// the blob Gravity `Init`/`UpdateConsuls` and Nebula `Init` embed.
    pub fn concat_pubkeys(&self) -> Vec<u8> {
        let mut blob = Vec::with_capacity(self.consuls.len() * 32);
        for consul in &self.consuls {
            blob.extend_from_slice(consul.pubkey().as_ref());
        }
        blob
    }

    /// The co-signer list for operations that require BFT signing
    /// (UpdateConsuls, SendHashValue) rather than a single relayer.
    pub fn signers(&self) -> Vec<&Keypair> {
        self.consuls.iter().map(Consul::keypair).collect()
    }
}
