//! Ledger-side provisioning helpers: program addressing, state-account
//! creation, and funding for test clusters.

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    system_instruction,
    transaction::Transaction,
};
use tracing::{debug, info};

use crate::config::ConfirmationConfig;
use crate::error::Result;
use crate::executor::{classify_send_error, confirm_signature};

/// State-account sizes per program. These are client-side declarations of
/// what the deployed programs expect; a mismatch is a fatal on-chain
/// error, not recoverable here, so they live in one place.
pub const GRAVITY_CONTRACT_ALLOCATION: u64 = 299;
pub const NEBULA_ALLOCATION: u64 = 2000;
pub const IBPORT_ALLOCATION: u64 = 20000;
pub const MULTISIG_ALLOCATION: u64 = 355;

/// A program-derived address plus the seed it was derived from.
#[derive(Debug, Clone)]
pub struct DerivedAddress {
    pub address: Pubkey,
    pub seed: Vec<u8>,
    pub bump: u8,
}

/// Keypair of one deployed program, optionally with a PDA the program
/// signs through (IBPort derives one to mint without holding a key).
#[derive(Debug)]
pub struct ProgramAddress {
    keypair: Keypair,
    derived: Option<DerivedAddress>,
}

impl ProgramAddress {
    pub fn new() -> Self {
        Self::from_keypair(Keypair::new())
    }

    /// Generate an address and derive its PDA from `seed`.
    pub fn with_seed(seed: &[u8]) -> Self {
        Self::from_keypair_with_seed(Keypair::new(), seed)
    }

    /// Wrap an existing program keypair, e.g. the key file a binary was
    /// deployed under.
    pub fn from_keypair(keypair: Keypair) -> Self {
        Self {
            keypair,
            derived: None,
        }
    }

    pub fn from_keypair_with_seed(keypair: Keypair, seed: &[u8]) -> Self {
        let (address, bump) = Pubkey::find_program_address(&[seed], &keypair.pubkey());
        Self {
            keypair,
            derived: Some(DerivedAddress {
                address,
                seed: seed.to_vec(),
                bump,
            }),
        }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    pub fn derived(&self) -> Option<&DerivedAddress> {
        self.derived.as_ref()
    }
}

impl Default for ProgramAddress {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a fresh account of `space` bytes owned by `owner_program`,
/// funded to rent exemption by `payer`. The new account co-signs its own
/// creation. Returns the account keypair once the transaction confirms.
pub async fn create_state_account(
    rpc: &RpcClient,
    payer: &Keypair,
    owner_program: &Pubkey,
    space: u64,
    confirmation: &ConfirmationConfig,
) -> Result<Keypair> {
    let rent_balance = rpc
        .get_minimum_balance_for_rent_exemption(space as usize)
        .await?;
    let account = Keypair::new();

    let instruction = system_instruction::create_account(
        &payer.pubkey(),
        &account.pubkey(),
        rent_balance,
        space,
        owner_program,
    );

    let blockhash = rpc.get_latest_blockhash().await?;
    let transaction = Transaction::new_signed_with_payer(
        &[instruction],
        Some(&payer.pubkey()),
        &[payer, &account],
        blockhash,
    );

    let signature = rpc
        .send_transaction(&transaction)
        .await
        .map_err(classify_send_error)?;
    confirm_signature(rpc, &signature, confirmation).await?;

    info!(
        account = %account.pubkey(),
        owner = %owner_program,
        space,
        "state account created"
    );
    Ok(account)
}

/// Airdrop lamports to `receiver` and wait for the grant to confirm.
/// Test-cluster funding only.
pub async fn request_airdrop(
    rpc: &RpcClient,
    receiver: &Pubkey,
    lamports: u64,
    confirmation: &ConfirmationConfig,
) -> Result<Signature> {
    let signature = rpc.request_airdrop(receiver, lamports).await?;
    confirm_signature(rpc, &signature, confirmation).await?;
    debug!(%receiver, lamports, "airdrop confirmed");
    Ok(signature)
}

pub async fn read_balance(rpc: &RpcClient, address: &Pubkey) -> Result<u64> {
    Ok(rpc.get_balance(address).await?)
}

/// Decode a base58-encoded 64-byte private key into a keypair.
pub fn keypair_from_base58(encoded: &str) -> Result<Keypair> {
    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| crate::error::AdapterError::Protocol(format!("invalid base58 key: {e}")))?;
    Keypair::try_from(&bytes[..])
        .map_err(|e| crate::error::AdapterError::Protocol(format!("invalid keypair bytes: {e}")))
}
