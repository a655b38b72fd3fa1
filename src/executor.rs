//! Generic transaction executor.
//!
//! One executor is bound to one program's addressing (program id, state
//! account, optional multisig account) and a default fee payer. Every
//! call takes an explicit [`InvokeOptions`] value; nothing about a call
//! leaks into the next one, and two concurrent provisioning tasks each
//! own their executor instance.

use std::time::Duration;

use serde::Serialize;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use tracing::{debug, info};

use crate::config::{Config, ConfirmationConfig};
use crate::error::{AdapterError, Result};

/// Addressing for one deployed program.
#[derive(Debug)]
pub struct TransactionContext {
    pub fee_payer: Keypair,
    pub program_id: Pubkey,
    pub data_account: Pubkey,
    /// Gravity and Nebula keep their consul roster in a separate multisig
    /// account; IBPort has none.
    pub multisig_account: Option<Pubkey>,
}

/// Per-call invocation overrides.
///
/// Extra signers co-sign with their real keys (the BFT multisig pattern:
/// N consul keys on one transaction) and are referenced as read-only
/// signer accounts. Extra accounts are appended verbatim after the fixed
/// metas, in the order the target program's account resolution expects.
#[derive(Default)]
pub struct InvokeOptions<'a> {
    extra_accounts: Vec<AccountMeta>,
    extra_signers: Vec<&'a Keypair>,
    fee_payer: Option<&'a Keypair>,
}

impl<'a> InvokeOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extra_accounts(mut self, metas: Vec<AccountMeta>) -> Self {
        self.extra_accounts = metas;
        self
    }

    pub fn extra_signers(mut self, signers: Vec<&'a Keypair>) -> Self {
        self.extra_signers = signers;
        self
    }

    /// Pay the fee from a different key than the context default.
    pub fn fee_payer(mut self, payer: &'a Keypair) -> Self {
        self.fee_payer = Some(payer);
        self
    }
}

/// Outcome of a confirmed invocation.
#[derive(Debug, Clone, Serialize)]
pub struct TxResult {
    pub signature: Signature,
}

pub struct GenericExecutor {
    rpc: RpcClient,
    context: TransactionContext,
    confirmation: ConfirmationConfig,
}

impl GenericExecutor {
    pub fn new(rpc_url: impl Into<String>, context: TransactionContext) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(rpc_url.into(), CommitmentConfig::confirmed()),
            context,
            confirmation: ConfirmationConfig::default(),
        }
    }

    pub fn from_config(config: &Config, context: TransactionContext) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(
                config.rpc_url.clone(),
                CommitmentConfig::confirmed(),
            ),
            context,
            confirmation: config.confirmation.clone(),
        }
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    pub fn context(&self) -> &TransactionContext {
        &self.context
    }

    pub fn confirmation(&self) -> &ConfirmationConfig {
        &self.confirmation
    }

    /// Build, sign, submit and confirm one instruction against the bound
    /// program.
    ///
    /// Account order is part of the wire contract: fee payer, state
    /// account, multisig account (when bound), extra signers, then extra
    /// accounts verbatim. The transaction is signed by the fee payer and
    /// every extra signer. On-chain rejection surfaces as
    /// [`AdapterError::InstructionFailed`] with the opaque program error;
    /// callers expecting a rejection (duplicate swap id, stale round)
    /// treat error presence itself as the signal.
    pub async fn invoke(&self, data: Vec<u8>, options: &InvokeOptions<'_>) -> Result<TxResult> {
        let payer = options.fee_payer.unwrap_or(&self.context.fee_payer);
        let accounts = account_metas(&self.context, payer.pubkey(), options);

        let instruction = Instruction::new_with_bytes(self.context.program_id, &data, accounts);

        let mut signers: Vec<&Keypair> = Vec::with_capacity(1 + options.extra_signers.len());
        signers.push(payer);
        signers.extend(options.extra_signers.iter().copied());

        let blockhash = self.rpc.get_latest_blockhash().await?;
        let transaction = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&payer.pubkey()),
            &signers,
            blockhash,
        );

        debug!(
            program = %self.context.program_id,
            payer = %payer.pubkey(),
            data_len = data.len(),
            signers = signers.len(),
            "submitting instruction"
        );

        let signature = self
            .rpc
            .send_transaction(&transaction)
            .await
            .map_err(classify_send_error)?;

        confirm_signature(&self.rpc, &signature, &self.confirmation).await?;

        let result = TxResult { signature };
        info!(
            program = %self.context.program_id,
            result = %serde_json::to_string(&result).unwrap_or_default(),
            "instruction confirmed"
        );
        Ok(result)
    }
}

fn account_metas(
    context: &TransactionContext,
    payer: Pubkey,
    options: &InvokeOptions<'_>,
) -> Vec<AccountMeta> {
    let mut accounts = Vec::with_capacity(
        3 + options.extra_signers.len() + options.extra_accounts.len(),
    );
    accounts.push(AccountMeta::new(payer, true));
    accounts.push(AccountMeta::new(context.data_account, false));
    if let Some(multisig) = context.multisig_account {
        accounts.push(AccountMeta::new(multisig, false));
    }
    for signer in &options.extra_signers {
        accounts.push(AccountMeta::new_readonly(signer.pubkey(), true));
    }
    accounts.extend(options.extra_accounts.iter().cloned());
    accounts
}

/// Map a submission failure to the adapter taxonomy. Preflight
/// simulation already ran the program, so an error that carries a
/// transaction error is an on-chain rejection, not transport trouble.
pub(crate) fn classify_send_error(
    err: solana_client::client_error::ClientError,
) -> AdapterError {
    match err.get_transaction_error() {
        Some(tx_err) => AdapterError::InstructionFailed(tx_err.to_string()),
        None => AdapterError::Rpc(err),
    }
}

/// Poll signature status until the transaction satisfies the confirmed
/// commitment, the program reports an execution error, or the poll budget
/// is exhausted.
pub async fn confirm_signature(
    rpc: &RpcClient,
    signature: &Signature,
    confirmation: &ConfirmationConfig,
) -> Result<()> {
    for poll in 0..confirmation.max_polls {
        let statuses = rpc.get_signature_statuses(&[*signature]).await?;
        if let Some(status) = statuses.value.first().and_then(|s| s.as_ref()) {
            if let Some(err) = &status.err {
                return Err(AdapterError::InstructionFailed(err.to_string()));
            }
            if status.satisfies_commitment(CommitmentConfig::confirmed()) {
                debug!(%signature, poll, "confirmed");
                return Ok(());
            }
        }
        tokio::time::sleep(Duration::from_millis(confirmation.poll_interval_ms)).await;
    }

    Err(AdapterError::ConfirmationTimeout {
        signature: *signature,
        polls: confirmation.max_polls,
    })
}
