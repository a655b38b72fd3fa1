//! Concurrent provisioning of the three-program bridge.
//!
//! Independent steps (state-account creation, per-program Init) run as a
//! joined task group; steps with ledger-state dependencies (Subscribe
//! after both Nebula and IBPort init) run after the group completes. The
//! group aggregates every failure rather than discarding siblings'
//! errors, and aborts unfinished siblings once a failure makes the
//! dependent steps unreachable.

use std::future::Future;

use futures::future::try_join_all;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AdapterError, Result};
use crate::executor::{GenericExecutor, InvokeOptions, TransactionContext};
use crate::instruction::{DataType, GravityInstruction, IbPortInstruction, NebulaInstruction};
use crate::ledger::{
    create_state_account, GRAVITY_CONTRACT_ALLOCATION, IBPORT_ALLOCATION, MULTISIG_ALLOCATION,
    NEBULA_ALLOCATION, ProgramAddress,
};
use crate::payload::{random_id, ID_LEN};
use crate::roster::ConsulSet;

/// Named fallible tasks joined as one unit.
///
/// `join` waits for every spawned task, collects all failures, and
/// reports an aggregated [`AdapterError::TaskGroup`] naming each failed
/// task. With `fail_fast` enabled the first failure aborts the still
/// running siblings; their cancellations are not counted as failures.
pub struct TaskGroup<T> {
    tasks: JoinSet<(String, Result<T>)>,
    fail_fast: bool,
}

impl<T: Send + 'static> TaskGroup<T> {
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
            fail_fast: false,
        }
    }

    pub fn fail_fast(mut self, enabled: bool) -> Self {
        self.fail_fast = enabled;
        self
    }

    pub fn spawn<F>(&mut self, name: impl Into<String>, future: F)
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let name = name.into();
        self.tasks.spawn(async move {
            let outcome = future.await;
            (name, outcome)
        });
    }

    /// Wait for the whole group. Returns every task's `(name, value)` on
    /// full success, in completion order.
    pub async fn join(mut self) -> Result<Vec<(String, T)>> {
        let total = self.tasks.len();
        let mut completed = Vec::with_capacity(total);
        let mut errors = Vec::new();

        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok((name, Ok(value))) => completed.push((name, value)),
                Ok((name, Err(err))) => {
                    warn!(task = %name, error = %err, "provisioning task failed");
                    errors.push(format!("{name}: {err}"));
                    if self.fail_fast {
                        self.tasks.abort_all();
                    }
                }
                Err(join_err) if join_err.is_cancelled() => {}
                Err(join_err) => errors.push(format!("task panicked: {join_err}")),
            }
        }

        if errors.is_empty() {
            Ok(completed)
        } else {
            Err(AdapterError::TaskGroup {
                total,
                failed: errors.len(),
                errors,
            })
        }
    }
}

impl<T: Send + 'static> Default for TaskGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Addresses of the three deployed program binaries.
#[derive(Debug)]
pub struct BridgePrograms {
    pub gravity: ProgramAddress,
    pub nebula: ProgramAddress,
    pub ibport: ProgramAddress,
}

impl BridgePrograms {
    /// Fresh addressing for one provisioning run. IBPort derives the PDA
    /// it later mints through.
    pub fn generate() -> Self {
        Self {
            gravity: ProgramAddress::new(),
            nebula: ProgramAddress::new(),
            ibport: ProgramAddress::with_seed(b"ibport"),
        }
    }
}

/// State and multisig accounts created during provisioning.
#[derive(Debug, Clone)]
pub struct BridgeAccounts {
    pub gravity_state: Pubkey,
    pub gravity_multisig: Pubkey,
    pub nebula_state: Pubkey,
    pub nebula_multisig: Pubkey,
    pub ibport_state: Pubkey,
}

/// Confirmed init signatures, one per program.
#[derive(Debug, Clone)]
pub struct InitReceipts {
    pub gravity: Signature,
    pub nebula: Signature,
    pub ibport: Signature,
}

#[derive(Debug, Clone)]
pub struct SubscriptionReceipt {
    pub signature: Signature,
    pub subscription_id: [u8; ID_LEN],
}

/// Everything a completed provisioning run produced.
#[derive(Debug)]
pub struct BridgeProvisioning {
    pub accounts: BridgeAccounts,
    pub init: InitReceipts,
    pub subscription: SubscriptionReceipt,
}

pub struct DeploymentOrchestrator {
    config: Config,
}

impl DeploymentOrchestrator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Provision the bridge end to end against already-deployed program
    /// binaries: create the five state/multisig accounts, run the three
    /// program inits concurrently, then subscribe the port to the relay
    /// once both relay and port init have confirmed.
    pub async fn provision(
        &self,
        deployer: &Keypair,
        consuls: &ConsulSet,
        programs: &BridgePrograms,
    ) -> Result<BridgeProvisioning> {
        let rpc = RpcClient::new_with_commitment(
            self.config.rpc_url.clone(),
            CommitmentConfig::confirmed(),
        );
        let confirmation = &self.config.confirmation;

        info!(
            gravity = %programs.gravity.pubkey(),
            nebula = %programs.nebula.pubkey(),
            ibport = %programs.ibport.pubkey(),
            bft = consuls.bft(),
            "provisioning bridge"
        );

        // Account creation has no inter-dependency; run it as one joined
        // batch of independent transactions.
        let gravity_id = programs.gravity.pubkey();
        let nebula_id = programs.nebula.pubkey();
        let ibport_id = programs.ibport.pubkey();
        let created = try_join_all([
            create_state_account(&rpc, deployer, &gravity_id, GRAVITY_CONTRACT_ALLOCATION, confirmation),
            create_state_account(&rpc, deployer, &gravity_id, MULTISIG_ALLOCATION, confirmation),
            create_state_account(&rpc, deployer, &nebula_id, NEBULA_ALLOCATION, confirmation),
            create_state_account(&rpc, deployer, &nebula_id, MULTISIG_ALLOCATION, confirmation),
            create_state_account(&rpc, deployer, &ibport_id, IBPORT_ALLOCATION, confirmation),
        ])
        .await?;

        let accounts = BridgeAccounts {
            gravity_state: created[0].pubkey(),
            gravity_multisig: created[1].pubkey(),
            nebula_state: created[2].pubkey(),
            nebula_multisig: created[3].pubkey(),
            ibport_state: created[4].pubkey(),
        };

        let oracles = consuls.concat_pubkeys();
        let bft = consuls.bft();

        // Three independent inits; each task owns its executor (a single
        // executor is not shared across tasks).
        let mut group = TaskGroup::new().fail_fast(true);

        let gravity_exec = self.executor(deployer, gravity_id, accounts.gravity_state, Some(accounts.gravity_multisig));
        let gravity_consuls = oracles.clone();
        group.spawn("gravity-init", async move {
            let data = GravityInstruction::Init {
                bft,
                init_round: 1,
                consuls: gravity_consuls,
            }
            .encode();
            gravity_exec.invoke(data, &InvokeOptions::new()).await
        });

        let nebula_exec = self.executor(deployer, nebula_id, accounts.nebula_state, Some(accounts.nebula_multisig));
        let nebula_oracles = oracles.clone();
        let gravity_state = accounts.gravity_state;
        group.spawn("nebula-init", async move {
            let data = NebulaInstruction::Init {
                bft,
                data_type: DataType::Bytes,
                gravity_data_account: gravity_state,
                oracles: nebula_oracles,
            }
            .encode();
            nebula_exec.invoke(data, &InvokeOptions::new()).await
        });

        let ibport_exec = self.executor(deployer, ibport_id, accounts.ibport_state, None);
        let nebula_state = accounts.nebula_state;
        group.spawn("ibport-init", async move {
            let data = IbPortInstruction::Init {
                nebula_data_account: nebula_state,
                token_data_account: spl_token::ID,
            }
            .encode();
            ibport_exec.invoke(data, &InvokeOptions::new()).await
        });

        let mut results = group.join().await?;
        let mut take = |name: &str| -> Result<Signature> {
            results
                .iter()
                .position(|(task, _)| task == name)
                .map(|idx| results.swap_remove(idx).1.signature)
                .ok_or_else(|| AdapterError::Protocol(format!("missing init result for {name}")))
        };
        let init = InitReceipts {
            gravity: take("gravity-init")?,
            nebula: take("nebula-init")?,
            ibport: take("ibport-init")?,
        };

        // Dependent step: subscribe only after relay and port init are
        // both committed.
        let subscriber = programs
            .ibport
            .derived()
            .map(|d| d.address)
            .unwrap_or_else(|| programs.ibport.pubkey());
        let subscription_id = random_id();
        let nebula_exec = self.executor(deployer, nebula_id, accounts.nebula_state, Some(accounts.nebula_multisig));
        let subscribe = nebula_exec
            .invoke(
                NebulaInstruction::Subscribe {
                    subscriber,
                    min_confirmations: 1,
                    reward: 1,
                    subscription_id,
                }
                .encode(),
                &InvokeOptions::new(),
            )
            .await?;

        info!(signature = %subscribe.signature, "bridge provisioned");
        Ok(BridgeProvisioning {
            accounts,
            init,
            subscription: SubscriptionReceipt {
                signature: subscribe.signature,
                subscription_id,
            },
        })
    }

    fn executor(
        &self,
        deployer: &Keypair,
        program_id: Pubkey,
        data_account: Pubkey,
        multisig_account: Option<Pubkey>,
    ) -> GenericExecutor {
        GenericExecutor::from_config(
            &self.config,
            TransactionContext {
                fee_payer: deployer.insecure_clone(),
                program_id,
                data_account,
                multisig_account,
            },
        )
    }
}
