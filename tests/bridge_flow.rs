//! End-to-end bridge flow against a live cluster.
//!
//! Requires a running validator (default `http://127.0.0.1:8899`, or
//! `SOLANA_RPC_URL`) with the three program binaries already deployed,
//! and the program keypair files they were deployed under:
//!
//! ```bash
//! export GRAVITY_PROGRAM_KEYPAIR=./private-keys/gravity.json
//! export NEBULA_PROGRAM_KEYPAIR=./private-keys/nebula.json
//! export IBPORT_PROGRAM_KEYPAIR=./private-keys/ibport.json
//! cargo test --test bridge_flow -- --ignored
//! ```
//!
//! Steps: provision (parallel account creation + parallel inits, then
//! subscribe), re-init and duplicate-subscription rejection, consul
//! roster update with under-threshold and stale-round rejection, the
//! relay-driven mint path (SendValueToSubs fan-out into the port, then
//! a BFT-co-signed SendHashValue), and attach-value double-spend
//! rejection.

use anyhow::{Context, Result, anyhow};
use gravity_adapter::config::Config;
use gravity_adapter::executor::{
    GenericExecutor, InvokeOptions, TransactionContext, confirm_signature,
};
use gravity_adapter::instruction::{
    DataType, GravityInstruction, IbPortInstruction, NebulaInstruction,
};
use gravity_adapter::ledger::{ProgramAddress, request_airdrop};
use gravity_adapter::orchestrator::{BridgePrograms, DeploymentOrchestrator};
use gravity_adapter::payload::{MintPayload, random_id};
use gravity_adapter::roster::ConsulSet;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, read_keypair_file};
use solana_sdk::signer::Signer;
use solana_sdk::system_instruction;
use solana_sdk::transaction::Transaction;
use spl_token::instruction::AuthorityType;
use spl_token::state::{Account as TokenAccount, Mint};

const BFT: u8 = 3;

fn program_from_env(var: &str, seed: Option<&[u8]>) -> Result<ProgramAddress> {
    let path = std::env::var(var).with_context(|| format!("{var} not set"))?;
    let keypair = read_keypair_file(&path)
        .map_err(|e| anyhow!("cannot read keypair file {path}: {e}"))?;
    Ok(match seed {
        Some(seed) => ProgramAddress::from_keypair_with_seed(keypair, seed),
        None => ProgramAddress::from_keypair(keypair),
    })
}

fn executor(
    config: &Config,
    deployer: &Keypair,
    program_id: Pubkey,
    data_account: Pubkey,
    multisig_account: Option<Pubkey>,
) -> GenericExecutor {
    GenericExecutor::from_config(
        config,
        TransactionContext {
            fee_payer: deployer.insecure_clone(),
            program_id,
            data_account,
            multisig_account,
        },
    )
}

async fn send_confirmed(
    rpc: &RpcClient,
    config: &Config,
    payer: &Keypair,
    signers: &[&Keypair],
    instructions: &[Instruction],
) -> Result<()> {
    let blockhash = rpc.get_latest_blockhash().await?;
    let transaction =
        Transaction::new_signed_with_payer(instructions, Some(&payer.pubkey()), signers, blockhash);
    let signature = rpc.send_transaction(&transaction).await?;
    confirm_signature(rpc, &signature, &config.confirmation).await?;
    Ok(())
}

/// Create a token mint with `authority` as mint authority.
async fn create_token_mint(
    rpc: &RpcClient,
    config: &Config,
    payer: &Keypair,
    authority: &Pubkey,
) -> Result<Pubkey> {
    let mint = Keypair::new();
    let rent = rpc.get_minimum_balance_for_rent_exemption(Mint::LEN).await?;
    let instructions = [
        system_instruction::create_account(
            &payer.pubkey(),
            &mint.pubkey(),
            rent,
            Mint::LEN as u64,
            &spl_token::ID,
        ),
        spl_token::instruction::initialize_mint(&spl_token::ID, &mint.pubkey(), authority, None, 8)?,
    ];
    send_confirmed(rpc, config, payer, &[payer, &mint], &instructions).await?;
    Ok(mint.pubkey())
}

async fn create_token_account(
    rpc: &RpcClient,
    config: &Config,
    payer: &Keypair,
    mint: &Pubkey,
    owner: &Pubkey,
) -> Result<Pubkey> {
    let account = Keypair::new();
    let rent = rpc
        .get_minimum_balance_for_rent_exemption(TokenAccount::LEN)
        .await?;
    let instructions = [
        system_instruction::create_account(
            &payer.pubkey(),
            &account.pubkey(),
            rent,
            TokenAccount::LEN as u64,
            &spl_token::ID,
        ),
        spl_token::instruction::initialize_account(&spl_token::ID, &account.pubkey(), mint, owner)?,
    ];
    send_confirmed(rpc, config, payer, &[payer, &account], &instructions).await?;
    Ok(account.pubkey())
}

#[tokio::test]
#[ignore = "needs a local validator with gravity/nebula/ibport deployed"]
async fn provisions_bridge_and_enforces_replay_guards() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .try_init();

    let config = Config::from_env();
    let rpc = RpcClient::new_with_commitment(config.rpc_url.clone(), CommitmentConfig::confirmed());

    let deployer = Keypair::new();
    request_airdrop(
        &rpc,
        &deployer.pubkey(),
        10 * LAMPORTS_PER_SOL,
        &config.confirmation,
    )
    .await?;

    let consuls = ConsulSet::generate(BFT as usize, BFT)?;
    let programs = BridgePrograms {
        gravity: program_from_env("GRAVITY_PROGRAM_KEYPAIR", None)?,
        nebula: program_from_env("NEBULA_PROGRAM_KEYPAIR", None)?,
        ibport: program_from_env("IBPORT_PROGRAM_KEYPAIR", Some(b"ibport"))?,
    };

    let orchestrator = DeploymentOrchestrator::new(config.clone());
    let provisioned = orchestrator.provision(&deployer, &consuls, &programs).await?;

    // three independent inits, three distinct confirmed signatures
    assert_ne!(provisioned.init.gravity, provisioned.init.nebula);
    assert_ne!(provisioned.init.nebula, provisioned.init.ibport);
    assert_ne!(provisioned.init.gravity, provisioned.init.ibport);

    let gravity_exec = executor(
        &config,
        &deployer,
        programs.gravity.pubkey(),
        provisioned.accounts.gravity_state,
        Some(provisioned.accounts.gravity_multisig),
    );
    let roster = consuls.concat_pubkeys();

    // Init is one-shot per data account
    let second_init = gravity_exec
        .invoke(
            GravityInstruction::Init {
                bft: BFT,
                init_round: 1,
                consuls: roster.clone(),
            }
            .encode(),
            &InvokeOptions::new(),
        )
        .await;
    assert!(
        second_init.is_err(),
        "re-init of an initialized state account must be rejected"
    );

    let nebula_exec = executor(
        &config,
        &deployer,
        programs.nebula.pubkey(),
        provisioned.accounts.nebula_state,
        Some(provisioned.accounts.nebula_multisig),
    );

    // double-subscribe prevention: the provisioning subscription id must
    // be rejected on a second registration
    let duplicate = nebula_exec
        .invoke(
            NebulaInstruction::Subscribe {
                subscriber: programs.ibport.pubkey(),
                min_confirmations: 1,
                reward: 1,
                subscription_id: provisioned.subscription.subscription_id,
            }
            .encode(),
            &InvokeOptions::new(),
        )
        .await;
    assert!(duplicate.is_err(), "reused subscription id must be rejected");

    // a distinct id still registers
    nebula_exec
        .invoke(
            NebulaInstruction::Subscribe {
                subscriber: programs.ibport.pubkey(),
                min_confirmations: 1,
                reward: 1,
                subscription_id: random_id(),
            }
            .encode(),
            &InvokeOptions::new(),
        )
        .await?;

    // consul roster update: enough co-signers and a fresh round succeeds
    gravity_exec
        .invoke(
            GravityInstruction::UpdateConsuls {
                bft: BFT,
                last_round: 10,
                consuls: roster.clone(),
            }
            .encode(),
            &InvokeOptions::new().extra_signers(consuls.signers()),
        )
        .await?;

    // fewer than bft co-signers is rejected even with a fresh round
    let under_threshold = gravity_exec
        .invoke(
            GravityInstruction::UpdateConsuls {
                bft: BFT,
                last_round: 11,
                consuls: roster.clone(),
            }
            .encode(),
            &InvokeOptions::new()
                .extra_signers(consuls.signers()[..(BFT as usize - 1)].to_vec()),
        )
        .await;
    assert!(
        under_threshold.is_err(),
        "update with fewer than bft co-signers must be rejected"
    );

    // stale round is rejected even with valid co-signers
    let stale = gravity_exec
        .invoke(
            GravityInstruction::UpdateConsuls {
                bft: BFT,
                last_round: 0,
                consuls: roster,
            }
            .encode(),
            &InvokeOptions::new().extra_signers(consuls.signers()),
        )
        .await;
    assert!(stale.is_err(), "stale round must be rejected");

    // relay-driven mint: a wrapped-token mint whose authority is the
    // port PDA, a receiver token account, and the payload fanned out
    // through Nebula into the port
    let port_pda = programs
        .ibport
        .derived()
        .map(|d| d.address)
        .context("port PDA missing")?;
    let mint = create_token_mint(&rpc, &config, &deployer, &deployer.pubkey()).await?;
    let receiver_token_account =
        create_token_account(&rpc, &config, &deployer, &mint, &deployer.pubkey()).await?;
    send_confirmed(
        &rpc,
        &config,
        &deployer,
        &[&deployer],
        &[spl_token::instruction::set_authority(
            &spl_token::ID,
            &mint,
            Some(&port_pda),
            AuthorityType::MintTokens,
            &deployer.pubkey(),
            &[],
        )?],
    )
    .await?;

    let payload = MintPayload::with_random_swap_id(227.0, receiver_token_account);
    let fan_out_metas = vec![
        AccountMeta::new_readonly(spl_token::ID, false),
        AccountMeta::new_readonly(programs.ibport.pubkey(), false),
        AccountMeta::new(provisioned.accounts.ibport_state, false),
        AccountMeta::new(mint, false),
        AccountMeta::new(receiver_token_account, false),
        AccountMeta::new_readonly(port_pda, false),
    ];

    // one consul relays the fan-out and pays its fee
    let operating_consul = consuls.consul(0).context("roster is non-empty")?;
    request_airdrop(
        &rpc,
        &operating_consul.pubkey(),
        2 * LAMPORTS_PER_SOL,
        &config.confirmation,
    )
    .await?;

    nebula_exec
        .invoke(
            NebulaInstruction::SendValueToSubs {
                data_hash: payload.to_data_hash(),
                data_type: DataType::Bytes,
                pulse_id: 1,
                subscription_id: provisioned.subscription.subscription_id,
            }
            .encode(),
            &InvokeOptions::new()
                .fee_payer(operating_consul.keypair())
                .extra_accounts(fan_out_metas),
        )
        .await?;

    // the commitment broadcast is co-signed by the full roster
    nebula_exec
        .invoke(
            NebulaInstruction::SendHashValue {
                data_hash: payload.to_data_hash(),
            }
            .encode(),
            &InvokeOptions::new().extra_signers(consuls.signers()),
        )
        .await?;

    // attach-value double-spend prevention, straight through the port
    let ibport_exec = executor(
        &config,
        &deployer,
        programs.ibport.pubkey(),
        provisioned.accounts.ibport_state,
        None,
    );
    let attach_metas = vec![
        AccountMeta::new_readonly(spl_token::ID, false),
        AccountMeta::new(mint, false),
        AccountMeta::new(receiver_token_account, false),
        AccountMeta::new_readonly(port_pda, false),
    ];
    let direct = MintPayload::with_random_swap_id(227.0, receiver_token_account);

    ibport_exec
        .invoke(
            IbPortInstruction::AttachValue { payload: direct }.encode(),
            &InvokeOptions::new().extra_accounts(attach_metas.clone()),
        )
        .await?;

    let replay = ibport_exec
        .invoke(
            IbPortInstruction::AttachValue { payload: direct }.encode(),
            &InvokeOptions::new().extra_accounts(attach_metas.clone()),
        )
        .await;
    assert!(replay.is_err(), "reused swap id must be rejected");

    // distinct swap ids keep minting
    for _ in 0..2 {
        let fresh = MintPayload::with_random_swap_id(227.0, receiver_token_account);
        ibport_exec
            .invoke(
                IbPortInstruction::AttachValue { payload: fresh }.encode(),
                &InvokeOptions::new().extra_accounts(attach_metas.clone()),
            )
            .await?;
    }

    Ok(())
}
