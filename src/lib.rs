//! # Gravity Adapter
//!
//! Client-side orchestration layer for the Gravity cross-chain oracle
//! bridge on Solana: the consul registry (Gravity), the BFT-multisig
//! data relay (Nebula), and the token-bridging port (IBPort).
//!
//! ## What this crate does
//! - Encodes typed operations into the exact byte layout each on-chain
//!   program expects (hand-rolled, byte-exact; no schema library)
//! - Builds, multi-signs, submits and confirms transactions, including
//!   the BFT pattern where N consul keys co-sign one transaction
//! - Runs independent deployment/initialization steps concurrently and
//!   serializes the steps that depend on prior ledger state
//!
//! ## What it deliberately does not do
//! The on-chain programs' state machines are opaque here: the crate only
//! models the instructions they accept and surfaces their rejections.
//! Replay guards (duplicate subscription ids, duplicate swap ids, stale
//! rounds) are enforced on-chain; an expected rejection and an
//! unexpected one look the same to the client, and callers distinguish
//! them only by their own expectation.
//!
//! ## Architecture
//! - `instruction`: per-program tagged instruction codecs
//! - `payload`: the 57-byte cross-chain mint payload shared by relay
//!   and port
//! - `roster`: consul keypair roster and BFT threshold
//! - `executor`: transaction context + generic build/sign/submit/confirm
//! - `ledger`: program addressing, state-account creation, funding
//! - `orchestrator`: concurrent provisioning with aggregated errors
//! - `config`: environment-driven settings

pub mod config;
pub mod error;
pub mod executor;
pub mod instruction;
pub mod ledger;
pub mod orchestrator;
pub mod payload;
pub mod roster;

pub use config::{Config, ConfirmationConfig, CONFIG};
pub use error::{AdapterError, Result};
pub use executor::{GenericExecutor, InvokeOptions, TransactionContext, TxResult};
pub use instruction::{DataType, GravityInstruction, IbPortInstruction, NebulaInstruction};
pub use ledger::ProgramAddress;
pub use orchestrator::{BridgePrograms, BridgeProvisioning, DeploymentOrchestrator, TaskGroup};
pub use payload::MintPayload;
pub use roster::{Consul, ConsulSet};
