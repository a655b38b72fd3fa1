//! Error types shared across the adapter.

use solana_sdk::signature::Signature;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = AdapterError> = std::result::Result<T, E>;

/// Failure modes of the client-side bridge adapter.
///
/// The taxonomy mirrors where a failure happens: before submission
/// (`Protocol`, `Payload`), at the RPC boundary (`Rpc`), or after the
/// transaction reached the cluster (`InstructionFailed`,
/// `ConfirmationTimeout`). On-chain rejections carry only the opaque
/// program error the ledger reports; callers that expect a rejection
/// (duplicate swap id, stale round) check for error presence, not kind.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Transport-level RPC failure. Never retried automatically.
    #[error("rpc transport error: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    /// The transaction was accepted by the cluster but the program
    /// rejected the instruction during execution.
    #[error("instruction failed on-chain: {0}")]
    InstructionFailed(String),

    /// The status poll budget ran out before the transaction reached the
    /// requested commitment.
    #[error("transaction {signature} unconfirmed after {polls} status polls")]
    ConfirmationTimeout { signature: Signature, polls: u32 },

    /// Client-side misuse caught before any network round trip, e.g. an
    /// empty consul roster or a BFT threshold above the roster size.
    #[error("protocol misuse: {0}")]
    Protocol(String),

    /// A cross-chain mint payload that does not match the fixed 57-byte
    /// layout.
    #[error("malformed mint payload: {0}")]
    Payload(String),

    /// Aggregated outcome of a concurrent provisioning group; every failed
    /// task is named.
    #[error("{failed}/{total} tasks failed: {}", .errors.join("; "))]
    TaskGroup {
        total: usize,
        failed: usize,
        errors: Vec<String>,
    },
}
