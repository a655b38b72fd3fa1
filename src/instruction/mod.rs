//! # Instruction Codecs
//!
//! Byte-exact encoders for the three on-chain programs of the bridge.
//! Each program has a closed set of operations modeled as one enum
//! variant per operation; `encode` writes the program-local tag byte
//! followed by the fields in declaration order at their natural width:
//!
//! - public keys: 32 raw bytes
//! - swap/subscription ids: 16 bytes verbatim
//! - unsigned integers: little-endian at native width
//! - amounts: 8-byte little-endian IEEE-754
//! - consul/oracle rosters: 32·N bytes, roster order, no length prefix
//!
//! Tags are not shared across programs. The client never decodes these
//! payloads; the only bidirectional format is the mint payload in
//! [`crate::payload`].

/// Gravity consul-registry instructions
pub mod gravity;

/// Nebula relay instructions
pub mod nebula;

/// IBPort token-port instructions
pub mod ibport;

pub use gravity::GravityInstruction;
pub use ibport::IbPortInstruction;
pub use nebula::{DataType, NebulaInstruction};
