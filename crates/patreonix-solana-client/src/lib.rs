//! patreonix-solana-client
//!
//! A small, focused Rust client for the Patreonix on-chain program.
//!
//! It includes:
//! - seeds and the default program id
//! - PDA derivation for creator and content accounts
//! - Anchor account decoding and instruction encoding
//! - the `ChainRpc` seam, with a Solana JSON-RPC implementation
//! - `PatreonixClient`, which turns creator/content operations into reads and
//!   transactions against that seam
//!
//! The RPC handle is injected, never created from ambient state, so the same
//! client code runs against a validator, devnet, or `MemoryChain` in tests.

pub mod accounts;
pub mod client;
pub mod constants;
pub mod instructions;
pub mod pda;
pub mod rpc;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

pub use client::{PatreonixClient, PostReceipt, Registration};
pub use constants::*;
pub use pda::*;
pub use rpc::{ChainRpc, MemcmpFilter, RpcError, SendOptions, SolanaRpc};
