//! Constants shared between the on-chain program and clients.
//!
//! Keep these stable because they affect PDA derivation and account decoding.

use std::str::FromStr;

use solana_program::pubkey::Pubkey;

pub use patreonix_core::config::DEFAULT_PROGRAM_ID;

/// PDA seed for creator accounts: `["creator", wallet]`.
pub const SEED_CREATOR: &[u8] = b"creator";

/// PDA seed for content accounts: `["content", creator_pda, index_le_u64]`.
pub const SEED_CONTENT: &[u8] = b"content";

/// Anchor account type names, used for discriminators.
pub const ACCOUNT_CREATOR: &str = "Creator";
pub const ACCOUNT_CONTENT: &str = "Content";

/// Byte offset of `Content.creator` inside raw account data (after the discriminator).
pub const CONTENT_CREATOR_OFFSET: usize = 8;

pub fn default_program_id() -> Pubkey {
    Pubkey::from_str(DEFAULT_PROGRAM_ID).unwrap_or_default()
}
