//! PDA derivation helpers for the Patreonix program.
//!
//! These must match the program's `seeds = [...]` constraints byte for byte.
//! In particular the content index is always encoded as 8 little-endian
//! bytes; any other width or byte order yields addresses that do not match
//! accounts created earlier.

use solana_program::pubkey::Pubkey;

use patreonix_core::{PatreonixError, PatreonixResult};

use crate::constants::{SEED_CONTENT, SEED_CREATOR};

#[derive(Debug, Clone)]
pub struct CreatorPdas {
    pub creator: (Pubkey, u8),
}

#[derive(Debug, Clone)]
pub struct ContentPdas {
    pub creator: (Pubkey, u8),
    pub content: (Pubkey, u8),
}

/// Seed bytes for a content index.
pub fn index_seed(index: u64) -> [u8; 8] {
    index.to_le_bytes()
}

/// Derive the creator PDA owned by `wallet`.
pub fn derive_creator(program_id: &Pubkey, wallet: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[SEED_CREATOR, wallet.as_ref()], program_id)
}

/// Derive the content PDA for `creator` (the creator PDA, not the wallet).
pub fn derive_content(program_id: &Pubkey, creator: &Pubkey, index: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[SEED_CONTENT, creator.as_ref(), &index_seed(index)], program_id)
}

pub fn pdas_for_creator(program_id: &Pubkey, wallet: &Pubkey) -> CreatorPdas {
    CreatorPdas {
        creator: derive_creator(program_id, wallet),
    }
}

/// Creator and content PDAs for a wallet's `index`-th content item.
pub fn pdas_for_content(program_id: &Pubkey, wallet: &Pubkey, index: u64) -> ContentPdas {
    let creator = derive_creator(program_id, wallet);
    let content = derive_content(program_id, &creator.0, index);
    ContentPdas { creator, content }
}

/// Parse a base58 public key, reporting bad input as `Decode`.
pub fn parse_pubkey(input: &str) -> PatreonixResult<Pubkey> {
    let bytes = bs58::decode(input.trim())
        .into_vec()
        .map_err(|e| PatreonixError::decode(format!("invalid base58 public key: {e}")))?;
    let arr: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
        PatreonixError::decode(format!("public key must be 32 bytes, got {}", b.len()))
    })?;
    Ok(Pubkey::new_from_array(arr))
}
