//! Patreonix data models.
//!
//! These are the off-chain views of the program's accounts. The on-chain
//! program is the only writer; everything here is read from account data or
//! built as instruction arguments.
//!
//! Addresses are `solana_program::pubkey::Pubkey` and serialize as base58
//! strings so that JSON consumers see the same form wallets display.

pub mod content;
pub mod creator;
pub mod page;

pub use content::{Comment, ContentItem, ContentState, ContentType, CreatePostArgs};
pub use creator::{Creator, RegisterCreatorArgs, UpdateCreatorArgs};
pub use page::{page_window, Page};

/// Serde adapter for `Pubkey` as a base58 string.
pub mod serde_pubkey {
    use std::str::FromStr;

    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use solana_program::pubkey::Pubkey;

    pub fn serialize<S: Serializer>(key: &Pubkey, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&key.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Pubkey, D::Error> {
        let raw = String::deserialize(d)?;
        Pubkey::from_str(&raw).map_err(D::Error::custom)
    }
}
