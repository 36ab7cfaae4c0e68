//! Anchor account layouts for the Patreonix program.
//!
//! Account data is `discriminator (8 bytes) || borsh(fields)`, where the
//! discriminator is the first 8 bytes of `sha256("account:<TypeName>")`.
//! Accounts are allocated with fixed space, so bytes after the encoded
//! fields are padding and ignored on decode.

use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};
use solana_program::pubkey::Pubkey;

use patreonix_core::model::{Comment, ContentItem, ContentType, Creator};
use patreonix_core::{PatreonixError, PatreonixResult};

use crate::constants::{ACCOUNT_CONTENT, ACCOUNT_CREATOR};

pub const DISCRIMINATOR_LEN: usize = 8;

/// `sha256("<namespace>:<name>")[..8]`.
pub(crate) fn anchor_discriminator(namespace: &str, name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let mut h = Sha256::new();
    h.update(namespace.as_bytes());
    h.update(b":");
    h.update(name.as_bytes());
    let digest = h.finalize();
    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
    out
}

pub fn account_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    anchor_discriminator("account", name)
}

/// Borsh tag for `ContentType`; variant order is the wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum ContentTypeTag {
    Text,
    Image,
    Video,
    Audio,
}

impl From<ContentType> for ContentTypeTag {
    fn from(t: ContentType) -> Self {
        match t {
            ContentType::Text => Self::Text,
            ContentType::Image => Self::Image,
            ContentType::Video => Self::Video,
            ContentType::Audio => Self::Audio,
        }
    }
}

impl From<ContentTypeTag> for ContentType {
    fn from(t: ContentTypeTag) -> Self {
        match t {
            ContentTypeTag::Text => Self::Text,
            ContentTypeTag::Image => Self::Image,
            ContentTypeTag::Video => Self::Video,
            ContentTypeTag::Audio => Self::Audio,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CreatorAccount {
    pub authority: [u8; 32],
    pub name: String,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub registered_at: i64,
    pub is_active: bool,
    pub total_supporters: u64,
    pub total_content: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CommentRecord {
    pub creator: [u8; 32],
    pub content: String,
    pub created_at: i64,
    pub is_edited: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ContentAccount {
    /// Creator PDA.
    pub creator: [u8; 32],
    pub title: String,
    pub description: String,
    pub content: String,
    pub content_type: ContentTypeTag,
    pub created_at: i64,
    pub updated_at: Option<i64>,
    pub total_views: u64,
    pub total_likes: u64,
    pub comments: Vec<CommentRecord>,
    pub content_index: u64,
    pub is_active: bool,
    pub bump: u8,
}

fn decode_anchor<T: BorshDeserialize>(name: &str, data: &[u8]) -> PatreonixResult<T> {
    if data.len() < DISCRIMINATOR_LEN {
        return Err(PatreonixError::decode(format!(
            "{name} account data too short: {} bytes",
            data.len()
        )));
    }
    let (disc, mut body) = data.split_at(DISCRIMINATOR_LEN);
    if disc != account_discriminator(name) {
        return Err(PatreonixError::decode(format!("account is not a {name}")));
    }
    T::deserialize(&mut body).map_err(|e| PatreonixError::decode(format!("{name}: {e}")))
}

fn encode_anchor<T: BorshSerialize>(name: &str, value: &T) -> PatreonixResult<Vec<u8>> {
    let mut out = account_discriminator(name).to_vec();
    let body = borsh::to_vec(value).map_err(|e| PatreonixError::decode(format!("{name}: {e}")))?;
    out.extend_from_slice(&body);
    Ok(out)
}

impl CreatorAccount {
    pub fn decode(data: &[u8]) -> PatreonixResult<Self> {
        decode_anchor(ACCOUNT_CREATOR, data)
    }

    pub fn encode(&self) -> PatreonixResult<Vec<u8>> {
        encode_anchor(ACCOUNT_CREATOR, self)
    }

    pub fn into_model(self, address: Pubkey) -> Creator {
        Creator {
            address,
            authority: Pubkey::new_from_array(self.authority),
            name: self.name,
            email: self.email,
            bio: self.bio,
            avatar: self.avatar,
            registered_at: self.registered_at,
            is_active: self.is_active,
            total_supporters: self.total_supporters,
            total_content: self.total_content,
        }
    }
}

impl ContentAccount {
    pub fn decode(data: &[u8]) -> PatreonixResult<Self> {
        decode_anchor(ACCOUNT_CONTENT, data)
    }

    pub fn encode(&self) -> PatreonixResult<Vec<u8>> {
        encode_anchor(ACCOUNT_CONTENT, self)
    }

    pub fn into_model(self, address: Pubkey) -> ContentItem {
        ContentItem {
            index: self.content_index,
            address,
            creator: Pubkey::new_from_array(self.creator),
            title: self.title,
            description: self.description,
            content_url: self.content,
            content_type: self.content_type.into(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            likes: self.total_likes,
            views: self.total_views,
            comments: self
                .comments
                .into_iter()
                .map(|c| Comment {
                    author: Pubkey::new_from_array(c.creator),
                    content: c.content,
                    created_at: c.created_at,
                    is_edited: c.is_edited,
                })
                .collect(),
            is_active: self.is_active,
        }
    }
}
