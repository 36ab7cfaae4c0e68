use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

use crate::errors::{PatreonixError, PatreonixResult};
use crate::limits::{
    check_len, check_non_empty, MAX_COMMENTS, MAX_COMMENT_LEN, MAX_CONTENT_LEN, MAX_DESCRIPTION_LEN,
    MAX_TITLE_LEN,
};
use crate::model::serde_pubkey;

/// Content type tag. Discriminant order matches the program's enum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Text,
    Image,
    Video,
    Audio,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = PatreonixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            other => Err(PatreonixError::invalid_input(format!("unknown content type: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(with = "serde_pubkey")]
    pub author: Pubkey,
    pub content: String,
    pub created_at: i64,
    pub is_edited: bool,
}

/// One piece of published content, addressed by creator and index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub index: u64,
    /// Content PDA.
    #[serde(with = "serde_pubkey")]
    pub address: Pubkey,
    /// Creator PDA (not the wallet).
    #[serde(with = "serde_pubkey")]
    pub creator: Pubkey,
    pub title: String,
    pub description: String,
    /// Inline body or external locator (e.g. an IPFS CID).
    pub content_url: String,
    pub content_type: ContentType,
    pub created_at: i64,
    pub updated_at: Option<i64>,
    pub likes: u64,
    pub views: u64,
    pub comments: Vec<Comment>,
    pub is_active: bool,
}

impl ContentItem {
    pub fn state(&self) -> ContentState {
        if self.is_active {
            ContentState::Active
        } else {
            ContentState::Inactive
        }
    }

    pub fn can_accept_comment(&self) -> bool {
        self.comments.len() < MAX_COMMENTS
    }
}

/// Lifecycle of a content slot: `Nonexistent -> Active -> Inactive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentState {
    Nonexistent,
    Active,
    Inactive,
}

impl ContentState {
    pub fn of(item: Option<&ContentItem>) -> Self {
        item.map_or(Self::Nonexistent, ContentItem::state)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostArgs {
    pub title: String,
    pub description: String,
    pub content_url: String,
    pub content_type: ContentType,
}

impl CreatePostArgs {
    pub fn validate(&self) -> PatreonixResult<()> {
        check_non_empty("title", &self.title)?;
        check_len("title", &self.title, MAX_TITLE_LEN)?;
        check_len("description", &self.description, MAX_DESCRIPTION_LEN)?;
        check_non_empty("content", &self.content_url)?;
        check_len("content", &self.content_url, MAX_CONTENT_LEN)
    }
}

/// Check a comment before it is submitted against `existing` comments.
pub fn validate_comment(text: &str, existing: usize) -> PatreonixResult<()> {
    check_non_empty("comment", text)?;
    check_len("comment", text, MAX_COMMENT_LEN)?;
    if existing >= MAX_COMMENTS {
        return Err(PatreonixError::invalid_input(format!(
            "content already has the maximum of {MAX_COMMENTS} comments"
        )));
    }
    Ok(())
}
