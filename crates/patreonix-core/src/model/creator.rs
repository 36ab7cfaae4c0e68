use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use time::OffsetDateTime;

use crate::errors::PatreonixResult;
use crate::limits::{check_len, check_opt_len, MAX_AVATAR_LEN, MAX_BIO_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN};
use crate::model::serde_pubkey;

/// A registered creator, one per wallet.
///
/// `address` is the creator PDA; `authority` is the owning wallet. Creators are
/// never deleted, deactivation only clears `is_active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    #[serde(with = "serde_pubkey")]
    pub address: Pubkey,
    #[serde(with = "serde_pubkey")]
    pub authority: Pubkey,
    pub name: String,
    pub email: Option<String>,
    pub bio: Option<String>,
    /// Content identifier of the avatar image.
    pub avatar: Option<String>,
    /// Unix seconds.
    pub registered_at: i64,
    pub is_active: bool,
    pub total_supporters: u64,
    /// Number of content items created so far; also the next content index.
    pub total_content: u64,
}

impl Creator {
    pub fn registered_at_utc(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.registered_at).ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterCreatorArgs {
    pub name: String,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

impl RegisterCreatorArgs {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Empty optional strings are sent as `None`, the same way the
    /// registration form treats blank fields.
    pub fn normalized(mut self) -> Self {
        self.email = self.email.filter(|s| !s.is_empty());
        self.bio = self.bio.filter(|s| !s.is_empty());
        self.avatar = self.avatar.filter(|s| !s.is_empty());
        self
    }

    pub fn validate(&self) -> PatreonixResult<()> {
        check_len("name", &self.name, MAX_NAME_LEN)?;
        check_opt_len("email", self.email.as_deref(), MAX_EMAIL_LEN)?;
        check_opt_len("bio", self.bio.as_deref(), MAX_BIO_LEN)?;
        check_opt_len("avatar", self.avatar.as_deref(), MAX_AVATAR_LEN)
    }
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCreatorArgs {
    pub name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

impl UpdateCreatorArgs {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.bio.is_none() && self.avatar.is_none()
    }

    pub fn validate(&self) -> PatreonixResult<()> {
        check_opt_len("name", self.name.as_deref(), MAX_NAME_LEN)?;
        check_opt_len("email", self.email.as_deref(), MAX_EMAIL_LEN)?;
        check_opt_len("bio", self.bio.as_deref(), MAX_BIO_LEN)?;
        check_opt_len("avatar", self.avatar.as_deref(), MAX_AVATAR_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_drops_blank_optionals() {
        let args = RegisterCreatorArgs {
            name: "Alice".into(),
            email: Some(String::new()),
            bio: Some("Crypto artist".into()),
            avatar: Some(String::new()),
        }
        .normalized();
        assert_eq!(args.email, None);
        assert_eq!(args.bio.as_deref(), Some("Crypto artist"));
        assert_eq!(args.avatar, None);
    }

    #[test]
    fn oversized_fields_rejected() {
        let mut args = RegisterCreatorArgs::new("a".repeat(MAX_NAME_LEN + 1));
        assert!(args.validate().is_err());
        args.name = "Alice".into();
        args.bio = Some("b".repeat(MAX_BIO_LEN + 1));
        assert!(args.validate().is_err());
        args.bio = None;
        args.validate().unwrap();
    }

    #[test]
    fn update_validation_skips_unset_fields() {
        let upd = UpdateCreatorArgs::default();
        assert!(upd.is_empty());
        upd.validate().unwrap();

        let upd = UpdateCreatorArgs {
            email: Some("e".repeat(MAX_EMAIL_LEN + 1)),
            ..Default::default()
        };
        assert!(upd.validate().is_err());
    }

    #[test]
    fn creator_serializes_addresses_as_base58() {
        let c = Creator {
            address: Pubkey::new_from_array([1; 32]),
            authority: Pubkey::new_from_array([2; 32]),
            name: "Alice".into(),
            email: None,
            bio: None,
            avatar: None,
            registered_at: 1_700_000_000,
            is_active: true,
            total_supporters: 0,
            total_content: 3,
        };
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["authority"], Pubkey::new_from_array([2; 32]).to_string());
        assert_eq!(v["totalContent"], 3);
        let back: Creator = serde_json::from_value(v).unwrap();
        assert_eq!(back, c);
        assert_eq!(c.registered_at_utc().unwrap().year(), 2023);
    }
}
