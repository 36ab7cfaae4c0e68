//! Credential authenticator.
//!
//! A wallet signs [`SIGN_IN_MESSAGE`]; the authenticator checks the signature,
//! looks up the wallet's creator account and builds the session principal.
//! Each call is independent: no shared mutable state, no retries.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use tracing::{debug, info, warn};

use patreonix_core::model::Creator;
use patreonix_core::{PatreonixResult, SIGN_IN_MESSAGE};
use patreonix_solana_client::{parse_pubkey, PatreonixClient};

use crate::error::AuthError;
use crate::verify::verify_signature;

/// Where creator accounts are looked up during sign-in.
#[async_trait]
pub trait CreatorDirectory: Send + Sync {
    async fn find_creator(&self, wallet: &Pubkey) -> PatreonixResult<Option<Creator>>;
}

#[async_trait]
impl CreatorDirectory for PatreonixClient {
    async fn find_creator(&self, wallet: &Pubkey) -> PatreonixResult<Option<Creator>> {
        self.fetch_creator(wallet).await
    }
}

/// Sign-in form fields, both base58.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub public_key: String,
    pub signature: String,
}

impl Credentials {
    pub fn new(public_key: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            signature: signature.into(),
        }
    }
}

/// Authenticated identity carried by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// Same as `public_key`.
    pub id: String,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub is_active: bool,
    pub public_key: String,
}

impl Principal {
    /// Build the principal for `public_key`. Creators without an email get
    /// `<public_key>@patreonix.com`.
    pub fn from_creator(public_key: &str, creator: &Creator) -> Self {
        let email = creator
            .email
            .clone()
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| format!("{public_key}@patreonix.com"));
        Self {
            id: public_key.to_string(),
            name: creator.name.clone(),
            email,
            bio: creator.bio.clone(),
            avatar: creator.avatar.clone().filter(|a| !a.is_empty()),
            is_active: creator.is_active,
            public_key: public_key.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct Authenticator {
    directory: Arc<dyn CreatorDirectory>,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}

impl Authenticator {
    pub fn new(directory: Arc<dyn CreatorDirectory>) -> Self {
        Self { directory }
    }

    pub async fn authenticate(&self, creds: &Credentials) -> Result<Principal, AuthError> {
        let public_key = creds.public_key.trim();
        let signature = creds.signature.trim();
        if public_key.is_empty() {
            return Err(AuthError::InvalidInput("publicKey is required".into()));
        }
        if signature.is_empty() {
            return Err(AuthError::InvalidInput("signature is required".into()));
        }

        if !verify_signature(SIGN_IN_MESSAGE.as_bytes(), signature, public_key)? {
            warn!(public_key, "sign-in signature rejected");
            return Err(AuthError::Authentication);
        }

        let wallet = parse_pubkey(public_key).map_err(|e| AuthError::Decode(e.to_string()))?;
        debug!(%wallet, "signature ok, looking up creator");

        let creator = match self.directory.find_creator(&wallet).await {
            Ok(Some(c)) => c,
            Ok(None) => {
                warn!(%wallet, "sign-in for unregistered wallet");
                return Err(AuthError::PrincipalNotFound(wallet.to_string()));
            }
            // undecodable account data counts as a failed lookup
            Err(e) => {
                warn!(%wallet, error = %e, "creator lookup failed");
                return Err(AuthError::UpstreamUnavailable(e.to_string()));
            }
        };

        info!(%wallet, "creator signed in");
        Ok(Principal::from_creator(public_key, &creator))
    }
}
