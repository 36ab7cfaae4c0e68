//! Configuration structures for Patreonix.
//!
//! Configuration is explicit: every component takes the struct it needs as an
//! argument. `PatreonixConfig::from_env` is the only place that reads the
//! process environment, and it is meant to be called once at startup.

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{PatreonixError, PatreonixResult};

/// Program id of the deployed Patreonix program (devnet).
pub const DEFAULT_PROGRAM_ID: &str = "5uh6s9rCQaPKbfdZ31opFWeUigSdzZrA6obGFtp4PFde";

pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";
pub const LOCALNET_RPC_URL: &str = "http://127.0.0.1:8899";

pub const DEFAULT_PINATA_API_URL: &str = "https://api.pinata.cloud";
pub const DEFAULT_PINATA_GATEWAY_URL: &str = "https://gateway.pinata.cloud/ipfs";

/// Session lifetime in seconds.
pub const DEFAULT_SESSION_MAX_AGE_SECS: u64 = 10_000;

/// Minimum length of the session signing secret, in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

/// Global configuration container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatreonixConfig {
    pub cluster: ClusterConfig,
    pub session: SessionConfig,
    pub pinning: PinningConfig,
    pub submit: SubmitConfig,
}

/// Where the program lives and how reads are committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub rpc_url: String,
    pub commitment: Commitment,
    pub program_id: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            commitment: Commitment::Confirmed,
            program_id: DEFAULT_PROGRAM_ID.to_string(),
        }
    }
}

impl ClusterConfig {
    /// Local test validator.
    pub fn localnet() -> Self {
        Self {
            rpc_url: LOCALNET_RPC_URL.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
        }
    }
}

impl FromStr for Commitment {
    type Err = PatreonixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "processed" => Ok(Self::Processed),
            "confirmed" => Ok(Self::Confirmed),
            "finalized" => Ok(Self::Finalized),
            other => Err(PatreonixError::invalid_input(format!(
                "unsupported commitment: {other}"
            ))),
        }
    }
}

/// Session token settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// HMAC secret used to sign session tokens.
    pub secret: String,
    pub max_age_secs: u64,
    pub issuer: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            max_age_secs: DEFAULT_SESSION_MAX_AGE_SECS,
            issuer: "patreonix".to_string(),
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"[REDACTED]")
            .field("max_age_secs", &self.max_age_secs)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Pinata API settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct PinningConfig {
    pub api_url: String,
    pub gateway_url: String,
    pub jwt: String,
}

impl Default for PinningConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_PINATA_API_URL.to_string(),
            gateway_url: DEFAULT_PINATA_GATEWAY_URL.to_string(),
            jwt: String::new(),
        }
    }
}

impl fmt::Debug for PinningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinningConfig")
            .field("api_url", &self.api_url)
            .field("gateway_url", &self.gateway_url)
            .field("jwt", &"[REDACTED]")
            .finish()
    }
}

/// Transaction submission settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitConfig {
    /// Forwarded to the RPC node's `maxRetries`. `None` keeps the node default.
    pub max_retries: Option<usize>,
}

impl PatreonixConfig {
    /// Load configuration from `PATREONIX_*` environment variables.
    ///
    /// A `.env` file is read first if present. Unset variables keep their
    /// defaults; set-but-unparseable variables are an error.
    pub fn from_env() -> PatreonixResult<Self> {
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();

        if let Some(v) = var("PATREONIX_RPC_URL") {
            cfg.cluster.rpc_url = v;
        }
        if let Some(v) = var("PATREONIX_COMMITMENT") {
            cfg.cluster.commitment = v.parse()?;
        }
        if let Some(v) = var("PATREONIX_PROGRAM_ID") {
            cfg.cluster.program_id = v;
        }
        if let Some(v) = var("PATREONIX_SESSION_SECRET") {
            cfg.session.secret = v;
        }
        if let Some(v) = var("PATREONIX_SESSION_MAX_AGE_SECS") {
            cfg.session.max_age_secs = parse_num("PATREONIX_SESSION_MAX_AGE_SECS", &v)?;
        }
        if let Some(v) = var("PATREONIX_PINATA_JWT") {
            cfg.pinning.jwt = v;
        }
        if let Some(v) = var("PATREONIX_PINATA_API_URL") {
            cfg.pinning.api_url = v;
        }
        if let Some(v) = var("PATREONIX_PINATA_GATEWAY_URL") {
            cfg.pinning.gateway_url = v;
        }
        if let Some(v) = var("PATREONIX_SUBMIT_MAX_RETRIES") {
            cfg.submit.max_retries = Some(parse_num("PATREONIX_SUBMIT_MAX_RETRIES", &v)?);
        }

        validate_config(&cfg)?;
        Ok(cfg)
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_num<T: FromStr>(name: &str, raw: &str) -> PatreonixResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| PatreonixError::invalid_input(format!("{name} must be a non-negative integer")))
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &PatreonixConfig) -> PatreonixResult<()> {
    if cfg.cluster.rpc_url.trim().is_empty() {
        return Err(PatreonixError::invalid_input("rpc_url must not be empty"));
    }

    validate_program_id(&cfg.cluster.program_id)?;

    if cfg.session.secret.len() < MIN_SESSION_SECRET_LEN {
        return Err(PatreonixError::invalid_input(format!(
            "session secret must be at least {MIN_SESSION_SECRET_LEN} bytes"
        )));
    }

    if cfg.session.max_age_secs == 0 {
        return Err(PatreonixError::invalid_input(
            "session max_age_secs must be greater than zero",
        ));
    }

    Ok(())
}

/// A program id must be base58 and decode to exactly 32 bytes.
pub fn validate_program_id(program_id: &str) -> PatreonixResult<()> {
    let bytes = bs58::decode(program_id.trim())
        .into_vec()
        .map_err(|e| PatreonixError::decode(format!("program id is not base58: {e}")))?;
    if bytes.len() != 32 {
        return Err(PatreonixError::invalid_input(format!(
            "program id must decode to 32 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(())
}
