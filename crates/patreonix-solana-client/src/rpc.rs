//! Chain access seam.
//!
//! `PatreonixClient` only ever talks to the chain through [`ChainRpc`]. The
//! production implementation wraps the nonblocking Solana JSON-RPC client;
//! tests use `memory::MemoryChain`.

use std::time::Duration;

use async_trait::async_trait;
use solana_account_decoder::{UiAccountEncoding, UiDataSliceConfig};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig, RpcSendTransactionConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_program::instruction::Instruction;
use solana_program::pubkey::Pubkey;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::{Result as TransactionResult, Transaction};
use thiserror::Error;
use tokio::time::sleep;
use tracing::debug;

use patreonix_core::config::{ClusterConfig, Commitment};

/// Transport or node failure. Carries the node's message only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RpcError(pub String);

impl RpcError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Match `bytes` at `offset` inside raw account data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemcmpFilter {
    pub offset: usize,
    pub bytes: Vec<u8>,
}

impl MemcmpFilter {
    pub fn new(offset: usize, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            offset,
            bytes: bytes.into(),
        }
    }

    pub fn matches(&self, data: &[u8]) -> bool {
        let Some(end) = self.offset.checked_add(self.bytes.len()) else {
            return false;
        };
        data.get(self.offset..end)
            .is_some_and(|window| window == self.bytes.as_slice())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub max_retries: Option<usize>,
}

#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Raw data of `address`, or `None` if no such account exists.
    async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, RpcError>;

    /// Addresses of accounts owned by `program_id` matching every filter.
    async fn program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<Pubkey>, RpcError>;

    /// Sign with `payer`, submit and wait for confirmation.
    async fn send_instructions(
        &self,
        payer: &Keypair,
        instructions: &[Instruction],
        opts: SendOptions,
    ) -> Result<Signature, RpcError>;
}

fn commitment_config(c: Commitment) -> CommitmentConfig {
    match c {
        Commitment::Processed => CommitmentConfig::processed(),
        Commitment::Confirmed => CommitmentConfig::confirmed(),
        Commitment::Finalized => CommitmentConfig::finalized(),
    }
}

/// [`ChainRpc`] over a Solana JSON-RPC endpoint.
pub struct SolanaRpc {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl SolanaRpc {
    pub fn new(rpc_url: impl Into<String>, commitment: Commitment) -> Self {
        let commitment = commitment_config(commitment);
        Self {
            client: RpcClient::new_with_commitment(rpc_url.into(), commitment),
            commitment,
        }
    }

    pub fn from_config(cfg: &ClusterConfig) -> Self {
        Self::new(cfg.rpc_url.clone(), cfg.commitment)
    }

    pub fn url(&self) -> String {
        self.client.url()
    }
}

impl std::fmt::Debug for SolanaRpc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaRpc")
            .field("url", &self.client.url())
            .field("commitment", &self.commitment.commitment)
            .finish()
    }
}

#[async_trait]
impl ChainRpc for SolanaRpc {
    async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, RpcError> {
        let resp = self
            .client
            .get_account_with_commitment(address, self.commitment)
            .await
            .map_err(|e| RpcError::new(e.to_string()))?;
        Ok(resp.value.map(|acc| acc.data))
    }

    async fn program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<Pubkey>, RpcError> {
        let filters = filters
            .iter()
            .map(|f| RpcFilterType::Memcmp(Memcmp::new_raw_bytes(f.offset, f.bytes.clone())))
            .collect();
        let config = RpcProgramAccountsConfig {
            filters: Some(filters),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                // addresses only
                data_slice: Some(UiDataSliceConfig { offset: 0, length: 0 }),
                commitment: Some(self.commitment),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };
        let accounts = self
            .client
            .get_program_accounts_with_config(program_id, config)
            .await
            .map_err(|e| RpcError::new(e.to_string()))?;
        Ok(accounts.into_iter().map(|(key, _)| key).collect())
    }

    async fn send_instructions(
        &self,
        payer: &Keypair,
        instructions: &[Instruction],
        opts: SendOptions,
    ) -> Result<Signature, RpcError> {
        let blockhash = self
            .client
            .get_latest_blockhash()
            .await
            .map_err(|e| RpcError::new(e.to_string()))?;
        let tx = Transaction::new_signed_with_payer(instructions, Some(&payer.pubkey()), &[payer], blockhash);

        let Some(max_retries) = opts.max_retries else {
            return self
                .client
                .send_and_confirm_transaction(&tx)
                .await
                .map_err(|e| RpcError::new(e.to_string()));
        };

        let config = RpcSendTransactionConfig {
            max_retries: Some(max_retries),
            preflight_commitment: Some(self.commitment.commitment),
            ..RpcSendTransactionConfig::default()
        };
        let sig = self
            .client
            .send_transaction_with_config(&tx, config)
            .await
            .map_err(|e| RpcError::new(e.to_string()))?;
        self.await_confirmation(&sig, &blockhash).await?;
        Ok(sig)
    }
}

impl SolanaRpc {
    /// Poll until `sig` reaches the configured commitment, fails on-chain, or
    /// `blockhash` expires.
    async fn await_confirmation(&self, sig: &Signature, blockhash: &Hash) -> Result<(), RpcError> {
        loop {
            // blockhash first: once it is invalid the transaction can no longer land
            let blockhash_valid = self
                .client
                .is_blockhash_valid(blockhash, self.commitment)
                .await
                .map_err(|e| RpcError::new(e.to_string()))?;
            let status = self
                .client
                .get_signature_status_with_commitment(sig, self.commitment)
                .await
                .map_err(|e| RpcError::new(e.to_string()))?;
            match confirmation(sig, status, blockhash_valid) {
                Confirmation::Confirmed => return Ok(()),
                Confirmation::Failed(e) => {
                    debug!(signature = %sig, error = %e, "transaction not confirmed");
                    return Err(e);
                }
                Confirmation::Pending => sleep(CONFIRM_POLL_INTERVAL).await,
            }
        }
    }
}

const CONFIRM_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, PartialEq, Eq)]
enum Confirmation {
    Pending,
    Confirmed,
    Failed(RpcError),
}

fn confirmation(sig: &Signature, status: Option<TransactionResult<()>>, blockhash_valid: bool) -> Confirmation {
    match status {
        Some(Ok(())) => Confirmation::Confirmed,
        Some(Err(e)) => Confirmation::Failed(RpcError::new(format!("transaction {sig} failed: {e}"))),
        None if blockhash_valid => Confirmation::Pending,
        None => Confirmation::Failed(RpcError::new(format!(
            "transaction {sig} expired before confirmation"
        ))),
    }
}
