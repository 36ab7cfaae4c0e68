//! Patreonix program client.
//!
//! `PatreonixClient` turns creator and content operations into account reads
//! and signed transactions against an injected [`ChainRpc`]. It holds no
//! mutable state: the chain is the only source of truth.
//!
//! Failures talking to the chain are reported as `PatreonixError::Upstream`
//! tagged with the operation that was running, so the caller can show one
//! code per user action.

use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use solana_program::instruction::Instruction;
use solana_program::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use tracing::{debug, warn};

use patreonix_core::config::{PatreonixConfig, SubmitConfig};
use patreonix_core::model::content::validate_comment;
use patreonix_core::model::{
    page_window, ContentItem, CreatePostArgs, Creator, Page, RegisterCreatorArgs, UpdateCreatorArgs,
};
use patreonix_core::{PatreonixError, PatreonixResult, UpstreamCode};

use crate::accounts::{account_discriminator, ContentAccount, CreatorAccount};
use crate::constants::{ACCOUNT_CONTENT, CONTENT_CREATOR_OFFSET};
use crate::instructions;
use crate::pda;
use crate::rpc::{ChainRpc, MemcmpFilter, RpcError, SendOptions, SolanaRpc};

/// Result of a successful `register_creator`.
#[derive(Debug, Clone)]
pub struct Registration {
    pub signature: String,
    /// Account as read back after confirmation.
    pub creator: Creator,
}

/// Result of a successful `create_post`.
#[derive(Debug, Clone)]
pub struct PostReceipt {
    pub signature: String,
    pub index: u64,
    /// Content PDA of the new post.
    pub address: Pubkey,
}

#[derive(Clone)]
pub struct PatreonixClient {
    program_id: Pubkey,
    rpc: Arc<dyn ChainRpc>,
    signer: Option<Arc<Keypair>>,
    submit: SubmitConfig,
}

impl fmt::Debug for PatreonixClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatreonixClient")
            .field("program_id", &self.program_id)
            .field("signer", &self.signer.as_ref().map(|k| k.pubkey()))
            .field("submit", &self.submit)
            .finish()
    }
}

fn upstream(code: UpstreamCode) -> impl Fn(RpcError) -> PatreonixError {
    move |e| {
        warn!(code = code.as_str(), error = %e, "chain call failed");
        PatreonixError::upstream(code, e.to_string())
    }
}

impl PatreonixClient {
    /// Read-only client. Add a signer with [`with_signer`](Self::with_signer)
    /// before calling write operations.
    pub fn new(program_id: Pubkey, rpc: Arc<dyn ChainRpc>) -> Self {
        Self {
            program_id,
            rpc,
            signer: None,
            submit: SubmitConfig::default(),
        }
    }

    /// Client over the Solana RPC endpoint named in `cfg.cluster`.
    pub fn from_config(cfg: &PatreonixConfig) -> PatreonixResult<Self> {
        let program_id = pda::parse_pubkey(&cfg.cluster.program_id)?;
        let rpc = Arc::new(SolanaRpc::from_config(&cfg.cluster));
        Ok(Self::new(program_id, rpc).with_submit_config(cfg.submit.clone()))
    }

    pub fn with_signer(mut self, signer: Arc<Keypair>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_submit_config(mut self, submit: SubmitConfig) -> Self {
        self.submit = submit;
        self
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    pub fn signer_pubkey(&self) -> Option<Pubkey> {
        self.signer.as_ref().map(|k| k.pubkey())
    }

    pub fn creator_address(&self, wallet: &Pubkey) -> Pubkey {
        pda::derive_creator(&self.program_id, wallet).0
    }

    pub fn content_address(&self, wallet: &Pubkey, index: u64) -> Pubkey {
        pda::pdas_for_content(&self.program_id, wallet, index).content.0
    }

    // ---- reads ----

    /// Creator account for `wallet`, or `None` if the wallet never registered.
    pub async fn fetch_creator(&self, wallet: &Pubkey) -> PatreonixResult<Option<Creator>> {
        let address = self.creator_address(wallet);
        debug!(%wallet, %address, "fetching creator");
        let data = self
            .rpc
            .account_data(&address)
            .await
            .map_err(upstream(UpstreamCode::GetCreatorAccount))?;
        data.map(|d| CreatorAccount::decode(&d).map(|acc| acc.into_model(address)))
            .transpose()
    }

    /// Like [`fetch_creator`](Self::fetch_creator) but a missing account is
    /// `CreatorNotFound`.
    pub async fn creator_account(&self, wallet: &Pubkey) -> PatreonixResult<Creator> {
        self.fetch_creator(wallet)
            .await?
            .ok_or_else(|| PatreonixError::CreatorNotFound(wallet.to_string()))
    }

    pub async fn total_content_count(&self, wallet: &Pubkey) -> PatreonixResult<u64> {
        self.creator_account(wallet)
            .await
            .map(|c| c.total_content)
            .map_err(|e| e.within(UpstreamCode::ContentCount))
    }

    async fn content_at(&self, creator: &Pubkey, index: u64) -> PatreonixResult<Option<ContentItem>> {
        let (address, _) = pda::derive_content(&self.program_id, creator, index);
        let data = self
            .rpc
            .account_data(&address)
            .await
            .map_err(upstream(UpstreamCode::FetchContent))?;
        data.map(|d| ContentAccount::decode(&d).map(|acc| acc.into_model(address)))
            .transpose()
    }

    /// Content item `index` of `wallet`'s creator.
    ///
    /// `None` means the slot has not been created yet (any index at or past
    /// `total_content`), not that the read failed.
    pub async fn content_by_index(&self, wallet: &Pubkey, index: u64) -> PatreonixResult<Option<ContentItem>> {
        debug!(%wallet, index, "fetching content");
        self.content_at(&self.creator_address(wallet), index).await
    }

    /// Page `page` (0-based) of `wallet`'s content, `page_size` items per page.
    ///
    /// Items in the page are fetched concurrently. Missing slots are dropped,
    /// so a page may hold fewer than `page_size` items even when `has_more`.
    pub async fn paginated_content(
        &self,
        wallet: &Pubkey,
        page: u64,
        page_size: u64,
    ) -> PatreonixResult<Page<ContentItem>> {
        const CODE: UpstreamCode = UpstreamCode::FetchPaginatedContent;
        if page_size == 0 {
            return Err(PatreonixError::invalid_input("page_size must be greater than zero"));
        }
        let total = self.total_content_count(wallet).await.map_err(|e| e.within(CODE))?;
        let Some(window) = page_window(total, page, page_size)? else {
            debug!(%wallet, page, page_size, total, "page past the end");
            return Ok(Page::empty(total, page, page_size));
        };
        debug!(%wallet, page, start = window.start, end = window.end, total, "fetching page");

        let creator = self.creator_address(wallet);
        let fetched = join_all(window.clone().map(|i| self.content_at(&creator, i))).await;
        let items = collect_present(fetched).map_err(|e| e.within(CODE))?;

        Ok(Page {
            items,
            total,
            page,
            page_size,
            has_more: window.end < total,
        })
    }

    /// Every content item of `wallet`'s creator, in index order.
    pub async fn all_content(&self, wallet: &Pubkey) -> PatreonixResult<Vec<ContentItem>> {
        const CODE: UpstreamCode = UpstreamCode::FetchAllContent;
        let total = self.total_content_count(wallet).await.map_err(|e| e.within(CODE))?;
        debug!(%wallet, total, "fetching all content");
        let creator = self.creator_address(wallet);
        let fetched = join_all((0..total).map(|i| self.content_at(&creator, i))).await;
        collect_present(fetched).map_err(|e| e.within(CODE))
    }

    /// Content PDAs owned by `wallet`'s creator, found by scanning program
    /// accounts rather than by index.
    pub async fn content_addresses(&self, wallet: &Pubkey) -> PatreonixResult<Vec<Pubkey>> {
        let creator = self.creator_address(wallet);
        let filters = [
            MemcmpFilter::new(0, account_discriminator(ACCOUNT_CONTENT).to_vec()),
            MemcmpFilter::new(CONTENT_CREATOR_OFFSET, creator.to_bytes().to_vec()),
        ];
        debug!(%wallet, %creator, "scanning content accounts");
        self.rpc
            .program_accounts(&self.program_id, &filters)
            .await
            .map_err(upstream(UpstreamCode::FetchContentPdas))
    }

    // ---- writes ----

    fn signer(&self) -> PatreonixResult<&Keypair> {
        self.signer.as_deref().ok_or(PatreonixError::WalletNotConnected)
    }

    async fn submit(&self, code: UpstreamCode, payer: &Keypair, ixs: &[Instruction]) -> PatreonixResult<String> {
        let opts = SendOptions {
            max_retries: self.submit.max_retries,
        };
        let sig = self
            .rpc
            .send_instructions(payer, ixs, opts)
            .await
            .map_err(upstream(code))?;
        debug!(code = code.as_str(), signature = %sig, "transaction confirmed");
        Ok(sig.to_string())
    }

    /// Register the signer as a creator and read the new account back.
    pub async fn register_creator(&self, args: RegisterCreatorArgs) -> PatreonixResult<Registration> {
        const CODE: UpstreamCode = UpstreamCode::RegisterCreator;
        let signer = self.signer()?;
        let args = args.normalized();
        args.validate()?;

        let wallet = signer.pubkey();
        debug!(%wallet, "registering creator");
        let ix = instructions::ix_register_creator(&self.program_id, &wallet, args)?;
        let signature = self.submit(CODE, signer, &[ix]).await?;
        let creator = self.creator_account(&wallet).await.map_err(|e| e.within(CODE))?;
        Ok(Registration { signature, creator })
    }

    pub async fn update_creator(&self, args: UpdateCreatorArgs) -> PatreonixResult<String> {
        let signer = self.signer()?;
        if args.is_empty() {
            return Err(PatreonixError::invalid_input("update has no fields set"));
        }
        args.validate()?;
        let ix = instructions::ix_update_creator(&self.program_id, &signer.pubkey(), args)?;
        self.submit(UpstreamCode::UpdateCreator, signer, &[ix]).await
    }

    pub async fn deactivate_creator(&self) -> PatreonixResult<String> {
        let signer = self.signer()?;
        let ix = instructions::ix_deactivate_creator(&self.program_id, &signer.pubkey())?;
        self.submit(UpstreamCode::DeactivateCreator, signer, &[ix]).await
    }

    pub async fn reactivate_creator(&self) -> PatreonixResult<String> {
        let signer = self.signer()?;
        let ix = instructions::ix_reactivate_creator(&self.program_id, &signer.pubkey())?;
        self.submit(UpstreamCode::ReactivateCreator, signer, &[ix]).await
    }

    pub async fn increment_supporters(&self) -> PatreonixResult<String> {
        let signer = self.signer()?;
        let ix = instructions::ix_increment_supporters(&self.program_id, &signer.pubkey())?;
        self.submit(UpstreamCode::IncrementSupporters, signer, &[ix]).await
    }

    /// Publish a new content item as the signer's next index.
    ///
    /// The index is read from the creator account just before submitting.
    /// Two concurrent calls for the same creator read the same index; the
    /// program accepts the first and rejects the second, which surfaces here
    /// as `CREATE_POST_ERROR`.
    pub async fn create_post(&self, args: CreatePostArgs) -> PatreonixResult<PostReceipt> {
        const CODE: UpstreamCode = UpstreamCode::CreatePost;
        let signer = self.signer()?;
        args.validate()?;

        let wallet = signer.pubkey();
        let creator = self.creator_account(&wallet).await.map_err(|e| e.within(CODE))?;
        let index = creator.total_content;
        let (address, _) = pda::derive_content(&self.program_id, &creator.address, index);
        debug!(%wallet, index, %address, "creating post");

        let ix = instructions::ix_create_content(&self.program_id, &wallet, index, args)?;
        let signature = self.submit(CODE, signer, &[ix]).await?;
        Ok(PostReceipt {
            signature,
            index,
            address,
        })
    }

    /// Comment as the signer on content `index` of `creator_wallet`.
    pub async fn insert_comment(
        &self,
        creator_wallet: &Pubkey,
        index: u64,
        text: impl Into<String>,
    ) -> PatreonixResult<String> {
        const CODE: UpstreamCode = UpstreamCode::InsertComment;
        let signer = self.signer()?;
        let text = text.into();

        let item = self
            .content_by_index(creator_wallet, index)
            .await
            .map_err(|e| e.within(CODE))?
            .ok_or_else(|| PatreonixError::invalid_input(format!("content {index} does not exist")))?;
        validate_comment(&text, item.comments.len())?;

        let ix = instructions::ix_insert_comment(&self.program_id, &item.address, &signer.pubkey(), text)?;
        self.submit(CODE, signer, &[ix]).await
    }
}

/// Keep fetched items that exist; the first error wins.
fn collect_present(fetched: Vec<PatreonixResult<Option<ContentItem>>>) -> PatreonixResult<Vec<ContentItem>> {
    let mut items = Vec::with_capacity(fetched.len());
    for r in fetched {
        if let Some(item) = r? {
            items.push(item);
        }
    }
    Ok(items)
}
