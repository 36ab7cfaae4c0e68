//! In-process chain for tests.
//!
//! `MemoryChain` stores encoded Anchor accounts and executes submitted
//! Patreonix instructions with the same checks the program performs
//! (authority, PDA seeds, content index, field limits). A transaction is
//! applied atomically: if any instruction fails, no account changes.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use solana_program::instruction::Instruction;
use solana_program::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};

use patreonix_core::limits::MAX_COMMENT_LEN;
use patreonix_core::model::content::validate_comment;
use patreonix_core::model::{ContentType, CreatePostArgs, RegisterCreatorArgs};

use crate::accounts::{CommentRecord, ContentAccount, ContentTypeTag, CreatorAccount};
use crate::instructions::PatreonixIx;
use crate::pda;
use crate::rpc::{ChainRpc, MemcmpFilter, RpcError, SendOptions};

/// Instructions from one submitted transaction.
#[derive(Debug, Clone)]
pub struct SentTransaction {
    pub payer: Pubkey,
    pub signature: Signature,
    pub instructions: Vec<PatreonixIx>,
    pub opts: SendOptions,
}

#[derive(Debug, Default)]
struct State {
    accounts: BTreeMap<Pubkey, Vec<u8>>,
    sent: Vec<SentTransaction>,
    now: i64,
    offline: bool,
}

#[derive(Debug)]
pub struct MemoryChain {
    program_id: Pubkey,
    state: Mutex<State>,
}

impl MemoryChain {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            state: Mutex::new(State {
                now: 1_700_000_000,
                ..State::default()
            }),
        }
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    /// Unix time stamped on accounts created from now on.
    pub fn set_clock(&self, unix: i64) {
        self.state.lock().now = unix;
    }

    /// While offline every call fails with an `RpcError`.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    pub fn insert_account(&self, address: Pubkey, data: Vec<u8>) {
        self.state.lock().accounts.insert(address, data);
    }

    pub fn raw_account(&self, address: &Pubkey) -> Option<Vec<u8>> {
        self.state.lock().accounts.get(address).cloned()
    }

    pub fn sent(&self) -> Vec<SentTransaction> {
        self.state.lock().sent.clone()
    }

    /// Store an active creator account for `wallet` and return its PDA.
    pub fn seed_creator(&self, wallet: &Pubkey, name: &str) -> Pubkey {
        let (address, _) = pda::derive_creator(&self.program_id, wallet);
        let mut st = self.state.lock();
        let acc = CreatorAccount {
            authority: wallet.to_bytes(),
            name: name.to_string(),
            email: None,
            bio: None,
            avatar: None,
            registered_at: st.now,
            is_active: true,
            total_supporters: 0,
            total_content: 0,
        };
        if let Ok(data) = acc.encode() {
            st.accounts.insert(address, data);
        }
        address
    }

    /// Append `count` text posts to the creator of `wallet`.
    ///
    /// The creator must have been seeded first.
    pub fn seed_content(&self, wallet: &Pubkey, count: u64) {
        let mut st = self.state.lock();
        let mut ctx = Exec {
            program_id: self.program_id,
            accounts: &mut st.accounts,
            now: 0,
        };
        for _ in 0..count {
            let Ok((creator_pda, creator)) = ctx.creator_of(wallet) else {
                return;
            };
            let index = creator.total_content;
            let args = CreatePostArgs {
                title: format!("post {index}"),
                description: String::new(),
                content_url: format!("body {index}"),
                content_type: ContentType::Text,
            };
            let (content_pda, _) = pda::derive_content(&self.program_id, &creator_pda, index);
            if ctx.create_content(&content_pda, &creator_pda, wallet, args, index).is_err() {
                return;
            }
        }
    }

    fn execute(&self, payer: &Pubkey, instructions: &[Instruction]) -> Result<Vec<PatreonixIx>, RpcError> {
        let mut st = self.state.lock();
        let mut staged = st.accounts.clone();
        let mut decoded = Vec::with_capacity(instructions.len());
        {
            let mut ctx = Exec {
                program_id: self.program_id,
                accounts: &mut staged,
                now: st.now,
            };
            for ix in instructions {
                decoded.push(ctx.apply(payer, ix)?);
            }
        }
        st.accounts = staged;
        Ok(decoded)
    }
}

struct Exec<'a> {
    program_id: Pubkey,
    accounts: &'a mut BTreeMap<Pubkey, Vec<u8>>,
    now: i64,
}

fn program_error(msg: &str) -> RpcError {
    RpcError::new(format!("Error processing Instruction: custom program error: {msg}"))
}

impl Exec<'_> {
    fn apply(&mut self, payer: &Pubkey, ix: &Instruction) -> Result<PatreonixIx, RpcError> {
        if ix.program_id != self.program_id {
            return Err(RpcError::new(format!("unknown program {}", ix.program_id)));
        }
        let decoded = PatreonixIx::from_slice(&ix.data).map_err(|e| program_error(&e.to_string()))?;
        let key = |i: usize| {
            ix.accounts
                .get(i)
                .map(|m| m.pubkey)
                .ok_or_else(|| program_error("NotEnoughAccountKeys"))
        };
        let signer_at = |i: usize| -> Result<Pubkey, RpcError> {
            let k = key(i)?;
            if k != *payer {
                return Err(RpcError::new("missing required signature for instruction"));
            }
            Ok(k)
        };

        match &decoded {
            PatreonixIx::RegisterCreator(args) => {
                let authority = signer_at(1)?;
                self.register_creator(&key(0)?, &authority, args)?;
            }
            PatreonixIx::UpdateCreator(args) => {
                let authority = signer_at(1)?;
                let (address, mut creator) = self.creator_checked(&key(0)?, &authority)?;
                args.validate().map_err(|_| program_error("ContentTooLong"))?;
                if let Some(v) = &args.name {
                    creator.name = v.clone();
                }
                if let Some(v) = &args.email {
                    creator.email = Some(v.clone());
                }
                if let Some(v) = &args.bio {
                    creator.bio = Some(v.clone());
                }
                if let Some(v) = &args.avatar {
                    creator.avatar = Some(v.clone());
                }
                self.store_creator(address, &creator)?;
            }
            PatreonixIx::DeactivateCreator | PatreonixIx::ReactivateCreator => {
                let authority = signer_at(1)?;
                let (address, mut creator) = self.creator_checked(&key(0)?, &authority)?;
                creator.is_active = matches!(decoded, PatreonixIx::ReactivateCreator);
                self.store_creator(address, &creator)?;
            }
            PatreonixIx::IncrementSupporters => {
                let authority = signer_at(1)?;
                let (address, mut creator) = self.creator_checked(&key(0)?, &authority)?;
                creator.total_supporters = creator
                    .total_supporters
                    .checked_add(1)
                    .ok_or_else(|| program_error("MathOverflow"))?;
                self.store_creator(address, &creator)?;
            }
            PatreonixIx::CreateContent {
                title,
                description,
                content,
                content_type,
                content_index,
            } => {
                let authority = signer_at(2)?;
                let args = CreatePostArgs {
                    title: title.clone(),
                    description: description.clone(),
                    content_url: content.clone(),
                    content_type: *content_type,
                };
                self.create_content(&key(0)?, &key(1)?, &authority, args, *content_index)?;
            }
            PatreonixIx::InsertComment { content } => {
                let author = signer_at(1)?;
                let address = key(0)?;
                let mut item = self.load_content(&address)?;
                validate_comment(content, item.comments.len()).map_err(|_| {
                    if content.is_empty() {
                        program_error("EmptyComment")
                    } else if content.len() > MAX_COMMENT_LEN {
                        program_error("CommentTooLong")
                    } else {
                        program_error("TooManyComments")
                    }
                })?;
                item.comments.push(CommentRecord {
                    creator: author.to_bytes(),
                    content: content.clone(),
                    created_at: self.now,
                    is_edited: false,
                });
                let data = item.encode().map_err(|e| RpcError::new(e.to_string()))?;
                self.accounts.insert(address, data);
            }
        }
        Ok(decoded)
    }

    fn register_creator(
        &mut self,
        address: &Pubkey,
        authority: &Pubkey,
        args: &RegisterCreatorArgs,
    ) -> Result<(), RpcError> {
        if pda::derive_creator(&self.program_id, authority).0 != *address {
            return Err(program_error("ConstraintSeeds"));
        }
        if self.accounts.contains_key(address) {
            return Err(RpcError::new(format!("Allocate: account {address} already in use")));
        }
        args.validate().map_err(|_| program_error("ContentTooLong"))?;
        let creator = CreatorAccount {
            authority: authority.to_bytes(),
            name: args.name.clone(),
            email: args.email.clone(),
            bio: args.bio.clone(),
            avatar: args.avatar.clone(),
            registered_at: self.now,
            is_active: true,
            total_supporters: 0,
            total_content: 0,
        };
        self.store_creator(*address, &creator)
    }

    fn create_content(
        &mut self,
        content_address: &Pubkey,
        creator_address: &Pubkey,
        authority: &Pubkey,
        args: CreatePostArgs,
        index: u64,
    ) -> Result<(), RpcError> {
        let mut creator = self.load_creator(creator_address)?;
        if creator.authority != authority.to_bytes() {
            return Err(program_error("UnauthorizedAccess"));
        }
        if !creator.is_active {
            return Err(program_error("CreatorNotActive"));
        }
        let (expected, bump) = pda::derive_content(&self.program_id, creator_address, index);
        if expected != *content_address {
            return Err(program_error("ConstraintSeeds"));
        }
        if self.accounts.contains_key(content_address) {
            return Err(RpcError::new(format!("Allocate: account {content_address} already in use")));
        }
        if index != creator.total_content {
            return Err(program_error("InvalidContentIndex"));
        }
        args.validate().map_err(|_| {
            if args.title.is_empty() {
                program_error("EmptyTitle")
            } else if args.content_url.is_empty() {
                program_error("EmptyContent")
            } else {
                program_error("ContentTooLong")
            }
        })?;

        let item = ContentAccount {
            creator: creator_address.to_bytes(),
            title: args.title,
            description: args.description,
            content: args.content_url,
            content_type: ContentTypeTag::from(args.content_type),
            created_at: self.now,
            updated_at: None,
            total_views: 0,
            total_likes: 0,
            comments: Vec::new(),
            content_index: index,
            is_active: true,
            bump,
        };
        let data = item.encode().map_err(|e| RpcError::new(e.to_string()))?;
        self.accounts.insert(*content_address, data);

        creator.total_content = creator
            .total_content
            .checked_add(1)
            .ok_or_else(|| program_error("MathOverflow"))?;
        self.store_creator(*creator_address, &creator)
    }

    fn creator_of(&self, wallet: &Pubkey) -> Result<(Pubkey, CreatorAccount), RpcError> {
        let (address, _) = pda::derive_creator(&self.program_id, wallet);
        Ok((address, self.load_creator(&address)?))
    }

    /// Load the creator at `address`, checking seeds and `has_one = authority`.
    fn creator_checked(&self, address: &Pubkey, authority: &Pubkey) -> Result<(Pubkey, CreatorAccount), RpcError> {
        if pda::derive_creator(&self.program_id, authority).0 != *address {
            return Err(program_error("ConstraintSeeds"));
        }
        let creator = self.load_creator(address)?;
        if creator.authority != authority.to_bytes() {
            return Err(program_error("ConstraintHasOne"));
        }
        Ok((*address, creator))
    }

    fn load_creator(&self, address: &Pubkey) -> Result<CreatorAccount, RpcError> {
        let data = self
            .accounts
            .get(address)
            .ok_or_else(|| program_error("AccountNotInitialized"))?;
        CreatorAccount::decode(data).map_err(|_| program_error("AccountDiscriminatorMismatch"))
    }

    fn load_content(&self, address: &Pubkey) -> Result<ContentAccount, RpcError> {
        let data = self
            .accounts
            .get(address)
            .ok_or_else(|| program_error("AccountNotInitialized"))?;
        ContentAccount::decode(data).map_err(|_| program_error("AccountDiscriminatorMismatch"))
    }

    fn store_creator(&mut self, address: Pubkey, creator: &CreatorAccount) -> Result<(), RpcError> {
        let data = creator.encode().map_err(|e| RpcError::new(e.to_string()))?;
        self.accounts.insert(address, data);
        Ok(())
    }
}

#[async_trait]
impl ChainRpc for MemoryChain {
    async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, RpcError> {
        let st = self.state.lock();
        if st.offline {
            return Err(RpcError::new("connection refused"));
        }
        Ok(st.accounts.get(address).cloned())
    }

    async fn program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<Pubkey>, RpcError> {
        let st = self.state.lock();
        if st.offline {
            return Err(RpcError::new("connection refused"));
        }
        if *program_id != self.program_id {
            return Ok(Vec::new());
        }
        Ok(st
            .accounts
            .iter()
            .filter(|(_, data)| filters.iter().all(|f| f.matches(data)))
            .map(|(key, _)| *key)
            .collect())
    }

    async fn send_instructions(
        &self,
        payer: &Keypair,
        instructions: &[Instruction],
        opts: SendOptions,
    ) -> Result<Signature, RpcError> {
        if self.state.lock().offline {
            return Err(RpcError::new("connection refused"));
        }
        let payer_key = payer.pubkey();
        let decoded = self.execute(&payer_key, instructions)?;
        let signature = Signature::new_unique();
        self.state.lock().sent.push(SentTransaction {
            payer: payer_key,
            signature,
            instructions: decoded,
            opts,
        });
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::default_program_id;
    use crate::instructions::{ix_create_content, ix_register_creator};

    fn post(title: &str) -> CreatePostArgs {
        CreatePostArgs {
            title: title.into(),
            description: String::new(),
            content_url: "body".into(),
            content_type: ContentType::Text,
        }
    }

    #[tokio::test]
    async fn failed_transaction_leaves_no_trace() {
        let chain = MemoryChain::new(default_program_id());
        let wallet = Keypair::new();
        let pid = chain.program_id();

        let register = ix_register_creator(&pid, &wallet.pubkey(), RegisterCreatorArgs::new("Alice")).unwrap();
        // wrong index makes the second instruction fail
        let bad_post = ix_create_content(&pid, &wallet.pubkey(), 5, post("x")).unwrap();
        let err = chain
            .send_instructions(&wallet, &[register, bad_post], SendOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("InvalidContentIndex"));

        let creator_pda = pda::derive_creator(&pid, &wallet.pubkey()).0;
        assert!(chain.raw_account(&creator_pda).is_none());
        assert!(chain.sent().is_empty());
    }

    #[tokio::test]
    async fn foreign_signer_rejected() {
        let chain = MemoryChain::new(default_program_id());
        let owner = Pubkey::new_unique();
        chain.seed_creator(&owner, "Alice");

        let intruder = Keypair::new();
        let ix = ix_create_content(&chain.program_id(), &owner, 0, post("x")).unwrap();
        let err = chain
            .send_instructions(&intruder, &[ix], SendOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("signature"));
    }

    #[tokio::test]
    async fn seeded_content_advances_total() {
        let chain = MemoryChain::new(default_program_id());
        let wallet = Pubkey::new_unique();
        let creator_pda = chain.seed_creator(&wallet, "Alice");
        chain.seed_content(&wallet, 3);

        let creator = CreatorAccount::decode(&chain.raw_account(&creator_pda).unwrap()).unwrap();
        assert_eq!(creator.total_content, 3);

        let filters = [MemcmpFilter::new(8, creator_pda.to_bytes().to_vec())];
        let found = chain.program_accounts(&chain.program_id(), &filters).await.unwrap();
        assert_eq!(found.len(), 3);
    }

    #[tokio::test]
    async fn offline_fails_every_call() {
        let chain = MemoryChain::new(default_program_id());
        chain.set_offline(true);
        assert!(chain.account_data(&Pubkey::new_unique()).await.is_err());
        assert!(chain.program_accounts(&chain.program_id(), &[]).await.is_err());
    }
}
