//! content_flow.rs
//!
//! Creator and content operations of `PatreonixClient` against `MemoryChain`.

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use solana_program::instruction::Instruction;
use solana_program::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use tokio::sync::Barrier;

use patreonix_core::model::{ContentState, ContentType, CreatePostArgs, RegisterCreatorArgs, UpdateCreatorArgs};
use patreonix_core::{PatreonixError, UpstreamCode};
use patreonix_solana_client::instructions::{ix_create_content, PatreonixIx};
use patreonix_solana_client::memory::MemoryChain;
use patreonix_solana_client::{default_program_id, ChainRpc, MemcmpFilter, PatreonixClient, RpcError, SendOptions};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn setup() -> (Arc<MemoryChain>, PatreonixClient) {
    init_tracing();
    let chain = Arc::new(MemoryChain::new(default_program_id()));
    let client = PatreonixClient::new(chain.program_id(), chain.clone());
    (chain, client)
}

fn post(title: &str) -> CreatePostArgs {
    CreatePostArgs {
        title: title.into(),
        description: "desc".into(),
        content_url: "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi".into(),
        content_type: ContentType::Image,
    }
}

#[tokio::test]
async fn pagination_over_twenty_five_items() -> anyhow::Result<()> {
    let (chain, client) = setup();
    let wallet = Pubkey::new_unique();
    chain.seed_creator(&wallet, "Alice");
    chain.seed_content(&wallet, 25);

    let p0 = client.paginated_content(&wallet, 0, 10).await?;
    assert_eq!(p0.items.len(), 10);
    assert!(p0.has_more);
    assert_eq!(p0.total, 25);
    let indices: Vec<u64> = p0.items.iter().map(|i| i.index).collect();
    assert_eq!(indices, (0..10).collect::<Vec<_>>());

    let p2 = client.paginated_content(&wallet, 2, 10).await?;
    assert_eq!(p2.items.len(), 5);
    assert!(!p2.has_more);
    assert_eq!(p2.items[0].index, 20);

    let p3 = client.paginated_content(&wallet, 3, 10).await?;
    assert!(p3.items.is_empty());
    assert!(!p3.has_more);
    Ok(())
}

#[tokio::test]
async fn fetch_by_index_is_none_past_total() -> anyhow::Result<()> {
    let (chain, client) = setup();
    let wallet = Pubkey::new_unique();
    chain.seed_creator(&wallet, "Alice");
    chain.seed_content(&wallet, 3);

    for i in 0..3 {
        let item = client.content_by_index(&wallet, i).await?;
        assert_eq!(item.map(|c| c.index), Some(i));
    }
    assert!(client.content_by_index(&wallet, 3).await?.is_none());
    assert!(client.content_by_index(&wallet, u64::MAX).await?.is_none());

    // unregistered wallet: nothing, not an error
    assert!(client.content_by_index(&Pubkey::new_unique(), 0).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn register_then_post_then_comment() -> anyhow::Result<()> {
    let (chain, client) = setup();
    chain.set_clock(1_710_000_000);
    let author = Arc::new(Keypair::new());
    let client = client.with_signer(author.clone());

    let reg = client
        .register_creator(RegisterCreatorArgs {
            name: "Alice".into(),
            email: Some(String::new()),
            bio: Some("Crypto artist".into()),
            avatar: None,
        })
        .await?;
    assert_eq!(reg.creator.authority, author.pubkey());
    assert_eq!(reg.creator.email, None, "blank email is not stored");
    assert_eq!(reg.creator.registered_at, 1_710_000_000);
    assert!(reg.creator.is_active);

    let first = client.create_post(post("first")).await?;
    let second = client.create_post(post("second")).await?;
    assert_eq!((first.index, second.index), (0, 1));
    assert_eq!(second.address, client.content_address(&author.pubkey(), 1));
    assert_eq!(client.total_content_count(&author.pubkey()).await?, 2);

    let fan = Arc::new(Keypair::new());
    let fan_client = PatreonixClient::new(chain.program_id(), chain.clone()).with_signer(fan.clone());
    fan_client.insert_comment(&author.pubkey(), 1, "love it").await?;

    let item = client
        .content_by_index(&author.pubkey(), 1)
        .await?
        .expect("post exists");
    assert_eq!(item.title, "second");
    assert_eq!(item.creator, reg.creator.address);
    assert_eq!(item.comments.len(), 1);
    assert_eq!(item.comments[0].author, fan.pubkey());
    assert_eq!(ContentState::of(Some(&item)), ContentState::Active);

    let scanned = client.content_addresses(&author.pubkey()).await?;
    assert_eq!(scanned.len(), 2);
    assert!(scanned.contains(&first.address));

    let all = client.all_content(&author.pubkey()).await?;
    assert_eq!(all.iter().map(|i| i.title.as_str()).collect::<Vec<_>>(), ["first", "second"]);
    Ok(())
}

#[tokio::test]
async fn creator_lifecycle_updates() -> anyhow::Result<()> {
    let (chain, client) = setup();
    let author = Arc::new(Keypair::new());
    chain.seed_creator(&author.pubkey(), "Alice");
    let client = client.with_signer(author.clone());

    client
        .update_creator(UpdateCreatorArgs {
            bio: Some("new bio".into()),
            ..Default::default()
        })
        .await?;
    client.increment_supporters().await?;
    client.deactivate_creator().await?;

    let creator = client.creator_account(&author.pubkey()).await?;
    assert_eq!(creator.name, "Alice");
    assert_eq!(creator.bio.as_deref(), Some("new bio"));
    assert_eq!(creator.total_supporters, 1);
    assert!(!creator.is_active);

    // the program refuses posts from an inactive creator
    let err = client.create_post(post("nope")).await.unwrap_err();
    assert_eq!(err.code(), "CREATE_POST_ERROR");

    client.reactivate_creator().await?;
    assert!(client.creator_account(&author.pubkey()).await?.is_active);

    let kinds: Vec<&str> = chain
        .sent()
        .iter()
        .flat_map(|tx| tx.instructions.iter().map(PatreonixIx::name))
        .collect();
    assert_eq!(
        kinds,
        ["update_creator", "increment_supporters", "deactivate_creator", "reactivate_creator"]
    );
    Ok(())
}

#[tokio::test]
async fn writes_without_signer_fail() {
    let (_chain, client) = setup();
    assert_matches!(
        client.create_post(post("x")).await,
        Err(PatreonixError::WalletNotConnected)
    );
    assert_matches!(
        client.register_creator(RegisterCreatorArgs::new("Alice")).await,
        Err(PatreonixError::WalletNotConnected)
    );
    assert_matches!(client.deactivate_creator().await, Err(PatreonixError::WalletNotConnected));
}

#[tokio::test]
async fn invalid_input_never_reaches_the_chain() {
    let (chain, client) = setup();
    let author = Arc::new(Keypair::new());
    chain.seed_creator(&author.pubkey(), "Alice");
    let client = client.with_signer(author);

    let mut bad = post("x");
    bad.title = "t".repeat(65);
    assert_matches!(client.create_post(bad).await, Err(PatreonixError::InvalidInput(_)));
    assert_matches!(
        client.update_creator(UpdateCreatorArgs::default()).await,
        Err(PatreonixError::InvalidInput(_))
    );
    assert!(chain.sent().is_empty());
}

#[tokio::test]
async fn post_without_creator_is_not_found() {
    let (_chain, client) = setup();
    let client = client.with_signer(Arc::new(Keypair::new()));
    assert_matches!(
        client.create_post(post("x")).await,
        Err(PatreonixError::CreatorNotFound(_))
    );
}

#[tokio::test]
async fn comment_limit_enforced_client_side() -> anyhow::Result<()> {
    let (chain, client) = setup();
    let author = Pubkey::new_unique();
    chain.seed_creator(&author, "Alice");
    chain.seed_content(&author, 1);
    let client = client.with_signer(Arc::new(Keypair::new()));

    for n in 0..10 {
        client.insert_comment(&author, 0, format!("comment {n}")).await?;
    }
    assert_matches!(
        client.insert_comment(&author, 0, "one too many").await,
        Err(PatreonixError::InvalidInput(_))
    );
    assert_matches!(
        client.insert_comment(&author, 7, "missing post").await,
        Err(PatreonixError::InvalidInput(_))
    );
    Ok(())
}

#[tokio::test]
async fn stale_index_rejected_by_program() -> anyhow::Result<()> {
    let (chain, client) = setup();
    let author = Arc::new(Keypair::new());
    chain.seed_creator(&author.pubkey(), "Alice");
    let client = client.with_signer(author.clone());

    // simulate a second submitter that read total_content = 0 after the first post landed
    client.create_post(post("winner")).await?;
    let stale = ix_create_content(&chain.program_id(), &author.pubkey(), 0, post("loser"))?;
    let err = chain
        .send_instructions(&author, &[stale], SendOptions::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already in use"));
    assert_eq!(client.total_content_count(&author.pubkey()).await?, 1);
    Ok(())
}

/// Every account read waits until `Barrier` parties have all read, so
/// concurrent writers act on the same creator snapshot.
struct LockstepReads {
    chain: Arc<MemoryChain>,
    barrier: Barrier,
}

#[async_trait]
impl ChainRpc for LockstepReads {
    async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, RpcError> {
        let data = self.chain.account_data(address).await?;
        self.barrier.wait().await;
        Ok(data)
    }

    async fn program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<Pubkey>, RpcError> {
        self.chain.program_accounts(program_id, filters).await
    }

    async fn send_instructions(
        &self,
        payer: &Keypair,
        instructions: &[Instruction],
        opts: SendOptions,
    ) -> Result<Signature, RpcError> {
        self.chain.send_instructions(payer, instructions, opts).await
    }
}

#[tokio::test]
async fn concurrent_posts_race_for_one_index() -> anyhow::Result<()> {
    let (chain, reader) = setup();
    let author = Arc::new(Keypair::new());
    chain.seed_creator(&author.pubkey(), "Alice");

    let lockstep = Arc::new(LockstepReads {
        chain: chain.clone(),
        barrier: Barrier::new(2),
    });
    let client = PatreonixClient::new(chain.program_id(), lockstep).with_signer(author.clone());

    let (a, b) = tokio::join!(client.create_post(post("first")), client.create_post(post("second")));
    let (receipt, err) = match (a, b) {
        (Ok(r), Err(e)) | (Err(e), Ok(r)) => (r, e),
        other => panic!("expected exactly one post to land, got {other:?}"),
    };
    assert_eq!(receipt.index, 0);
    assert_eq!(receipt.address, reader.content_address(&author.pubkey(), 0));
    assert_eq!(err.code(), "CREATE_POST_ERROR");
    assert!(err.to_string().contains("already in use"));

    assert_eq!(reader.total_content_count(&author.pubkey()).await?, 1);
    assert!(reader.content_by_index(&author.pubkey(), 1).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn upstream_failures_carry_operation_codes() {
    let (chain, client) = setup();
    let wallet = Pubkey::new_unique();
    chain.seed_creator(&wallet, "Alice");
    chain.seed_content(&wallet, 2);
    chain.set_offline(true);

    let cases = [
        (client.fetch_creator(&wallet).await.map(|_| ()), UpstreamCode::GetCreatorAccount),
        (client.total_content_count(&wallet).await.map(|_| ()), UpstreamCode::ContentCount),
        (client.content_by_index(&wallet, 0).await.map(|_| ()), UpstreamCode::FetchContent),
        (
            client.paginated_content(&wallet, 0, 10).await.map(|_| ()),
            UpstreamCode::FetchPaginatedContent,
        ),
        (client.all_content(&wallet).await.map(|_| ()), UpstreamCode::FetchAllContent),
        (client.content_addresses(&wallet).await.map(|_| ()), UpstreamCode::FetchContentPdas),
    ];
    for (result, code) in cases {
        let err = result.unwrap_err();
        assert!(err.is_upstream());
        assert_eq!(err.code(), code.as_str());
    }

    let client = client.with_signer(Arc::new(Keypair::new()));
    let err = client.increment_supporters().await.unwrap_err();
    assert_eq!(err.code(), "INCREMENT_SUPPORTERS_ERROR");
}

#[tokio::test]
async fn submit_config_forwards_max_retries() -> anyhow::Result<()> {
    let (chain, client) = setup();
    let author = Arc::new(Keypair::new());
    chain.seed_creator(&author.pubkey(), "Alice");
    let client = client
        .with_signer(author)
        .with_submit_config(patreonix_core::config::SubmitConfig { max_retries: Some(3) });

    client.create_post(post("x")).await?;
    assert_eq!(chain.sent()[0].opts.max_retries, Some(3));
    Ok(())
}
