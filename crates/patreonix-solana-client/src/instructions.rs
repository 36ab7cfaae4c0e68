//! Patreonix program instruction encoding.
//!
//! Anchor instruction data is `sha256("global:<snake_name>")[..8]` followed by
//! the borsh-encoded arguments in declaration order. Account metas follow the
//! field order of each instruction's `Accounts` struct.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::instruction::{AccountMeta, Instruction};
use solana_program::pubkey::Pubkey;
use solana_program::system_program;

use patreonix_core::model::{ContentType, CreatePostArgs, RegisterCreatorArgs, UpdateCreatorArgs};
use patreonix_core::{PatreonixError, PatreonixResult};

use crate::accounts::{anchor_discriminator, ContentTypeTag, DISCRIMINATOR_LEN};
use crate::pda;

/// Decoded instruction payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatreonixIx {
    RegisterCreator(RegisterCreatorArgs),
    UpdateCreator(UpdateCreatorArgs),
    DeactivateCreator,
    ReactivateCreator,
    IncrementSupporters,
    CreateContent {
        title: String,
        description: String,
        content: String,
        content_type: ContentType,
        content_index: u64,
    },
    InsertComment {
        content: String,
    },
}

type OptStrings = (Option<String>, Option<String>, Option<String>, Option<String>);
type CreateContentFields = (String, String, String, ContentTypeTag, u64);

const ALL_NAMES: [&str; 7] = [
    "register_creator",
    "update_creator",
    "deactivate_creator",
    "reactivate_creator",
    "increment_supporters",
    "create_content",
    "insert_comment",
];

impl PatreonixIx {
    /// Program method name in snake case.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RegisterCreator(_) => "register_creator",
            Self::UpdateCreator(_) => "update_creator",
            Self::DeactivateCreator => "deactivate_creator",
            Self::ReactivateCreator => "reactivate_creator",
            Self::IncrementSupporters => "increment_supporters",
            Self::CreateContent { .. } => "create_content",
            Self::InsertComment { .. } => "insert_comment",
        }
    }

    pub fn to_vec(&self) -> PatreonixResult<Vec<u8>> {
        let mut out = anchor_discriminator("global", self.name()).to_vec();
        let args = match self {
            Self::RegisterCreator(a) => to_borsh(&(
                a.name.clone(),
                a.email.clone(),
                a.bio.clone(),
                a.avatar.clone(),
            ))?,
            Self::UpdateCreator(a) => to_borsh(&(
                a.name.clone(),
                a.email.clone(),
                a.bio.clone(),
                a.avatar.clone(),
            ))?,
            Self::DeactivateCreator | Self::ReactivateCreator | Self::IncrementSupporters => Vec::new(),
            Self::CreateContent {
                title,
                description,
                content,
                content_type,
                content_index,
            } => to_borsh(&(
                title.clone(),
                description.clone(),
                content.clone(),
                ContentTypeTag::from(*content_type),
                *content_index,
            ))?,
            Self::InsertComment { content } => to_borsh(content)?,
        };
        out.extend_from_slice(&args);
        Ok(out)
    }

    pub fn from_slice(data: &[u8]) -> PatreonixResult<Self> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(PatreonixError::decode("instruction data too short"));
        }
        let (disc, mut body) = data.split_at(DISCRIMINATOR_LEN);
        let name = ALL_NAMES
            .iter()
            .copied()
            .find(|n| anchor_discriminator("global", n) == disc)
            .ok_or_else(|| PatreonixError::decode("unknown instruction discriminator"))?;

        let ix = match name {
            "register_creator" => {
                let (name, email, bio, avatar): (String, Option<String>, Option<String>, Option<String>) =
                    from_borsh(&mut body)?;
                Self::RegisterCreator(RegisterCreatorArgs {
                    name,
                    email,
                    bio,
                    avatar,
                })
            }
            "update_creator" => {
                let (name, email, bio, avatar): OptStrings = from_borsh(&mut body)?;
                Self::UpdateCreator(UpdateCreatorArgs {
                    name,
                    email,
                    bio,
                    avatar,
                })
            }
            "deactivate_creator" => Self::DeactivateCreator,
            "reactivate_creator" => Self::ReactivateCreator,
            "increment_supporters" => Self::IncrementSupporters,
            "create_content" => {
                let (title, description, content, tag, content_index): CreateContentFields =
                    from_borsh(&mut body)?;
                Self::CreateContent {
                    title,
                    description,
                    content,
                    content_type: tag.into(),
                    content_index,
                }
            }
            _ => Self::InsertComment {
                content: from_borsh(&mut body)?,
            },
        };
        Ok(ix)
    }
}

fn to_borsh<T: BorshSerialize + ?Sized>(value: &T) -> PatreonixResult<Vec<u8>> {
    borsh::to_vec(value).map_err(|e| PatreonixError::decode(format!("serialize: {e}")))
}

fn from_borsh<T: BorshDeserialize>(body: &mut &[u8]) -> PatreonixResult<T> {
    T::deserialize(body).map_err(|e| PatreonixError::decode(format!("deserialize: {e}")))
}

fn creator_update_metas(program_id: &Pubkey, authority: &Pubkey) -> Vec<AccountMeta> {
    let (creator, _) = pda::derive_creator(program_id, authority);
    vec![
        AccountMeta::new(creator, false),
        AccountMeta::new_readonly(*authority, true),
    ]
}

/// Build instruction to register the creator account for `authority`.
pub fn ix_register_creator(
    program_id: &Pubkey,
    authority: &Pubkey,
    args: RegisterCreatorArgs,
) -> PatreonixResult<Instruction> {
    let (creator, _) = pda::derive_creator(program_id, authority);
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(creator, false),
            AccountMeta::new(*authority, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: PatreonixIx::RegisterCreator(args).to_vec()?,
    })
}

pub fn ix_update_creator(
    program_id: &Pubkey,
    authority: &Pubkey,
    args: UpdateCreatorArgs,
) -> PatreonixResult<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: creator_update_metas(program_id, authority),
        data: PatreonixIx::UpdateCreator(args).to_vec()?,
    })
}

pub fn ix_deactivate_creator(program_id: &Pubkey, authority: &Pubkey) -> PatreonixResult<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: creator_update_metas(program_id, authority),
        data: PatreonixIx::DeactivateCreator.to_vec()?,
    })
}

pub fn ix_reactivate_creator(program_id: &Pubkey, authority: &Pubkey) -> PatreonixResult<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: creator_update_metas(program_id, authority),
        data: PatreonixIx::ReactivateCreator.to_vec()?,
    })
}

pub fn ix_increment_supporters(program_id: &Pubkey, authority: &Pubkey) -> PatreonixResult<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: creator_update_metas(program_id, authority),
        data: PatreonixIx::IncrementSupporters.to_vec()?,
    })
}

/// Build instruction to create content number `content_index` for `authority`.
///
/// The program only accepts `content_index == creator.total_content`.
pub fn ix_create_content(
    program_id: &Pubkey,
    authority: &Pubkey,
    content_index: u64,
    args: CreatePostArgs,
) -> PatreonixResult<Instruction> {
    let pdas = pda::pdas_for_content(program_id, authority, content_index);
    let data = PatreonixIx::CreateContent {
        title: args.title,
        description: args.description,
        content: args.content_url,
        content_type: args.content_type,
        content_index,
    }
    .to_vec()?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(pdas.content.0, false),
            AccountMeta::new(pdas.creator.0, false),
            AccountMeta::new(*authority, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data,
    })
}

/// Build instruction for `commenter` to comment on an existing content account.
pub fn ix_insert_comment(
    program_id: &Pubkey,
    content: &Pubkey,
    commenter: &Pubkey,
    text: String,
) -> PatreonixResult<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*content, false),
            AccountMeta::new_readonly(*commenter, true),
        ],
        data: PatreonixIx::InsertComment { content: text }.to_vec()?,
    })
}
