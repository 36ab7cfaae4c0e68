//! patreonix-core
//!
//! Core primitives shared by the Patreonix client crates:
//! - Creator / Content models as read from the on-chain program
//! - field limits enforced by the program, mirrored for early validation
//! - `PatreonixError` with stable string codes
//! - explicit configuration structs (cluster, session, pinning, submission)
//! - typed creator settings
//!
//! This crate performs no network I/O.

pub mod config;
pub mod errors;
pub mod limits;
pub mod model;
pub mod settings;

pub use crate::errors::{PatreonixError, PatreonixResult, UpstreamCode};

/// Message a wallet signs to prove ownership when signing in.
///
/// Changing it invalidates every signature produced by existing clients.
pub const SIGN_IN_MESSAGE: &str = "Sign into Patreonix as a creator";

/// Convenience re-exports.
pub mod prelude {
    pub use crate::config::{ClusterConfig, Commitment, PatreonixConfig, PinningConfig, SessionConfig, SubmitConfig};
    pub use crate::model::content::{Comment, ContentItem, ContentState, ContentType, CreatePostArgs};
    pub use crate::model::creator::{Creator, RegisterCreatorArgs, UpdateCreatorArgs};
    pub use crate::model::page::Page;
    pub use crate::{PatreonixError, PatreonixResult, UpstreamCode, SIGN_IN_MESSAGE};
}
