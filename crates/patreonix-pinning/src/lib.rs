//! patreonix-pinning
//!
//! Client for the Pinata pinning API used to store creator media (avatars,
//! post images, video) on IPFS. Content hashes it returns are what creator
//! and content accounts store in their `avatar` / `content` fields.

pub mod client;
pub mod error;

pub use client::{PinataClient, PinataMetadata};
pub use error::{PinningError, PinningResult};
