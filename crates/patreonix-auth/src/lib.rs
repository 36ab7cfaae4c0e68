//! patreonix-auth
//!
//! Wallet-signature sign-in for Patreonix creators:
//! - `verify`: Ed25519 verification of the fixed sign-in message
//! - `authenticator`: credentials -> verified wallet -> creator -> `Principal`
//! - `session`: HS256 session tokens carrying the principal
//! - `guard`: public/private route decisions
//!
//! Every failure is an `AuthError`; show users `AuthError::public_message`.

pub mod authenticator;
pub mod error;
pub mod guard;
pub mod session;
pub mod verify;

pub use authenticator::{Authenticator, CreatorDirectory, Credentials, Principal};
pub use error::{AuthError, SIGN_IN_FAILED};
pub use guard::{Access, RouteGuard, LOGIN_PATH};
pub use session::{SessionClaims, SessionIssuer, SessionToken};
pub use verify::verify_signature;
