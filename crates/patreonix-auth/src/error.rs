//! Sign-in and session errors.

use thiserror::Error;

/// What every authentication failure looks like to the end user.
pub const SIGN_IN_FAILED: &str = "sign-in failed";

#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing or blank credential fields.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The signature does not verify against the public key.
    #[error("signature verification failed")]
    Authentication,

    /// The wallet proved ownership but has no creator account.
    #[error("no creator registered for wallet {0}")]
    PrincipalNotFound(String),

    /// The chain could not be read.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Malformed base58 or key bytes.
    #[error("decode error: {0}")]
    Decode(String),

    #[error("session expired")]
    SessionExpired,

    #[error("session token invalid: {0}")]
    SessionInvalid(String),

    /// The session token could not be produced.
    #[error("session error: {0}")]
    Session(String),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Authentication => "AUTHENTICATION_FAILED",
            Self::PrincipalNotFound(_) => "PRINCIPAL_NOT_FOUND",
            Self::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            Self::Decode(_) => "DECODE_ERROR",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::SessionInvalid(_) => "SESSION_INVALID",
            Self::Session(_) => "SESSION_ERROR",
        }
    }

    /// Message safe to show the user.
    ///
    /// Detail stays in logs; the caller only learns that sign-in did not work.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::SessionExpired | Self::SessionInvalid(_) => "session expired, sign in again",
            _ => SIGN_IN_FAILED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_failures_share_one_public_message() {
        let errors = [
            AuthError::InvalidInput("publicKey".into()),
            AuthError::Authentication,
            AuthError::PrincipalNotFound("abc".into()),
            AuthError::UpstreamUnavailable("rpc".into()),
            AuthError::Decode("base58".into()),
        ];
        for e in errors {
            assert_eq!(e.public_message(), SIGN_IN_FAILED);
        }
        assert_ne!(AuthError::SessionExpired.public_message(), SIGN_IN_FAILED);
    }

    #[test]
    fn detail_is_in_display_not_public_message() {
        let e = AuthError::UpstreamUnavailable("connection refused".into());
        assert!(e.to_string().contains("connection refused"));
        assert!(!e.public_message().contains("connection"));
        assert_eq!(e.code(), "UPSTREAM_UNAVAILABLE");
    }
}
