//! Error type shared by the Patreonix client crates.
//!
//! Every variant maps to a stable string code via [`PatreonixError::code`].
//! Callers (UI toasts, API responses) should match on the code, not the message.

use thiserror::Error;

pub type PatreonixResult<T> = Result<T, PatreonixError>;

/// Operation that failed while talking to the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamCode {
    GetCreatorAccount,
    ContentCount,
    CreatePost,
    FetchContent,
    FetchAllContent,
    FetchPaginatedContent,
    FetchContentPdas,
    RegisterCreator,
    UpdateCreator,
    DeactivateCreator,
    ReactivateCreator,
    IncrementSupporters,
    InsertComment,
}

impl UpstreamCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetCreatorAccount => "GET_CREATOR_ACCOUNT_ERROR",
            Self::ContentCount => "CONTENT_COUNT_ERROR",
            Self::CreatePost => "CREATE_POST_ERROR",
            Self::FetchContent => "FETCH_CONTENT_ERROR",
            Self::FetchAllContent => "FETCH_ALL_CONTENT_ERROR",
            Self::FetchPaginatedContent => "FETCH_PAGINATED_CONTENT_ERROR",
            Self::FetchContentPdas => "FETCH_CONTENT_PDAS_ERROR",
            Self::RegisterCreator => "REGISTER_CREATOR_ERROR",
            Self::UpdateCreator => "UPDATE_CREATOR_ERROR",
            Self::DeactivateCreator => "DEACTIVATE_CREATOR_ERROR",
            Self::ReactivateCreator => "REACTIVATE_CREATOR_ERROR",
            Self::IncrementSupporters => "INCREMENT_SUPPORTERS_ERROR",
            Self::InsertComment => "INSERT_COMMENT_ERROR",
        }
    }
}

impl std::fmt::Display for UpstreamCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PatreonixError {
    /// A write was attempted on a client built without a signer.
    #[error("provider wallet not connected")]
    WalletNotConnected,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The wallet has no registered creator account.
    #[error("creator not found for wallet {0}")]
    CreatorNotFound(String),

    /// Malformed base58, account bytes or instruction payload.
    #[error("decode error: {0}")]
    Decode(String),

    /// RPC or transaction failure, tagged with the operation that hit it.
    #[error("{code}: {message}")]
    Upstream { code: UpstreamCode, message: String },
}

impl PatreonixError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn upstream(code: UpstreamCode, msg: impl Into<String>) -> Self {
        Self::Upstream {
            code,
            message: msg.into(),
        }
    }

    /// Stable string code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::WalletNotConnected => "WALLET_NOT_CONNECTED",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::CreatorNotFound(_) => "CREATOR_NOT_FOUND",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Upstream { code, .. } => code.as_str(),
        }
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }

    /// Re-tag an upstream failure with the enclosing operation.
    ///
    /// Non-upstream variants pass through untouched so callers can still tell
    /// bad input and missing creators apart from RPC trouble.
    pub fn within(self, code: UpstreamCode) -> Self {
        match self {
            Self::Upstream { message, .. } => Self::Upstream { code, message },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn codes_are_stable() {
        assert_eq!(PatreonixError::WalletNotConnected.code(), "WALLET_NOT_CONNECTED");
        assert_eq!(PatreonixError::invalid_input("x").code(), "INVALID_INPUT");
        assert_eq!(
            PatreonixError::upstream(UpstreamCode::CreatePost, "boom").code(),
            "CREATE_POST_ERROR"
        );
    }

    #[test]
    fn within_retags_only_upstream() {
        let e = PatreonixError::upstream(UpstreamCode::ContentCount, "rpc down")
            .within(UpstreamCode::FetchPaginatedContent);
        assert_eq!(e.code(), "FETCH_PAGINATED_CONTENT_ERROR");
        assert!(e.to_string().contains("rpc down"));

        let e = PatreonixError::CreatorNotFound("w".into()).within(UpstreamCode::FetchAllContent);
        assert_matches!(e, PatreonixError::CreatorNotFound(_));
    }
}
