//! Signed session tokens (HS256 JWT).
//!
//! The token carries the principal verbatim plus `iss`, `iat` and `exp`.
//! Lifetime comes from `SessionConfig::max_age_secs`.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, info};

use patreonix_core::config::{SessionConfig, MIN_SESSION_SECRET_LEN};

use crate::authenticator::{Authenticator, Credentials, Principal};
use crate::error::AuthError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub iss: String,
    /// Unix seconds.
    pub iat: i64,
    pub exp: i64,
    #[serde(flatten)]
    pub principal: Principal,
}

#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: OffsetDateTime,
}

#[derive(Clone)]
pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    max_age_secs: i64,
}

impl std::fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIssuer")
            .field("issuer", &self.issuer)
            .field("max_age_secs", &self.max_age_secs)
            .finish_non_exhaustive()
    }
}

impl SessionIssuer {
    pub fn new(cfg: &SessionConfig) -> Result<Self, AuthError> {
        if cfg.secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(AuthError::Session(format!(
                "secret must be at least {MIN_SESSION_SECRET_LEN} bytes"
            )));
        }
        let max_age_secs = i64::try_from(cfg.max_age_secs)
            .ok()
            .filter(|s| *s > 0)
            .ok_or_else(|| AuthError::Session("max_age_secs out of range".into()))?;
        Ok(Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            max_age_secs,
        })
    }

    pub fn issue(&self, principal: &Principal) -> Result<SessionToken, AuthError> {
        self.issue_at(principal, OffsetDateTime::now_utc())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, principal: &Principal, now: OffsetDateTime) -> Result<SessionToken, AuthError> {
        let iat = now.unix_timestamp();
        let exp = iat.saturating_add(self.max_age_secs);
        let claims = SessionClaims {
            iss: self.issuer.clone(),
            iat,
            exp,
            principal: principal.clone(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Session(e.to_string()))?;
        let expires_at = OffsetDateTime::from_unix_timestamp(exp).map_err(|e| AuthError::Session(e.to_string()))?;
        debug!(public_key = %principal.public_key, exp, "session issued");
        Ok(SessionToken { token, expires_at })
    }

    /// Check signature, issuer and expiry of `token`.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.leeway = 0;

        decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::SessionExpired,
                _ => AuthError::SessionInvalid(e.to_string()),
            })
    }

    /// Authenticate `creds` and issue a session for the resulting principal.
    ///
    /// Nothing is issued when authentication fails.
    pub async fn sign_in(
        &self,
        authenticator: &Authenticator,
        creds: &Credentials,
    ) -> Result<(Principal, SessionToken), AuthError> {
        let principal = authenticator.authenticate(creds).await?;
        let token = self.issue(&principal)?;
        info!(public_key = %principal.public_key, expires_at = %token.expires_at, "session started");
        Ok((principal, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use time::Duration;

    fn cfg() -> SessionConfig {
        SessionConfig {
            secret: "k".repeat(MIN_SESSION_SECRET_LEN),
            ..SessionConfig::default()
        }
    }

    fn principal() -> Principal {
        Principal {
            id: "W".into(),
            name: "Alice".into(),
            email: "W@patreonix.com".into(),
            bio: None,
            avatar: None,
            is_active: true,
            public_key: "W".into(),
        }
    }

    #[test]
    fn issue_then_verify() {
        let issuer = SessionIssuer::new(&cfg()).unwrap();
        let tok = issuer.issue(&principal()).unwrap();
        let claims = issuer.verify(&tok.token).unwrap();
        assert_eq!(claims.principal, principal());
        assert_eq!(claims.iss, "patreonix");
        assert_eq!(claims.exp - claims.iat, 10_000);
        assert_eq!(tok.expires_at.unix_timestamp(), claims.exp);
    }

    #[test]
    fn expired_token_rejected() {
        let issuer = SessionIssuer::new(&cfg()).unwrap();
        let long_ago = OffsetDateTime::now_utc() - Duration::seconds(20_000);
        let tok = issuer.issue_at(&principal(), long_ago).unwrap();
        assert_matches!(issuer.verify(&tok.token), Err(AuthError::SessionExpired));
    }

    #[test]
    fn tampered_or_foreign_token_rejected() {
        let issuer = SessionIssuer::new(&cfg()).unwrap();
        let tok = issuer.issue(&principal()).unwrap().token;

        // change one character in the middle of the signature segment
        let at = tok.rfind('.').unwrap() + 10;
        let mut tampered = tok.clone();
        let old = tampered.remove(at);
        tampered.insert(at, if old == 'x' { 'y' } else { 'x' });
        assert_matches!(issuer.verify(&tampered), Err(AuthError::SessionInvalid(_)));

        let other = SessionIssuer::new(&SessionConfig {
            secret: "z".repeat(MIN_SESSION_SECRET_LEN),
            ..SessionConfig::default()
        })
        .unwrap();
        assert_matches!(other.verify(&tok), Err(AuthError::SessionInvalid(_)));
        assert_matches!(issuer.verify("not.a.jwt"), Err(AuthError::SessionInvalid(_)));
    }

    #[test]
    fn wrong_issuer_rejected() {
        let issuer = SessionIssuer::new(&cfg()).unwrap();
        let tok = issuer.issue(&principal()).unwrap().token;
        let other = SessionIssuer::new(&SessionConfig {
            issuer: "someone-else".into(),
            ..cfg()
        })
        .unwrap();
        assert_matches!(other.verify(&tok), Err(AuthError::SessionInvalid(_)));
    }

    #[test]
    fn short_secret_refused() {
        let bad = SessionConfig {
            secret: "short".into(),
            ..SessionConfig::default()
        };
        assert_matches!(SessionIssuer::new(&bad), Err(AuthError::Session(_)));
    }

    #[test]
    fn debug_hides_keys() {
        let out = format!("{:?}", SessionIssuer::new(&cfg()).unwrap());
        assert!(!out.contains(&"k".repeat(MIN_SESSION_SECRET_LEN)));
    }
}
