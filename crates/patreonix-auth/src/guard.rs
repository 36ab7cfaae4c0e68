//! Route guard for the creator dashboard.

use std::sync::Arc;

use tracing::debug;

use crate::session::SessionIssuer;

pub const LOGIN_PATH: &str = "/login";

const PUBLIC_PATHS: [&str; 3] = ["/", "/login", "/register"];
const AUTH_API_PREFIX: &str = "/api/auth";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    RedirectToLogin,
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    sessions: Arc<SessionIssuer>,
}

impl RouteGuard {
    pub fn new(sessions: Arc<SessionIssuer>) -> Self {
        Self { sessions }
    }

    pub fn is_public(path: &str) -> bool {
        PUBLIC_PATHS.contains(&path) || path.starts_with(AUTH_API_PREFIX)
    }

    /// Decide whether a request for `path` carrying `token` may proceed.
    pub fn check(&self, path: &str, token: Option<&str>) -> Access {
        if Self::is_public(path) {
            return Access::Allow;
        }
        match token.map(|t| self.sessions.verify(t)) {
            Some(Ok(_)) => Access::Allow,
            Some(Err(e)) => {
                debug!(path, error = %e, "session rejected");
                Access::RedirectToLogin
            }
            None => Access::RedirectToLogin,
        }
    }
}
