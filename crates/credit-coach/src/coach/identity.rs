use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::UserId;

/// Claims carried by a verified bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: UserId,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TokenClaims {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Verifies bearer credentials; `None` means the token is unknown or invalid.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, token: &str) -> Option<TokenClaims>;
}

/// Extracts the credential from an `Authorization` header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

/// Resolves the request subject, falling back to `fallback` for anonymous,
/// unknown, or expired credentials.
pub fn resolve_subject<I>(
    identity: &I,
    header: Option<&str>,
    fallback: &UserId,
    now: DateTime<Utc>,
) -> UserId
where
    I: IdentityResolver + ?Sized,
{
    bearer_token(header)
        .and_then(|token| identity.resolve(token))
        .filter(|claims| !claims.is_expired_at(now))
        .map(|claims| claims.sub)
        .unwrap_or_else(|| fallback.clone())
}
