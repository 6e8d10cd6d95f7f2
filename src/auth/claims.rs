use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Access-token payload as issued by the external auth provider. `sub` is the
/// diary owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

impl Claims {
    pub fn issue(user_id: Uuid, issuer: &str, audience: &str, ttl: Duration) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            sub: user_id,
            iat: now.unix_timestamp().max(0) as usize,
            exp: (now + ttl).unix_timestamp().max(0) as usize,
            iss: issuer.to_string(),
            aud: audience.to_string(),
        }
    }
}
