use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, Header, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{config::AppCredentials, error::FetchError};

const CLOCK_SKEW_SECS: u64 = 60;
const TOKEN_LIFETIME_SECS: u64 = 600;

#[derive(Debug, Serialize, Deserialize)]
pub struct AppClaims {
    pub iat: u64,
    pub exp: u64,
    pub iss: String,
    pub jti: String,
}

#[derive(Clone)]
pub struct AppToken(String);

impl AppToken {
    pub fn issue(credentials: &AppCredentials) -> Result<Self, FetchError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| FetchError::Auth(format!("system clock is before the epoch: {e}")))?
            .as_secs();
        Self::issue_at(credentials, now)
    }

    pub fn issue_at(credentials: &AppCredentials, now: u64) -> Result<Self, FetchError> {
        let claims = AppClaims {
            iat: now.saturating_sub(CLOCK_SKEW_SECS),
            exp: now + TOKEN_LIFETIME_SECS,
            iss: credentials.app_id.clone(),
            jti: uuid::Uuid::now_v7().to_string(),
        };

        let jwt = encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &credentials.encoding_key,
        )
        .map_err(|e| FetchError::Auth(e.to_string()))?;
        debug!(app_id = %claims.iss, iat = claims.iat, exp = claims.exp, "issued app token");

        Ok(Self(jwt))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AppToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AppToken(<redacted>)")
    }
}

#[derive(Clone, Deserialize)]
pub struct InstallationToken {
    token: String,
    #[serde(default)]
    pub expires_at: Option<String>,
}

impl InstallationToken {
    pub fn as_str(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for InstallationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallationToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
