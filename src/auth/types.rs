use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use super::time::{Clock, SystemClock};

/// How long a fetched token is served from the cache before the native layer is asked again.
pub const DEFAULT_TOKEN_FRESHNESS: Duration = Duration::from_secs(15 * 60);

/// Result of the OS permission prompt, as reported by the native layer.
///
/// Values the native layer may add later are kept verbatim in [`AuthorizationStatus::Unknown`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuthorizationStatus {
    Authorized,
    Denied,
    NotDetermined,
    Restricted,
    Unknown(String),
}

impl AuthorizationStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AuthorizationStatus::Authorized => "authorized",
            AuthorizationStatus::Denied => "denied",
            AuthorizationStatus::NotDetermined => "notDetermined",
            AuthorizationStatus::Restricted => "restricted",
            AuthorizationStatus::Unknown(raw) => raw,
        }
    }

    pub fn is_authorized(&self) -> bool {
        matches!(self, AuthorizationStatus::Authorized)
    }
}

impl From<&str> for AuthorizationStatus {
    fn from(value: &str) -> Self {
        match value {
            "authorized" => AuthorizationStatus::Authorized,
            "denied" => AuthorizationStatus::Denied,
            "notDetermined" => AuthorizationStatus::NotDetermined,
            "restricted" => AuthorizationStatus::Restricted,
            other => AuthorizationStatus::Unknown(other.to_owned()),
        }
    }
}

impl From<String> for AuthorizationStatus {
    fn from(value: String) -> Self {
        AuthorizationStatus::from(value.as_str())
    }
}

impl From<AuthorizationStatus> for String {
    fn from(status: AuthorizationStatus) -> Self {
        match status {
            AuthorizationStatus::Unknown(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription capabilities of the signed-in user.
///
/// `Default` is the conservative "no access" answer returned when the native query fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    pub can_play_catalog_content: bool,
    pub has_cloud_library_enabled: bool,
    pub is_music_catalog_subscription_eligible: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedToken {
    pub token: String,
    pub fetched_at: SystemTime,
}

impl CachedToken {
    pub fn new(token: impl Into<String>, fetched_at: SystemTime) -> Self {
        Self {
            token: token.into(),
            fetched_at,
        }
    }

    /// A token is fresh while strictly less than `window` has elapsed since it was fetched.
    /// A `fetched_at` in the future (clock moved backwards) counts as stale.
    pub fn is_fresh(&self, now: SystemTime, window: Duration) -> bool {
        now.duration_since(self.fetched_at)
            .map(|age| age < window)
            .unwrap_or(false)
    }
}

#[derive(Clone, Debug)]
pub struct AuthOptions {
    pub token_freshness: Duration,
    pub clock: Arc<dyn Clock>,
}

impl AuthOptions {
    pub fn new() -> Self {
        Self {
            token_freshness: DEFAULT_TOKEN_FRESHNESS,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_token_freshness(mut self, window: Duration) -> Self {
        self.token_freshness = window;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self::new()
    }
}
