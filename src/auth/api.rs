use std::future::Future;
use std::sync::Arc;

use crate::logger::log_arg;

use super::bridge::NativeMusicModule;
use super::errors::{MusicKitError, MusicKitResult, NativeError};
use super::logger::LOGGER;
use super::state::{TokenCache, TokenSlot};
use super::time::Clock;
use super::types::{AuthOptions, AuthorizationStatus, CachedToken, SubscriptionStatus};

/// Application-facing entry point to the native music module.
///
/// Token lookups are served from a [`TokenCache`] while they are younger than
/// [`AuthOptions::token_freshness`]; everything else goes straight to the
/// native layer. Clones share the same cache.
#[derive(Clone)]
pub struct MusicKitAuth {
    module: Arc<dyn NativeMusicModule>,
    cache: TokenCache,
    options: AuthOptions,
}

impl MusicKitAuth {
    pub fn new(module: Arc<dyn NativeMusicModule>) -> Self {
        Self::with_options(module, AuthOptions::default())
    }

    pub fn with_options(module: Arc<dyn NativeMusicModule>, options: AuthOptions) -> Self {
        Self::with_cache(module, TokenCache::new(), options)
    }

    /// Builds a facade over a cache owned by the caller, e.g. one shared with other components.
    pub fn with_cache(
        module: Arc<dyn NativeMusicModule>,
        cache: TokenCache,
        options: AuthOptions,
    ) -> Self {
        Self {
            module,
            cache,
            options,
        }
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    pub fn options(&self) -> &AuthOptions {
        &self.options
    }

    /// Requests access to the user's music library, prompting if needed.
    pub async fn authorize(&self) -> MusicKitResult<AuthorizationStatus> {
        self.module
            .authorization()
            .await
            .map_err(|cause| reported(MusicKitError::AuthorizationFailed { cause }))
    }

    pub async fn get_developer_token(&self) -> MusicKitResult<String> {
        self.cached_token(
            TokenSlot::Developer,
            || self.module.developer_token(),
            |cause| MusicKitError::DeveloperTokenFailed { cause },
        )
        .await
    }

    /// Returns the music-user token, minting it with `developer_token` on a cache miss.
    ///
    /// A fresh cached token is returned as is, whatever developer token is passed.
    pub async fn get_music_user_token(&self, developer_token: &str) -> MusicKitResult<String> {
        self.cached_token(
            TokenSlot::MusicUser,
            || self.module.music_user_token(Some(developer_token)),
            |cause| MusicKitError::MusicUserTokenFailed { cause },
        )
        .await
    }

    /// Same as [`get_music_user_token`](Self::get_music_user_token) for bindings
    /// that resolve the developer token on the native side.
    pub async fn get_music_user_token_implicit(&self) -> MusicKitResult<String> {
        self.cached_token(
            TokenSlot::MusicUser,
            || self.module.music_user_token(None),
            |cause| MusicKitError::MusicUserTokenFailed { cause },
        )
        .await
    }

    /// Never fails: a native failure is logged and reported as "no access".
    pub async fn check_subscription(&self) -> SubscriptionStatus {
        match self.module.check_subscription().await {
            Ok(status) => status,
            Err(cause) => {
                log_failure(&MusicKitError::SubscriptionCheckFailed { cause });
                SubscriptionStatus::default()
            }
        }
    }

    async fn cached_token<F, Fut>(
        &self,
        slot: TokenSlot,
        fetch: F,
        into_error: fn(NativeError) -> MusicKitError,
    ) -> MusicKitResult<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, NativeError>>,
    {
        let window = self.options.token_freshness;
        if let Some(token) = self
            .cache
            .fresh_token(slot, self.options.clock.now(), window)
        {
            LOGGER.debug(format!("Serving cached {}", slot.label()));
            return Ok(token);
        }

        let token = fetch().await.map_err(|cause| reported(into_error(cause)))?;
        self.cache
            .store(slot, CachedToken::new(token.clone(), self.options.clock.now()));
        LOGGER.debug(format!("Fetched {} from native module", slot.label()));
        Ok(token)
    }
}

fn log_failure(error: &MusicKitError) {
    LOGGER.error_with([
        log_arg(format!("Apple Music Kit: {}", error.summary())),
        log_arg(error.cause().to_string()),
    ]);
}

fn reported(error: MusicKitError) -> MusicKitError {
    log_failure(&error);
    error
}
