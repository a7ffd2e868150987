//! # Apple Music Kit auth module
//!
//! Exposes the native music module's authorization, token and subscription
//! entry points as async Rust calls. The developer token and the music-user
//! token are cached in memory for 15 minutes, so repeated lookups do not
//! cross the native bridge.
//!
//! ## Features
//!
//! - Request library access and receive the OS authorization status verbatim.
//! - Retrieve the developer token and the music-user token, served from a
//!   [`TokenCache`] while they are fresh. The music-user token can be minted
//!   with an explicit developer token or with one resolved by the native layer.
//! - Check subscription capabilities. Failures never surface: they are logged
//!   and reported as the all-false [`SubscriptionStatus`].
//! - Wrap callback-style native bindings with [`CallbackMusicModule`].
//!
//! Failures of the native layer are logged through the `@music-kit/auth`
//! logger (see [`crate::logger`]) before they are returned.
//!
//! ## Example Usage
//!
//! ```rust
//! use futures::FutureExt;
//! use music_kit_rs::auth::{
//!     AuthorizationStatus, CallbackMusicModule, MusicKitAuth, NativeError, SubscriptionStatus,
//! };
//! use std::sync::Arc;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! // In an app these closures call into the platform binding.
//! let module = CallbackMusicModule::new(
//!     |done| {
//!         done(AuthorizationStatus::Authorized);
//!         Ok(())
//!     },
//!     |done| {
//!         done("signed-developer-token".to_string());
//!         Ok(())
//!     },
//!     |_developer_token, done| {
//!         done("music-user-token".to_string());
//!         Ok(())
//!     },
//!     || async { Err::<SubscriptionStatus, _>(NativeError::new("offline")) }.boxed(),
//! );
//!
//! let auth = MusicKitAuth::new(Arc::new(module));
//!
//! assert!(auth.authorize().await.unwrap().is_authorized());
//! let developer_token = auth.get_developer_token().await.unwrap();
//! let user_token = auth.get_music_user_token(&developer_token).await.unwrap();
//! assert_eq!(user_token, "music-user-token");
//!
//! // A failed check degrades to "no access".
//! assert_eq!(auth.check_subscription().await, SubscriptionStatus::default());
//! # });
//! ```

pub mod api;
mod bridge;
mod errors;
pub(crate) mod logger;
mod state;
mod time;
mod types;

pub use api::MusicKitAuth;
pub use bridge::{
    subscription_from_json, CallbackMusicModule, Completion, NativeMusicModule, SubscriptionFuture,
};
pub use errors::{MusicKitError, MusicKitResult, NativeError};
pub use state::TokenCache;
pub use time::{Clock, SystemClock};
pub use types::{
    AuthOptions, AuthorizationStatus, CachedToken, SubscriptionStatus, DEFAULT_TOKEN_FRESHNESS,
};
