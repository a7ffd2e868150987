//! Boundary with the native music module.
//!
//! The facade only talks to [`NativeMusicModule`]. Hosts whose binding already
//! exposes futures implement the trait directly; hosts that only have the
//! callback-style entry points (`authorization(callback)`,
//! `developerToken(callback)`, `musicUserToken(developerToken?, callback)`)
//! wrap them in a [`CallbackMusicModule`].

use std::sync::Arc;

use futures::channel::oneshot;
use futures::future::BoxFuture;
use serde_json::Value;

use super::errors::NativeError;
use super::types::{AuthorizationStatus, SubscriptionStatus};

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait NativeMusicModule: Send + Sync {
    /// Runs the OS permission flow and resolves with its final status.
    async fn authorization(&self) -> Result<AuthorizationStatus, NativeError>;

    /// Mints or fetches the signed developer token.
    async fn developer_token(&self) -> Result<String, NativeError>;

    /// Mints a user-scoped token. `None` lets the native layer resolve the developer token itself.
    async fn music_user_token(&self, developer_token: Option<&str>) -> Result<String, NativeError>;

    async fn check_subscription(&self) -> Result<SubscriptionStatus, NativeError>;
}

/// One-shot completion handed to a callback-style native entry point.
pub type Completion<T> = Box<dyn FnOnce(T) + Send + 'static>;

pub type SubscriptionFuture = BoxFuture<'static, Result<SubscriptionStatus, NativeError>>;

type CallbackCall<T> = Arc<dyn Fn(Completion<T>) -> Result<(), NativeError> + Send + Sync>;
type MusicUserTokenCall =
    Arc<dyn Fn(Option<String>, Completion<String>) -> Result<(), NativeError> + Send + Sync>;
type SubscriptionCall = Arc<dyn Fn() -> SubscriptionFuture + Send + Sync>;

/// Adapts callback-style bindings to [`NativeMusicModule`].
///
/// An `Err` returned by a binding is the synchronous failure of the native
/// call. A binding that drops its completion without calling it resolves to a
/// [`NativeError`] instead of hanging forever.
#[derive(Clone)]
pub struct CallbackMusicModule {
    authorization: CallbackCall<AuthorizationStatus>,
    developer_token: CallbackCall<String>,
    music_user_token: MusicUserTokenCall,
    check_subscription: SubscriptionCall,
}

impl CallbackMusicModule {
    pub fn new<A, D, U, S>(
        authorization: A,
        developer_token: D,
        music_user_token: U,
        check_subscription: S,
    ) -> Self
    where
        A: Fn(Completion<AuthorizationStatus>) -> Result<(), NativeError> + Send + Sync + 'static,
        D: Fn(Completion<String>) -> Result<(), NativeError> + Send + Sync + 'static,
        U: Fn(Option<String>, Completion<String>) -> Result<(), NativeError>
            + Send
            + Sync
            + 'static,
        S: Fn() -> SubscriptionFuture + Send + Sync + 'static,
    {
        Self {
            authorization: Arc::new(authorization),
            developer_token: Arc::new(developer_token),
            music_user_token: Arc::new(music_user_token),
            check_subscription: Arc::new(check_subscription),
        }
    }
}

async fn await_completion<T, F>(call: &str, invoke: F) -> Result<T, NativeError>
where
    T: Send + 'static,
    F: FnOnce(Completion<T>) -> Result<(), NativeError>,
{
    let (sender, receiver) = oneshot::channel::<T>();
    invoke(Box::new(move |value| {
        let _ = sender.send(value);
    }))?;
    receiver
        .await
        .map_err(|_| NativeError::completion_dropped(call))
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl NativeMusicModule for CallbackMusicModule {
    async fn authorization(&self) -> Result<AuthorizationStatus, NativeError> {
        await_completion("authorization", |done| (self.authorization)(done)).await
    }

    async fn developer_token(&self) -> Result<String, NativeError> {
        await_completion("developerToken", |done| (self.developer_token)(done)).await
    }

    async fn music_user_token(&self, developer_token: Option<&str>) -> Result<String, NativeError> {
        let developer_token = developer_token.map(str::to_owned);
        await_completion("musicUserToken", move |done| {
            (self.music_user_token)(developer_token, done)
        })
        .await
    }

    async fn check_subscription(&self) -> Result<SubscriptionStatus, NativeError> {
        (self.check_subscription)().await
    }
}

/// Decodes the subscription record as the native bridge serializes it.
pub fn subscription_from_json(value: Value) -> Result<SubscriptionStatus, NativeError> {
    serde_json::from_value(value)
        .map_err(|err| NativeError::new(format!("malformed subscription record: {err}")))
}
