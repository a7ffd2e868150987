//! Synchronous wrappers for hosts that do not run an async executor.
//!
//! Calls are driven on a shared Tokio current-thread runtime. They must not be
//! made from inside another Tokio runtime.

use std::future::Future;
use std::sync::{Arc, LazyLock};

use tokio::runtime::{Builder, Runtime};

use crate::auth::{
    self, AuthOptions, AuthorizationStatus, MusicKitResult, NativeMusicModule,
    SubscriptionStatus, TokenCache,
};

macro_rules! block_on_methods {
    ($(fn $name:ident($($arg:ident : $ty:ty),*) -> $ret:ty);* $(;)?) => {
        $(pub fn $name(&self, $($arg: $ty),*) -> $ret {
            block_on(self.inner.$name($($arg),*))
        })*
    };
}

static RT: LazyLock<Runtime> = LazyLock::new(|| {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

fn block_on<F: Future>(fut: F) -> F::Output {
    RT.block_on(fut)
}

/// Blocking counterpart of [`auth::MusicKitAuth`]; shares its cache semantics.
#[derive(Clone)]
pub struct MusicKitAuth {
    inner: auth::MusicKitAuth,
}

impl MusicKitAuth {
    pub fn new(module: Arc<dyn NativeMusicModule>) -> Self {
        Self::from_async(auth::MusicKitAuth::new(module))
    }

    pub fn with_options(module: Arc<dyn NativeMusicModule>, options: AuthOptions) -> Self {
        Self::from_async(auth::MusicKitAuth::with_options(module, options))
    }

    pub fn from_async(inner: auth::MusicKitAuth) -> Self {
        Self { inner }
    }

    pub fn as_async(&self) -> &auth::MusicKitAuth {
        &self.inner
    }

    pub fn cache(&self) -> &TokenCache {
        self.inner.cache()
    }

    block_on_methods! {
        fn authorize() -> MusicKitResult<AuthorizationStatus>;
        fn get_developer_token() -> MusicKitResult<String>;
        fn get_music_user_token(developer_token: &str) -> MusicKitResult<String>;
        fn get_music_user_token_implicit() -> MusicKitResult<String>;
        fn check_subscription() -> SubscriptionStatus;
    }
}
