//! Test utilities shared across crate-level unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

use crate::auth::{AuthorizationStatus, Clock, NativeError, NativeMusicModule, SubscriptionStatus};
use crate::logger::{self, LogCallbackParams, LogLevel, LogOptions};

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<SystemTime>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)),
        })
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock().unwrap()
    }
}

/// Native module double that counts calls and mints numbered tokens.
///
/// Token calls succeed with `dev-token-N` / `user-token-N` unless a failure was queued.
#[derive(Default)]
pub struct FakeMusicModule {
    authorization_calls: AtomicUsize,
    developer_token_calls: AtomicUsize,
    music_user_token_calls: AtomicUsize,
    subscription_calls: AtomicUsize,
    authorization_failure: Mutex<Option<NativeError>>,
    developer_token_failure: Mutex<Option<NativeError>>,
    music_user_token_failure: Mutex<Option<NativeError>>,
    subscription: Mutex<Option<Result<SubscriptionStatus, NativeError>>>,
    developer_token_args: Mutex<Vec<Option<String>>>,
}

impl FakeMusicModule {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_authorization(&self, message: &str) {
        *self.authorization_failure.lock().unwrap() = Some(NativeError::new(message));
    }

    pub fn fail_next_developer_token(&self, message: &str) {
        *self.developer_token_failure.lock().unwrap() = Some(NativeError::new(message));
    }

    pub fn fail_next_music_user_token(&self, message: &str) {
        *self.music_user_token_failure.lock().unwrap() = Some(NativeError::new(message));
    }

    pub fn set_subscription(&self, result: Result<SubscriptionStatus, NativeError>) {
        *self.subscription.lock().unwrap() = Some(result);
    }

    pub fn authorization_calls(&self) -> usize {
        self.authorization_calls.load(Ordering::SeqCst)
    }

    pub fn developer_token_calls(&self) -> usize {
        self.developer_token_calls.load(Ordering::SeqCst)
    }

    pub fn music_user_token_calls(&self) -> usize {
        self.music_user_token_calls.load(Ordering::SeqCst)
    }

    pub fn subscription_calls(&self) -> usize {
        self.subscription_calls.load(Ordering::SeqCst)
    }

    /// Developer tokens passed to `music_user_token`, in call order.
    pub fn developer_token_args(&self) -> Vec<Option<String>> {
        self.developer_token_args.lock().unwrap().clone()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl NativeMusicModule for FakeMusicModule {
    async fn authorization(&self) -> Result<AuthorizationStatus, NativeError> {
        self.authorization_calls.fetch_add(1, Ordering::SeqCst);
        match self.authorization_failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(AuthorizationStatus::Authorized),
        }
    }

    async fn developer_token(&self) -> Result<String, NativeError> {
        let call = self.developer_token_calls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.developer_token_failure.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(format!("dev-token-{call}")),
        }
    }

    async fn music_user_token(&self, developer_token: Option<&str>) -> Result<String, NativeError> {
        let call = self.music_user_token_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.developer_token_args
            .lock()
            .unwrap()
            .push(developer_token.map(str::to_owned));
        match self.music_user_token_failure.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(format!("user-token-{call}")),
        }
    }

    async fn check_subscription(&self) -> Result<SubscriptionStatus, NativeError> {
        self.subscription_calls.fetch_add(1, Ordering::SeqCst);
        self.subscription
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(NativeError::new("no subscription scripted")))
    }
}

/// Captures error-level records from the auth logger for the lifetime of the guard.
pub struct CapturedErrors {
    records: Arc<Mutex<Vec<LogCallbackParams>>>,
    _lock: MutexGuard<'static, ()>,
}

impl CapturedErrors {
    pub fn start() -> Self {
        let lock = logger::TEST_GUARD
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let logger_name = crate::auth::logger::LOGGER.name().to_owned();
        let records = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&records);
        logger::set_user_log_handler_fn(
            Some(move |params: LogCallbackParams| {
                if params.logger_type == logger_name {
                    sink.lock().unwrap().push(params);
                }
            }),
            Some(LogOptions {
                level: Some(LogLevel::Error),
            }),
        );

        Self {
            records,
            _lock: lock,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|params| params.message.clone())
            .collect()
    }
}

impl Drop for CapturedErrors {
    fn drop(&mut self) {
        logger::set_user_log_handler(None, None);
    }
}
