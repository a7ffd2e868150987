use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use super::types::CachedToken;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TokenSlot {
    Developer,
    MusicUser,
}

impl TokenSlot {
    pub(crate) fn label(self) -> &'static str {
        match self {
            TokenSlot::Developer => "developer token",
            TokenSlot::MusicUser => "music user token",
        }
    }
}

#[derive(Debug, Default)]
struct Slots {
    developer: Option<CachedToken>,
    music_user: Option<CachedToken>,
}

impl Slots {
    fn get_mut(&mut self, slot: TokenSlot) -> &mut Option<CachedToken> {
        match slot {
            TokenSlot::Developer => &mut self.developer,
            TokenSlot::MusicUser => &mut self.music_user,
        }
    }
}

/// In-memory cache for the developer and music-user tokens.
///
/// Cloning shares the underlying slots. Nothing is persisted and there is no
/// way to evict an entry: a slot only changes when a fresh native fetch
/// succeeds. The lock is released before any native call is awaited, so two
/// callers that both observe a stale slot will both fetch and the later write wins.
#[derive(Clone, Debug, Default)]
pub struct TokenCache {
    slots: Arc<Mutex<Slots>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored developer token whether or not it is still fresh.
    pub fn peek_developer_token(&self) -> Option<CachedToken> {
        self.peek(TokenSlot::Developer)
    }

    /// Returns the stored music-user token whether or not it is still fresh.
    pub fn peek_music_user_token(&self) -> Option<CachedToken> {
        self.peek(TokenSlot::MusicUser)
    }

    pub(crate) fn peek(&self, slot: TokenSlot) -> Option<CachedToken> {
        self.with_slots(|slots| slots.get_mut(slot).clone())
    }

    pub(crate) fn fresh_token(
        &self,
        slot: TokenSlot,
        now: SystemTime,
        window: Duration,
    ) -> Option<String> {
        self.with_slots(|slots| {
            slots
                .get_mut(slot)
                .as_ref()
                .filter(|cached| cached.is_fresh(now, window))
                .map(|cached| cached.token.clone())
        })
    }

    pub(crate) fn store(&self, slot: TokenSlot, token: CachedToken) {
        self.with_slots(|slots| {
            *slots.get_mut(slot) = Some(token);
        });
    }

    fn with_slots<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Slots) -> R,
    {
        let mut guard = self
            .slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}
