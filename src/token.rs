//! Bearer-token access for authenticated analytics calls.
//!
//! The tracker never stores credentials itself: it reads the token through
//! a [`TokenProvider`] at call time, and an absent token suppresses the
//! call entirely (nothing is tracked anonymously).

use std::sync::{Arc, RwLock};

pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Process-wide token slot. The embedding shell writes it on login and
/// clears it on logout or a 401; the tracker only ever reads.
#[derive(Clone, Default)]
pub struct SharedTokenStore {
    inner: Arc<RwLock<Option<String>>>,
}

impl SharedTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.inner.write().unwrap() = Some(token.into());
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap() = None;
    }
}

impl TokenProvider for SharedTokenStore {
    fn token(&self) -> Option<String> {
        self.inner.read().unwrap().clone()
    }
}

/// Fixed token, for embedders that manage auth elsewhere.
pub struct StaticToken(pub String);

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}
