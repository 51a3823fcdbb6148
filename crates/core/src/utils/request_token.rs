//! Last-writer-wins-by-token guard for slow lookups.
//!
//! Each lookup takes a token before starting. When the response arrives it
//! may only be committed if no newer token was issued in the meantime, so an
//! out-of-order (stale) response can never overwrite a fresher one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Monotonic token source.
#[derive(Debug, Default)]
pub struct RequestTokens {
    latest: AtomicU64,
}

impl RequestTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}

/// A value slot that only accepts writes carrying the latest token.
#[derive(Debug, Default)]
pub struct LatestValue<T> {
    tokens: RequestTokens,
    value: RwLock<T>,
}

impl<T: Clone + Default> LatestValue<T> {
    pub fn new() -> Self {
        Self {
            tokens: RequestTokens::new(),
            value: RwLock::new(T::default()),
        }
    }

    pub fn begin(&self) -> RequestToken {
        self.tokens.issue()
    }

    /// Stores `value` if `token` is still the latest. Returns whether it was stored.
    pub fn commit(&self, token: RequestToken, value: T) -> bool {
        let mut slot = match self.value.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Checked under the write lock so a newer commit cannot interleave.
        if !self.tokens.is_current(token) {
            return false;
        }
        *slot = value;
        true
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.tokens.is_current(token)
    }

    pub fn get(&self) -> T {
        match self.value.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_token_commits() {
        let slot: LatestValue<Vec<u32>> = LatestValue::new();
        let first = slot.begin();
        let second = slot.begin();

        assert!(slot.commit(second, vec![2]));
        assert!(!slot.commit(first, vec![1]));
        assert_eq!(slot.get(), vec![2]);
    }

    #[test]
    fn test_tokens_are_monotonic() {
        let tokens = RequestTokens::new();
        let a = tokens.issue();
        let b = tokens.issue();
        assert!(b > a);
        assert!(!tokens.is_current(a));
        assert!(tokens.is_current(b));
    }
}
