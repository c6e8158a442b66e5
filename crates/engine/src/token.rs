//! Single-slot token cache keyed by a logical scope.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

#[derive(Debug)]
struct TokenSlot<T> {
    scope: Option<String>,
    token: Option<T>,
}

/// Holds at most one token, tagged with the scope it was fetched for.
///
/// Asking for a different scope drops the held token before fetching, so a
/// token is never served for a scope it was not issued to. Failed fetches
/// leave the cache empty.
#[derive(Debug)]
pub struct TokenCache<T = String> {
    slot: Mutex<TokenSlot<T>>,
}

impl<T> Default for TokenCache<T> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(TokenSlot { scope: None, token: None }),
        }
    }
}

impl<T: Clone> TokenCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached token for `scope`, or runs `fetch` and caches its result.
    ///
    /// The lock is released while `fetch` runs. If another caller switched
    /// the scope in the meantime, the fetched token is returned but not stored.
    pub async fn get_token<F, Fut, E>(&self, scope: &str, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        {
            let mut slot = self.lock();
            if slot.scope.as_deref() != Some(scope) {
                if slot.scope.is_some() {
                    debug!(previous = ?slot.scope, next = scope, "token scope changed; invalidating");
                }
                slot.scope = Some(scope.to_string());
                slot.token = None;
            }
            if let Some(token) = slot.token.as_ref() {
                return Ok(token.clone());
            }
        }

        let token = fetch().await?;

        let mut slot = self.lock();
        if slot.scope.as_deref() == Some(scope) {
            slot.token = Some(token.clone());
        }
        Ok(token)
    }

    /// Drops the cached token and its scope.
    pub fn invalidate(&self) {
        let mut slot = self.lock();
        slot.scope = None;
        slot.token = None;
    }

    /// Scope of the currently held token, if one is held.
    pub fn cached_scope(&self) -> Option<String> {
        let slot = self.lock();
        slot.token.as_ref().and(slot.scope.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TokenSlot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    async fn fetch_counted(counter: &AtomicUsize, token: &str) -> Result<String, String> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(token.to_string())
    }

    #[tokio::test]
    async fn same_scope_is_fetched_once() {
        let cache = TokenCache::new();
        let calls = AtomicUsize::new(0);

        let first = cache.get_token("projA", || fetch_counted(&calls, "token-a")).await;
        let second = cache.get_token("projA", || fetch_counted(&calls, "token-other")).await;

        assert_eq!(first, Ok("token-a".to_string()));
        assert_eq!(second, Ok("token-a".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn switching_scope_invalidates_before_fetching() {
        let cache = TokenCache::new();
        let fetch_a = AtomicUsize::new(0);
        let fetch_b = AtomicUsize::new(0);

        cache.get_token("projA", || fetch_counted(&fetch_a, "token-a")).await.expect("a");
        let b = cache.get_token("projB", || fetch_counted(&fetch_b, "token-b")).await.expect("b");
        let a = cache.get_token("projA", || fetch_counted(&fetch_a, "token-a2")).await.expect("a again");

        assert_eq!(b, "token-b");
        assert_eq!(a, "token-a2");
        assert_eq!(fetch_a.load(Ordering::SeqCst), 2);
        assert_eq!(fetch_b.load(Ordering::SeqCst), 1);
        assert_eq!(cache.cached_scope().as_deref(), Some("projA"));
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache: TokenCache<String> = TokenCache::new();
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        let error = cache
            .get_token("projA", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<String, _>("upstream down")
            })
            .await;
        assert_eq!(error, Err("upstream down"));
        assert_eq!(cache.cached_scope(), None);

        let token = cache.get_token("projA", || fetch_counted(&calls, "token-a")).await;
        assert_eq!(token, Ok("token-a".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let cache = TokenCache::new();
        let calls = AtomicUsize::new(0);

        cache.get_token("projA", || fetch_counted(&calls, "t1")).await.expect("first");
        cache.invalidate();
        let token = cache.get_token("projA", || fetch_counted(&calls, "t2")).await.expect("second");

        assert_eq!(token, "t2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
