use anyhow::Result;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

use crate::storage::KeyValueStore;

pub type UnauthorizedHandler = Arc<dyn Fn() + Send + Sync>;

/// Token snapshot taken when a request is sent.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub token: Option<String>,
    generation: u64,
}

/// Owns the bearer token and what to do when the backend rejects it.
///
/// Every token change bumps a generation counter. A 401 only clears the token
/// if nothing changed since the failing request read its credentials, so a
/// burst of concurrent 401s results in one clear and one callback.
pub struct AuthContext {
    store: Arc<dyn KeyValueStore>,
    token_key: String,
    on_unauthorized: UnauthorizedHandler,
    generation: Mutex<u64>,
}

impl AuthContext {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        token_key: impl Into<String>,
        on_unauthorized: UnauthorizedHandler,
    ) -> Self {
        Self {
            store,
            token_key: token_key.into(),
            on_unauthorized,
            generation: Mutex::new(0),
        }
    }

    fn lock_generation(&self) -> MutexGuard<'_, u64> {
        self.generation.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read_token(&self) -> Option<String> {
        match self.store.get(&self.token_key) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!("Failed to read auth token from storage: {:#}", e);
                None
            }
        }
    }

    pub fn credentials(&self) -> Credentials {
        let generation = self.lock_generation();
        Credentials {
            token: self.read_token(),
            generation: *generation,
        }
    }

    #[cfg(test)]
    pub fn has_token(&self) -> bool {
        self.read_token().is_some()
    }

    pub fn set_token(&self, token: &str) -> Result<()> {
        let mut generation = self.lock_generation();
        self.store.set(&self.token_key, token)?;
        *generation += 1;
        info!("Auth token updated");
        Ok(())
    }

    /// Returns true if this call performed the clear and fired the callback.
    pub fn handle_unauthorized(&self, seen: &Credentials) -> bool {
        {
            let mut generation = self.lock_generation();
            if *generation != seen.generation {
                return false;
            }
            if let Err(e) = self.store.remove(&self.token_key) {
                warn!("Failed to clear auth token: {:#}", e);
            }
            *generation += 1;
        }

        warn!("Backend rejected credentials; redirecting to login");
        (self.on_unauthorized)();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn context() -> (Arc<AuthContext>, Arc<MemoryStore>, Arc<AtomicUsize>) {
        let store = Arc::new(MemoryStore::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let auth = AuthContext::new(
            store.clone(),
            "token",
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        (Arc::new(auth), store, calls)
    }

    #[test]
    fn test_credentials_read_token() {
        let (auth, store, _) = context();
        assert!(auth.credentials().token.is_none());

        store.set("token", "abc").unwrap();
        assert_eq!(auth.credentials().token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_empty_token_is_absent() {
        let (auth, store, _) = context();
        store.set("token", "").unwrap();
        assert!(!auth.has_token());
    }

    #[test]
    fn test_unauthorized_once_per_generation() {
        let (auth, store, calls) = context();
        auth.set_token("abc").unwrap();

        let first = auth.credentials();
        let second = auth.credentials();

        assert!(auth.handle_unauthorized(&first));
        assert!(!auth.handle_unauthorized(&second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.get("token").unwrap(), None);
    }

    #[test]
    fn test_new_token_re_arms_handler() {
        let (auth, _, calls) = context();
        auth.set_token("abc").unwrap();
        assert!(auth.handle_unauthorized(&auth.credentials()));

        auth.set_token("fresh").unwrap();
        assert!(auth.handle_unauthorized(&auth.credentials()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_stale_credentials_do_not_clear_new_token() {
        let (auth, store, calls) = context();
        auth.set_token("old").unwrap();
        let stale = auth.credentials();

        auth.set_token("new").unwrap();
        assert!(!auth.handle_unauthorized(&stale));
        assert_eq!(store.get("token").unwrap().as_deref(), Some("new"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_concurrent_unauthorized_threads() {
        let (auth, _, calls) = context();
        auth.set_token("abc").unwrap();

        let seen: Vec<_> = (0..8).map(|_| auth.credentials()).collect();
        let handles: Vec<_> = seen
            .into_iter()
            .map(|creds| {
                let auth = auth.clone();
                std::thread::spawn(move || auth.handle_unauthorized(&creds))
            })
            .collect();

        let fired = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|fired| *fired)
            .count();

        assert_eq!(fired, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
