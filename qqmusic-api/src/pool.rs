//! HTTP client pool keyed by execution context.
//!
//! Each execution context (by default: the OS thread the caller runs on,
//! i.e. one event loop or runtime worker) gets its own [`reqwest::Client`],
//! created on first use and reused afterwards. Dropping a client releases
//! its idle connections, which is how [`ConnectionPool::close_all`] tears
//! the pool down.
//!
//! Certificate verification is disabled on every pooled client: the API
//! front end is reached the same way the official web client does, and
//! callers relying on certificate checks must not use this pool.

use crate::config::ClientConfig;
use crate::error::{QQMusicError, Result};
use reqwest::Client;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

static NEXT_CONTEXT: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_CONTEXT: ContextKey = ContextKey::fresh();
}

/// Opaque execution-context handle used as pool key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextKey(u64);

impl ContextKey {
    /// Key of the calling thread. Stable for the thread's lifetime.
    pub fn current() -> Self {
        THREAD_CONTEXT.with(|key| *key)
    }

    /// Mint a new key, distinct from every key handed out so far.
    pub fn fresh() -> Self {
        Self(NEXT_CONTEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx-{}", self.0)
    }
}

#[derive(Default)]
struct PoolState {
    clients: HashMap<ContextKey, Arc<Client>>,
    closed: bool,
}

/// Lazily populated map from [`ContextKey`] to pooled HTTP client.
pub struct ConnectionPool {
    config: ClientConfig,
    state: Mutex<PoolState>,
}

impl ConnectionPool {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            state: Mutex::new(PoolState::default()),
        }
    }

    /// Client for the calling thread's context.
    pub fn current(&self) -> Result<Arc<Client>> {
        self.get(ContextKey::current())
    }

    /// Client for `key`, building it on first use.
    ///
    /// Fails with [`QQMusicError::PoolClosed`] once [`close_all`](Self::close_all)
    /// has run.
    pub fn get(&self, key: ContextKey) -> Result<Arc<Client>> {
        {
            let state = self.lock();
            if state.closed {
                return Err(QQMusicError::PoolClosed);
            }
            if let Some(existing) = state.clients.get(&key) {
                return Ok(Arc::clone(existing));
            }
        }

        // Build without holding the lock; a concurrent builder for the same
        // key may win, in which case its client is returned and ours dropped.
        let built = Arc::new(self.build_client()?);
        let mut state = self.lock();
        if state.closed {
            return Err(QQMusicError::PoolClosed);
        }
        let pooled = state.clients.len();
        let client = state.clients.entry(key).or_insert_with(|| {
            debug!(context = %key, pooled = pooled + 1, "created pooled HTTP client");
            built
        });
        Ok(Arc::clone(client))
    }

    /// Drop the client of a single context. Returns whether one existed.
    pub fn close(&self, key: ContextKey) -> bool {
        self.lock().clients.remove(&key).is_some()
    }

    /// Drop every pooled client and refuse further lookups.
    ///
    /// Returns the number of clients released. Calling it again is a no-op.
    pub fn close_all(&self) -> usize {
        let mut state = self.lock();
        state.closed = true;
        let drained = state.clients.len();
        state.clients.clear();
        drained
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of live pooled clients.
    pub fn len(&self) -> usize {
        self.lock().clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn build_client(&self) -> Result<Client> {
        let client = Client::builder()
            .user_agent(self.config.user_agent.as_str())
            .connect_timeout(self.config.connect_timeout)
            .timeout(self.config.timeout)
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(client)
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("ConnectionPool")
            .field("clients", &state.clients.len())
            .field("closed", &state.closed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn pool() -> ConnectionPool {
        ConnectionPool::new(ClientConfig::default())
    }

    #[test]
    fn same_context_reuses_client() {
        let pool = pool();
        let key = ContextKey::fresh();
        let a = pool.get(key).unwrap();
        let b = pool.get(key).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn distinct_contexts_get_distinct_clients() {
        let pool = pool();
        let a = pool.get(ContextKey::fresh()).unwrap();
        let b = pool.get(ContextKey::fresh()).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn current_key_is_per_thread() {
        let here = ContextKey::current();
        assert_eq!(here, ContextKey::current());
        let there = thread::spawn(ContextKey::current).join().unwrap();
        assert_ne!(here, there);
    }

    #[test]
    fn concurrent_first_use_creates_one_client() {
        let pool = Arc::new(pool());
        let key = ContextKey::fresh();
        let clients: Vec<_> = (0..8)
            .map(|_| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || pool.get(key).unwrap())
            })
            .map(|h| h.join().unwrap())
            .collect();
        assert_eq!(pool.len(), 1);
        assert!(clients.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn close_single_context() {
        let pool = pool();
        let key = ContextKey::fresh();
        let first = pool.get(key).unwrap();
        assert!(pool.close(key));
        assert!(!pool.close(key));
        let second = pool.get(key).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn lookups_fail_after_close_all() {
        let pool = pool();
        pool.get(ContextKey::fresh()).unwrap();
        pool.get(ContextKey::fresh()).unwrap();

        assert_eq!(pool.close_all(), 2);
        assert!(pool.is_closed());
        assert!(pool.is_empty());
        assert!(matches!(pool.current(), Err(QQMusicError::PoolClosed)));
        assert_eq!(pool.close_all(), 0);
    }
}
