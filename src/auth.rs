//! Identity session: who is signed in.
//!
//! Sign-in and sign-up accept any credentials. They wait out a simulated
//! network latency, synthesize a [`User`] and persist it under
//! [`USER_KEY`]. Overlapping calls are queued and run one at a time, so the
//! persisted user always matches the one in memory.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard,
    },
    time::Duration,
};

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    catalog::avatar_url,
    error::AuthError,
    schemas::User,
    store::{StoreAdapter, USER_KEY},
};

#[derive(Clone, Debug, PartialEq)]
pub enum AuthState {
    Unauthenticated,
    Loading,
    Authenticated(User),
}

#[derive(Debug, Default)]
struct Inner {
    user: Option<User>,
    pending: usize,
}

pub struct AuthContext {
    storage: StoreAdapter,
    latency: Duration,
    inner: Mutex<Inner>,
    flight: tokio::sync::Mutex<()>,
    closed: AtomicBool,
}

// Keeps the container in `Loading` while a call is queued or running, and
// clears it even if the caller drops the future midway.
struct Pending<'a>(&'a AuthContext);

impl<'a> Pending<'a> {
    fn enter(auth: &'a AuthContext) -> Self {
        auth.inner().pending += 1;
        Self(auth)
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        self.0.inner().pending -= 1;
    }
}

impl AuthContext {
    /// Restores the previously signed-in user, if any. A corrupt entry is
    /// discarded and the session starts signed out.
    pub fn new(storage: StoreAdapter, latency: Duration) -> Self {
        let user = storage.read_or_discard::<User>(USER_KEY);
        if let Some(user) = &user {
            info!("Restored session for {}", user.email);
        }
        Self {
            storage,
            latency,
            inner: Mutex::new(Inner { user, pending: 0 }),
            flight: tokio::sync::Mutex::new(()),
            closed: AtomicBool::new(false),
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> AuthState {
        let inner = self.inner();
        if inner.pending > 0 {
            return AuthState::Loading;
        }
        match &inner.user {
            Some(user) => AuthState::Authenticated(user.clone()),
            None => AuthState::Unauthenticated,
        }
    }

    pub fn user(&self) -> Option<User> {
        self.inner().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner().user.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.inner().pending > 0
    }

    /// Tears the container down. Calls still in flight finish with
    /// [`AuthError::Closed`] and leave memory and storage untouched.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn simulated_call<T>(
        &self,
        commit: impl FnOnce(&Self) -> Result<T, AuthError>,
    ) -> Result<T, AuthError> {
        let _pending = Pending::enter(self);
        let _flight = self.flight.lock().await;
        if self.is_closed() {
            return Err(AuthError::Closed);
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.is_closed() {
            warn!("Dropping identity result, session closed");
            return Err(AuthError::Closed);
        }
        commit(self)
    }

    fn adopt(&self, user: User) -> Result<User, AuthError> {
        self.storage.write(USER_KEY, &user)?;
        self.inner().user = Some(user.clone());
        Ok(user)
    }

    /// No password check is made; any input succeeds.
    pub async fn sign_in(&self, email: &str, _password: &str) -> Result<User, AuthError> {
        let email = email.to_string();
        let user = self
            .simulated_call(move |auth| {
                let name = email.split('@').next().unwrap_or_default().to_string();
                auth.adopt(mock_user(name, email))
            })
            .await?;
        info!("Signed in {}", user.email);
        Ok(user)
    }

    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        _password: &str,
    ) -> Result<User, AuthError> {
        let (name, email) = (name.to_string(), email.to_string());
        let user = self
            .simulated_call(move |auth| auth.adopt(mock_user(name, email)))
            .await?;
        info!("Registered {}", user.email);
        Ok(user)
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.simulated_call(|auth| {
            auth.storage.remove(USER_KEY)?;
            if let Some(user) = auth.inner().user.take() {
                info!("Signed out {}", user.email);
            }
            Ok(())
        })
        .await
    }
}

fn mock_user(name: String, email: String) -> User {
    User {
        id: Uuid::new_v4().to_string(),
        avatar: Some(avatar_url(&email)),
        name,
        email,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        error::StoreError,
        store::{MemoryStore, Store},
    };

    const LATENCY: Duration = Duration::from_millis(1000);

    fn context(store: &Arc<MemoryStore>) -> AuthContext {
        AuthContext::new(StoreAdapter::new(store.clone()), LATENCY)
    }

    #[tokio::test(start_paused = true)]
    async fn sign_in_derives_profile_from_email() {
        let store = Arc::new(MemoryStore::new());
        let auth = context(&store);
        assert_eq!(auth.state(), AuthState::Unauthenticated);

        let user = auth.sign_in("sam@example.com", "whatever").await.unwrap();
        assert_eq!(user.name, "sam");
        assert_eq!(user.email, "sam@example.com");
        assert_eq!(
            user.avatar.as_deref(),
            Some("https://api.dicebear.com/7.x/avataaars/svg?seed=sam@example.com")
        );
        assert_eq!(auth.state(), AuthState::Authenticated(user.clone()));

        let stored: User = serde_json::from_str(&store.get(USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored, user);
    }

    #[tokio::test(start_paused = true)]
    async fn sign_up_keeps_given_name() {
        let store = Arc::new(MemoryStore::new());
        let auth = context(&store);
        let user = auth.sign_up("Sam Rivera", "sam@example.com", "pw").await.unwrap();
        assert_eq!(user.name, "Sam Rivera");
        assert_eq!(auth.user(), Some(user));
    }

    #[tokio::test(start_paused = true)]
    async fn loading_while_request_in_flight() {
        let store = Arc::new(MemoryStore::new());
        let auth = context(&store);
        let call = auth.sign_in("a@b.c", "pw");
        tokio::pin!(call);
        assert!(futures::poll!(&mut call).is_pending());
        assert_eq!(auth.state(), AuthState::Loading);
        call.await.unwrap();
        assert!(auth.is_authenticated());
        assert!(!auth.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_request_clears_loading() {
        let store = Arc::new(MemoryStore::new());
        let auth = context(&store);
        {
            let call = auth.sign_in("a@b.c", "pw");
            tokio::pin!(call);
            assert!(futures::poll!(&mut call).is_pending());
        }
        assert_eq!(auth.state(), AuthState::Unauthenticated);
        assert_eq!(store.get(USER_KEY).unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn sign_out_clears_memory_and_storage() {
        let store = Arc::new(MemoryStore::new());
        let auth = context(&store);
        auth.sign_in("a@b.c", "pw").await.unwrap();
        auth.sign_out().await.unwrap();
        assert_eq!(auth.state(), AuthState::Unauthenticated);
        assert_eq!(store.get(USER_KEY).unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn restores_persisted_user() {
        let store = Arc::new(MemoryStore::new());
        let user = context(&store).sign_in("a@b.c", "pw").await.unwrap();
        let restored = context(&store);
        assert_eq!(restored.state(), AuthState::Authenticated(user));
    }

    #[test]
    fn corrupt_user_entry_is_discarded() {
        let store = Arc::new(MemoryStore::new());
        store.set(USER_KEY, "{\"id\":").unwrap();
        let auth = context(&store);
        assert_eq!(auth.state(), AuthState::Unauthenticated);
        assert_eq!(store.get(USER_KEY).unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_sign_ins_run_in_order() {
        let store = Arc::new(MemoryStore::new());
        let auth = context(&store);
        let (first, second) = futures::join!(
            auth.sign_in("first@x.io", "pw"),
            auth.sign_in("second@x.io", "pw")
        );
        let (_, second) = (first.unwrap(), second.unwrap());
        assert_eq!(auth.user(), Some(second.clone()));
        let stored: User = serde_json::from_str(&store.get(USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored, second);
    }

    #[tokio::test(start_paused = true)]
    async fn close_discards_in_flight_result() {
        let store = Arc::new(MemoryStore::new());
        let auth = context(&store);
        let call = auth.sign_in("a@b.c", "pw");
        tokio::pin!(call);
        assert!(futures::poll!(&mut call).is_pending());
        auth.close();
        assert!(matches!(call.await, Err(AuthError::Closed)));
        assert_eq!(auth.user(), None);
        assert_eq!(store.get(USER_KEY).unwrap(), None);
    }

    /// Delegates to a [`MemoryStore`] until `failing` is set, then rejects
    /// every write and removal.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: AtomicBool,
    }

    impl FlakyStore {
        fn check(&self, key: &str) -> Result<(), StoreError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::Io {
                    path: format!("{key}.json").into(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
                });
            }
            Ok(())
        }
    }

    impl Store for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.check(key)?;
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.check(key)?;
            self.inner.remove(key)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failed_write_keeps_previous_user() {
        let store = Arc::new(FlakyStore::default());
        let auth = AuthContext::new(StoreAdapter::new(store.clone()), LATENCY);
        let first = auth.sign_in("sam@example.com", "pw").await.unwrap();
        let stored = store.get(USER_KEY).unwrap();
        store.failing.store(true, Ordering::SeqCst);

        let err = auth.sign_up("Alex", "alex@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::Store(StoreError::Io { .. })));
        assert_eq!(auth.state(), AuthState::Authenticated(first.clone()));
        assert_eq!(store.get(USER_KEY).unwrap(), stored);

        assert!(auth.sign_out().await.is_err());
        assert_eq!(auth.user(), Some(first));
        assert_eq!(store.get(USER_KEY).unwrap(), stored);
    }
}
