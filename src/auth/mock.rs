//! Scripted gateway and storage doubles for tests
//!
//! Bypasses the network entirely: each call pops the next queued response.

use super::error::{AuthError, StorageError};
use super::gateway::AuthGateway;
use super::storage::{MemoryTokenStorage, TokenStorage};
use super::types::{LoginPayload, RegisterPayload, TokenResponse, UserProfile};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub(crate) fn sample_user(id: i64, username: &str) -> UserProfile {
    UserProfile {
        id,
        username: username.to_string(),
        email: format!("{}@example.com", username),
        first_name: String::new(),
        last_name: String::new(),
        groups: vec![],
        user_permissions: vec![],
    }
}

pub(crate) fn token_response(token: &str) -> TokenResponse {
    TokenResponse {
        token: Some(token.to_string()),
        access: None,
    }
}

#[derive(Default)]
pub(crate) struct MockGateway {
    login: Mutex<VecDeque<Result<TokenResponse, AuthError>>>,
    register: Mutex<VecDeque<Result<TokenResponse, AuthError>>>,
    current_user: Mutex<VecDeque<Result<UserProfile, AuthError>>>,
    current_user_calls: AtomicUsize,
    seen_tokens: Mutex<Vec<String>>,
    gate: Option<Arc<Notify>>,
}

impl MockGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make `current_user` wait for a notification before answering
    pub(crate) fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub(crate) fn on_login(self, response: Result<TokenResponse, AuthError>) -> Self {
        self.login.lock().unwrap().push_back(response);
        self
    }

    pub(crate) fn on_register(self, response: Result<TokenResponse, AuthError>) -> Self {
        self.register.lock().unwrap().push_back(response);
        self
    }

    pub(crate) fn on_current_user(self, response: Result<UserProfile, AuthError>) -> Self {
        self.current_user.lock().unwrap().push_back(response);
        self
    }

    pub(crate) fn current_user_calls(&self) -> usize {
        self.current_user_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn seen_tokens(&self) -> Vec<String> {
        self.seen_tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthGateway for MockGateway {
    async fn register(&self, _payload: &RegisterPayload) -> Result<TokenResponse, AuthError> {
        let next = self.register.lock().unwrap().pop_front();
        next.expect("unexpected register call")
    }

    async fn login(&self, _payload: &LoginPayload) -> Result<TokenResponse, AuthError> {
        let next = self.login.lock().unwrap().pop_front();
        next.expect("unexpected login call")
    }

    async fn current_user(&self, token: &str) -> Result<UserProfile, AuthError> {
        self.current_user_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_tokens.lock().unwrap().push(token.to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let next = self.current_user.lock().unwrap().pop_front();
        next.expect("unexpected current_user call")
    }
}

/// Storage whose writes always fail; reads return the seeded token
pub(crate) struct BrokenStorage {
    pub(crate) token: Option<String>,
}

impl BrokenStorage {
    fn error() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only")
    }
}

impl TokenStorage for BrokenStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.token.clone())
    }

    fn save(&self, _token: &str) -> Result<(), StorageError> {
        Err(StorageError::Write {
            path: PathBuf::from("/read-only/auth.token"),
            source: Self::error(),
        })
    }

    fn clear(&self) -> Result<(), StorageError> {
        Err(StorageError::Remove {
            path: PathBuf::from("/read-only/auth.token"),
            source: Self::error(),
        })
    }
}

/// Memory storage whose `save` signals on entry, then blocks until released
pub(crate) struct PausingStorage {
    inner: MemoryTokenStorage,
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl PausingStorage {
    /// Returns the storage, the "save entered" receiver and the release sender
    pub(crate) fn new() -> (Self, Receiver<()>, Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let storage = Self {
            inner: MemoryTokenStorage::new(),
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        };
        (storage, entered_rx, release_tx)
    }
}

impl TokenStorage for PausingStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        self.inner.load()
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        let _ = self.entered.lock().unwrap().send(());
        let _ = self.release.lock().unwrap().recv();
        self.inner.save(token)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.inner.clear()
    }
}
