//! Session store
//!
//! Holds the current token and the hydrated user profile for the lifetime of
//! the client. Every token mutation is written to [`TokenStorage`] under the
//! same lock as the in-memory copy, so storage stays the source of truth at
//! startup.
//!
//! Network-bearing operations (login, register, hydration) are serialised
//! through one async mutex. A hydration result is applied only if the token
//! it was fetched with is still current, so a concurrent logout always wins.

use super::error::{AuthError, StorageError};
use super::gateway::AuthGateway;
use super::storage::TokenStorage;
use super::types::{LoginPayload, RegisterPayload, TokenResponse, UserProfile};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Snapshot of the authentication state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

impl Session {
    /// A token is present but its profile has not been fetched yet
    pub fn needs_hydration(&self) -> bool {
        self.token.is_some() && self.user.is_none()
    }
}

/// Explicitly constructed session context, shared by reference
pub struct SessionStore<G, S> {
    gateway: G,
    storage: S,
    state: RwLock<Session>,
    flight: tokio::sync::Mutex<()>,
}

impl<G: AuthGateway, S: TokenStorage> SessionStore<G, S> {
    /// Create a store seeded with the token held in `storage`.
    ///
    /// Only the token is restored; the profile is hydrated on demand.
    pub fn new(gateway: G, storage: S) -> Result<Self, StorageError> {
        let token = storage.load()?;
        if token.is_some() {
            debug!("Restored token from storage");
        }

        Ok(Self {
            gateway,
            storage,
            state: RwLock::new(Session { token, user: None }),
            flight: tokio::sync::Mutex::new(()),
        })
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn session(&self) -> Session {
        self.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.read().user.clone()
    }

    /// A token is held. Rejected tokens are cleared during hydration, so
    /// once hydration has settled this means "not rejected by the server".
    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    pub fn needs_hydration(&self) -> bool {
        self.read().needs_hydration()
    }

    /// Log in with `credentials`, persist the returned token and hydrate the
    /// profile. On failure the previous session is left untouched.
    ///
    /// Use [`AuthError::reason`] with [`LOGIN_FAILED`](super::error::LOGIN_FAILED)
    /// to get the message to show the user.
    pub async fn login(&self, credentials: &LoginPayload) -> Result<(), AuthError> {
        let _flight = self.flight.lock().await;

        let response = self.gateway.login(credentials).await;
        let token = self.adopt_token(response).map_err(|e| {
            warn!("Login failed: {}", e);
            e
        })?;
        info!("Login successful");

        self.hydrate_after_sign_in(&token).await
    }

    /// Register a new account. Same contract as [`login`](Self::login).
    pub async fn register(&self, data: &RegisterPayload) -> Result<(), AuthError> {
        let _flight = self.flight.lock().await;

        let response = self.gateway.register(data).await;
        let token = self.adopt_token(response).map_err(|e| {
            warn!("Registration failed: {}", e);
            e
        })?;
        info!("Registration successful");

        self.hydrate_after_sign_in(&token).await
    }

    /// Refresh the profile for the current token.
    ///
    /// No-op without a token. On failure the profile is cleared; the token is
    /// cleared too, in memory and in storage, only when the server rejected
    /// it as unauthorized. The error is returned for the caller to report.
    pub async fn fetch_current_user(&self) -> Result<(), AuthError> {
        let _flight = self.flight.lock().await;

        match self.token() {
            Some(token) => self.hydrate(&token).await,
            None => Ok(()),
        }
    }

    /// Hydrate only if a token is present without a profile.
    ///
    /// Concurrent callers wait for the in-flight hydration and reuse its
    /// result instead of issuing their own request.
    pub async fn ensure_hydrated(&self) -> Result<(), AuthError> {
        if !self.needs_hydration() {
            return Ok(());
        }

        let _flight = self.flight.lock().await;

        // Re-check: the hydration we waited on may have settled it
        let token = {
            let state = self.read();
            match &state.token {
                Some(token) if state.user.is_none() => token.clone(),
                _ => return Ok(()),
            }
        };
        self.hydrate(&token).await
    }

    /// Clear the token and profile, in memory and in storage. Never fails.
    pub fn logout(&self) {
        let mut state = self.write();
        if let Err(e) = self.storage.clear() {
            warn!("Failed to remove stored token: {}", e);
        }
        *state = Session::default();
        info!("Logged out");
    }

    /// Persist then adopt the token from a login/register response.
    ///
    /// Replacing the token drops the profile that belonged to the old one.
    fn adopt_token(
        &self,
        response: Result<TokenResponse, AuthError>,
    ) -> Result<String, AuthError> {
        let token = response?.into_token().ok_or(AuthError::MissingToken)?;

        // Storage and memory change under the same lock
        let mut state = self.write();
        self.storage.save(&token)?;
        state.token = Some(token.clone());
        state.user = None;
        Ok(token)
    }

    /// Hydrate right after login/register.
    ///
    /// A transient failure leaves the new session in place. A rejected token
    /// has already been cleared by `hydrate`, so the sign-in is reported as
    /// failed.
    async fn hydrate_after_sign_in(&self, token: &str) -> Result<(), AuthError> {
        match self.hydrate(token).await {
            Err(err) if err.is_unauthorized() => Err(err),
            _ => Ok(()),
        }
    }

    /// Fetch the profile for `token`. Caller must hold the flight lock.
    async fn hydrate(&self, token: &str) -> Result<(), AuthError> {
        let result = self.gateway.current_user(token).await;

        let mut state = self.write();
        if state.token.as_deref() != Some(token) {
            debug!("Session changed during hydration, discarding result");
            return result.map(|_| ());
        }

        match result {
            Ok(user) => {
                info!("Hydrated session for user: {}", user.username);
                state.user = Some(user);
                Ok(())
            }
            Err(err) => {
                state.user = None;
                if err.is_unauthorized() {
                    warn!("Stored token rejected, clearing session");
                    if let Err(e) = self.storage.clear() {
                        warn!("Failed to remove stored token: {}", e);
                    }
                    state.token = None;
                } else {
                    warn!("Failed to fetch current user: {}", err);
                }
                Err(err)
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}
