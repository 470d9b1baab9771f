//! Authentication module for sessiongate
//!
//! This module provides client-side session management, including:
//! - Login, registration and logout against a REST backend
//! - Token storage and retrieval
//! - Current-user hydration
//! - Navigation guarding

pub mod error;
pub mod gateway;
pub mod guard;
pub mod session;
pub mod storage;
pub mod types;

#[cfg(test)]
mod mock;

pub use error::{AuthError, ErrorKind, StorageError, LOGIN_FAILED, REGISTRATION_FAILED};
pub use gateway::{AuthGateway, Endpoints, HttpAuthGateway};
pub use guard::{
    decide, GuardPolicy, NavDecision, NavigationGuard, NavigationIntent, Route, RouteMeta,
    RouteTable,
};
pub use session::{Session, SessionStore};
pub use storage::{default_token_path, FileTokenStorage, MemoryTokenStorage, TokenStorage};
pub use types::{Group, LoginPayload, Permission, RegisterPayload, TokenResponse, UserProfile};
