//! sessiongate: client-side authentication sessions
//!
//! This library keeps an authentication token and the current user's profile
//! in sync with a REST backend and durable storage, and guards in-app
//! navigation based on that session.

pub mod auth;
pub mod config;
