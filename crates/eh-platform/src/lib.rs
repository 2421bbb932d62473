//! EventHub Platform
//!
//! Event-management backend:
//! - User registration and password login with signed bearer tokens
//! - Event CRUD where only the owner may modify or delete
//! - Attendee rosters with one membership per (event, user) pair
//! - SQLite persistence with bounded store calls

pub mod domain;
pub mod repository;
pub mod service;
pub mod api;
pub mod config;
pub mod error;

pub use domain::*;
pub use config::PlatformConfig;
pub use error::PlatformError;
