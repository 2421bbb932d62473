//! Domain Models
//!
//! Core entities of the platform. Identifiers are store-assigned integers.

pub mod user;
pub mod event;
pub mod attendee;

pub use user::*;
pub use event::*;
pub use attendee::*;
