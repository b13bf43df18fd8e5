//! StallBoard
//!
//! Back office for market events: an administrator console that approves
//! organizers, an organizer console that manages events, invitations and
//! exhibitor applications, and a store console where exhibitors register and
//! apply. All data lives in a hosted PostgREST-style store and users sign in
//! with LINE.

#![allow(non_snake_case)]

pub mod config;
pub mod database;
pub mod forms;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{StallBoardError, Result};

// Re-export main components for easy access
pub use database::{DataStore, DatabaseService, MemoryStore, RestStore};
pub use services::{ServiceFactory, Session};
pub use state::{RegistrationFlow, RegistrationStep};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
