//! State management module
//!
//! This module holds the registration flow and the per-console view router

pub mod registration;
pub mod router;

// Re-export commonly used state components
pub use registration::{RegistrationFlow, RegistrationPath, RegistrationStep};
pub use router::{admin_view, organizer_view, store_view, AdminView, OrganizerAccess, OrganizerView, StoreView};
