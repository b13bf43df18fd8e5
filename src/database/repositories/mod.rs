//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod organizer;
pub mod invitation;
pub mod event;
pub mod exhibitor;
pub mod application;
pub mod draft;

// Re-export repositories
pub use organizer::OrganizerRepository;
pub use invitation::InvitationRepository;
pub use event::EventRepository;
pub use exhibitor::ExhibitorRepository;
pub use application::ApplicationRepository;
pub use draft::DraftRepository;
