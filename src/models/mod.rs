//! Data models module
//!
//! This module contains the remote-table rows and insert payloads used
//! throughout the application

pub mod organizer;
pub mod invitation;
pub mod event;
pub mod exhibitor;
pub mod application;
pub mod draft;

// Re-export commonly used models
pub use organizer::{Organizer, NewOrganizer, OrganizerMember, NewOrganizerMember, MemberRole};
pub use invitation::{OrganizerInvitation, NewInvitation, InvitationStatus};
pub use event::Event;
pub use exhibitor::{Exhibitor, NewExhibitor, DocumentKind};
pub use application::{EventApplication, NewApplication, ApplicationStatus, Decision};
pub use draft::{FormDraft, DraftUpsert, FormType};
