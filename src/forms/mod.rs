//! Form input, validation and payload building
//!
//! Forms hold raw user input as typed, so drafts can store them verbatim and
//! validation can point at the first invalid field.

pub mod address;
pub mod event;
pub mod exhibitor;
pub mod organizer;
pub mod validation;

pub use address::AddressFields;
pub use event::EventForm;
pub use exhibitor::ExhibitorForm;
pub use organizer::OrganizerForm;
pub use validation::{FieldError, ValidationErrors};
