//! Remote table names

pub const ORGANIZERS: &str = "organizers";
pub const ORGANIZER_MEMBERS: &str = "organizer_members";
pub const ORGANIZER_INVITATIONS: &str = "organizer_invitations";
pub const EVENTS: &str = "events";
pub const EXHIBITORS: &str = "exhibitors";
pub const EVENT_APPLICATIONS: &str = "event_applications";
pub const FORM_DRAFTS: &str = "form_drafts";
