//! View selection for the three consoles
//!
//! Each console shows exactly one screen, picked from the session and what
//! has been loaded for that user.

use crate::models::exhibitor::Exhibitor;
use crate::models::organizer::{MemberRole, Organizer};
use crate::services::auth::Session;

/// An organizer the signed-in user belongs to, with their role there
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizerAccess {
    pub organizer: Organizer,
    pub role: MemberRole,
}

impl OrganizerAccess {
    pub fn can_manage(&self) -> bool {
        self.role.can_manage()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrganizerView {
    Login,
    Registration,
    PendingApproval(Organizer),
    Dashboard(OrganizerAccess),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreView {
    Login,
    Registration,
    Dashboard(Exhibitor),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminView {
    Login,
    Forbidden,
    Dashboard,
}

pub fn organizer_view(session: &Session, access: Option<OrganizerAccess>) -> OrganizerView {
    if !session.is_authenticated() {
        return OrganizerView::Login;
    }
    match access {
        None => OrganizerView::Registration,
        Some(access) if !access.organizer.is_approved => OrganizerView::PendingApproval(access.organizer),
        Some(access) => OrganizerView::Dashboard(access),
    }
}

pub fn store_view(session: &Session, exhibitor: Option<Exhibitor>) -> StoreView {
    if !session.is_authenticated() {
        return StoreView::Login;
    }
    match exhibitor {
        None => StoreView::Registration,
        Some(exhibitor) => StoreView::Dashboard(exhibitor),
    }
}

pub fn admin_view(session: &Session, is_admin: impl Fn(&str) -> bool) -> AdminView {
    match session.user_id() {
        None => AdminView::Login,
        Some(user_id) if !is_admin(user_id) => AdminView::Forbidden,
        Some(_) => AdminView::Dashboard,
    }
}
