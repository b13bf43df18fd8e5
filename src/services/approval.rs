//! Approval workflows
//!
//! Admins approve organizers; organizer owners and admins approve or reject
//! exhibitor applications. Each decision is a plain status update (last
//! writer wins) followed by a re-fetch of the affected list.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use super::auth::{AuthService, LineProfile, Session};
use super::organizer::OrganizerService;
use crate::database::DatabaseService;
use crate::models::application::{Decision, EventApplication};
use crate::models::event::Event;
use crate::models::exhibitor::Exhibitor;
use crate::models::organizer::Organizer;
use crate::utils::errors::{Result, StallBoardError};
use crate::utils::logging::{log_admin_action, log_user_action};

/// An application as the organizer dashboard shows it
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationView {
    pub application: EventApplication,
    pub event: Event,
    pub exhibitor: Option<Exhibitor>,
}

#[derive(Clone, Debug)]
pub struct ApprovalService {
    database: Arc<DatabaseService>,
    organizers: OrganizerService,
    auth: AuthService,
}

impl ApprovalService {
    pub fn new(database: Arc<DatabaseService>, organizers: OrganizerService, auth: AuthService) -> Self {
        Self { database, organizers, auth }
    }

    /// Organizers for the admin console, pending ones first
    pub async fn list_organizers(&self, session: &Session) -> Result<Vec<Organizer>> {
        self.auth.require_admin(session)?;
        self.database.organizers.list().await
    }

    pub async fn pending_organizers(&self, session: &Session) -> Result<Vec<Organizer>> {
        self.auth.require_admin(session)?;
        self.database.organizers.list_pending().await
    }

    /// Approve or revoke an organizer, then re-fetch the list
    pub async fn set_organizer_approval(
        &self,
        session: &Session,
        organizer_id: &str,
        approved: bool,
    ) -> Result<Vec<Organizer>> {
        let admin = self.auth.require_admin(session)?;
        let organizer = self.database.organizers.set_approved(organizer_id, approved).await?;
        let action = if approved { "organizer_approved" } else { "organizer_approval_revoked" };
        log_admin_action(&admin.user_id, action, Some(&organizer.id), Some(&organizer.organization_name));
        self.database.organizers.list().await
    }

    /// Applications to an organizer's events, oldest first
    pub async fn list_applications(&self, profile: &LineProfile, organizer_id: &str) -> Result<Vec<ApplicationView>> {
        self.organizers.require_access(&profile.user_id, organizer_id).await?;
        self.applications_for(organizer_id).await
    }

    async fn applications_for(&self, organizer_id: &str) -> Result<Vec<ApplicationView>> {
        let events = self.database.events.list_for_organizer(organizer_id).await?;
        let event_ids: Vec<String> = events.iter().map(|e| e.id.clone()).collect();
        let applications = self.database.applications.list_for_events(&event_ids).await?;

        let exhibitor_ids: Vec<String> = applications.iter().map(|a| a.exhibitor_id.clone()).collect();
        let exhibitors: HashMap<String, Exhibitor> = self
            .database
            .exhibitors
            .find_many(&exhibitor_ids)
            .await?
            .into_iter()
            .map(|e| (e.id.clone(), e))
            .collect();
        let events: HashMap<String, Event> = events.into_iter().map(|e| (e.id.clone(), e)).collect();

        Ok(applications
            .into_iter()
            .filter_map(|application| {
                let event = events.get(&application.event_id)?.clone();
                let exhibitor = exhibitors.get(&application.exhibitor_id).cloned();
                Some(ApplicationView {
                    application,
                    event,
                    exhibitor,
                })
            })
            .collect())
    }

    /// Approve or reject an application, then re-fetch the organizer's list
    pub async fn decide_application(
        &self,
        profile: &LineProfile,
        application_id: &str,
        decision: Decision,
    ) -> Result<Vec<ApplicationView>> {
        let application = self
            .database
            .applications
            .find_by_id(application_id)
            .await?
            .ok_or_else(|| StallBoardError::ApplicationNotFound {
                application_id: application_id.to_string(),
            })?;
        let event = self
            .database
            .events
            .find_by_id(&application.event_id)
            .await?
            .ok_or_else(|| StallBoardError::EventNotFound {
                event_id: application.event_id.clone(),
            })?;
        self.organizers
            .require_manager(&profile.user_id, &event.organizer_id)
            .await?;

        let updated = self
            .database
            .applications
            .set_status(application_id, decision.status())
            .await?;

        info!(application_id = application_id, status = %updated.status, "Application decided");
        log_user_action(
            &profile.user_id,
            "application_decided",
            Some(&format!("{} -> {}", application_id, updated.status)),
        );
        self.applications_for(&event.organizer_id).await
    }
}
