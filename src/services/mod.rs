//! Services module
//!
//! This module contains the console business logic on top of the repositories

pub mod approval;
pub mod auth;
pub mod draft;
pub mod events;
pub mod invitation;
pub mod organizer;
pub mod postal;
pub mod registration;
pub mod storage;

// Re-export commonly used services
pub use approval::{ApplicationView, ApprovalService};
pub use auth::{AuthService, LineLoginClient, LineProfile, LoginProvider, Session};
pub use draft::{is_blank, DraftAutosave};
pub use events::{EventService, ExhibitorApplication};
pub use invitation::InvitationService;
pub use organizer::OrganizerService;
pub use postal::{LookupOutcome, PostalAddress, PostalService};
pub use registration::{RegistrationForm, RegistrationService, RegistrationWizard};
pub use storage::{StorageService, Upload};

use std::sync::Arc;

use tracing::warn;

use crate::config::settings::Settings;
use crate::database::query::Query;
use crate::database::{tables, DataStore, DatabaseService};
use crate::state::router::{self, AdminView, OrganizerView, StoreView};
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub database: Arc<DatabaseService>,
    pub auth_service: AuthService,
    pub organizer_service: OrganizerService,
    pub invitation_service: InvitationService,
    pub registration_service: RegistrationService,
    pub approval_service: ApprovalService,
    pub event_service: EventService,
    pub postal_service: PostalService,
    pub storage_service: StorageService,
    store: Arc<dyn DataStore>,
    settings: Settings,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: Settings, store: Arc<dyn DataStore>, login: Arc<dyn LoginProvider>) -> Result<Self> {
        let database = Arc::new(DatabaseService::new(store.clone()));

        let storage_service = StorageService::new(&settings.supabase, settings.storage.clone())?;
        let postal_service = PostalService::new(&settings.postal)?;
        let auth_service = AuthService::new(login, settings.clone());
        let organizer_service = OrganizerService::new(database.clone());
        let invitation_service = InvitationService::new(
            database.clone(),
            organizer_service.clone(),
            settings.invitations.clone(),
        );
        let registration_service = RegistrationService::new(
            database.clone(),
            storage_service.clone(),
            invitation_service.clone(),
            settings.drafts.clone(),
        );
        let approval_service = ApprovalService::new(database.clone(), organizer_service.clone(), auth_service.clone());
        let event_service = EventService::new(
            database.clone(),
            organizer_service.clone(),
            storage_service.clone(),
            settings.drafts.clone(),
        );

        Ok(Self {
            database,
            auth_service,
            organizer_service,
            invitation_service,
            registration_service,
            approval_service,
            event_service,
            postal_service,
            storage_service,
            store,
            settings,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Screen the organizer console shows for this session
    pub async fn organizer_view(&self, session: &Session) -> Result<OrganizerView> {
        let access = match session.user_id() {
            Some(user_id) => self.organizer_service.access_for(user_id).await?,
            None => None,
        };
        Ok(router::organizer_view(session, access))
    }

    /// Screen the store console shows for this session
    pub async fn store_view(&self, session: &Session) -> Result<StoreView> {
        let exhibitor = match session.user_id() {
            Some(user_id) => self.database.exhibitors.find_by_line_user(user_id).await?,
            None => None,
        };
        Ok(router::store_view(session, exhibitor))
    }

    /// Screen the admin console shows for this session
    pub fn admin_view(&self, session: &Session) -> AdminView {
        router::admin_view(session, |user_id| self.settings.is_admin(user_id))
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let store_reachable = match self.store.select(&Query::table(tables::ORGANIZERS).select("id").limit(1)).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Store health check failed");
                false
            }
        };

        ServiceHealthStatus {
            store_reachable,
            line_configured: !self.settings.line.channel_id.is_empty(),
            id_token_verification: self.settings.line.channel_secret.is_some(),
            drafts_enabled: self.settings.drafts.enabled,
            admins_configured: !self.settings.admin.line_user_ids.is_empty(),
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone)]
pub struct ServiceHealthStatus {
    pub store_reachable: bool,
    pub line_configured: bool,
    pub id_token_verification: bool,
    pub drafts_enabled: bool,
    pub admins_configured: bool,
}

impl ServiceHealthStatus {
    /// Check if all critical services are healthy
    pub fn is_healthy(&self) -> bool {
        self.store_reachable && self.line_configured
    }

    /// Get list of problems worth reporting
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.store_reachable {
            issues.push("Data store is not reachable".to_string());
        }
        if !self.line_configured {
            issues.push("LINE channel is not configured".to_string());
        }
        if !self.admins_configured {
            issues.push("No administrators configured".to_string());
        }

        issues
    }
}
