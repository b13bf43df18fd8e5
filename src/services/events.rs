//! Event service
//!
//! Organizer-side event management and exhibitor-side applications. Every
//! mutation returns the re-fetched list the console shows next.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use super::auth::LineProfile;
use super::draft::DraftAutosave;
use super::organizer::OrganizerService;
use super::storage::{StorageService, Upload};
use crate::config::settings::DraftConfig;
use crate::database::DatabaseService;
use crate::forms::EventForm;
use crate::models::application::{ApplicationStatus, EventApplication, NewApplication};
use crate::models::draft::FormType;
use crate::models::event::Event;
use crate::models::exhibitor::Exhibitor;
use crate::utils::errors::{Result, StallBoardError};
use crate::utils::helpers::non_empty;
use crate::utils::logging::log_user_action;

/// Storage folder for event images
const EVENT_IMAGE_KIND: &str = "events";

/// An exhibitor's application with the event it targets
#[derive(Debug, Clone, PartialEq)]
pub struct ExhibitorApplication {
    pub application: EventApplication,
    pub event: Option<Event>,
}

#[derive(Clone, Debug)]
pub struct EventService {
    database: Arc<DatabaseService>,
    organizers: OrganizerService,
    storage: StorageService,
    drafts: DraftConfig,
}

impl EventService {
    pub fn new(
        database: Arc<DatabaseService>,
        organizers: OrganizerService,
        storage: StorageService,
        drafts: DraftConfig,
    ) -> Self {
        Self {
            database,
            organizers,
            storage,
            drafts,
        }
    }

    /// Draft autosave for the create form or one event's edit form
    pub fn autosave(&self, user_id: &str, form_type: FormType) -> DraftAutosave {
        DraftAutosave::new(self.database.drafts.clone(), &self.drafts, user_id, form_type)
    }

    async fn owned_event(&self, profile: &LineProfile, event_id: &str) -> Result<Event> {
        let event = self
            .database
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| StallBoardError::EventNotFound {
                event_id: event_id.to_string(),
            })?;
        self.organizers
            .require_approved(&profile.user_id, &event.organizer_id)
            .await?;
        Ok(event)
    }

    pub async fn create(&self, profile: &LineProfile, organizer_id: &str, form: &EventForm) -> Result<Event> {
        self.organizers.require_approved(&profile.user_id, organizer_id).await?;
        form.validate(true).into_result()?;

        let event = self
            .database
            .events
            .create(&form.to_insert_payload(organizer_id))
            .await?;

        info!(event_id = %event.id, organizer_id = organizer_id, "Event created");
        log_user_action(&profile.user_id, "event_created", Some(&event.id));
        Ok(event)
    }

    /// Apply an edit; blank fields keep their stored values
    pub async fn update(&self, profile: &LineProfile, event_id: &str, form: &EventForm) -> Result<Event> {
        let existing = self.owned_event(profile, event_id).await?;
        form.validate(false).into_result()?;

        let patch = form.to_update_patch();
        let patched_date = |column: &str| {
            patch
                .get(column)
                .and_then(|v| v.as_str())
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        };
        let start = patched_date("start_date").unwrap_or(existing.start_date);
        let end = patched_date("end_date").unwrap_or(existing.end_date);
        if end < start {
            return Err(StallBoardError::Validation {
                field: "end_date".to_string(),
                message: "End date must not be before the start date".to_string(),
            });
        }
        let deadline = patched_date("application_deadline").or(existing.application_deadline);
        if deadline.map_or(false, |deadline| deadline > start) {
            return Err(StallBoardError::Validation {
                field: "application_deadline".to_string(),
                message: "Application deadline must be on or before the start date".to_string(),
            });
        }

        let event = self.database.events.update(event_id, patch).await?;
        log_user_action(&profile.user_id, "event_updated", Some(event_id));
        Ok(event)
    }

    /// Delete an event and return the organizer's remaining events
    pub async fn delete(&self, profile: &LineProfile, event_id: &str) -> Result<Vec<Event>> {
        let event = self.owned_event(profile, event_id).await?;
        self.database.events.delete(event_id).await?;
        log_user_action(&profile.user_id, "event_deleted", Some(event_id));
        self.database.events.list_for_organizer(&event.organizer_id).await
    }

    pub async fn list_for_organizer(&self, profile: &LineProfile, organizer_id: &str) -> Result<Vec<Event>> {
        self.organizers.require_access(&profile.user_id, organizer_id).await?;
        self.database.events.list_for_organizer(organizer_id).await
    }

    /// Every event, for the admin console
    pub async fn list_all(&self) -> Result<Vec<Event>> {
        self.database.events.list_all().await
    }

    /// Upload an event image and return its public URL
    pub async fn upload_image(&self, profile: &LineProfile, organizer_id: &str, upload: &Upload) -> Result<String> {
        self.organizers.require_approved(&profile.user_id, organizer_id).await?;
        self.storage
            .upload_public(self.storage.event_images_bucket(), organizer_id, EVENT_IMAGE_KIND, upload)
            .await
    }

    /// Published events exhibitors can browse on `today`
    pub async fn open_events(&self, today: NaiveDate) -> Result<Vec<Event>> {
        Ok(self
            .database
            .events
            .list_upcoming(today)
            .await?
            .into_iter()
            .filter(|event| event.accepts_applications(today))
            .collect())
    }

    async fn exhibitor_of(&self, profile: &LineProfile) -> Result<Exhibitor> {
        self.database
            .exhibitors
            .find_by_line_user(&profile.user_id)
            .await?
            .ok_or_else(|| StallBoardError::ExhibitorNotFound {
                user_id: profile.user_id.clone(),
            })
    }

    /// Apply to an event; one application per event and exhibitor
    pub async fn apply(
        &self,
        profile: &LineProfile,
        event_id: &str,
        message: &str,
        today: NaiveDate,
    ) -> Result<Vec<ExhibitorApplication>> {
        let exhibitor = self.exhibitor_of(profile).await?;
        let event = self
            .database
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| StallBoardError::EventNotFound {
                event_id: event_id.to_string(),
            })?;

        if !event.accepts_applications(today) {
            return Err(StallBoardError::InvalidInput(
                "this event is not accepting applications".to_string(),
            ));
        }
        if self
            .database
            .applications
            .find_for_pair(event_id, &exhibitor.id)
            .await?
            .is_some()
        {
            return Err(StallBoardError::DuplicateApplication);
        }

        let application = self
            .database
            .applications
            .create(&NewApplication {
                event_id: event_id.to_string(),
                exhibitor_id: exhibitor.id.clone(),
                status: ApplicationStatus::Pending,
                message: non_empty(message),
            })
            .await?;

        info!(application_id = %application.id, event_id = event_id, "Application submitted");
        log_user_action(&profile.user_id, "application_submitted", Some(event_id));
        self.applications_of(&exhibitor).await
    }

    /// The signed-in exhibitor's applications, newest first
    pub async fn my_applications(&self, profile: &LineProfile) -> Result<Vec<ExhibitorApplication>> {
        let exhibitor = self.exhibitor_of(profile).await?;
        self.applications_of(&exhibitor).await
    }

    async fn applications_of(&self, exhibitor: &Exhibitor) -> Result<Vec<ExhibitorApplication>> {
        let applications = self.database.applications.list_for_exhibitor(&exhibitor.id).await?;
        let lookups = applications
            .iter()
            .map(|application| self.database.events.find_by_id(&application.event_id));
        let events = futures::future::try_join_all(lookups).await?;

        Ok(applications
            .into_iter()
            .zip(events)
            .map(|(application, event)| ExhibitorApplication { application, event })
            .collect())
    }
}
