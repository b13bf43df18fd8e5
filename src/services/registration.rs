//! Registration service
//!
//! Organizer and exhibitor sign-up. [`RegistrationWizard`] walks a user
//! through the steps of [`RegistrationFlow`] with the form autosaved as a
//! draft; [`RegistrationService`] performs the writes.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info};

use super::auth::LineProfile;
use super::draft::DraftAutosave;
use super::invitation::InvitationService;
use super::storage::{StorageService, Upload};
use crate::config::settings::DraftConfig;
use crate::database::DatabaseService;
use crate::forms::{ExhibitorForm, OrganizerForm, ValidationErrors};
use crate::models::draft::FormType;
use crate::models::exhibitor::{DocumentKind, Exhibitor};
use crate::models::organizer::{MemberRole, NewOrganizerMember, Organizer, OrganizerMember};
use crate::state::registration::{RegistrationFlow, RegistrationStep};
use crate::utils::errors::{Result, StallBoardError};
use crate::utils::logging::log_user_action;

/// A form that can be collected by the registration wizard
pub trait RegistrationForm: Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static {
    fn form_type() -> FormType;

    fn validate(&self) -> ValidationErrors;
}

impl RegistrationForm for OrganizerForm {
    fn form_type() -> FormType {
        FormType::OrganizerRegistration
    }

    fn validate(&self) -> ValidationErrors {
        OrganizerForm::validate(self)
    }
}

impl RegistrationForm for ExhibitorForm {
    fn form_type() -> FormType {
        FormType::ExhibitorRegistration
    }

    fn validate(&self) -> ValidationErrors {
        ExhibitorForm::validate(self)
    }
}

#[derive(Clone, Debug)]
pub struct RegistrationService {
    database: Arc<DatabaseService>,
    storage: StorageService,
    invitations: InvitationService,
    drafts: DraftConfig,
}

impl RegistrationService {
    pub fn new(
        database: Arc<DatabaseService>,
        storage: StorageService,
        invitations: InvitationService,
        drafts: DraftConfig,
    ) -> Self {
        Self {
            database,
            storage,
            invitations,
            drafts,
        }
    }

    /// Draft autosave for one user's form
    pub fn autosave(&self, user_id: &str, form_type: FormType) -> DraftAutosave {
        DraftAutosave::new(self.database.drafts.clone(), &self.drafts, user_id, form_type)
    }

    /// Store a new organizer (unapproved) and its owner membership
    pub async fn register_organizer(&self, profile: &LineProfile, form: &OrganizerForm) -> Result<Organizer> {
        form.validate().into_result()?;

        if self.database.organizers.find_by_line_user(&profile.user_id).await?.is_some() {
            return Err(StallBoardError::InvalidInput(
                "this LINE account has already registered an organizer".to_string(),
            ));
        }

        let organizer = self
            .database
            .organizers
            .create(&form.to_new_organizer(&profile.user_id))
            .await?;

        let owner = NewOrganizerMember {
            organizer_id: organizer.id.clone(),
            line_user_id: profile.user_id.clone(),
            display_name: Some(profile.display_name.clone()),
            role: MemberRole::Owner,
            invitation_id: None,
        };
        if let Err(e) = self.database.organizers.add_member(&owner).await {
            // Ownership is still resolved from organizers.line_user_id
            error!(organizer_id = %organizer.id, error = %e, "Failed to store owner membership");
        }

        info!(organizer_id = %organizer.id, user_id = %profile.user_id, "Organizer registered");
        log_user_action(&profile.user_id, "organizer_registered", Some(&organizer.id));
        Ok(organizer)
    }

    /// Upload the documents, then store the exhibitor
    pub async fn register_exhibitor(
        &self,
        profile: &LineProfile,
        form: &ExhibitorForm,
        documents: &[(DocumentKind, Upload)],
    ) -> Result<Exhibitor> {
        form.validate().into_result()?;

        if self.database.exhibitors.find_by_line_user(&profile.user_id).await?.is_some() {
            return Err(StallBoardError::InvalidInput(
                "this LINE account already has a store profile".to_string(),
            ));
        }

        for (kind, upload) in documents {
            self.storage.check(upload).map_err(|e| match e {
                StallBoardError::Validation { message, .. } => StallBoardError::Validation {
                    field: kind.column().to_string(),
                    message,
                },
                other => other,
            })?;
        }

        let mut request = form.to_new_exhibitor(&profile.user_id);
        for (kind, upload) in documents {
            let url = self
                .storage
                .upload_public(self.storage.documents_bucket(), &profile.user_id, kind.slug(), upload)
                .await?;
            request.set_document_url(*kind, url);
        }

        let exhibitor = self.database.exhibitors.create(&request).await?;
        info!(exhibitor_id = %exhibitor.id, user_id = %profile.user_id, "Exhibitor registered");
        log_user_action(&profile.user_id, "exhibitor_registered", Some(&exhibitor.id));
        Ok(exhibitor)
    }

    pub async fn redeem_invitation(&self, profile: &LineProfile, code: &str) -> Result<OrganizerMember> {
        self.invitations.redeem(profile, code).await
    }
}

/// One user's pass through the registration steps
#[derive(Debug)]
pub struct RegistrationWizard<F: RegistrationForm> {
    service: RegistrationService,
    profile: LineProfile,
    flow: RegistrationFlow,
    form: F,
    autosave: DraftAutosave,
}

impl<F: RegistrationForm> RegistrationWizard<F> {
    /// Open the wizard, restoring a saved draft into the form
    pub async fn start(service: RegistrationService, profile: LineProfile, flow: RegistrationFlow) -> Self {
        let autosave = service.autosave(&profile.user_id, F::form_type());
        let form = autosave.hydrate::<F>().await.unwrap_or_default();
        Self {
            service,
            profile,
            flow,
            form,
            autosave,
        }
    }

    pub fn step(&self) -> RegistrationStep {
        self.flow.step()
    }

    pub fn flow(&self) -> &RegistrationFlow {
        &self.flow
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn autosave(&self) -> &DraftAutosave {
        &self.autosave
    }

    pub fn choose_new_registration(&mut self) -> Result<()> {
        self.flow.choose_new_registration()
    }

    pub fn choose_invitation(&mut self) -> Result<()> {
        self.flow.choose_invitation()
    }

    /// Replace the form content while collecting; schedules a draft save
    pub fn update(&mut self, form: F) -> Result<()> {
        if self.flow.step() != RegistrationStep::Collect {
            return Err(StallBoardError::InvalidInput(format!(
                "the form cannot be edited at step {}",
                self.flow.step()
            )));
        }
        self.autosave.watch(&form);
        self.form = form;
        Ok(())
    }

    /// Validate and move to the confirmation step
    pub async fn confirm(&mut self) -> Result<()> {
        if self.flow.step() != RegistrationStep::Collect {
            return self.flow.confirm();
        }
        self.form.validate().into_result()?;
        self.flow.confirm()?;
        self.autosave.flush().await;
        Ok(())
    }

    pub fn back(&mut self) -> Result<()> {
        self.flow.back()
    }

    fn ensure_can_complete(&self) -> Result<()> {
        if self.flow.step() != RegistrationStep::Confirm {
            return Err(StallBoardError::InvalidStateTransition {
                from: self.flow.step().id().to_string(),
                to: RegistrationStep::Complete.id().to_string(),
            });
        }
        Ok(())
    }

    /// Join an organizer with a code from the invitation step
    pub async fn redeem(&mut self, code: &str) -> Result<OrganizerMember> {
        if self.flow.step() != RegistrationStep::InviteRedemption {
            return Err(StallBoardError::InvalidStateTransition {
                from: self.flow.step().id().to_string(),
                to: RegistrationStep::Complete.id().to_string(),
            });
        }
        let member = self.service.redeem_invitation(&self.profile, code).await?;
        self.flow.complete()?;
        self.autosave.clear().await;
        Ok(member)
    }
}

impl RegistrationWizard<OrganizerForm> {
    /// Submit the confirmed organizer registration
    pub async fn submit(&mut self) -> Result<Organizer> {
        self.ensure_can_complete()?;
        let organizer = self.service.register_organizer(&self.profile, &self.form).await?;
        self.flow.complete()?;
        self.autosave.clear().await;
        Ok(organizer)
    }
}

impl RegistrationWizard<ExhibitorForm> {
    /// Submit the confirmed store registration with its documents
    pub async fn submit(&mut self, documents: &[(DocumentKind, Upload)]) -> Result<Exhibitor> {
        self.ensure_can_complete()?;
        let exhibitor = self
            .service
            .register_exhibitor(&self.profile, &self.form, documents)
            .await?;
        self.flow.complete()?;
        self.autosave.clear().await;
        Ok(exhibitor)
    }
}
