//! Organizer invitation service
//!
//! Owners and admins issue short codes that let another LINE user join their
//! organizer. Redemption inserts the membership and then marks the code as
//! used; the two writes are separate requests.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, info, warn};

use super::auth::LineProfile;
use super::organizer::OrganizerService;
use crate::config::settings::InvitationConfig;
use crate::database::DatabaseService;
use crate::models::invitation::{InvitationStatus, NewInvitation, OrganizerInvitation};
use crate::models::organizer::{MemberRole, NewOrganizerMember, OrganizerMember};
use crate::utils::errors::{Result, StallBoardError, StoreError};
use crate::utils::helpers::{generate_invite_code, normalize_invite_code};
use crate::utils::logging::log_user_action;

/// Attempts at finding an unused code before giving up
const CODE_ATTEMPTS: usize = 5;

#[derive(Clone, Debug)]
pub struct InvitationService {
    database: Arc<DatabaseService>,
    organizers: OrganizerService,
    config: InvitationConfig,
}

impl InvitationService {
    pub fn new(database: Arc<DatabaseService>, organizers: OrganizerService, config: InvitationConfig) -> Self {
        Self {
            database,
            organizers,
            config,
        }
    }

    /// Issue a new code for `organizer_id`
    pub async fn create(
        &self,
        profile: &LineProfile,
        organizer_id: &str,
        role: MemberRole,
    ) -> Result<OrganizerInvitation> {
        if role == MemberRole::Owner {
            return Err(StallBoardError::InvalidInput(
                "invitations can grant the admin or member role only".to_string(),
            ));
        }
        self.organizers.require_manager(&profile.user_id, organizer_id).await?;

        let expires_at = Utc::now() + Duration::days(self.config.ttl_days);
        for attempt in 1..=CODE_ATTEMPTS {
            let request = NewInvitation {
                organizer_id: organizer_id.to_string(),
                code: generate_invite_code(self.config.code_length),
                role,
                status: InvitationStatus::Active,
                expires_at,
                created_by: profile.user_id.clone(),
            };

            match self.database.invitations.create(&request).await {
                Ok(invitation) => {
                    log_user_action(
                        &profile.user_id,
                        "invitation_created",
                        Some(&format!("organizer={} role={}", organizer_id, role.as_str())),
                    );
                    return Ok(invitation);
                }
                Err(StoreError::Conflict { .. }) => {
                    warn!(attempt = attempt, "Invitation code collided, generating another");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(StallBoardError::InvalidInput(
            "could not generate a unique invitation code".to_string(),
        ))
    }

    /// Codes issued by an organizer, newest first
    pub async fn list(&self, profile: &LineProfile, organizer_id: &str) -> Result<Vec<OrganizerInvitation>> {
        self.organizers.require_manager(&profile.user_id, organizer_id).await?;
        self.database.invitations.list_for_organizer(organizer_id).await
    }

    /// Revoke an active code and return the refreshed list
    pub async fn revoke(
        &self,
        profile: &LineProfile,
        organizer_id: &str,
        invitation_id: &str,
    ) -> Result<Vec<OrganizerInvitation>> {
        self.organizers.require_manager(&profile.user_id, organizer_id).await?;

        let revoked = self.database.invitations.revoke(organizer_id, invitation_id).await?;
        if revoked.is_empty() {
            return Err(StallBoardError::InvalidInput(
                "invitation is not active".to_string(),
            ));
        }
        log_user_action(&profile.user_id, "invitation_revoked", Some(invitation_id));

        self.database.invitations.list_for_organizer(organizer_id).await
    }

    /// Join an organizer with an invitation code
    ///
    /// A code redeems at most once. If the membership is stored but the code
    /// cannot be marked as used afterwards, `InvitationMarkFailed` is returned
    /// and the membership is kept.
    pub async fn redeem(&self, profile: &LineProfile, raw_code: &str) -> Result<OrganizerMember> {
        let code = normalize_invite_code(raw_code);
        if code.is_empty() {
            return Err(StallBoardError::Validation {
                field: "code".to_string(),
                message: "Invitation code is required".to_string(),
            });
        }

        let invitation = self
            .database
            .invitations
            .find_by_code(&code)
            .await?
            .ok_or(StallBoardError::InvitationNotFound)?;

        let now = Utc::now();
        invitation.check_redeemable(now)?;

        let organizer = self
            .database
            .organizers
            .find_by_id(&invitation.organizer_id)
            .await?
            .ok_or_else(|| StallBoardError::OrganizerNotFound {
                organizer_id: invitation.organizer_id.clone(),
            })?;

        if organizer.line_user_id == profile.user_id
            || self
                .database
                .organizers
                .find_membership(&organizer.id, &profile.user_id)
                .await?
                .is_some()
        {
            return Err(StallBoardError::AlreadyMember);
        }

        let member = self
            .database
            .organizers
            .add_member(&NewOrganizerMember {
                organizer_id: organizer.id.clone(),
                line_user_id: profile.user_id.clone(),
                display_name: Some(profile.display_name.clone()),
                role: invitation.role,
                invitation_id: Some(invitation.id.clone()),
            })
            .await
            .map_err(|e| match e {
                StallBoardError::Store(StoreError::Conflict { .. }) => StallBoardError::AlreadyMember,
                other => other,
            })?;

        if let Err(source) = self
            .database
            .invitations
            .mark_used(&invitation.id, &profile.user_id, now)
            .await
        {
            error!(
                member_id = %member.id,
                invitation_id = %invitation.id,
                error = %source,
                "Membership created but invitation could not be marked as used"
            );
            return Err(StallBoardError::InvitationMarkFailed {
                member_id: member.id,
                invitation_id: invitation.id,
                source,
            });
        }

        info!(
            user_id = %profile.user_id,
            organizer_id = %organizer.id,
            role = invitation.role.as_str(),
            "Invitation redeemed"
        );
        log_user_action(&profile.user_id, "invitation_redeemed", Some(&organizer.id));
        Ok(member)
    }
}
