//! Organizer access service
//!
//! Resolves which organizer a LINE user belongs to and guards organizer
//! operations by membership and role.

use std::sync::Arc;

use tracing::debug;

use crate::database::DatabaseService;
use crate::models::organizer::{MemberRole, OrganizerMember};
use crate::state::router::OrganizerAccess;
use crate::utils::errors::{Result, StallBoardError};

#[derive(Clone, Debug)]
pub struct OrganizerService {
    database: Arc<DatabaseService>,
}

impl OrganizerService {
    pub fn new(database: Arc<DatabaseService>) -> Self {
        Self { database }
    }

    /// The organizer a user registered or joined, if any
    ///
    /// The user's own registration wins over memberships; among memberships
    /// the earliest one is used.
    pub async fn access_for(&self, line_user_id: &str) -> Result<Option<OrganizerAccess>> {
        if let Some(organizer) = self.database.organizers.find_by_line_user(line_user_id).await? {
            return Ok(Some(OrganizerAccess {
                organizer,
                role: MemberRole::Owner,
            }));
        }

        for membership in self.database.organizers.memberships_of(line_user_id).await? {
            if let Some(organizer) = self.database.organizers.find_by_id(&membership.organizer_id).await? {
                return Ok(Some(OrganizerAccess {
                    organizer,
                    role: membership.role,
                }));
            }
            debug!(organizer_id = %membership.organizer_id, "Membership points at a missing organizer");
        }

        Ok(None)
    }

    /// The user's access to one specific organizer
    pub async fn require_access(&self, line_user_id: &str, organizer_id: &str) -> Result<OrganizerAccess> {
        let organizer = self
            .database
            .organizers
            .find_by_id(organizer_id)
            .await?
            .ok_or_else(|| StallBoardError::OrganizerNotFound {
                organizer_id: organizer_id.to_string(),
            })?;

        let role = if organizer.line_user_id == line_user_id {
            MemberRole::Owner
        } else {
            self.database
                .organizers
                .find_membership(organizer_id, line_user_id)
                .await?
                .map(|m| m.role)
                .ok_or_else(|| StallBoardError::PermissionDenied("not a member of this organizer".to_string()))?
        };

        Ok(OrganizerAccess { organizer, role })
    }

    /// Access of an approved organizer; pending organizers are read-only
    pub async fn require_approved(&self, line_user_id: &str, organizer_id: &str) -> Result<OrganizerAccess> {
        let access = self.require_access(line_user_id, organizer_id).await?;
        if !access.organizer.is_approved {
            return Err(StallBoardError::PermissionDenied("organizer is awaiting approval".to_string()));
        }
        Ok(access)
    }

    /// Access of an owner or admin
    pub async fn require_manager(&self, line_user_id: &str, organizer_id: &str) -> Result<OrganizerAccess> {
        let access = self.require_access(line_user_id, organizer_id).await?;
        if !access.can_manage() {
            return Err(StallBoardError::PermissionDenied("owner or admin role required".to_string()));
        }
        Ok(access)
    }

    pub async fn members(&self, line_user_id: &str, organizer_id: &str) -> Result<Vec<OrganizerMember>> {
        self.require_access(line_user_id, organizer_id).await?;
        self.database.organizers.members(organizer_id).await
    }
}
