//! Organizer invitation model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use super::organizer::MemberRole;
use crate::utils::errors::{Result, StallBoardError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizerInvitation {
    pub id: String,
    pub organizer_id: String,
    pub code: String,
    pub role: MemberRole,
    pub status: InvitationStatus,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub used_by: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvitation {
    pub organizer_id: String,
    pub code: String,
    pub role: MemberRole,
    pub status: InvitationStatus,
    pub expires_at: DateTime<Utc>,
    pub created_by: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Active,
    Used,
    Revoked,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Active => "active",
            InvitationStatus::Used => "used",
            InvitationStatus::Revoked => "revoked",
        }
    }
}

impl OrganizerInvitation {
    /// Check that the invitation can still be redeemed at `now`
    ///
    /// A revoked code reads as used to the person typing it.
    pub fn check_redeemable(&self, now: DateTime<Utc>) -> Result<()> {
        if self.used_at.is_some() || self.status != InvitationStatus::Active {
            return Err(StallBoardError::InvitationAlreadyUsed);
        }
        if self.expires_at <= now {
            return Err(StallBoardError::InvitationExpired);
        }
        Ok(())
    }
}
