//! Registration flow
//!
//! A user either fills in a new registration (collect, confirm, complete) or
//! redeems an invitation code. Only the transitions listed in
//! [`RegistrationStep::next_steps`] are allowed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::errors::{Result, StallBoardError};

/// Steps of the registration flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStep {
    /// Choose between a new registration and an invitation code
    EntrySelection,
    /// Fill in the registration form
    Collect,
    /// Review the normalized values before submitting
    Confirm,
    /// Type an invitation code
    InviteRedemption,
    Complete,
}

impl RegistrationStep {
    pub fn id(&self) -> &'static str {
        match self {
            RegistrationStep::EntrySelection => "entry_selection",
            RegistrationStep::Collect => "new_registration.collect",
            RegistrationStep::Confirm => "new_registration.confirm",
            RegistrationStep::InviteRedemption => "invite_redemption",
            RegistrationStep::Complete => "complete",
        }
    }

    /// Steps reachable from this one
    pub fn next_steps(&self) -> &'static [RegistrationStep] {
        use RegistrationStep::*;
        match self {
            EntrySelection => &[Collect, InviteRedemption],
            Collect => &[Confirm],
            Confirm => &[Collect, Complete],
            InviteRedemption => &[Complete],
            Complete => &[],
        }
    }

    pub fn can_move_to(&self, next: RegistrationStep) -> bool {
        self.next_steps().contains(&next)
    }
}

impl fmt::Display for RegistrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Which way the user chose to register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationPath {
    NewRegistration,
    Invitation,
}

/// Current position in the registration flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationFlow {
    step: RegistrationStep,
    path: Option<RegistrationPath>,
}

impl Default for RegistrationFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationFlow {
    pub fn new() -> Self {
        Self {
            step: RegistrationStep::EntrySelection,
            path: None,
        }
    }

    /// Start directly in the form, for consoles without invitations
    pub fn new_registration() -> Self {
        Self {
            step: RegistrationStep::Collect,
            path: Some(RegistrationPath::NewRegistration),
        }
    }

    pub fn step(&self) -> RegistrationStep {
        self.step
    }

    pub fn path(&self) -> Option<RegistrationPath> {
        self.path
    }

    pub fn is_complete(&self) -> bool {
        self.step == RegistrationStep::Complete
    }

    /// Move to `next`, rejecting anything not in the transition table
    pub fn transition(&mut self, next: RegistrationStep) -> Result<()> {
        if !self.step.can_move_to(next) {
            return Err(StallBoardError::InvalidStateTransition {
                from: self.step.id().to_string(),
                to: next.id().to_string(),
            });
        }

        match next {
            RegistrationStep::Collect if self.step == RegistrationStep::EntrySelection => {
                self.path = Some(RegistrationPath::NewRegistration);
            }
            RegistrationStep::InviteRedemption => self.path = Some(RegistrationPath::Invitation),
            _ => {}
        }

        self.step = next;
        Ok(())
    }

    pub fn choose_new_registration(&mut self) -> Result<()> {
        self.transition(RegistrationStep::Collect)
    }

    pub fn choose_invitation(&mut self) -> Result<()> {
        self.transition(RegistrationStep::InviteRedemption)
    }

    pub fn confirm(&mut self) -> Result<()> {
        self.transition(RegistrationStep::Confirm)
    }

    /// Back from the confirmation screen to the form
    pub fn back(&mut self) -> Result<()> {
        self.transition(RegistrationStep::Collect)
    }

    pub fn complete(&mut self) -> Result<()> {
        self.transition(RegistrationStep::Complete)
    }
}
