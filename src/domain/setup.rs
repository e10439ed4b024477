//! First-login setup gate for client-role users.
//!
//! The gate is derived from the persisted user record alone: the setup
//! status column is the single source of truth, so skipping on one browser
//! is honoured on every other one.

use serde::Serialize;
use thiserror::Error;

use crate::domain::types::{SetupStatus, UserRole};
use crate::domain::user::User;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupState {
    /// Session not resolved yet.
    #[default]
    Unknown,
    /// Client user without a linked hotel who has neither completed nor skipped setup.
    NeedsSetup,
    /// The setup form is on screen.
    SetupShown,
    /// Nothing left to do; the regular shell is rendered.
    Completed,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("setup cannot move from {from:?} via {event}")]
pub struct SetupTransitionError {
    pub from: SetupState,
    pub event: &'static str,
}

impl SetupState {
    /// Resolves the gate for `user`.
    pub fn resolve(user: &User) -> Self {
        let needs_setup = user.role == UserRole::Client
            && user.client_id.is_none()
            && user.setup_status == SetupStatus::Pending;
        if needs_setup {
            SetupState::NeedsSetup
        } else {
            SetupState::Completed
        }
    }

    pub fn requires_form(self) -> bool {
        matches!(self, SetupState::NeedsSetup | SetupState::SetupShown)
    }

    /// The form has been rendered.
    pub fn show(self) -> Result<Self, SetupTransitionError> {
        self.transition("show", SetupState::SetupShown)
    }

    /// The form was submitted and a client has been linked.
    pub fn complete(self) -> Result<Self, SetupTransitionError> {
        self.transition("complete", SetupState::Completed)
    }

    /// The user dismissed the form without creating a client.
    pub fn skip(self) -> Result<Self, SetupTransitionError> {
        self.transition("skip", SetupState::Completed)
    }

    /// Status persisted after a successful `complete` or `skip`.
    pub fn persisted_status(event: SetupEvent) -> SetupStatus {
        match event {
            SetupEvent::Complete => SetupStatus::Completed,
            SetupEvent::Skip => SetupStatus::Skipped,
        }
    }

    fn transition(self, event: &'static str, to: SetupState) -> Result<Self, SetupTransitionError> {
        if self.requires_form() {
            Ok(to)
        } else {
            Err(SetupTransitionError { from: self, event })
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetupEvent {
    Complete,
    Skip,
}
