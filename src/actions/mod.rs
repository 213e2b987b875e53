//! Form-driven mutations.
//!
//! Each action resolves to an [`ActionState`]; errors are folded into
//! `status = "error"` at the action boundary and never returned as `Err`.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{Error, Result};

pub mod groups;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Idle,
    Success,
    Error,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ActionState {
    pub status: ActionStatus,
    pub message: Option<String>,
}

impl Default for ActionState {
    fn default() -> Self {
        Self::idle()
    }
}

impl ActionState {
    pub fn idle() -> Self {
        Self {
            status: ActionStatus::Idle,
            message: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ActionStatus::Success,
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ActionStatus::Error,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ActionStatus::Success
    }
}

impl From<&Error> for ActionState {
    fn from(err: &Error) -> Self {
        let message = err.to_string();
        if message.trim().is_empty() {
            ActionState::error("Unexpected error")
        } else {
            ActionState::error(message)
        }
    }
}

fn finish(action: &'static str, outcome: Result<&'static str>) -> ActionState {
    match outcome {
        Ok(message) => ActionState::success(message),
        Err(err) => {
            warn!(action, "action failed: {err}");
            ActionState::from(&err)
        }
    }
}
