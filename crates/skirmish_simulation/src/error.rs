//! Error taxonomy of the AI core.
//!
//! Only data/catalog inconsistencies are errors. "No eligible state" and
//! "no usable action" are steady states and never reach this type.

use thiserror::Error;

use crate::actions::ActionId;

#[derive(Debug, Error)]
pub enum AiError {
    /// A value reached a selection point it cannot be handled at.
    #[error("invalid AI state: {0}")]
    InvalidState(String),

    #[error("unrecognized life state value {0}")]
    InvalidLifeState(u8),

    #[error("unrecognized action identifier value {0}")]
    InvalidActionId(u8),

    #[error("action {0:?} has no description in the action catalog")]
    UndescribedAction(ActionId),

    #[error("unknown character template '{0}'")]
    UnknownCharacter(String),

    #[error("failed to parse game data: {0}")]
    Catalog(#[from] ron::error::SpannedError),
}

impl AiError {
    /// True for errors that indicate an upstream data inconsistency and
    /// must be reported loudly by the host loop.
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            AiError::InvalidState(_)
                | AiError::InvalidLifeState(_)
                | AiError::InvalidActionId(_)
                | AiError::UndescribedAction(_)
        )
    }
}
