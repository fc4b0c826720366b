//! Action identifiers.

use serde::{Deserialize, Serialize};

use crate::error::AiError;

/// Kind of action an actor can perform.
///
/// `None` marks an empty skill slot and is never submitted as a request.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum ActionId {
    #[default]
    None = 0,
    /// Close distance to the first target (synthesized for `should_close` requests)
    GeneralChase = 1,
    /// Incapacitated; nothing else runs until it expires
    Stun = 2,
    Slash = 3,
    Cleave = 4,
    Fireball = 5,
    ArrowVolley = 6,
    ChargedShot = 7,
    ShieldBash = 8,
    Trample = 9,
}

/// How the Action Player runs an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionLogic {
    Chase,
    Stun,
    Skill,
}

impl ActionId {
    pub fn logic(self) -> Result<ActionLogic, AiError> {
        match self {
            ActionId::None => Err(AiError::InvalidState(
                "ActionId::None has no action logic".to_string(),
            )),
            ActionId::GeneralChase => Ok(ActionLogic::Chase),
            ActionId::Stun => Ok(ActionLogic::Stun),
            ActionId::Slash
            | ActionId::Cleave
            | ActionId::Fireball
            | ActionId::ArrowVolley
            | ActionId::ChargedShot
            | ActionId::ShieldBash
            | ActionId::Trample => Ok(ActionLogic::Skill),
        }
    }
}

impl TryFrom<u8> for ActionId {
    type Error = AiError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let id = match value {
            0 => ActionId::None,
            1 => ActionId::GeneralChase,
            2 => ActionId::Stun,
            3 => ActionId::Slash,
            4 => ActionId::Cleave,
            5 => ActionId::Fireball,
            6 => ActionId::ArrowVolley,
            7 => ActionId::ChargedShot,
            8 => ActionId::ShieldBash,
            9 => ActionId::Trample,
            other => return Err(AiError::InvalidActionId(other)),
        };
        Ok(id)
    }
}
