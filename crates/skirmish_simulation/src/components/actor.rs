//! Core actor components: Actor (faction), LifeState, Stealthy.

use bevy::prelude::*;

use crate::error::AiError;

/// Any combatant the AI can perceive (heroes, NPCs, bosses).
///
/// Requires a `LifeState` so perception never sees a half-built actor.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(LifeState)]
pub struct Actor {
    /// Stable faction ID. Actors of different factions are hostile.
    pub faction_id: u64,
}

/// Replicated life state of an actor.
///
/// Fainted and Dead actors are never appropriate foes, and an agent that is
/// not Alive stops issuing action requests.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
#[repr(u8)]
pub enum LifeState {
    #[default]
    Alive = 0,
    Fainted = 1,
    Dead = 2,
}

impl LifeState {
    pub fn is_alive(self) -> bool {
        self == LifeState::Alive
    }
}

impl TryFrom<u8> for LifeState {
    type Error = AiError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LifeState::Alive),
            1 => Ok(LifeState::Fainted),
            2 => Ok(LifeState::Dead),
            other => Err(AiError::InvalidLifeState(other)),
        }
    }
}

/// Marker: actor is hidden from enemy AI (not an appropriate foe).
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Stealthy;
