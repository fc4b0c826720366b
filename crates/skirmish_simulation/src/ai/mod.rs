//! AI decision-making module
//!
//! Per agent: a brain (perception + Idle/Attack state machine) on top of an
//! Action Player. The ECS side only drives ticks and carries events.

use std::sync::Arc;

use bevy::prelude::*;

pub mod agent;
pub mod attack;
pub mod brain;
pub mod config;
pub mod events;
pub mod idle;
pub mod systems;


pub use agent::{Agent, ExternalEvent, TickContext};
pub use attack::AttackState;
pub use brain::{AiBrain, AiStateKind, Perception, STATE_PRIORITY};
pub use config::AiConfig;
pub use events::{AgentActionEvent, ExternalAiEvent};
pub use idle::IdleState;

use crate::actions::GameData;
use crate::components::Actor;
use crate::error::AiError;

/// AI Plugin
///
/// Registers AI systems in FixedUpdate for determinism.
/// Execution order:
/// 1. sync_life_state — LifeState changes → ExternalAiEvent
/// 2. apply_external_events — inbound events → agents
/// 3. tick_agents — brain + action player, ascending Entity order
/// 4. chase_movement — straight-line steering while chasing
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AiConfig>()
            .init_resource::<GameData>()
            .register_type::<AiConfig>()
            .add_event::<ExternalAiEvent>()
            .add_event::<AgentActionEvent>()
            .add_systems(
                FixedUpdate,
                (
                    systems::sync_life_state,
                    systems::apply_external_events,
                    systems::tick_agents,
                    systems::chase_movement,
                )
                    .chain(), // Sequential for determinism
            );
    }
}

/// Spawn an AI-controlled actor from a character template.
pub fn spawn_agent(
    world: &mut World,
    data: &GameData,
    character: &str,
    position: Vec3,
    faction_id: u64,
) -> Result<Entity, AiError> {
    let character = data.character(character)?.clone();
    let entity = world
        .spawn((Actor { faction_id }, Transform::from_translation(position)))
        .id();

    world
        .entity_mut(entity)
        .insert(Agent::new(entity, character, Arc::clone(data.actions())));

    crate::logger::log_info(&format!(
        "Spawned agent {:?} (faction {}) at {:?}",
        entity, faction_id, position
    ));
    Ok(entity)
}
