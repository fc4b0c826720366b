//! AI events at the ECS boundary.
//!
//! Inside the core, notifications are plain method calls on `Agent`.
//! These Bevy events only carry them in and out of the simulation.

use bevy::prelude::*;

use super::ExternalEvent;
use crate::actions::ActionEvent;

/// Host → agent: animation markers, hits, stuns, life-state changes.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ExternalAiEvent {
    pub agent: Entity,
    pub event: ExternalEvent,
}

/// Agent → execution/animation layer.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AgentActionEvent {
    pub agent: Entity,
    pub event: ActionEvent,
}
