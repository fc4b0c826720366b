//! AI systems (FixedUpdate, chained).

use std::collections::BTreeMap;

use bevy::prelude::*;

use super::{Agent, AgentActionEvent, AiConfig, ExternalAiEvent, ExternalEvent, TickContext};
use crate::actions::{ActionEvent, ActionPhase};
use crate::components::{Actor, LifeState};
use crate::world::{ActorQueryData, EcsWorldView};
use crate::DeterministicRng;

/// System: forward `LifeState` component changes to the owning agent.
pub fn sync_life_state(
    changed: Query<(Entity, &LifeState), (With<Agent>, Changed<LifeState>)>,
    mut external: EventWriter<ExternalAiEvent>,
) {
    let mut changed: Vec<_> = changed.iter().map(|(entity, state)| (entity, *state)).collect();
    changed.sort_by_key(|(entity, _)| *entity);

    for (agent, life_state) in changed {
        external.write(ExternalAiEvent {
            agent,
            event: ExternalEvent::LifeStateChanged(life_state),
        });
    }
}

/// System: deliver inbound events to agents, in arrival order.
pub fn apply_external_events(
    mut external: EventReader<ExternalAiEvent>,
    mut agents: Query<&mut Agent>,
    actors: Query<ActorQueryData>,
    config: Res<AiConfig>,
    mut rng: ResMut<DeterministicRng>,
    mut outbound: EventWriter<AgentActionEvent>,
) {
    let world = EcsWorldView::new(&actors);
    let mut events = Vec::new();

    for ExternalAiEvent { agent, event } in external.read() {
        let Ok(mut target) = agents.get_mut(*agent) else {
            // Despawned since the event was sent
            continue;
        };

        let mut cx = TickContext {
            world: &world,
            config: &config,
            rng: &mut rng.rng,
            events: &mut events,
        };
        target.notify_external_event(event.clone(), &mut cx);
        publish(*agent, &mut events, &mut outbound);
    }
}

/// System: tick every agent once, in ascending `Entity` order.
pub fn tick_agents(
    mut agents: Query<(Entity, &mut Agent)>,
    actors: Query<ActorQueryData>,
    config: Res<AiConfig>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
    mut outbound: EventWriter<AgentActionEvent>,
) {
    // Fixed step, not the frame delta: same ticks → same result
    let dt = time.timestep().as_secs_f32();
    let world = EcsWorldView::new(&actors);

    let mut order: Vec<Entity> = agents.iter().map(|(entity, _)| entity).collect();
    order.sort();

    let mut events = Vec::new();
    for entity in order {
        let Ok((_, mut agent)) = agents.get_mut(entity) else {
            continue;
        };

        let mut cx = TickContext {
            world: &world,
            config: &config,
            rng: &mut rng.rng,
            events: &mut events,
        };
        if let Err(err) = agent.tick(dt, &mut cx) {
            let message = format!("Agent {:?}: tick failed: {}", entity, err);
            if err.is_invalid_state() {
                crate::logger::log_error(&message);
            } else {
                crate::logger::log_warning(&message);
            }
        }
        publish(entity, &mut events, &mut outbound);
    }
}

/// System: straight-line steering for agents whose active action is a chase.
///
/// Pathfinding lives outside the simulation; this only closes distance in
/// headless runs.
pub fn chase_movement(
    mut actors: Query<(Entity, &mut Transform, Option<&Agent>), With<Actor>>,
    config: Res<AiConfig>,
    time: Res<Time<Fixed>>,
) {
    let step = config.chase_speed * time.timestep().as_secs_f32();

    let positions: BTreeMap<Entity, Vec3> = actors
        .iter()
        .map(|(entity, transform, _)| (entity, transform.translation))
        .collect();

    for (_entity, mut transform, agent) in actors.iter_mut() {
        let Some(agent) = agent else {
            continue;
        };
        let Some(ActionPhase::Chasing { range }) = agent.player().active_phase() else {
            continue;
        };
        let Some(target) = agent
            .player()
            .active_action_info()
            .and_then(|info| info.target_ids.first())
            .and_then(|target| positions.get(target))
        else {
            continue;
        };

        // Stop a little inside the range so the chase can complete
        let stop_distance = *range * 0.9;
        let to_target = *target - transform.translation;
        let distance = to_target.length();
        if distance > stop_distance {
            let travel = (distance - stop_distance).min(step);
            transform.translation += to_target.normalize_or_zero() * travel;
        }
    }
}

fn publish(
    agent: Entity,
    events: &mut Vec<ActionEvent>,
    outbound: &mut EventWriter<AgentActionEvent>,
) {
    outbound.write_batch(events.drain(..).map(|event| AgentActionEvent { agent, event }));
}
