//! Skirmish Simulation Core
//!
//! Server-authoritative combat AI on Bevy 0.16 ECS:
//! - actions: action catalog, cooldowns, per-agent Action Player
//! - ai: perception, Idle/Attack state machine, ECS systems
//!
//! Rendering, animation playback, pathfinding and replication live outside;
//! they talk to the simulation through `ExternalAiEvent` / `AgentActionEvent`.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Public modules
pub mod actions;
pub mod ai;
pub mod components;
pub mod error;
pub mod logger;
pub mod world;

// Re-exports for convenience
pub use actions::{
    ActionCatalog, ActionDescription, ActionEvent, ActionId, ActionPlayer, ActionRequest,
    CharacterStaticData, GameData, Interruptibility, PlayOutcome,
};
pub use ai::{
    spawn_agent, AIPlugin, Agent, AgentActionEvent, AiConfig, AiStateKind, ExternalAiEvent,
    ExternalEvent,
};
pub use components::*;
pub use error::AiError;
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use world::{ActorView, WorldView};

/// Simulation tick rate (FixedUpdate)
pub const TICK_HZ: f64 = 60.0;

/// Main simulation plugin (all subsystems)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Keep a seed the host already chose
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.insert_resource(Time::<Fixed>::from_hz(TICK_HZ))
            .register_type::<Actor>()
            .register_type::<LifeState>()
            .register_type::<Stealthy>()
            .add_plugins(AIPlugin);
    }
}

/// Deterministic RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Minimal Bevy App for headless simulation.
///
/// Virtual time advances exactly one fixed step per `app.update()`.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(TICK_HZ))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / TICK_HZ,
        )));

    app
}

/// Run exactly one simulation step (FixedUpdate), bypassing frame timing.
///
/// `First` (and its event rotation) is skipped here, so the inbound queue is
/// rotated by hand: events sent before this step stay readable for one more.
pub fn step_simulation(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
    if let Some(mut inbound) = app.world_mut().get_resource_mut::<Events<ExternalAiEvent>>() {
        inbound.update();
    }
}

/// Take every action event published since the last call.
pub fn drain_action_events(app: &mut App) -> Vec<AgentActionEvent> {
    app.world_mut()
        .resource_mut::<Events<AgentActionEvent>>()
        .drain()
        .collect()
}

/// World snapshot for determinism comparisons
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Sort by Entity for a stable order
    entities.sort_by_key(|(entity, _)| *entity);

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.to_bits().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}

/// Byte encoding of an action event log (agent handle + Debug of the event).
pub fn action_log_bytes(events: &[AgentActionEvent]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for AgentActionEvent { agent, event } in events {
        bytes.extend_from_slice(&agent.to_bits().to_le_bytes());
        bytes.extend_from_slice(format!("{:?};", event).as_bytes());
    }
    bytes
}
