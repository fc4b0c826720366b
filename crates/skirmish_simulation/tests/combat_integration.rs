//! Combat integration test
//!
//! Headless app + SimulationPlugin, stepped one FixedUpdate at a time.
//!
//! Checks:
//! - agents spot, chase and attack foes
//! - external events (stun, markers, life state) reach agents
//! - at most one active action per agent, at any tick

use bevy::prelude::*;
use skirmish_simulation::*;

/// Helper: full combat App with all plugins
fn create_combat_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);
    app
}

/// Helper: spawn an agent from the built-in game data
fn spawn_npc(app: &mut App, character: &str, position: Vec3, faction_id: u64) -> Entity {
    let data = app.world().resource::<GameData>().clone();
    spawn_agent(app.world_mut(), &data, character, position, faction_id).unwrap()
}

/// Helper: spawn a non-AI actor (training dummy)
fn spawn_dummy(app: &mut App, position: Vec3, faction_id: u64) -> Entity {
    app.world_mut()
        .spawn((Actor { faction_id }, Transform::from_translation(position)))
        .id()
}

fn run_ticks(app: &mut App, ticks: usize) -> Vec<AgentActionEvent> {
    let mut log = Vec::new();
    for _ in 0..ticks {
        step_simulation(app);
        log.extend(drain_action_events(app));
    }
    log
}

fn requests_by(log: &[AgentActionEvent], agent: Entity) -> Vec<&ActionRequest> {
    log.iter()
        .filter(|event| event.agent == agent)
        .filter_map(|event| match &event.event {
            ActionEvent::Requested(request) => Some(request),
            _ => None,
        })
        .collect()
}

#[test]
fn test_shipped_game_data_parses() {
    let data = GameData::from_ron_str(include_str!("../data/game_data.ron")).unwrap();
    for name in ["imp", "imp_mage", "imp_archer", "imp_boss"] {
        assert!(data.character(name).is_ok(), "missing character {}", name);
    }
}

#[test]
fn test_agent_spots_chases_and_slashes_dummy() {
    let mut app = create_combat_app(42);
    let imp = spawn_npc(&mut app, "imp", Vec3::ZERO, 1);
    let dummy = spawn_dummy(&mut app, Vec3::new(6.0, 0.0, 0.0), 2);

    let log = run_ticks(&mut app, 200);

    let requests = requests_by(&log, imp);
    assert!(!requests.is_empty(), "imp never attacked");
    assert!(requests.iter().all(|r| r.action == ActionId::Slash && r.target_ids == vec![dummy]));
    assert!(requests.iter().all(|r| r.should_close));

    // Chase first, then the Slash itself
    assert!(log.iter().any(|e| e.agent == imp
        && e.event
            == ActionEvent::Started {
                action: ActionId::GeneralChase,
                target_ids: vec![dummy]
            }));
    assert!(log.iter().any(|e| e.agent == imp
        && e.event
            == ActionEvent::Started {
                action: ActionId::Slash,
                target_ids: vec![dummy]
            }));

    let imp_pos = app.world().get::<Transform>(imp).unwrap().translation;
    assert!(imp_pos.distance(Vec3::new(6.0, 0.0, 0.0)) <= 2.0);
}

#[test]
fn test_agent_ignores_friends_and_far_actors() {
    let mut app = create_combat_app(7);
    let imp = spawn_npc(&mut app, "imp", Vec3::ZERO, 1);
    spawn_dummy(&mut app, Vec3::new(1.0, 0.0, 0.0), 1);
    spawn_dummy(&mut app, Vec3::new(30.0, 0.0, 0.0), 2);

    let log = run_ticks(&mut app, 120);

    assert!(requests_by(&log, imp).is_empty());
    let agent = app.world().get::<Agent>(imp).unwrap();
    assert_eq!(agent.brain().current_state(), Some(AiStateKind::Idle));
}

#[test]
fn test_dead_agent_stops_requesting() {
    let mut app = create_combat_app(42);
    let imp = spawn_npc(&mut app, "imp", Vec3::ZERO, 1);
    spawn_dummy(&mut app, Vec3::new(1.0, 0.0, 0.0), 2);

    let log = run_ticks(&mut app, 30);
    assert!(!requests_by(&log, imp).is_empty());

    *app.world_mut().get_mut::<LifeState>(imp).unwrap() = LifeState::Dead;
    let log = run_ticks(&mut app, 300);

    assert!(requests_by(&log, imp).is_empty());
    assert!(log
        .iter()
        .any(|e| e.agent == imp && e.event == ActionEvent::Canceled { forced: true }));

    let agent = app.world().get::<Agent>(imp).unwrap();
    assert_eq!(agent.brain().life_state(), LifeState::Dead);
    assert!(agent.player().active_action_info().is_none());
}

#[test]
fn test_fainted_agent_recovers_and_attacks_again() {
    let mut app = create_combat_app(42);
    let imp = spawn_npc(&mut app, "imp", Vec3::ZERO, 1);
    let dummy = spawn_dummy(&mut app, Vec3::new(1.0, 0.0, 0.0), 2);

    let log = run_ticks(&mut app, 30);
    assert!(!requests_by(&log, imp).is_empty());

    *app.world_mut().get_mut::<LifeState>(imp).unwrap() = LifeState::Fainted;
    let log = run_ticks(&mut app, 60);
    assert!(requests_by(&log, imp).is_empty());
    let agent = app.world().get::<Agent>(imp).unwrap();
    assert_eq!(agent.brain().current_state(), None);
    assert_eq!(agent.brain().attack().foe(), None);

    *app.world_mut().get_mut::<LifeState>(imp).unwrap() = LifeState::Alive;
    let log = run_ticks(&mut app, 60);

    let requests = requests_by(&log, imp);
    assert!(!requests.is_empty(), "imp never attacked after recovering");
    assert!(requests
        .iter()
        .all(|r| r.action == ActionId::Slash && r.target_ids == vec![dummy]));
    let agent = app.world().get::<Agent>(imp).unwrap();
    assert_eq!(agent.brain().life_state(), LifeState::Alive);
    assert_eq!(agent.brain().current_state(), Some(AiStateKind::Attack));
    assert_eq!(agent.brain().attack().foe(), Some(dummy));
}

#[test]
fn test_killed_foe_is_dropped() {
    let mut app = create_combat_app(42);
    let imp = spawn_npc(&mut app, "imp", Vec3::ZERO, 1);
    let dummy = spawn_dummy(&mut app, Vec3::new(1.0, 0.0, 0.0), 2);

    run_ticks(&mut app, 30);
    app.world_mut().despawn(dummy);
    let log = run_ticks(&mut app, 60);

    assert!(requests_by(&log, imp).is_empty());
    let agent = app.world().get::<Agent>(imp).unwrap();
    assert_eq!(agent.brain().current_state(), Some(AiStateKind::Idle));
    assert_eq!(agent.brain().attack().foe(), None);
}

#[test]
fn test_stun_event_suppresses_attacks() {
    let mut app = create_combat_app(42);
    let imp = spawn_npc(&mut app, "imp", Vec3::ZERO, 1);
    spawn_dummy(&mut app, Vec3::new(1.0, 0.0, 0.0), 2);
    run_ticks(&mut app, 5);

    app.world_mut().send_event(ExternalAiEvent {
        agent: imp,
        event: ExternalEvent::Stunned { duration: 1.0 },
    });

    // 1s at 60Hz
    let log = run_ticks(&mut app, 55);
    assert!(requests_by(&log, imp)
        .iter()
        .all(|request| request.action == ActionId::Stun));
    assert!(app.world().get::<Agent>(imp).unwrap().player().is_stunned());

    // Stun wears off, attacks resume
    let log = run_ticks(&mut app, 120);
    assert!(log.iter().any(|e| e.agent == imp
        && e.event
            == ActionEvent::Completed {
                action: ActionId::Stun
            }));
    assert!(requests_by(&log, imp)
        .iter()
        .any(|request| request.action == ActionId::Slash));
}

#[test]
fn test_animation_marker_triggers_impact() {
    let mut app = create_combat_app(42);
    let imp = spawn_npc(&mut app, "imp", Vec3::ZERO, 1);
    spawn_dummy(&mut app, Vec3::new(1.0, 0.0, 0.0), 2);

    // Tick 1: idle spots the dummy, tick 2: Slash starts
    run_ticks(&mut app, 2);
    let active = app
        .world()
        .get::<Agent>(imp)
        .unwrap()
        .player()
        .active_action_info()
        .cloned();
    assert_eq!(active.map(|info| info.action), Some(ActionId::Slash));

    app.world_mut().send_event(ExternalAiEvent {
        agent: imp,
        event: ExternalEvent::AnimationMarker("hit".to_string()),
    });
    let log = run_ticks(&mut app, 1);

    assert!(log.iter().any(|e| e.agent == imp
        && matches!(e.event, ActionEvent::Impact { action: ActionId::Slash, .. })));
}

#[test]
fn test_hit_reaction_makes_attacker_hated() {
    let mut app = create_combat_app(42);
    let imp = spawn_npc(&mut app, "imp", Vec3::ZERO, 1);
    // Outside detection range, inside engagement range
    let sniper = spawn_dummy(&mut app, Vec3::new(15.0, 0.0, 0.0), 2);

    run_ticks(&mut app, 10);
    assert!(!app.world().get::<Agent>(imp).unwrap().brain().perception().is_hated(sniper));

    app.world_mut().send_event(ExternalAiEvent {
        agent: imp,
        event: ExternalEvent::HitReaction {
            attacker: Some(sniper),
        },
    });
    let log = run_ticks(&mut app, 2);

    let agent = app.world().get::<Agent>(imp).unwrap();
    assert_eq!(agent.brain().current_state(), Some(AiStateKind::Attack));
    assert_eq!(agent.brain().attack().foe(), Some(sniper));
    assert_eq!(requests_by(&log, imp).len(), 1);
}

#[test]
fn test_two_groups_fight_1000_ticks() {
    let mut app = create_combat_app(42);
    let agents = [
        spawn_npc(&mut app, "imp_mage", Vec3::new(0.0, 0.0, 0.0), 1),
        spawn_npc(&mut app, "imp_archer", Vec3::new(1.0, 0.0, 2.0), 1),
        spawn_npc(&mut app, "imp_boss", Vec3::new(8.0, 0.0, 0.0), 2),
        spawn_npc(&mut app, "imp", Vec3::new(7.0, 0.0, -1.0), 2),
    ];

    for tick in 0..1000 {
        step_simulation(&mut app);
        let log = drain_action_events(&mut app);

        for agent in agents {
            // Every request targets an enemy, never ActionId::None
            for request in requests_by(&log, agent) {
                assert_ne!(request.action, ActionId::None, "tick {}", tick);
                let target = request.target_ids[0];
                let mine = app.world().get::<Actor>(agent).unwrap().faction_id;
                let theirs = app.world().get::<Actor>(target).unwrap().faction_id;
                assert_ne!(mine, theirs, "tick {}: friendly target", tick);
            }
        }
    }

    for agent in agents {
        let state = app.world().get::<Agent>(agent).unwrap().brain().current_state();
        assert_eq!(state, Some(AiStateKind::Attack));
    }
}

#[test]
fn test_inbound_event_queue_stays_bounded() {
    let mut app = create_combat_app(42);
    let imp = spawn_npc(&mut app, "imp", Vec3::ZERO, 1);
    spawn_dummy(&mut app, Vec3::new(1.0, 0.0, 0.0), 2);

    let mut log = Vec::new();
    for _ in 0..1000 {
        app.world_mut().send_event(ExternalAiEvent {
            agent: imp,
            event: ExternalEvent::AnimationMarker("hit".to_string()),
        });
        step_simulation(&mut app);
        log.extend(drain_action_events(&mut app));
    }

    // Only the last step's events are still buffered
    let pending = app.world().resource::<Events<ExternalAiEvent>>().len();
    assert!(pending <= 2, "{} inbound events still buffered", pending);

    // Delivery still works with the rotation in place
    assert!(log.iter().any(|e| e.agent == imp
        && matches!(e.event, ActionEvent::Impact { action: ActionId::Slash, .. })));
}
