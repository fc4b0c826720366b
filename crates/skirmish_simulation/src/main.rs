//! Headless Skirmish simulation
//!
//! Runs a small fight without rendering and prints the action log summary.

use bevy::prelude::*;
use skirmish_simulation::{
    create_headless_app, drain_action_events, log_info, spawn_agent, step_simulation, ActionEvent,
    AiError, GameData, SimulationPlugin,
};

const GAME_DATA: &str = include_str!("../data/game_data.ron");

fn main() -> Result<(), AiError> {
    let seed = 42;
    let data = GameData::from_ron_str(GAME_DATA)?;

    let mut app = create_headless_app(seed);
    app.insert_resource(data.clone()).add_plugins(SimulationPlugin);
    log_info(&format!("Starting Skirmish headless simulation (seed: {})", seed));

    let world = app.world_mut();
    spawn_agent(world, &data, "imp_mage", Vec3::new(0.0, 0.0, 0.0), 1)?;
    spawn_agent(world, &data, "imp_archer", Vec3::new(2.0, 0.0, 1.0), 1)?;
    spawn_agent(world, &data, "imp_boss", Vec3::new(9.0, 0.0, 0.0), 2)?;
    spawn_agent(world, &data, "imp", Vec3::new(8.0, 0.0, -2.0), 2)?;

    let mut requested = 0;
    let mut impacts = 0;
    for tick in 0..1000 {
        step_simulation(&mut app);

        for event in drain_action_events(&mut app) {
            match event.event {
                ActionEvent::Requested(_) => requested += 1,
                ActionEvent::Impact { .. } => impacts += 1,
                _ => {}
            }
        }

        if tick % 100 == 0 {
            log_info(&format!("Tick {}: {} requests so far", tick, requested));
        }
    }

    log_info(&format!(
        "Simulation complete: {} requests, {} impacts",
        requested, impacts
    ));
    Ok(())
}
