//! Idle state: nobody to fight, watch for hostile actors.

use bevy::prelude::*;

use super::{AiConfig, Perception};
use crate::world::{ActorView, WorldView};

#[derive(Debug, Clone, Default)]
pub struct IdleState {
    /// Scratch: actors spotted this tick
    spotted: Vec<Entity>,
}

impl IdleState {
    /// Eligible while no hated enemy is appropriate.
    pub fn is_eligible<W: WorldView + ?Sized>(
        &self,
        perception: &Perception,
        world: &W,
        config: &AiConfig,
    ) -> bool {
        perception.hated_enemies(world, config).next().is_none()
    }

    pub fn initialize(&mut self) {
        self.spotted.clear();
    }

    /// Hate every appropriate actor within detection range.
    pub fn update<W: WorldView + ?Sized>(
        &mut self,
        perception: &mut Perception,
        world: &W,
        config: &AiConfig,
    ) {
        self.spotted.clear();
        let Some(me) = perception.my_character(world) else {
            return;
        };

        let detect_sq = config.detect_range * config.detect_range;
        let spotted = &mut self.spotted;
        let observer = &*perception;
        world.visit_actors(&mut |view: &ActorView| {
            if me.distance_squared(view) <= detect_sq
                && observer.is_appropriate_view(&me, view, config)
            {
                spotted.push(view.entity);
            }
        });

        for foe in self.spotted.iter().copied() {
            if perception.hate(foe) {
                crate::logger::log(&format!("{:?} spotted enemy {:?}", perception.me(), foe));
            }
        }
    }
}
