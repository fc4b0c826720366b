//! AI Brain: perception + state arbitration for one agent.

use std::collections::BTreeSet;

use bevy::prelude::*;

use super::{AiConfig, AttackState, IdleState, TickContext};
use crate::actions::{ActionEvent, ActionPlayer, CharacterStaticData};
use crate::components::LifeState;
use crate::error::AiError;
use crate::world::{ActorView, WorldView};

/// Mutually exclusive behavior states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum AiStateKind {
    Idle,
    Attack,
}

/// Arbitration order: first eligible state wins.
pub const STATE_PRIORITY: [AiStateKind; 2] = [AiStateKind::Attack, AiStateKind::Idle];

/// Who this agent hates, and whether they are still worth fighting.
///
/// The hated set only stores `Entity` handles. Every read goes through the
/// world view, so a despawned foe simply stops showing up.
#[derive(Debug, Clone)]
pub struct Perception {
    me: Entity,
    hated: BTreeSet<Entity>,
}

impl Perception {
    pub fn new(me: Entity) -> Self {
        Self {
            me,
            hated: BTreeSet::new(),
        }
    }

    pub fn me(&self) -> Entity {
        self.me
    }

    pub fn hate(&mut self, foe: Entity) -> bool {
        foe != self.me && self.hated.insert(foe)
    }

    pub fn is_hated(&self, foe: Entity) -> bool {
        self.hated.contains(&foe)
    }

    /// Own actor snapshot (position, faction).
    pub fn my_character<W: WorldView + ?Sized>(&self, world: &W) -> Option<ActorView> {
        world.actor(self.me)
    }

    /// Hostile, alive, visible and within engagement range.
    pub fn is_appropriate_foe<W: WorldView + ?Sized>(
        &self,
        foe: Entity,
        world: &W,
        config: &AiConfig,
    ) -> bool {
        match (self.my_character(world), world.actor(foe)) {
            (Some(me), Some(foe)) => self.is_appropriate_view(&me, &foe, config),
            _ => false,
        }
    }

    pub fn is_appropriate_view(&self, me: &ActorView, foe: &ActorView, config: &AiConfig) -> bool {
        if foe.entity == self.me || foe.faction_id == me.faction_id {
            return false;
        }
        if !foe.life_state.is_alive() || foe.stealthy {
            return false;
        }
        match config.max_engagement_range {
            Some(range) => me.distance_squared(foe) <= range * range,
            None => true,
        }
    }

    /// Appropriate hated foes in ascending `Entity` order.
    ///
    /// Lazy and restartable: call again for a fresh pass.
    pub fn hated_enemies<'a, W: WorldView + ?Sized>(
        &'a self,
        world: &'a W,
        config: &'a AiConfig,
    ) -> impl Iterator<Item = ActorView> + 'a {
        let me = self.my_character(world);
        self.hated.iter().filter_map(move |foe| {
            let me = me.as_ref()?;
            let foe = world.actor(*foe)?;
            self.is_appropriate_view(me, &foe, config).then_some(foe)
        })
    }

    /// Forget hated entities that are no longer appropriate.
    pub fn purge<W: WorldView + ?Sized>(&mut self, world: &W, config: &AiConfig) {
        let Some(me) = self.my_character(world) else {
            self.hated.clear();
            return;
        };
        let hated = std::mem::take(&mut self.hated);
        self.hated = hated
            .into_iter()
            .filter(|foe| {
                world
                    .actor(*foe)
                    .is_some_and(|view| self.is_appropriate_view(&me, &view, config))
            })
            .collect();
    }
}

#[derive(Debug, Clone)]
pub struct AiBrain {
    perception: Perception,
    character: CharacterStaticData,
    life_state: LifeState,
    current: Option<AiStateKind>,
    idle: IdleState,
    attack: AttackState,
}

impl AiBrain {
    pub fn new(me: Entity, character: CharacterStaticData) -> Self {
        Self {
            perception: Perception::new(me),
            character,
            life_state: LifeState::Alive,
            current: None,
            idle: IdleState::default(),
            attack: AttackState::default(),
        }
    }

    pub fn perception(&self) -> &Perception {
        &self.perception
    }

    pub fn perception_mut(&mut self) -> &mut Perception {
        &mut self.perception
    }

    pub fn character(&self) -> &CharacterStaticData {
        &self.character
    }

    pub fn life_state(&self) -> LifeState {
        self.life_state
    }

    pub fn current_state(&self) -> Option<AiStateKind> {
        self.current
    }

    pub fn attack(&self) -> &AttackState {
        &self.attack
    }

    /// Leaving Alive cancels everything the agent was doing, stun included.
    pub fn set_life_state(
        &mut self,
        life_state: LifeState,
        player: &mut ActionPlayer,
        events: &mut Vec<ActionEvent>,
    ) {
        if self.life_state == life_state {
            return;
        }
        crate::logger::log(&format!(
            "AiBrain {:?}: life state {:?} → {:?}",
            self.perception.me, self.life_state, life_state
        ));
        self.life_state = life_state;

        if !life_state.is_alive() {
            player.cancel_all(events);
            self.leave_current();
        }
    }

    pub fn is_eligible<W: WorldView + ?Sized>(
        &self,
        kind: AiStateKind,
        world: &W,
        config: &AiConfig,
    ) -> bool {
        match kind {
            AiStateKind::Idle => self.idle.is_eligible(&self.perception, world, config),
            AiStateKind::Attack => self.attack.is_eligible(&self.perception, world, config),
        }
    }

    /// Re-arbitrate if needed, then run the current state.
    pub fn update<W: WorldView + ?Sized>(
        &mut self,
        player: &mut ActionPlayer,
        cx: &mut TickContext<'_, W>,
    ) -> Result<(), AiError> {
        if !self.life_state.is_alive() {
            return Ok(());
        }

        self.perception.purge(cx.world, cx.config);

        let keep_current = self
            .current
            .is_some_and(|kind| self.is_eligible(kind, cx.world, cx.config));
        if !keep_current {
            let next = STATE_PRIORITY
                .into_iter()
                .find(|kind| self.is_eligible(*kind, cx.world, cx.config));
            if next != self.current {
                crate::logger::log(&format!(
                    "AiBrain {:?}: {:?} → {:?}",
                    self.perception.me, self.current, next
                ));
            }
            self.leave_current();
            self.current = next;
            if let Some(kind) = next {
                self.initialize(kind, cx);
            }
        }

        match self.current {
            Some(AiStateKind::Idle) => {
                self.idle.update(&mut self.perception, cx.world, cx.config);
                Ok(())
            }
            Some(AiStateKind::Attack) => self.attack.update(&self.perception, player, cx),
            // No eligible state: nothing to do this tick
            None => Ok(()),
        }
    }

    fn leave_current(&mut self) {
        if self.current.take() == Some(AiStateKind::Attack) {
            self.attack.exit();
        }
    }

    fn initialize<W: WorldView + ?Sized>(
        &mut self,
        kind: AiStateKind,
        cx: &mut TickContext<'_, W>,
    ) {
        match kind {
            AiStateKind::Idle => self.idle.initialize(),
            AiStateKind::Attack => self.attack.initialize(&self.character, &mut *cx.rng),
        }
    }
}
