//! Attack state: pick the nearest hated foe and keep hitting it.
//!
//! Per tick:
//! 1. Foe gone/inappropriate → pick the nearest hated enemy, force-clear actions
//! 2. No foe → wait for the brain to switch state
//! 3. Busy chasing/attacking the foe, or stunned → wait
//! 4. Pick a usable attack (random among those off cooldown), none → wait
//! 5. Request it against the foe, closing distance first

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::RngCore;

use super::{AiConfig, Perception, TickContext};
use crate::actions::{ActionId, ActionPlayer, ActionRequest, CharacterStaticData};
use crate::error::AiError;
use crate::world::WorldView;

#[derive(Debug, Clone, Default)]
pub struct AttackState {
    foe: Option<Entity>,
    current_attack: Option<ActionId>,
    /// Non-empty skill slots of the character, in slot order
    attack_actions: Vec<ActionId>,
    /// Scratch: attacks off cooldown, rebuilt on every choice
    usable: Vec<ActionId>,
}

impl AttackState {
    pub fn foe(&self) -> Option<Entity> {
        self.foe
    }

    pub fn current_attack(&self) -> Option<ActionId> {
        self.current_attack
    }

    pub fn attack_actions(&self) -> &[ActionId] {
        &self.attack_actions
    }

    /// Eligible while the current foe holds or another one can be chosen.
    pub fn is_eligible<W: WorldView + ?Sized>(
        &self,
        perception: &Perception,
        world: &W,
        config: &AiConfig,
    ) -> bool {
        if self
            .foe
            .is_some_and(|foe| perception.is_appropriate_foe(foe, world, config))
        {
            return true;
        }
        perception.hated_enemies(world, config).next().is_some()
    }

    pub fn initialize(&mut self, character: &CharacterStaticData, rng: &mut dyn RngCore) {
        self.attack_actions.clear();
        self.attack_actions.extend(character.skills());
        self.current_attack = self.attack_actions.choose(rng).copied();
        self.foe = None;
    }

    /// Foe loss outside `update` (state switched away, agent died).
    pub fn exit(&mut self) {
        self.foe = None;
    }

    pub fn update<W: WorldView + ?Sized>(
        &mut self,
        perception: &Perception,
        player: &mut ActionPlayer,
        cx: &mut TickContext<'_, W>,
    ) -> Result<(), AiError> {
        let foe_holds = self
            .foe
            .is_some_and(|foe| perception.is_appropriate_foe(foe, cx.world, cx.config));
        if !foe_holds {
            self.foe = Self::choose_foe(perception, cx.world, cx.config);
            // Whatever was in flight targeted the old foe
            player.clear_actions(true, cx.events);
        }

        let Some(foe) = self.foe else {
            return Ok(());
        };

        if let Some(active) = player.active_action_info() {
            let busy = match active.action {
                ActionId::GeneralChase => active.targets(foe),
                ActionId::Stun => true,
                action => self.current_attack == Some(action) && active.targets(foe),
            };
            if busy {
                return Ok(());
            }
        }

        let Some(attack) = self.choose_attack(player, &mut *cx.rng) else {
            return Ok(());
        };
        self.current_attack = Some(attack);

        player.play_action(ActionRequest::attack(attack, foe), cx.world, cx.events)?;
        Ok(())
    }

    /// Nearest appropriate hated enemy. Equal distances keep the first one
    /// enumerated (lowest `Entity`).
    pub fn choose_foe<W: WorldView + ?Sized>(
        perception: &Perception,
        world: &W,
        config: &AiConfig,
    ) -> Option<Entity> {
        let me = perception.my_character(world)?;

        let mut nearest: Option<(Entity, f32)> = None;
        for foe in perception.hated_enemies(world, config) {
            let distance_sq = me.distance_squared(&foe);
            match nearest {
                Some((_, best)) if distance_sq >= best => {}
                _ => nearest = Some((foe.entity, distance_sq)),
            }
        }

        nearest.map(|(entity, _)| entity)
    }

    /// Uniform random pick among attacks whose reuse time has elapsed.
    pub fn choose_attack(
        &mut self,
        player: &ActionPlayer,
        rng: &mut dyn RngCore,
    ) -> Option<ActionId> {
        self.usable.clear();
        self.usable.extend(
            self.attack_actions
                .iter()
                .copied()
                .filter(|id| player.is_reuse_elapsed(*id)),
        );
        self.usable.choose(rng).copied()
    }
}
