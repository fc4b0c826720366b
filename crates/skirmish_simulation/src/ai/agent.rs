//! Agent: one AI-controlled combatant (brain + action player).
//!
//! The host loop drives it through two calls:
//! - `tick(dt)` once per simulation step
//! - `notify_external_event(event)` for things that happen outside the core

use std::sync::Arc;

use bevy::prelude::*;
use rand::RngCore;

use super::{AiBrain, AiConfig};
use crate::actions::{ActionCatalog, ActionEvent, ActionPlayer, CharacterStaticData};
use crate::components::LifeState;
use crate::error::AiError;
use crate::world::WorldView;

/// Everything a tick needs from the host, borrowed for the call.
pub struct TickContext<'a, W: WorldView + ?Sized> {
    pub world: &'a W,
    pub config: &'a AiConfig,
    pub rng: &'a mut dyn RngCore,
    /// Outbound action events, in emission order
    pub events: &'a mut Vec<ActionEvent>,
}

/// Inbound notifications from animation, combat and replication.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalEvent {
    /// Animation reached a named marker (forwarded to the active action)
    AnimationMarker(String),
    StoppedChargingUp,
    /// The agent was hit; the attacker (if known) becomes hated
    HitReaction { attacker: Option<Entity> },
    LifeStateChanged(LifeState),
    Stunned { duration: f32 },
}

impl ExternalEvent {
    /// Decode a replicated life-state value.
    pub fn life_state_changed(raw: u8) -> Result<Self, AiError> {
        Ok(Self::LifeStateChanged(LifeState::try_from(raw)?))
    }
}

#[derive(Component, Debug, Clone)]
pub struct Agent {
    brain: AiBrain,
    player: ActionPlayer,
}

impl Agent {
    pub fn new(me: Entity, character: CharacterStaticData, catalog: Arc<ActionCatalog>) -> Self {
        Self {
            brain: AiBrain::new(me, character),
            player: ActionPlayer::new(me, catalog),
        }
    }

    pub fn brain(&self) -> &AiBrain {
        &self.brain
    }

    pub fn player(&self) -> &ActionPlayer {
        &self.player
    }

    /// Decide (at the current time), then advance the active action by `dt`.
    ///
    /// The clock advances even when the decision fails; the decision error
    /// takes precedence in the result.
    pub fn tick<W: WorldView + ?Sized>(
        &mut self,
        dt: f32,
        cx: &mut TickContext<'_, W>,
    ) -> Result<(), AiError> {
        let decided = self.brain.update(&mut self.player, cx);
        let advanced = self.player.update(dt, cx.world, cx.events);
        decided.and(advanced)
    }

    pub fn notify_external_event<W: WorldView + ?Sized>(
        &mut self,
        event: ExternalEvent,
        cx: &mut TickContext<'_, W>,
    ) {
        match event {
            ExternalEvent::AnimationMarker(marker) => {
                self.player.on_animation_marker(&marker, cx.events);
            }
            ExternalEvent::StoppedChargingUp => {
                self.player.stop_charging_up();
            }
            ExternalEvent::HitReaction { attacker } => {
                self.player.on_hit_reaction();
                let Some(attacker) = attacker else {
                    return;
                };
                let perception = self.brain.perception_mut();
                if perception.is_appropriate_foe(attacker, cx.world, cx.config)
                    && perception.hate(attacker)
                {
                    crate::logger::log(&format!(
                        "{:?} hit by {:?} → added to hated enemies",
                        perception.me(),
                        attacker
                    ));
                }
            }
            ExternalEvent::LifeStateChanged(life_state) => {
                self.brain.set_life_state(life_state, &mut self.player, cx.events);
            }
            ExternalEvent::Stunned { duration } => {
                // Dead and fainted agents are not doing anything to interrupt
                if self.brain.life_state().is_alive() {
                    self.player.stun(duration, cx.events);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionId;
    use crate::world::ActorView;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Imp whose only skill (Slash) is missing from the catalog.
    fn imp_without_slash() -> Agent {
        let character =
            CharacterStaticData::new("imp", [ActionId::Slash, ActionId::None, ActionId::None]);
        let catalog = ActionCatalog::new([]).unwrap();
        Agent::new(Entity::from_raw(1), character, Arc::new(catalog))
    }

    #[test]
    fn test_undescribed_skill_fails_tick_but_clock_advances() {
        let config = AiConfig::default();
        let world = vec![
            ActorView::new(Entity::from_raw(1), 1, Vec3::ZERO),
            ActorView::new(Entity::from_raw(2), 2, Vec3::new(1.0, 0.0, 0.0)),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut events = Vec::new();
        let mut agent = imp_without_slash();

        let mut errors = Vec::new();
        for _ in 0..10 {
            let mut cx = TickContext {
                world: &world,
                config: &config,
                rng: &mut rng,
                events: &mut events,
            };
            if let Err(err) = agent.tick(0.1, &mut cx) {
                errors.push(err);
            }
        }

        // Tick 1 only spots the foe; every attack attempt after that fails
        assert_eq!(errors.len(), 9);
        assert!(errors
            .iter()
            .all(|err| matches!(err, AiError::UndescribedAction(ActionId::Slash))));
        assert!(errors.iter().all(AiError::is_invalid_state));
        assert!((agent.player().now() - 1.0).abs() < 1e-4);
        assert!(agent.player().active_action_info().is_none());
    }

    #[test]
    fn test_life_state_changed_decoding() {
        assert_eq!(
            ExternalEvent::life_state_changed(1).unwrap(),
            ExternalEvent::LifeStateChanged(LifeState::Fainted)
        );

        let err = ExternalEvent::life_state_changed(7).unwrap_err();
        assert!(matches!(err, AiError::InvalidLifeState(7)));
        assert!(err.is_invalid_state());
    }
}
