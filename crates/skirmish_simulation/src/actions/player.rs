//! Action Player: serializes action execution for one agent.
//!
//! At most one action is active. Pending requests wait in a FIFO queue and
//! activate when the active action completes. Cooldowns are recorded when an
//! action activates, not when it is requested: a `should_close` request may
//! wait behind a synthesized chase first.

use std::collections::VecDeque;
use std::sync::Arc;

use bevy::prelude::*;

use super::{
    ActionCatalog, ActionEvent, ActionId, ActionLogic, ActionRequest, ActiveActionInfo,
    CooldownTracker, Interruptibility, PlayOutcome,
};
use crate::error::AiError;
use crate::world::WorldView;

/// Phase of the active action.
///
/// Skills run ChargingUp (optional) → Executing → done.
/// Chase runs until the target is in range. Stun runs until its timer expires.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionPhase {
    Chasing { range: f32 },
    ChargingUp { remaining: f32 },
    Executing { remaining: f32 },
    Stunned { remaining: f32 },
}

#[derive(Debug, Clone)]
struct RunningAction {
    info: ActiveActionInfo,
    interruptibility: Interruptibility,
    phase: ActionPhase,
    /// Execution time once charge-up ends
    duration: f32,
    impact_marker: Option<String>,
    impact_fired: bool,
}

enum Step {
    Continue,
    Finished,
    Failed,
}

#[derive(Debug, Clone)]
pub struct ActionPlayer {
    owner: Entity,
    catalog: Arc<ActionCatalog>,
    cooldowns: CooldownTracker,
    active: Option<RunningAction>,
    queue: VecDeque<ActionRequest>,
    /// Agent-local simulation clock (seconds)
    now: f64,
}

impl ActionPlayer {
    pub fn new(owner: Entity, catalog: Arc<ActionCatalog>) -> Self {
        Self {
            owner,
            catalog,
            cooldowns: CooldownTracker::default(),
            active: None,
            queue: VecDeque::new(),
            now: 0.0,
        }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    pub fn is_reuse_elapsed(&self, id: ActionId) -> bool {
        self.cooldowns
            .is_reuse_elapsed(id, self.catalog.reuse_time(id), self.now)
    }

    pub fn active_action_info(&self) -> Option<&ActiveActionInfo> {
        self.active.as_ref().map(|running| &running.info)
    }

    pub fn active_phase(&self) -> Option<&ActionPhase> {
        self.active.as_ref().map(|running| &running.phase)
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_stunned(&self) -> bool {
        matches!(self.active_phase(), Some(ActionPhase::Stunned { .. }))
    }

    /// Submit a request.
    ///
    /// Dropped silently while stunned or while a resistant action runs.
    /// A Stun request always preempts whatever is running.
    pub fn play_action<W: WorldView + ?Sized>(
        &mut self,
        request: ActionRequest,
        world: &W,
        events: &mut Vec<ActionEvent>,
    ) -> Result<PlayOutcome, AiError> {
        let logic = request.action.logic()?;
        let catalog = Arc::clone(&self.catalog);
        let description = catalog.get(request.action)?;

        if logic != ActionLogic::Stun {
            if let Some(active) = &self.active {
                if active.interruptibility != Interruptibility::Interruptible {
                    return Ok(PlayOutcome::Dropped);
                }
                if request.should_queue {
                    events.push(ActionEvent::Requested(request.clone()));
                    self.queue.push_back(request);
                    return Ok(PlayOutcome::Queued);
                }
            }
        }

        let chase_target = match (logic, request.first_target()) {
            (ActionLogic::Skill, Some(target))
                if request.should_close && !self.in_range(target, description.range, world) =>
            {
                Some(target)
            }
            _ => None,
        };

        if logic == ActionLogic::Chase && request.first_target().is_none() {
            return Err(AiError::InvalidState(
                "chase requested without a target".to_string(),
            ));
        }

        // Nothing can start right now: leave the active action alone
        if chase_target.is_none()
            && logic == ActionLogic::Skill
            && !self
                .cooldowns
                .is_reuse_elapsed(request.action, description.reuse_time, self.now)
        {
            return Ok(PlayOutcome::Dropped);
        }

        self.interrupt_active(events);
        self.queue.clear();
        events.push(ActionEvent::Requested(request.clone()));

        if let Some(target) = chase_target {
            let range = description.range;
            self.queue.push_back(request);
            self.start_chase(target, range, events);
        } else {
            self.activate(request, events)?;
        }

        Ok(PlayOutcome::Started)
    }

    /// Put the agent in a Stun for `duration` seconds, overriding the catalog.
    pub fn stun(&mut self, duration: f32, events: &mut Vec<ActionEvent>) {
        self.interrupt_active(events);
        self.queue.clear();

        let request = ActionRequest::new(ActionId::Stun);
        events.push(ActionEvent::Requested(request.clone()));
        events.push(ActionEvent::Started {
            action: ActionId::Stun,
            target_ids: Vec::new(),
        });
        self.active = Some(RunningAction {
            info: ActiveActionInfo {
                action: ActionId::Stun,
                target_ids: request.target_ids,
            },
            interruptibility: Interruptibility::Locked,
            phase: ActionPhase::Stunned { remaining: duration },
            duration,
            impact_marker: None,
            impact_fired: false,
        });
    }

    /// Cancel the active action and everything queued behind it.
    ///
    /// `force` also removes resistant actions. Locked actions (stun) survive.
    pub fn clear_actions(&mut self, force: bool, events: &mut Vec<ActionEvent>) {
        self.queue.clear();

        let cancel = match self.active.as_ref().map(|running| running.interruptibility) {
            Some(Interruptibility::Interruptible) => true,
            Some(Interruptibility::Resistant) => force,
            Some(Interruptibility::Locked) | None => false,
        };
        if cancel {
            self.interrupt_active(events);
        }

        events.push(ActionEvent::Canceled { forced: force });
    }

    /// Drop everything, stun included (agent fainted or died).
    pub fn cancel_all(&mut self, events: &mut Vec<ActionEvent>) {
        self.queue.clear();
        self.interrupt_active(events);
        events.push(ActionEvent::Canceled { forced: true });
    }

    /// Advance the clock and the active action by `dt` seconds.
    pub fn update<W: WorldView + ?Sized>(
        &mut self,
        dt: f32,
        world: &W,
        events: &mut Vec<ActionEvent>,
    ) -> Result<(), AiError> {
        self.now += dt as f64;

        let owner = self.owner;
        let Some(running) = self.active.as_mut() else {
            return Ok(());
        };

        let step = match &mut running.phase {
            ActionPhase::Chasing { range } => {
                let me = world.actor(owner);
                let target = running
                    .info
                    .target_ids
                    .first()
                    .and_then(|target| world.actor(*target));
                match (me, target) {
                    (Some(me), Some(target)) if target.life_state.is_alive() => {
                        if me.distance_squared(&target) <= *range * *range {
                            Step::Finished
                        } else {
                            Step::Continue
                        }
                    }
                    _ => Step::Failed,
                }
            }
            ActionPhase::ChargingUp { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    running.phase = ActionPhase::Executing {
                        remaining: running.duration,
                    };
                }
                Step::Continue
            }
            ActionPhase::Executing { remaining } | ActionPhase::Stunned { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    Step::Finished
                } else {
                    Step::Continue
                }
            }
        };

        match step {
            Step::Continue => Ok(()),
            Step::Finished => {
                if let Some(done) = self.active.take() {
                    events.push(ActionEvent::Completed {
                        action: done.info.action,
                    });
                }
                self.advance_queue(events)
            }
            Step::Failed => {
                // Chase lost its target: whatever waited behind it is stale
                self.queue.clear();
                self.interrupt_active(events);
                Ok(())
            }
        }
    }

    /// Forward an animation marker to the active action.
    ///
    /// Returns true if it triggered the action's impact.
    pub fn on_animation_marker(&mut self, marker: &str, events: &mut Vec<ActionEvent>) -> bool {
        let Some(running) = self.active.as_mut() else {
            return false;
        };
        if running.impact_fired || !matches!(running.phase, ActionPhase::Executing { .. }) {
            return false;
        }
        if running.impact_marker.as_deref() != Some(marker) {
            return false;
        }

        running.impact_fired = true;
        events.push(ActionEvent::Impact {
            action: running.info.action,
            target_ids: running.info.target_ids.clone(),
        });
        true
    }

    /// End an in-progress charge-up early and start executing.
    pub fn stop_charging_up(&mut self) -> bool {
        let Some(running) = self.active.as_mut() else {
            return false;
        };
        if !matches!(running.phase, ActionPhase::ChargingUp { .. }) {
            return false;
        }
        running.phase = ActionPhase::Executing {
            remaining: running.duration,
        };
        true
    }

    /// Being hit while charging up releases the charge early.
    pub fn on_hit_reaction(&mut self) -> bool {
        self.stop_charging_up()
    }

    fn in_range<W: WorldView + ?Sized>(&self, target: Entity, range: f32, world: &W) -> bool {
        match (world.actor(self.owner), world.actor(target)) {
            (Some(me), Some(target)) => me.distance_squared(&target) <= range * range,
            _ => false,
        }
    }

    fn interrupt_active(&mut self, events: &mut Vec<ActionEvent>) {
        if let Some(running) = self.active.take() {
            events.push(ActionEvent::Interrupted {
                action: running.info.action,
            });
        }
    }

    fn start_chase(&mut self, target: Entity, range: f32, events: &mut Vec<ActionEvent>) {
        events.push(ActionEvent::Started {
            action: ActionId::GeneralChase,
            target_ids: vec![target],
        });
        self.active = Some(RunningAction {
            info: ActiveActionInfo {
                action: ActionId::GeneralChase,
                target_ids: vec![target],
            },
            interruptibility: Interruptibility::Interruptible,
            phase: ActionPhase::Chasing { range },
            duration: 0.0,
            impact_marker: None,
            impact_fired: false,
        });
    }

    fn advance_queue(&mut self, events: &mut Vec<ActionEvent>) -> Result<(), AiError> {
        while self.active.is_none() {
            let Some(next) = self.queue.pop_front() else {
                break;
            };
            self.activate(next, events)?;
        }
        Ok(())
    }

    /// Make `request` the active action. Returns false if its cooldown has
    /// not elapsed yet (the request is discarded).
    fn activate(
        &mut self,
        request: ActionRequest,
        events: &mut Vec<ActionEvent>,
    ) -> Result<bool, AiError> {
        let catalog = Arc::clone(&self.catalog);
        let description = catalog.get(request.action)?;

        let phase = match request.action.logic()? {
            ActionLogic::Chase => ActionPhase::Chasing {
                range: description.range,
            },
            ActionLogic::Stun => ActionPhase::Stunned {
                remaining: description.duration,
            },
            ActionLogic::Skill => {
                if !self
                    .cooldowns
                    .is_reuse_elapsed(request.action, description.reuse_time, self.now)
                {
                    crate::logger::log(&format!(
                        "ActionPlayer {:?}: {:?} still cooling down at activation, skipped",
                        self.owner, request.action
                    ));
                    return Ok(false);
                }
                self.cooldowns.record(request.action, self.now);

                if description.charge_up > 0.0 {
                    ActionPhase::ChargingUp {
                        remaining: description.charge_up,
                    }
                } else {
                    ActionPhase::Executing {
                        remaining: description.duration,
                    }
                }
            }
        };

        events.push(ActionEvent::Started {
            action: request.action,
            target_ids: request.target_ids.clone(),
        });
        self.active = Some(RunningAction {
            info: ActiveActionInfo {
                action: request.action,
                target_ids: request.target_ids,
            },
            interruptibility: description.interruptibility,
            phase,
            duration: description.duration,
            impact_marker: description.impact_marker.clone(),
            impact_fired: false,
        });
        Ok(true)
    }
}
