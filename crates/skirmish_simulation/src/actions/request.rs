//! Action requests and the events the Action Player emits.

use bevy::prelude::*;

use super::ActionId;

/// One-shot instruction for the Action Player.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub action: ActionId,
    /// Ordered targets; the first one drives range checks and chasing.
    pub target_ids: Vec<Entity>,
    /// Close distance to the first target before the action fires.
    pub should_close: bool,
    /// Wait behind the active action instead of interrupting it.
    pub should_queue: bool,
}

impl ActionRequest {
    pub fn new(action: ActionId) -> Self {
        Self {
            action,
            target_ids: Vec::new(),
            should_close: false,
            should_queue: false,
        }
    }

    /// Attack request used by the AI: single target, close distance first.
    pub fn attack(action: ActionId, target: Entity) -> Self {
        Self {
            action,
            target_ids: vec![target],
            should_close: true,
            should_queue: false,
        }
    }

    pub fn queued(mut self) -> Self {
        self.should_queue = true;
        self
    }

    pub fn first_target(&self) -> Option<Entity> {
        self.target_ids.first().copied()
    }
}

/// Read-only snapshot of the running action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveActionInfo {
    pub action: ActionId,
    pub target_ids: Vec<Entity>,
}

impl ActiveActionInfo {
    pub fn targets(&self, entity: Entity) -> bool {
        self.target_ids.first() == Some(&entity)
    }
}

/// What `play_action` did with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Running now (possibly behind a synthesized chase)
    Started,
    Queued,
    /// Stunned or an uninterruptible action is running
    Dropped,
}

/// Outbound notifications for the execution/animation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionEvent {
    /// A request was accepted by the Action Player
    Requested(ActionRequest),
    /// An action became active (cooldown recorded at this moment)
    Started { action: ActionId, target_ids: Vec<Entity> },
    /// The active action reached its impact animation marker
    Impact { action: ActionId, target_ids: Vec<Entity> },
    Completed { action: ActionId },
    /// The active action was cut short
    Interrupted { action: ActionId },
    /// `clear_actions` fired
    Canceled { forced: bool },
}
