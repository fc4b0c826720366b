//! Static game data: action descriptions and character templates.
//!
//! Loaded once (built-in defaults or RON) and shared read-only by every agent.

use std::collections::BTreeMap;
use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::ActionId;
use crate::error::AiError;

/// How an active action reacts to new requests and `clear_actions`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interruptibility {
    /// Replaced by any new request, removed by any clear
    #[default]
    Interruptible,
    /// New requests are dropped; only a forced clear removes it
    Resistant,
    /// Survives every clear; ends on its own timer (stun)
    Locked,
}

/// Per-action timing and targeting data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescription {
    pub id: ActionId,
    /// Max distance to the first target for the action to fire (meters)
    #[serde(default)]
    pub range: f32,
    /// Execution time after charge-up (seconds)
    #[serde(default)]
    pub duration: f32,
    /// Minimum time between two activations (seconds)
    #[serde(default)]
    pub reuse_time: f32,
    /// Charge-up before execution, 0 = none (seconds)
    #[serde(default)]
    pub charge_up: f32,
    /// Animation marker that applies the action's effect
    #[serde(default)]
    pub impact_marker: Option<String>,
    #[serde(default)]
    pub interruptibility: Interruptibility,
}

impl ActionDescription {
    pub fn new(id: ActionId, range: f32, duration: f32, reuse_time: f32) -> Self {
        Self {
            id,
            range,
            duration,
            reuse_time,
            charge_up: 0.0,
            impact_marker: None,
            interruptibility: Interruptibility::Interruptible,
        }
    }

    pub fn with_charge_up(mut self, charge_up: f32) -> Self {
        self.charge_up = charge_up;
        self
    }

    pub fn with_impact_marker(mut self, marker: &str) -> Self {
        self.impact_marker = Some(marker.to_string());
        self
    }

    pub fn with_interruptibility(mut self, interruptibility: Interruptibility) -> Self {
        self.interruptibility = interruptibility;
        self
    }
}

/// Character template: which skills an agent spawned from it can use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterStaticData {
    pub name: String,
    #[serde(default)]
    pub skill1: ActionId,
    #[serde(default)]
    pub skill2: ActionId,
    #[serde(default)]
    pub skill3: ActionId,
}

impl CharacterStaticData {
    pub fn new(name: &str, skills: [ActionId; 3]) -> Self {
        Self {
            name: name.to_string(),
            skill1: skills[0],
            skill2: skills[1],
            skill3: skills[2],
        }
    }

    /// Non-empty skill slots, in slot order.
    pub fn skills(&self) -> impl Iterator<Item = ActionId> + '_ {
        [self.skill1, self.skill2, self.skill3]
            .into_iter()
            .filter(|id| *id != ActionId::None)
    }
}

/// Lookup table from `ActionId` to its description.
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    actions: BTreeMap<ActionId, ActionDescription>,
}

impl ActionCatalog {
    /// Builds a catalog, filling in chase/stun descriptions when missing.
    pub fn new(descriptions: impl IntoIterator<Item = ActionDescription>) -> Result<Self, AiError> {
        let mut actions = BTreeMap::new();
        for description in descriptions {
            if description.id == ActionId::None {
                return Err(AiError::InvalidState(
                    "action catalog describes ActionId::None".to_string(),
                ));
            }
            actions.insert(description.id, description);
        }

        Ok(Self::with_builtins(actions))
    }

    fn with_builtins(mut actions: BTreeMap<ActionId, ActionDescription>) -> Self {
        actions
            .entry(ActionId::GeneralChase)
            .or_insert_with(|| ActionDescription::new(ActionId::GeneralChase, 1.5, 0.0, 0.0));
        actions.entry(ActionId::Stun).or_insert_with(|| {
            ActionDescription::new(ActionId::Stun, 0.0, 2.0, 0.0)
                .with_interruptibility(Interruptibility::Locked)
        });
        Self { actions }
    }

    pub fn get(&self, id: ActionId) -> Result<&ActionDescription, AiError> {
        self.actions.get(&id).ok_or(AiError::UndescribedAction(id))
    }

    /// Reuse time, or 0 for actions the catalog does not know.
    pub fn reuse_time(&self, id: ActionId) -> f32 {
        self.actions.get(&id).map(|d| d.reuse_time).unwrap_or(0.0)
    }
}

/// On-disk layout of the game data file.
#[derive(Debug, Deserialize)]
struct GameDataFile {
    actions: Vec<ActionDescription>,
    characters: Vec<CharacterStaticData>,
}

/// Resource: action catalog + character templates.
#[derive(Resource, Debug, Clone)]
pub struct GameData {
    actions: Arc<ActionCatalog>,
    characters: BTreeMap<String, CharacterStaticData>,
}

impl GameData {
    pub fn new(
        actions: ActionCatalog,
        characters: impl IntoIterator<Item = CharacterStaticData>,
    ) -> Result<Self, AiError> {
        let characters: BTreeMap<_, _> = characters
            .into_iter()
            .map(|character| (character.name.clone(), character))
            .collect();

        // Every skill slot must point at a described action
        for character in characters.values() {
            for skill in character.skills() {
                actions.get(skill)?;
            }
        }

        Ok(Self {
            actions: Arc::new(actions),
            characters,
        })
    }

    pub fn from_ron_str(source: &str) -> Result<Self, AiError> {
        let file: GameDataFile = ron::from_str(source)?;
        Self::new(ActionCatalog::new(file.actions)?, file.characters)
    }

    pub fn actions(&self) -> &Arc<ActionCatalog> {
        &self.actions
    }

    pub fn character(&self, name: &str) -> Result<&CharacterStaticData, AiError> {
        self.characters
            .get(name)
            .ok_or_else(|| AiError::UnknownCharacter(name.to_string()))
    }
}

impl Default for GameData {
    fn default() -> Self {
        let actions = [
            ActionDescription::new(ActionId::Slash, 2.0, 0.8, 1.0).with_impact_marker("hit"),
            ActionDescription::new(ActionId::Cleave, 2.5, 1.2, 4.0).with_impact_marker("hit"),
            ActionDescription::new(ActionId::Fireball, 12.0, 1.0, 5.0)
                .with_impact_marker("release"),
            ActionDescription::new(ActionId::ArrowVolley, 15.0, 0.6, 2.0)
                .with_impact_marker("release"),
            ActionDescription::new(ActionId::ChargedShot, 18.0, 0.5, 6.0)
                .with_charge_up(1.5)
                .with_impact_marker("release"),
            ActionDescription::new(ActionId::ShieldBash, 1.8, 0.7, 3.0)
                .with_impact_marker("hit")
                .with_interruptibility(Interruptibility::Resistant),
            ActionDescription::new(ActionId::Trample, 8.0, 2.0, 10.0)
                .with_interruptibility(Interruptibility::Resistant),
        ];
        let characters = [
            CharacterStaticData::new("imp", [ActionId::Slash, ActionId::None, ActionId::None]),
            CharacterStaticData::new(
                "imp_mage",
                [ActionId::Fireball, ActionId::Slash, ActionId::None],
            ),
            CharacterStaticData::new(
                "imp_archer",
                [ActionId::ArrowVolley, ActionId::ChargedShot, ActionId::None],
            ),
            CharacterStaticData::new(
                "imp_boss",
                [ActionId::Cleave, ActionId::ShieldBash, ActionId::Trample],
            ),
        ];

        // The built-in table describes every skill and never ActionId::None
        let catalog =
            ActionCatalog::with_builtins(actions.into_iter().map(|d| (d.id, d)).collect());

        Self {
            actions: Arc::new(catalog),
            characters: characters
                .into_iter()
                .map(|c| (c.name.clone(), c))
                .collect(),
        }
    }
}
