//! Read-only view of the live-entity index used by perception.
//!
//! Foe references are generational `Entity` handles: a lookup through the
//! view returns `None` once the entity is despawned, so a stale handle is
//! never dereferenced.

use bevy::prelude::*;

use crate::components::{Actor, LifeState, Stealthy};

/// Snapshot of one perceivable actor for the current tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorView {
    pub entity: Entity,
    pub faction_id: u64,
    pub position: Vec3,
    pub life_state: LifeState,
    pub stealthy: bool,
}

impl ActorView {
    pub fn new(entity: Entity, faction_id: u64, position: Vec3) -> Self {
        Self {
            entity,
            faction_id,
            position,
            life_state: LifeState::Alive,
            stealthy: false,
        }
    }

    pub fn distance_squared(&self, other: &ActorView) -> f32 {
        self.position.distance_squared(other.position)
    }
}

/// Live-entity index as seen by the AI core. Must not change mid-tick.
pub trait WorldView {
    fn actor(&self, entity: Entity) -> Option<ActorView>;

    fn visit_actors(&self, visit: &mut dyn FnMut(&ActorView));
}

/// A plain snapshot (e.g. nearby actors collected by the host) is a world view.
impl WorldView for [ActorView] {
    fn actor(&self, entity: Entity) -> Option<ActorView> {
        self.iter().find(|view| view.entity == entity).copied()
    }

    fn visit_actors(&self, visit: &mut dyn FnMut(&ActorView)) {
        for view in self {
            visit(view);
        }
    }
}

impl WorldView for Vec<ActorView> {
    fn actor(&self, entity: Entity) -> Option<ActorView> {
        self.as_slice().actor(entity)
    }

    fn visit_actors(&self, visit: &mut dyn FnMut(&ActorView)) {
        self.as_slice().visit_actors(visit);
    }
}

/// Query data for actors perceivable through the ECS world.
pub type ActorQueryData = (
    Entity,
    &'static Actor,
    &'static Transform,
    &'static LifeState,
    Has<Stealthy>,
);

/// `WorldView` backed by a Bevy query.
pub struct EcsWorldView<'a, 'w, 's> {
    actors: &'a Query<'w, 's, ActorQueryData>,
}

impl<'a, 'w, 's> EcsWorldView<'a, 'w, 's> {
    pub fn new(actors: &'a Query<'w, 's, ActorQueryData>) -> Self {
        Self { actors }
    }
}

type ActorItem<'a> = (Entity, &'a Actor, &'a Transform, &'a LifeState, bool);

fn to_view((entity, actor, transform, life_state, stealthy): ActorItem<'_>) -> ActorView {
    ActorView {
        entity,
        faction_id: actor.faction_id,
        position: transform.translation,
        life_state: *life_state,
        stealthy,
    }
}

impl WorldView for EcsWorldView<'_, '_, '_> {
    fn actor(&self, entity: Entity) -> Option<ActorView> {
        self.actors.get(entity).ok().map(to_view)
    }

    fn visit_actors(&self, visit: &mut dyn FnMut(&ActorView)) {
        for item in self.actors.iter() {
            visit(&to_view(item));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_lookup_tolerates_missing_entity() {
        let world = vec![ActorView::new(Entity::from_raw(1), 1, Vec3::ZERO)];
        assert!(world.actor(Entity::from_raw(1)).is_some());
        assert!(world.actor(Entity::from_raw(2)).is_none());
    }

    #[test]
    fn test_distance_squared() {
        let a = ActorView::new(Entity::from_raw(1), 1, Vec3::ZERO);
        let b = ActorView::new(Entity::from_raw(2), 2, Vec3::new(3.0, 0.0, 4.0));
        assert_eq!(a.distance_squared(&b), 25.0);
    }
}
