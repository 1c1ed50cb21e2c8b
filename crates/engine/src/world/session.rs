use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use super::inventory::DEFAULT_ITEM_NAME;
use super::{
    Actor, Inventory, LevelRegistry, MapObject, ObjectId, ObjectKind, PhysicsConfig, StepReport,
    TileGrid, Vec2,
};
use crate::content::MapSource;

#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    LayerSwitched { from: usize, to: usize },
    ItemCollected { name: String, count: u32 },
    EnemyHit,
    LevelLoaded { id: String },
    LevelLoadFailed { id: String },
}

/// One exploration run: grid, levels, actor and inventory advanced together per tick.
pub struct ExplorationSession {
    registry: LevelRegistry,
    maps: Box<dyn MapSource>,
    physics: PhysicsConfig,
    grid: TileGrid,
    actor: Actor,
    inventory: Inventory,
    contacts: BTreeSet<ObjectId>,
    last_step: StepReport,
}

impl ExplorationSession {
    pub fn new(registry: LevelRegistry, maps: Box<dyn MapSource>, physics: PhysicsConfig) -> Self {
        Self {
            registry,
            maps,
            physics,
            grid: TileGrid::default(),
            actor: Actor::default(),
            inventory: Inventory::new(),
            contacts: BTreeSet::new(),
            last_step: StepReport::default(),
        }
    }

    pub fn with_actor_size(mut self, size: Vec2) -> Self {
        self.actor = Actor::new(self.actor.position(), size);
        self
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut TileGrid {
        &mut self.grid
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn registry(&self) -> &LevelRegistry {
        &self.registry
    }

    pub fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }

    pub fn last_step(&self) -> StepReport {
        self.last_step
    }

    pub fn current_level_id(&self) -> Option<&str> {
        self.registry.current_level_id()
    }

    pub fn set_move_intent(&mut self, left: bool, right: bool) {
        self.actor.set_move_intent(left, right);
    }

    pub fn request_jump(&mut self) {
        self.actor.request_jump();
    }

    /// Fresh run: empty inventory, initial level.
    pub fn restart(&mut self) -> bool {
        self.inventory.clear();
        self.actor.set_move_intent(false, false);
        let Some(initial) = self.registry.initial_level().map(|level| level.id.clone()) else {
            warn!("restart_without_levels");
            return false;
        };
        self.load_level(&initial)
    }

    /// On failure the previous level, grid and actor stay as they were.
    pub fn load_level(&mut self, id: &str) -> bool {
        let grid = match self.registry.load_grid(id, self.maps.as_ref()) {
            Ok(grid) => grid,
            Err(error) => {
                warn!(level = id, error = %error, "level_load_failed");
                return false;
            }
        };
        self.grid = grid;
        let spawn = self
            .registry
            .current()
            .map(|level| level.spawn)
            .unwrap_or(Vec2::ZERO);
        self.actor.reset_to(spawn);
        self.prime_contacts();
        info!(
            level = id,
            width = self.grid.width(),
            height = self.grid.height(),
            layers = self.grid.layer_count(),
            objects = self.grid.objects().len(),
            "level_loaded"
        );
        true
    }

    /// Physics step, then object triggers, then level transitions.
    pub fn tick(&mut self) -> Vec<TickEvent> {
        let mut events = Vec::new();
        self.last_step = self.actor.step(&self.grid, &self.physics);

        let reloaded = self.check_objects(&mut events);
        if !reloaded {
            self.check_transitions(&mut events);
        }
        events
    }

    fn overlapping_objects(&self) -> BTreeSet<ObjectId> {
        let center = self.actor.center();
        let tile_size = self.grid.tile_size();
        self.grid
            .objects_on_layer(self.grid.active_layer())
            .filter(|object| {
                let radius = (tile_size + object.size.x) * 0.5;
                center.distance(object.bounds().center()) < radius
            })
            .map(|object| object.id)
            .collect()
    }

    /// Objects already under the actor after a jump in position or layer do not fire.
    fn prime_contacts(&mut self) {
        self.contacts = self.overlapping_objects();
    }

    fn check_objects(&mut self, events: &mut Vec<TickEvent>) -> bool {
        let overlapping = self.overlapping_objects();
        let triggered = select_trigger(
            self.grid
                .objects()
                .iter()
                .filter(|object| overlapping.contains(&object.id))
                .filter(|object| !self.contacts.contains(&object.id)),
        )
        .map(|object| (object.id, object.kind.clone()));
        self.contacts = overlapping;

        let Some((id, kind)) = triggered else {
            return false;
        };
        debug!(object = id.0, kind = kind.label(), "object_triggered");

        match kind {
            ObjectKind::LayerPortal { target_layer } => {
                let from = self.grid.active_layer();
                if self.grid.switch_layer(target_layer) {
                    info!(from, to = target_layer, "layer_switched");
                    events.push(TickEvent::LayerSwitched {
                        from,
                        to: target_layer,
                    });
                    self.prime_contacts();
                }
                false
            }
            ObjectKind::LayerReturn => {
                let from = self.grid.active_layer();
                self.grid.return_to_previous_layer();
                let to = self.grid.active_layer();
                info!(from, to, "layer_returned");
                events.push(TickEvent::LayerSwitched { from, to });
                self.prime_contacts();
                false
            }
            ObjectKind::Item {
                payload: Some(target),
            } if self.registry.contains(&target) => {
                let loaded = self.load_level(&target);
                events.push(if loaded {
                    TickEvent::LevelLoaded { id: target }
                } else {
                    TickEvent::LevelLoadFailed { id: target }
                });
                loaded
            }
            ObjectKind::Item { payload } => {
                let name = payload.unwrap_or_else(|| DEFAULT_ITEM_NAME.to_string());
                self.grid.remove_object(id);
                self.contacts.remove(&id);
                let count = self.inventory.add(&name);
                info!(item = %name, count, "item_collected");
                events.push(TickEvent::ItemCollected { name, count });
                false
            }
            ObjectKind::Enemy => {
                let spawn = self
                    .registry
                    .current()
                    .map(|level| level.spawn)
                    .unwrap_or(Vec2::ZERO);
                self.actor.reset_to(spawn);
                self.prime_contacts();
                info!(object = id.0, "enemy_hit");
                events.push(TickEvent::EnemyHit);
                false
            }
        }
    }

    fn check_transitions(&mut self, events: &mut Vec<TickEvent>) {
        let Some(target) = self
            .registry
            .find_transition(self.actor.position(), self.actor.half_extents())
            .map(|(name, point)| {
                debug!(transition = name, target = %point.target_level, "transition_reached");
                point.target_level.clone()
            })
        else {
            return;
        };
        events.push(if self.load_level(&target) {
            TickEvent::LevelLoaded { id: target }
        } else {
            TickEvent::LevelLoadFailed { id: target }
        });
    }
}

/// Highest priority wins; the earliest in map order breaks ties.
fn select_trigger<'a>(candidates: impl Iterator<Item = &'a MapObject>) -> Option<&'a MapObject> {
    let mut chosen: Option<&MapObject> = None;
    for object in candidates {
        let beats_chosen = chosen.map_or(true, |current| {
            object.kind.trigger_priority() > current.kind.trigger_priority()
        });
        if beats_chosen {
            chosen = Some(object);
        }
    }
    chosen
}
