//! The simulation state owned by the tick driver, plus the per-tick
//! subsystem steps that operate on it.

use crate::base::{self, Base};
use crate::config::*;
use crate::error::{CommandError, ShopError};
use crate::inventory::Inventory;
use crate::physics;
use crate::projectile::{self, Owner, Projectile};
use crate::resource::{self, Resource, ResourceIds};
use crate::spatial::SpatialGrid;
use crate::store::EntityStore;
use crate::types::{BaseId, Point, ResourceId, UnitId};
use crate::unit::{FleetTemplates, Unit, UnitContext, UnitKind};
use crate::upgrade::{self, Purchase, Shop, StatTarget, UpgradeAction};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Global stats driven by upgrades.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldStats {
    pub damage: f64,
    pub fire_rate_ms: f64,
    pub spread_degrees: f64,
    pub spawn_interval_ms: f64,
    pub harvester_range: f64,
    pub large_haul: bool,
}

impl WorldStats {
    pub fn new() -> Self {
        WorldStats {
            damage: BASE_LASER_DAMAGE,
            fire_rate_ms: FIRE_RATE_MS,
            spread_degrees: BULLET_SPREAD_DEGREES,
            spawn_interval_ms: SPAWN_INTERVAL_BASE_MS,
            harvester_range: HARVESTER_RANGE,
            large_haul: false,
        }
    }
}

impl Default for WorldStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Things that happened during a tick, drained by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SimEvent {
    AsteroidShattered {
        asteroid: ResourceId,
        position: Point,
        fragments: usize,
    },
    Deposited {
        unit: UnitId,
        base: BaseId,
        amount: u64,
    },
    UnitPurchased {
        unit: UnitId,
        kind: UnitKind,
    },
    BasePurchased {
        base: BaseId,
    },
    ProjectileFired {
        position: Point,
        owner: Owner,
    },
}

pub struct SimulationState {
    pub resources: EntityStore<Resource>,
    pub resource_ids: ResourceIds,
    pub bases: Vec<Base>,
    pub units: Vec<Unit>,
    pub projectiles: Vec<Projectile>,
    pub inventory: Inventory,
    pub shop: Shop,
    pub stats: WorldStats,
    pub templates: FleetTemplates,
    pub rng: StdRng,
    pub grid: SpatialGrid,
    pub events: Vec<SimEvent>,
    pub active_base: BaseId,
    pub aim: Option<Point>,
    pub now_ms: f64, // Sum of tick deltas
    pub tick: u64,
    spawn_timer_ms: f64,
    next_unit_id: u32,
    next_base_id: u32,
}

impl SimulationState {
    /// Home base at the origin, one harvester, and `initial_asteroids`
    /// asteroids scattered around home.
    pub fn new(seed: u64, initial_asteroids: usize) -> Self {
        let home = Base::new(BaseId(1), "Home Base", Point::ZERO, HARVESTER_RANGE);
        let mut state = SimulationState {
            resources: EntityStore::new(),
            resource_ids: ResourceIds::new(),
            bases: vec![home],
            units: Vec::new(),
            projectiles: Vec::new(),
            inventory: Inventory::new(),
            shop: Shop::new(),
            stats: WorldStats::new(),
            templates: FleetTemplates::new(),
            rng: StdRng::seed_from_u64(seed),
            grid: SpatialGrid::new(GRID_CELL_SIZE),
            events: Vec::new(),
            active_base: BaseId(1),
            aim: None,
            now_ms: 0.0,
            tick: 0,
            spawn_timer_ms: 0.0,
            next_unit_id: 1,
            next_base_id: 2,
        };
        state.spawn_unit(UnitKind::Harvester);
        state.events.clear();

        for _ in 0..initial_asteroids.min(MAX_RESOURCES) {
            state.spawn_asteroid_near(Point::ZERO);
        }
        info!(
            "World created: {} asteroids, {} base, {} unit (seed {})",
            state.resources.len(),
            state.bases.len(),
            state.units.len(),
            seed
        );
        state
    }

    pub fn home(&self) -> Option<&Base> {
        base::home(&self.bases)
    }

    pub fn active_base(&self) -> Option<&Base> {
        base::find(&self.bases, self.active_base)
    }

    // --- Spawning ---

    /// Spawns one asteroid within `LOCAL_SPAWN_RADIUS` of `center`, unless
    /// the live population is already at the ceiling.
    pub fn spawn_asteroid_near(&mut self, center: Point) -> Option<ResourceId> {
        if self.resources.len() >= MAX_RESOURCES {
            return None;
        }
        let id = self.resource_ids.next_id();
        let asteroid = resource::spawn_asteroid(&mut self.rng, id, center, LOCAL_SPAWN_RADIUS, None);
        self.resources.insert(asteroid);
        Some(id)
    }

    /// Accumulates time and spawns an asteroid around a random base once the
    /// spawn interval has elapsed.
    pub fn update_spawner(&mut self, dt_ms: f64) {
        self.spawn_timer_ms += dt_ms;
        if self.spawn_timer_ms < self.stats.spawn_interval_ms || self.resources.len() >= MAX_RESOURCES {
            return;
        }
        let center = if self.bases.is_empty() {
            Point::ZERO
        } else {
            let pick = self.rng.gen_range(0..self.bases.len());
            self.bases[pick].position
        };
        if let Some(id) = self.spawn_asteroid_near(center) {
            crate::debug_spawn!(
                "Tick {}: spawned {} near ({:.0}, {:.0}), {} live",
                self.tick,
                id,
                center.x,
                center.y,
                self.resources.len()
            );
        }
        self.spawn_timer_ms = 0.0;
    }

    /// Builds a unit of `kind` at the home base from the current template.
    pub fn spawn_unit(&mut self, kind: UnitKind) -> Option<UnitId> {
        let home = base::home(&self.bases)?;
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        let unit = Unit::new(id, kind, self.templates.get(kind), home);
        info!("{} ({}) built at {}", id, kind, home.name);
        self.units.push(unit);
        self.events.push(SimEvent::UnitPurchased { unit: id, kind });
        Some(id)
    }

    // --- Shop ---

    pub fn buy_upgrade(&mut self, id: &str) -> Result<Purchase, ShopError> {
        let purchase = self.shop.purchase(id, &mut self.inventory)?;
        self.apply_purchase(&purchase);
        Ok(purchase)
    }

    /// Buys a vehicle by type name (`harvester`, `miner`, `satellite`).
    pub fn buy_vehicle(&mut self, vehicle: &str) -> Result<Purchase, ShopError> {
        let id = upgrade::vehicle_upgrade_id(vehicle)?;
        self.buy_upgrade(id)
    }

    fn apply_purchase(&mut self, purchase: &Purchase) {
        info!(
            "Purchased {} (level {}, value {:.2}), {} Crystals left",
            purchase.id,
            purchase.level,
            purchase.value,
            self.inventory.funds()
        );
        match purchase.action {
            UpgradeAction::SetStat(target) => self.apply_stat(target, purchase.value),
            UpgradeAction::SpawnUnit(kind) => {
                self.spawn_unit(kind);
            }
        }
    }

    fn apply_stat(&mut self, target: StatTarget, value: f64) {
        match target {
            StatTarget::HarvesterSpeed => {
                self.templates.harvester.speed = value;
                self.refresh_units(UnitKind::Harvester);
            }
            StatTarget::HarvesterCapacity => {
                self.templates.harvester.cargo_capacity = value.max(0.0) as u32;
                self.refresh_units(UnitKind::Harvester);
            }
            StatTarget::FuelTank => {
                for kind in UnitKind::ALL.into_iter().filter(|k| k.uses_fuel()) {
                    self.templates.get_mut(kind).max_fuel = kind.base_template().max_fuel * value;
                    self.refresh_units(kind);
                }
            }
            StatTarget::LaserDamage => self.stats.damage = value,
            StatTarget::FireRate => self.stats.fire_rate_ms = value,
            StatTarget::Spread => self.stats.spread_degrees = value,
            StatTarget::LargeHaul => self.stats.large_haul = value > 0.0,
            StatTarget::SpawnInterval => self.stats.spawn_interval_ms = value,
            StatTarget::HarvesterRange => {
                self.stats.harvester_range = value;
                for b in self.bases.iter_mut() {
                    b.collection_radius = value;
                }
                self.templates.harvester.range = value;
                self.refresh_units(UnitKind::Harvester);
            }
        }
    }

    // Pushes the kind's template onto every live unit of that kind
    fn refresh_units(&mut self, kind: UnitKind) {
        let template = *self.templates.get(kind);
        for unit in self.units.iter_mut().filter(|u| u.kind == kind) {
            unit.apply_template(&template);
        }
    }

    /// Buys a new base next to the most recent one and makes it active.
    pub fn buy_base(&mut self) -> Result<BaseId, ShopError> {
        let cost = self.shop.purchase_base(&mut self.inventory)?;
        let id = BaseId(self.next_base_id);
        self.next_base_id += 1;
        let position = base::next_position(&self.bases);
        let name = format!("Base {}", id.0);
        info!(
            "{} purchased for {} at ({:.0}, {:.0})",
            name, cost, position.x, position.y
        );
        self.bases
            .push(Base::new(id, name, position, self.stats.harvester_range));
        self.active_base = id;
        self.events.push(SimEvent::BasePurchased { base: id });
        Ok(id)
    }

    pub fn select_base(&mut self, id: BaseId) -> Result<(), CommandError> {
        if base::find(&self.bases, id).is_none() {
            return Err(CommandError::UnknownBase(id));
        }
        log::debug!(target: "base", "Active base is now {}", id);
        self.active_base = id;
        Ok(())
    }

    // --- Per-tick steps ---

    /// Moves the active base by a directional impulse.
    pub fn move_active_base(&mut self, dx: f64, dy: f64, dt_secs: f64) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        if let Some(active) = base::find_mut(&mut self.bases, self.active_base) {
            active.nudge(dx, dy, dt_secs);
            log::trace!(
                target: "base",
                "{} moved to ({:.1}, {:.1})",
                active.name,
                active.position.x,
                active.position.y
            );
        }
    }

    /// The active base shoots at the aim point when its cooldown allows.
    pub fn fire_active_base(&mut self) {
        let Some(aim) = self.aim else {
            return;
        };
        let now = self.now_ms;
        let cooldown = self.stats.fire_rate_ms;
        let Some(active) = base::find_mut(&mut self.bases, self.active_base) else {
            return;
        };
        if !active.can_fire(now, cooldown) {
            return;
        }
        let owner = Owner::Base(active.id);
        let origin = active.position;
        let Some(shot) = projectile::fire(
            &mut self.rng,
            origin,
            aim,
            self.stats.spread_degrees,
            self.stats.damage,
            owner,
        ) else {
            return;
        };
        active.last_shot_ms = Some(now);
        self.projectiles.push(shot);
        self.events.push(SimEvent::ProjectileFired {
            position: origin,
            owner,
        });
    }

    pub fn update_projectiles(&mut self, dt_secs: f64) {
        let shattered = projectile::update_projectiles(
            &mut self.projectiles,
            &mut self.resources,
            &mut self.grid,
            &mut self.resource_ids,
            &mut self.rng,
            dt_secs,
        );
        for shatter in shattered {
            self.events.push(SimEvent::AsteroidShattered {
                asteroid: shatter.asteroid,
                position: shatter.position,
                fragments: shatter.fragments,
            });
        }
    }

    pub fn update_physics(&mut self, dt_secs: f64) {
        physics::step(self.resources.as_mut_slice(), &mut self.grid, dt_secs);
    }

    /// Runs every unit's state machine in insertion order.
    pub fn update_units(&mut self, dt_secs: f64) {
        self.grid.rebuild(self.resources.iter().map(|r| r.position));
        let grid_ids: Vec<ResourceId> = self.resources.iter().map(|r| r.id).collect();
        let SimulationState {
            resources,
            bases,
            units,
            projectiles,
            inventory,
            stats,
            rng,
            events,
            grid,
            now_ms,
            tick,
            ..
        } = self;
        let mut ctx = UnitContext {
            resources,
            bases,
            projectiles,
            inventory,
            stats,
            rng,
            events,
            grid,
            grid_ids: &grid_ids,
            now_ms: *now_ms,
            dt_secs,
            tick: *tick,
        };
        for unit in units.iter_mut() {
            unit.update(&mut ctx);
        }
    }
}
