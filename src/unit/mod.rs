//! Autonomous fleet units.
//!
//! Every unit shares one record shape and a [`UnitState`]; the [`UnitKind`]
//! picks which behaviour module drives it each tick:
//! - [`harvest`]: collect fragments around the assigned base, relay through
//!   linked bases, deposit at base.
//! - [`combat`]: hunt asteroids near the base and shoot them apart.
//! - [`research`]: orbit the base and accrue research points.
//!
//! Fuel-using units refuel near any base before their behaviour runs.

pub mod combat;
pub mod harvest;
pub mod research;

use crate::base::{self, Base};
use crate::config::*;
use crate::inventory::Inventory;
use crate::projectile::Projectile;
use crate::resource::Resource;
use crate::spatial::SpatialGrid;
use crate::state::{SimEvent, WorldStats};
use crate::store::EntityStore;
use crate::types::{BaseId, Payload, Point, ResourceId, UnitId};
use rand::rngs::StdRng;
use serde::Serialize;
use std::fmt;

// Unit types, each with its own behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum UnitKind {
    Harvester,
    Miner,
    Satellite,
}

impl UnitKind {
    pub const ALL: [UnitKind; 3] = [UnitKind::Harvester, UnitKind::Miner, UnitKind::Satellite];

    /// Vehicle type id used by the shop
    pub fn name(&self) -> &'static str {
        match self {
            UnitKind::Harvester => "harvester",
            UnitKind::Miner => "miner",
            UnitKind::Satellite => "satellite",
        }
    }

    pub fn uses_fuel(&self) -> bool {
        !matches!(self, UnitKind::Satellite)
    }

    /// Stats a freshly built unit of this kind starts with, before upgrades.
    pub fn base_template(&self) -> UnitTemplate {
        match self {
            UnitKind::Harvester => UnitTemplate {
                speed: MOVEMENT_SPEED_BASE,
                cargo_capacity: CARGO_CAPACITY_BASE,
                max_fuel: HARVESTER_MAX_FUEL,
                fuel_rate: HARVESTER_FUEL_RATE,
                range: HARVESTER_RANGE,
                attack_range: 0.0,
                fire_rate_ms: 0.0,
                damage: 0.0,
            },
            UnitKind::Miner => UnitTemplate {
                speed: MINER_SPEED,
                cargo_capacity: 0,
                max_fuel: MINER_MAX_FUEL,
                fuel_rate: MINER_FUEL_RATE,
                range: MINER_RANGE,
                attack_range: MINER_ATTACK_RANGE,
                fire_rate_ms: MINER_FIRE_RATE_MS,
                damage: MINER_DAMAGE,
            },
            UnitKind::Satellite => UnitTemplate {
                speed: 0.0,
                cargo_capacity: 0,
                max_fuel: 0.0,
                fuel_rate: 0.0,
                range: SATELLITE_ORBIT_RADIUS,
                attack_range: 0.0,
                fire_rate_ms: 0.0,
                damage: 0.0,
            },
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Represents the possible states of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnitState {
    Idle,
    MovingToResource,
    MovingToBaseLink,
    MovingToTarget,  // Miner closing in on an asteroid
    AttackingTarget, // Miner in range and firing
    ReturningToBase,
}

impl UnitState {
    pub fn label(&self) -> &'static str {
        match self {
            UnitState::Idle => "IDLE",
            UnitState::MovingToResource => "MOVING_TO_RESOURCE",
            UnitState::MovingToBaseLink => "MOVING_TO_BASE_LINK",
            UnitState::MovingToTarget => "MOVING_TO_TARGET",
            UnitState::AttackingTarget => "ATTACKING_TARGET",
            UnitState::ReturningToBase => "RETURNING_TO_BASE",
        }
    }
}

/// What a unit is currently heading for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnitTarget {
    Resource(ResourceId), // Harvest target
    Base(BaseId),         // Linked base to relay through
    Asteroid(ResourceId), // Miner target
}

/// Per-kind stats; upgrades rewrite these and push them to live units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnitTemplate {
    pub speed: f64, // Units per second
    pub cargo_capacity: u32,
    pub max_fuel: f64,
    pub fuel_rate: f64, // Fuel per unit of distance
    pub range: f64,     // Search radius around the assigned base
    pub attack_range: f64,
    pub fire_rate_ms: f64,
    pub damage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetTemplates {
    pub harvester: UnitTemplate,
    pub miner: UnitTemplate,
    pub satellite: UnitTemplate,
}

impl FleetTemplates {
    pub fn new() -> Self {
        FleetTemplates {
            harvester: UnitKind::Harvester.base_template(),
            miner: UnitKind::Miner.base_template(),
            satellite: UnitKind::Satellite.base_template(),
        }
    }

    pub fn get(&self, kind: UnitKind) -> &UnitTemplate {
        match kind {
            UnitKind::Harvester => &self.harvester,
            UnitKind::Miner => &self.miner,
            UnitKind::Satellite => &self.satellite,
        }
    }

    pub fn get_mut(&mut self, kind: UnitKind) -> &mut UnitTemplate {
        match kind {
            UnitKind::Harvester => &mut self.harvester,
            UnitKind::Miner => &mut self.miner,
            UnitKind::Satellite => &mut self.satellite,
        }
    }
}

impl Default for FleetTemplates {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a unit may touch during its step, borrowed disjointly from the
/// simulation state.
pub struct UnitContext<'a> {
    pub resources: &'a mut EntityStore<Resource>,
    pub bases: &'a [Base],
    pub projectiles: &'a mut Vec<Projectile>,
    pub inventory: &'a mut Inventory,
    pub stats: &'a WorldStats,
    pub rng: &'a mut StdRng,
    pub events: &'a mut Vec<SimEvent>,
    /// Resource grid built at the start of the unit phase; slots map through
    /// `grid_ids`.
    pub grid: &'a SpatialGrid,
    pub grid_ids: &'a [ResourceId],
    pub now_ms: f64,
    pub dt_secs: f64,
    pub tick: u64,
}

impl UnitContext<'_> {
    /// Live resources in the grid cells around `pos`. Resources removed
    /// earlier in the unit phase are skipped.
    pub fn resources_near(&self, pos: Point) -> Vec<ResourceId> {
        self.grid
            .neighbors(pos)
            .filter_map(|slot| self.grid_ids.get(slot).copied())
            .filter(|&id| self.resources.contains(id))
            .collect()
    }
}

/// Result of one movement step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Moving,
    Arrived,
    OutOfFuel, // Clamped short, tank now empty
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub position: Point,
    pub fuel: f64,
    pub max_fuel: f64,
    pub fuel_rate: f64,
    pub speed: f64,
    pub cargo_capacity: u32,
    pub cargo: Payload, // Held this trip
    pub range: f64,
    pub attack_range: f64,
    pub fire_rate_ms: f64,
    pub damage: f64,
    pub base: BaseId, // Assigned base: search origin and deposit point
    pub state: UnitState,
    pub target: Option<UnitTarget>,
    pub last_action_ms: Option<f64>, // None: reassess without waiting out the idle delay
    pub last_shot_ms: Option<f64>,
    pub refueling: bool,
    pub orbit_angle: f64,
}

impl Unit {
    /// Builds a unit from its kind's template, parked at `home`.
    pub fn new(id: UnitId, kind: UnitKind, template: &UnitTemplate, home: &Base) -> Self {
        let mut unit = Unit {
            id,
            kind,
            position: home.position,
            fuel: template.max_fuel,
            max_fuel: template.max_fuel,
            fuel_rate: template.fuel_rate,
            speed: template.speed,
            cargo_capacity: template.cargo_capacity,
            cargo: Payload::new(),
            range: template.range,
            attack_range: template.attack_range,
            fire_rate_ms: template.fire_rate_ms,
            damage: template.damage,
            base: home.id,
            state: UnitState::Idle,
            target: None,
            last_action_ms: None,
            last_shot_ms: None,
            refueling: false,
            orbit_angle: 0.0,
        };
        if kind == UnitKind::Satellite {
            unit.position = research::orbit_position(home.position, template.range, 0.0);
        }
        unit
    }

    /// Pushes updated template stats onto this unit. Fuel is kept, clamped to the new tank.
    pub fn apply_template(&mut self, template: &UnitTemplate) {
        self.speed = template.speed;
        self.cargo_capacity = template.cargo_capacity;
        self.max_fuel = template.max_fuel;
        self.fuel = self.fuel.clamp(0.0, self.max_fuel);
        self.fuel_rate = template.fuel_rate;
        self.range = template.range;
        self.attack_range = template.attack_range;
        self.fire_rate_ms = template.fire_rate_ms;
        self.damage = template.damage;
    }

    pub fn collected_in_trip(&self) -> u32 {
        self.cargo.total()
    }

    pub fn cargo_full(&self) -> bool {
        self.collected_in_trip() >= self.cargo_capacity
    }

    pub fn low_fuel(&self) -> bool {
        self.kind.uses_fuel() && self.fuel < self.max_fuel * LOW_FUEL_FRACTION
    }

    /// True once the idle delay since the last action has passed.
    pub fn idle_ready(&self, now_ms: f64) -> bool {
        self.last_action_ms
            .is_none_or(|last| now_ms - last > IDLE_DELAY_MS)
    }

    pub fn set_state(&mut self, state: UnitState, tick: u64) {
        if self.state != state {
            crate::debug_unit!(
                self.id.0,
                tick,
                "{} {} -> {}",
                self.kind,
                self.state.label(),
                state.label()
            );
            self.state = state;
        }
    }

    /// Heads home, dropping whatever it was chasing.
    pub fn force_return(&mut self, tick: u64) {
        self.target = None;
        self.set_state(UnitState::ReturningToBase, tick);
    }

    /// Back to IDLE with no idle delay so the next tick picks a new target.
    pub fn reassess(&mut self, tick: u64) {
        self.target = None;
        self.last_action_ms = None;
        self.set_state(UnitState::Idle, tick);
    }

    /// Regains fuel while within refuel range of any base.
    pub fn refuel(&mut self, bases: &[Base], dt_secs: f64) {
        if !self.kind.uses_fuel() {
            return;
        }
        self.refueling = base::in_refuel_range(bases, &self.position);
        if self.refueling && self.fuel < self.max_fuel {
            self.fuel = (self.fuel + REFUEL_RATE * dt_secs).min(self.max_fuel);
        }
    }

    /// One step towards `dest` at the current speed, paying fuel per unit of
    /// distance. The full step cost is checked before moving: if the tank
    /// cannot cover it the step is cut short and fuel ends at exactly zero.
    /// Returning units with an empty tank limp home at reserve speed for free.
    pub fn move_towards(&mut self, dest: Point, dt_secs: f64) -> Movement {
        let limping = self.kind.uses_fuel() && self.fuel <= 0.0 && self.state == UnitState::ReturningToBase;
        let speed = if limping {
            self.speed * RESERVE_SPEED_FACTOR
        } else {
            self.speed
        };
        let step = speed * dt_secs;
        let dist = self.position.distance(&dest);
        if !dist.is_finite() {
            return Movement::Moving;
        }

        let arriving = dist < step;
        let travel = if arriving { dist } else { step };

        if self.kind.uses_fuel() && !limping {
            let cost = travel * self.fuel_rate;
            if cost > self.fuel {
                let reachable = self.fuel / self.fuel_rate;
                self.advance(dest, reachable, dist);
                self.fuel = 0.0;
                return Movement::OutOfFuel;
            }
            self.fuel -= cost;
        }

        if arriving {
            self.position = dest;
            Movement::Arrived
        } else {
            self.advance(dest, travel, dist);
            Movement::Moving
        }
    }

    // Moves `travel` along the line to `dest`, which is `dist` away
    fn advance(&mut self, dest: Point, travel: f64, dist: f64) {
        if dist <= 0.0 {
            return;
        }
        let direction = (dest - self.position) * (1.0 / dist);
        self.position += direction * travel.min(dist);
    }

    /// Moves towards the assigned base (home if it is gone). On arrival the
    /// cargo is deposited into the shared inventory and the unit idles.
    pub fn return_to_base(&mut self, ctx: &mut UnitContext) {
        let Some(depot) = base::find(ctx.bases, self.base).or_else(|| base::home(ctx.bases)) else {
            return;
        };
        let depot_id = depot.id;
        if self.move_towards(depot.position, ctx.dt_secs) != Movement::Arrived {
            return;
        }

        let amount = ctx.inventory.deposit(&self.cargo);
        if amount > 0 {
            crate::debug_harvest!(self.id.0, ctx.tick, "Deposited {} units at {}", amount, depot_id);
            ctx.events.push(SimEvent::Deposited {
                unit: self.id,
                base: depot_id,
                amount,
            });
        }
        self.cargo.clear();
        self.base = depot_id;
        self.target = None;
        self.last_action_ms = Some(ctx.now_ms);
        self.set_state(UnitState::Idle, ctx.tick);
    }

    /// Runs one tick of this unit: refuel, then its kind's behaviour.
    pub fn update(&mut self, ctx: &mut UnitContext) {
        self.refuel(ctx.bases, ctx.dt_secs);
        match self.kind {
            UnitKind::Harvester => harvest::step(self, ctx),
            UnitKind::Miner => combat::step(self, ctx),
            UnitKind::Satellite => research::step(self, ctx),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::Fixture;
    use super::*;
    use crate::types::ResourceKind;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_resources_near_skips_collected_and_distant() {
        let mut fixture = Fixture::new();
        let payload: Payload = [(ResourceKind::Crystals, 1)].into_iter().collect();
        for (id, x) in [(1, 5.0), (2, 20.0), (3, 500.0)] {
            fixture
                .resources
                .insert(Resource::fragment(ResourceId(id), Point::new(x, 0.0), &payload, 1));
        }
        fixture.grid.rebuild(fixture.resources.iter().map(|r| r.position));
        let grid_ids: Vec<ResourceId> = fixture.resources.iter().map(|r| r.id).collect();
        // Collected earlier in the same unit phase
        fixture.resources.remove(ResourceId(1));

        let ctx = UnitContext {
            resources: &mut fixture.resources,
            bases: &fixture.bases,
            projectiles: &mut fixture.projectiles,
            inventory: &mut fixture.inventory,
            stats: &fixture.stats,
            rng: &mut fixture.rng,
            events: &mut fixture.events,
            grid: &fixture.grid,
            grid_ids: &grid_ids,
            now_ms: 0.0,
            dt_secs: 0.0,
            tick: 0,
        };
        assert_eq!(ctx.resources_near(Point::ZERO), vec![ResourceId(2)]);
    }

    #[test]
    fn test_fuel_never_goes_negative() {
        let fixture = Fixture::new();
        let mut unit = fixture.unit(UnitKind::Harvester);
        unit.fuel = 0.3;
        let far = Point::new(1e6, 0.0);
        for _ in 0..500 {
            unit.move_towards(far, 1.0 / 60.0);
            assert!(unit.fuel >= 0.0);
        }
        assert_eq!(unit.fuel, 0.0);
        // 0.3 fuel at 0.01 per unit buys exactly 30 units of travel
        assert_approx_eq!(unit.position.x, 30.0);
    }

    #[test]
    fn test_out_of_fuel_forces_return_without_target() {
        let mut fixture = Fixture::new();
        let mut unit = fixture.unit(UnitKind::Harvester);
        let fragment = Resource::fragment(ResourceId(1), Point::new(800.0, 0.0), &Payload::new(), 5);
        fixture.resources.insert(fragment);
        unit.state = UnitState::MovingToResource;
        unit.target = Some(UnitTarget::Resource(ResourceId(1)));
        unit.position = Point::new(100.0, 0.0);
        unit.fuel = 0.01;

        fixture.step(&mut unit);
        assert_eq!(unit.state, UnitState::ReturningToBase);
        assert_eq!(unit.target, None);
        assert_eq!(unit.fuel, 0.0);
    }

    #[test]
    fn test_refuel_is_idempotent_at_max() {
        let fixture = Fixture::new();
        let mut unit = fixture.unit(UnitKind::Harvester);
        assert_eq!(unit.fuel, unit.max_fuel);
        unit.refuel(&fixture.bases, 1.0);
        unit.refuel(&fixture.bases, 1.0);
        assert_eq!(unit.fuel, unit.max_fuel);
        assert!(unit.refueling);
    }

    #[test]
    fn test_refuel_only_near_a_base() {
        let fixture = Fixture::new();
        let mut unit = fixture.unit(UnitKind::Miner);
        unit.fuel = 10.0;
        unit.position = Point::new(REFUEL_RANGE + 1.0, 0.0);
        unit.refuel(&fixture.bases, 1.0);
        assert!(!unit.refueling);
        assert_eq!(unit.fuel, 10.0);
        unit.position = Point::new(REFUEL_RANGE - 1.0, 0.0);
        unit.refuel(&fixture.bases, 0.5);
        assert_approx_eq!(unit.fuel, 10.0 + REFUEL_RATE * 0.5);
    }

    #[test]
    fn test_empty_tank_limps_home_at_reserve_speed() {
        let fixture = Fixture::new();
        let mut unit = fixture.unit(UnitKind::Harvester);
        unit.fuel = 0.0;
        unit.state = UnitState::ReturningToBase;
        unit.position = Point::new(100.0, 0.0);
        assert_eq!(unit.move_towards(Point::ZERO, 1.0), Movement::Moving);
        assert_approx_eq!(unit.position.x, 100.0 - MOVEMENT_SPEED_BASE * RESERVE_SPEED_FACTOR);
        assert_eq!(unit.fuel, 0.0);
    }

    #[test]
    fn test_arrival_snaps_to_destination() {
        let fixture = Fixture::new();
        let mut unit = fixture.unit(UnitKind::Harvester);
        let dest = Point::new(1.0, 1.0);
        assert_eq!(unit.move_towards(dest, 1.0), Movement::Arrived);
        assert_eq!(unit.position, dest);
        assert_approx_eq!(unit.fuel, HARVESTER_MAX_FUEL - 2f64.sqrt() * HARVESTER_FUEL_RATE);
    }

    #[test]
    fn test_apply_template_clamps_fuel() {
        let fixture = Fixture::new();
        let mut unit = fixture.unit(UnitKind::Harvester);
        let mut template = UnitKind::Harvester.base_template();
        template.max_fuel = 50.0;
        template.speed = 999.0;
        unit.apply_template(&template);
        assert_eq!(unit.fuel, 50.0);
        assert_eq!(unit.speed, 999.0);
    }
}
