//! Upgrade catalog and shop.
//!
//! The catalog is plain data: every entry names its cost growth, an
//! [`Effect`] evaluated from the level, and what the value is applied to.
//! Applying the value to the world happens in the simulation state; the shop
//! only tracks levels, costs and the currency debit.

use crate::config::*;
use crate::error::ShopError;
use crate::inventory::Inventory;
use crate::unit::UnitKind;
use serde::Serialize;

/// How the price changes after a purchase
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CostGrowth {
    Multiply(f64), // next = floor(cost * f)
    Once,          // Sold out after the first purchase
}

impl CostGrowth {
    pub fn next(&self, cost: u64) -> Option<u64> {
        match self {
            CostGrowth::Multiply(factor) => Some((cost as f64 * factor).floor() as u64),
            CostGrowth::Once => None,
        }
    }
}

/// Pure level -> value functions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Effect {
    Linear { base: f64, step: f64 },              // base * (1 + (level-1) * step)
    Additive { base: f64, step: f64 },            // base + (level-1) * step
    Decay { base: f64, factor: f64, floor: f64 }, // max(floor, base * factor^(level-1))
    Flag,                                         // 1 once bought
    Count,                                        // Number of purchases
}

impl Effect {
    pub fn value(&self, level: u32) -> f64 {
        let n = level as f64 - 1.0;
        match *self {
            Effect::Linear { base, step } => base * (1.0 + n * step),
            Effect::Additive { base, step } => base + n * step,
            Effect::Decay { base, factor, floor } => (base * factor.powf(n)).max(floor),
            Effect::Flag => {
                if level > 0 {
                    1.0
                } else {
                    0.0
                }
            }
            Effect::Count => level as f64,
        }
    }
}

/// Stats an upgrade can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatTarget {
    HarvesterSpeed,
    HarvesterCapacity,
    FuelTank, // Max fuel multiplier for every fuel-using kind
    LaserDamage,
    FireRate,
    Spread,
    LargeHaul,
    SpawnInterval,
    HarvesterRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpgradeAction {
    SetStat(StatTarget),
    SpawnUnit(UnitKind),
}

#[derive(Debug, Clone, Serialize)]
pub struct UpgradeDef {
    pub id: &'static str,
    pub name: &'static str,
    pub group: &'static str,
    pub subgroup: &'static str,
    pub description: &'static str,
    pub base_level: u32,
    pub base_cost: u64,
    pub cost_growth: CostGrowth,
    pub effect: Effect,
    pub action: UpgradeAction,
}

pub static CATALOG: &[UpgradeDef] = &[
    UpgradeDef {
        id: "speed",
        name: "Speed Boost",
        group: "ship",
        subgroup: "Mobility & Hull",
        description: "Increases harvester movement speed by 50%",
        base_level: 1,
        base_cost: 100,
        cost_growth: CostGrowth::Multiply(1.5),
        effect: Effect::Linear {
            base: MOVEMENT_SPEED_BASE,
            step: 0.5,
        },
        action: UpgradeAction::SetStat(StatTarget::HarvesterSpeed),
    },
    UpgradeDef {
        id: "capacity",
        name: "Cargo Capacity",
        group: "ship",
        subgroup: "Mobility & Hull",
        description: "Increases trip haul limit by 5",
        base_level: 1,
        base_cost: 150,
        cost_growth: CostGrowth::Multiply(1.5),
        effect: Effect::Additive {
            base: CARGO_CAPACITY_BASE as f64,
            step: 5.0,
        },
        action: UpgradeAction::SetStat(StatTarget::HarvesterCapacity),
    },
    UpgradeDef {
        id: "fuel-tank",
        name: "Extended Tanks",
        group: "ship",
        subgroup: "Mobility & Hull",
        description: "Increases max fuel of harvesters and miners by 25%",
        base_level: 1,
        base_cost: 200,
        cost_growth: CostGrowth::Multiply(1.6),
        effect: Effect::Linear {
            base: 1.0,
            step: 0.25,
        },
        action: UpgradeAction::SetStat(StatTarget::FuelTank),
    },
    UpgradeDef {
        id: "damage",
        name: "Laser Damage",
        group: "ship",
        subgroup: "Weapon Systems",
        description: "Increases bullet damage by 20%",
        base_level: 1,
        base_cost: 250,
        cost_growth: CostGrowth::Multiply(1.8),
        effect: Effect::Linear {
            base: BASE_LASER_DAMAGE,
            step: 0.2,
        },
        action: UpgradeAction::SetStat(StatTarget::LaserDamage),
    },
    UpgradeDef {
        id: "fire-rate",
        name: "Rapid Fire",
        group: "ship",
        subgroup: "Weapon Systems",
        description: "Reduces fire cooldown by 10%",
        base_level: 1,
        base_cost: 300,
        cost_growth: CostGrowth::Multiply(2.0),
        effect: Effect::Decay {
            base: FIRE_RATE_MS,
            factor: 0.9,
            floor: 0.0,
        },
        action: UpgradeAction::SetStat(StatTarget::FireRate),
    },
    UpgradeDef {
        id: "accuracy",
        name: "Precision Optics",
        group: "ship",
        subgroup: "Weapon Systems",
        description: "Reduces bullet spread by 15%",
        base_level: 1,
        base_cost: 400,
        cost_growth: CostGrowth::Multiply(2.2),
        effect: Effect::Decay {
            base: BULLET_SPREAD_DEGREES,
            factor: 0.85,
            floor: 0.0,
        },
        action: UpgradeAction::SetStat(StatTarget::Spread),
    },
    UpgradeDef {
        id: "large-haul",
        name: "Large Haul Cargo Bay",
        group: "ship",
        subgroup: "Ship Systems",
        description: "Lets harvesters collect whole asteroids without breaking them up",
        base_level: 0,
        base_cost: 500,
        cost_growth: CostGrowth::Once,
        effect: Effect::Flag,
        action: UpgradeAction::SetStat(StatTarget::LargeHaul),
    },
    UpgradeDef {
        id: "spawn",
        name: "Resource Spawning",
        group: "world",
        subgroup: "Resource Generation",
        description: "Reduces delay between new resource spawns",
        base_level: 1,
        base_cost: 150,
        cost_growth: CostGrowth::Multiply(2.5),
        effect: Effect::Decay {
            base: SPAWN_INTERVAL_BASE_MS,
            factor: 0.9,
            floor: SPAWN_INTERVAL_FLOOR_MS,
        },
        action: UpgradeAction::SetStat(StatTarget::SpawnInterval),
    },
    UpgradeDef {
        id: "harvester-range",
        name: "Harvester Range",
        group: "ship",
        subgroup: "Ship Systems",
        description: "Increases collection radius around bases by 20%",
        base_level: 1,
        base_cost: 200,
        cost_growth: CostGrowth::Multiply(1.8),
        effect: Effect::Linear {
            base: HARVESTER_RANGE,
            step: 0.2,
        },
        action: UpgradeAction::SetStat(StatTarget::HarvesterRange),
    },
    UpgradeDef {
        id: "vehicle-harvester",
        name: "Harvester",
        group: "fleet",
        subgroup: "Vehicles",
        description: "Builds a harvester at the home base",
        base_level: 0,
        base_cost: 200,
        cost_growth: CostGrowth::Multiply(1.5),
        effect: Effect::Count,
        action: UpgradeAction::SpawnUnit(UnitKind::Harvester),
    },
    UpgradeDef {
        id: "vehicle-miner",
        name: "Miner",
        group: "fleet",
        subgroup: "Vehicles",
        description: "Builds a miner that shoots asteroids near its base",
        base_level: 0,
        base_cost: 400,
        cost_growth: CostGrowth::Multiply(1.6),
        effect: Effect::Count,
        action: UpgradeAction::SpawnUnit(UnitKind::Miner),
    },
    UpgradeDef {
        id: "vehicle-satellite",
        name: "Research Satellite",
        group: "fleet",
        subgroup: "Vehicles",
        description: "Launches a satellite that orbits its base and gathers research",
        base_level: 0,
        base_cost: 600,
        cost_growth: CostGrowth::Multiply(1.8),
        effect: Effect::Count,
        action: UpgradeAction::SpawnUnit(UnitKind::Satellite),
    },
];

pub fn find_def(id: &str) -> Option<&'static UpgradeDef> {
    CATALOG.iter().find(|def| def.id == id)
}

/// Catalog id of the upgrade that builds a vehicle of the given type name.
pub fn vehicle_upgrade_id(vehicle: &str) -> Result<&'static str, ShopError> {
    CATALOG
        .iter()
        .find(|def| matches!(def.action, UpgradeAction::SpawnUnit(kind) if kind.name() == vehicle))
        .map(|def| def.id)
        .ok_or_else(|| ShopError::UnknownVehicle(vehicle.to_string()))
}

/// Live level/cost of one catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeState {
    pub level: u32,
    pub cost: Option<u64>, // None once sold out
    pub value: f64,
}

/// Result of a successful purchase, applied by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Purchase {
    pub id: &'static str,
    pub level: u32,
    pub value: f64,
    pub action: UpgradeAction,
}

/// Shop-panel row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeView {
    pub id: &'static str,
    pub name: &'static str,
    pub group: &'static str,
    pub subgroup: &'static str,
    pub description: &'static str,
    pub level: u32,
    pub cost: Option<u64>,
    pub value: f64,
    pub affordable: bool,
}

#[derive(Debug, Clone)]
pub struct Shop {
    states: Vec<UpgradeState>, // Parallel to CATALOG
    pub base_cost: u64,
}

impl Shop {
    pub fn new() -> Self {
        let states = CATALOG
            .iter()
            .map(|def| UpgradeState {
                level: def.base_level,
                cost: Some(def.base_cost),
                value: def.effect.value(def.base_level),
            })
            .collect();
        Shop {
            states,
            base_cost: BASE_PURCHASE_COST,
        }
    }

    fn index_of(id: &str) -> Result<usize, ShopError> {
        CATALOG
            .iter()
            .position(|def| def.id == id)
            .ok_or_else(|| ShopError::UnknownUpgrade(id.to_string()))
    }

    pub fn state(&self, id: &str) -> Option<&UpgradeState> {
        Self::index_of(id).ok().and_then(|i| self.states.get(i))
    }

    /// Buys one level of `id`. Rejected purchases leave both the shop and the
    /// inventory untouched. The next cost is computed from the price just paid.
    pub fn purchase(&mut self, id: &str, inventory: &mut Inventory) -> Result<Purchase, ShopError> {
        let index = Self::index_of(id)?;
        let def = &CATALOG[index];
        let state = &mut self.states[index];
        let cost = state.cost.ok_or_else(|| ShopError::SoldOut(id.to_string()))?;
        inventory.try_debit(cost)?;

        state.level += 1;
        state.value = def.effect.value(state.level);
        state.cost = def.cost_growth.next(cost);

        crate::debug_shop!(
            "Bought {} level {} for {} (value {:.2}, next cost {:?})",
            def.id,
            state.level,
            cost,
            state.value,
            state.cost
        );
        Ok(Purchase {
            id: def.id,
            level: state.level,
            value: state.value,
            action: def.action,
        })
    }

    /// Debits the current base price and grows it for the next purchase.
    /// Returns the amount paid.
    pub fn purchase_base(&mut self, inventory: &mut Inventory) -> Result<u64, ShopError> {
        let cost = self.base_cost;
        inventory.try_debit(cost)?;
        self.base_cost = (cost as f64 * BASE_COST_GROWTH).floor() as u64;
        crate::debug_shop!("Bought base for {} (next cost {})", cost, self.base_cost);
        Ok(cost)
    }

    pub fn view(&self, inventory: &Inventory) -> Vec<UpgradeView> {
        CATALOG
            .iter()
            .zip(&self.states)
            .map(|(def, state)| UpgradeView {
                id: def.id,
                name: def.name,
                group: def.group,
                subgroup: def.subgroup,
                description: def.description,
                level: state.level,
                cost: state.cost,
                value: state.value,
                affordable: state.cost.is_some_and(|c| inventory.can_afford(c)),
            })
            .collect()
    }
}

impl Default for Shop {
    fn default() -> Self {
        Self::new()
    }
}
