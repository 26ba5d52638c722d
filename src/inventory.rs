use crate::config::STARTING_CRYSTALS;
use crate::error::ShopError;
use crate::types::{Payload, ResourceKind};
use serde::Serialize;
use std::collections::BTreeMap;

/// Shared stockpile of deposited resources plus the research counter.
///
/// Only two things write to it: units depositing cargo at a base and shop
/// purchases debiting the primary kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inventory {
    amounts: BTreeMap<ResourceKind, u64>,
    pub research: f64,
}

impl Inventory {
    /// Empty inventory with no starting funds.
    pub fn empty() -> Self {
        Inventory {
            amounts: BTreeMap::new(),
            research: 0.0,
        }
    }

    /// Inventory seeded with the starting Crystals.
    pub fn new() -> Self {
        let mut inventory = Self::empty();
        inventory.credit(ResourceKind::PRIMARY, STARTING_CRYSTALS);
        inventory
    }

    pub fn balance(&self, kind: ResourceKind) -> u64 {
        self.amounts.get(&kind).copied().unwrap_or(0)
    }

    /// Balance of the shop currency
    pub fn funds(&self) -> u64 {
        self.balance(ResourceKind::PRIMARY)
    }

    pub fn credit(&mut self, kind: ResourceKind, amount: u64) {
        *self.amounts.entry(kind).or_insert(0) += amount;
    }

    /// Merges a unit's cargo, per kind. Returns the number of units deposited.
    pub fn deposit(&mut self, payload: &Payload) -> u64 {
        let mut total = 0;
        for (kind, amount) in payload.iter() {
            self.credit(kind, amount as u64);
            total += amount as u64;
        }
        total
    }

    pub fn can_afford(&self, cost: u64) -> bool {
        self.funds() >= cost
    }

    /// Debits `cost` of the primary kind, or leaves the inventory untouched.
    pub fn try_debit(&mut self, cost: u64) -> Result<(), ShopError> {
        let available = self.funds();
        if available < cost {
            return Err(ShopError::InsufficientFunds {
                needed: cost,
                available,
            });
        }
        self.amounts.insert(ResourceKind::PRIMARY, available - cost);
        Ok(())
    }

    pub fn add_research(&mut self, points: f64) {
        self.research += points;
    }

    /// Every kind with its balance, including zero entries, for display.
    pub fn summary(&self) -> Vec<(ResourceKind, u64)> {
        ResourceKind::ALL
            .into_iter()
            .map(|kind| (kind, self.balance(kind)))
            .collect()
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}
