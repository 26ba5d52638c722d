//! Bases: deposit and refuel points with a collection radius. The first base
//! is the permanent home. Bases within `MAX_BASE_LINK_DISTANCE` of each other
//! are linked, which lets units relay to resources around the other base.

use crate::config::*;
use crate::types::{BaseId, Point};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Base {
    pub id: BaseId,
    pub name: String,
    pub position: Point,
    pub collection_radius: f64, // Harvest range around the base
    #[serde(skip)]
    pub last_shot_ms: Option<f64>, // Auto-fire cooldown timestamp
}

impl Base {
    pub fn new(id: BaseId, name: impl Into<String>, position: Point, collection_radius: f64) -> Self {
        Base {
            id,
            name: name.into(),
            position,
            collection_radius,
            last_shot_ms: None,
        }
    }

    /// True if `other` is a different base within link distance.
    pub fn is_linked(&self, other: &Base) -> bool {
        self.id != other.id && self.position.distance(&other.position) <= MAX_BASE_LINK_DISTANCE
    }

    /// Applies a directional impulse: each axis moves by `BASE_MOVEMENT_SPEED × Δt`.
    pub fn nudge(&mut self, dx: f64, dy: f64, dt_secs: f64) {
        let step = BASE_MOVEMENT_SPEED * dt_secs;
        self.position += Point::new(dx.clamp(-1.0, 1.0) * step, dy.clamp(-1.0, 1.0) * step);
    }

    /// Ready to fire again given the cooldown
    pub fn can_fire(&self, now_ms: f64, cooldown_ms: f64) -> bool {
        match self.last_shot_ms {
            Some(last) => now_ms - last >= cooldown_ms,
            None => true,
        }
    }
}

pub fn find(bases: &[Base], id: BaseId) -> Option<&Base> {
    bases.iter().find(|b| b.id == id)
}

pub fn find_mut(bases: &mut [Base], id: BaseId) -> Option<&mut Base> {
    bases.iter_mut().find(|b| b.id == id)
}

/// The permanent home base (first created).
pub fn home(bases: &[Base]) -> Option<&Base> {
    bases.first()
}

/// Every unordered linked pair, for drawing link lines.
pub fn links(bases: &[Base]) -> Vec<(BaseId, BaseId)> {
    let mut pairs = Vec::new();
    for (i, a) in bases.iter().enumerate() {
        for b in &bases[i + 1..] {
            if a.is_linked(b) {
                pairs.push((a.id, b.id));
            }
        }
    }
    pairs
}

/// Bases linked to `id`, in creation order.
pub fn linked_to(bases: &[Base], id: BaseId) -> impl Iterator<Item = &Base> {
    let origin = find(bases, id);
    bases
        .iter()
        .filter(move |b| origin.is_some_and(|o| o.is_linked(b)))
}

/// True if `point` is within refuel range of any base.
pub fn in_refuel_range(bases: &[Base], point: &Point) -> bool {
    bases
        .iter()
        .any(|b| b.position.distance(point) <= REFUEL_RANGE)
}

/// Where the next purchased base goes: offset from the most recent base so it
/// starts out linked to it.
pub fn next_position(bases: &[Base]) -> Point {
    let (ox, oy) = NEW_BASE_OFFSET;
    bases
        .last()
        .map(|b| b.position + Point::new(ox, oy))
        .unwrap_or(Point::ZERO)
}
