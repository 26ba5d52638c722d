use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// Represents a 2D point (or vector) in world coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Unit vector pointing along `angle` (radians).
    pub fn from_angle(angle: f64) -> Self {
        Point {
            x: angle.cos(),
            y: angle.sin(),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance. Non-finite coordinates yield `f64::INFINITY` so that
    /// range checks against a malformed point are always false.
    pub fn distance(&self, other: &Point) -> f64 {
        if !self.is_finite() || !other.is_finite() {
            return f64::INFINITY;
        }
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn dot(&self, other: &Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Normalized copy, or `None` for a (near) zero vector.
    pub fn normalized(&self) -> Option<Point> {
        let len = self.length();
        if len > 1e-12 && len.is_finite() {
            Some(Point {
                x: self.x / len,
                y: self.y / len,
            })
        } else {
            None
        }
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

// --- Identifiers ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UnitId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BaseId(pub u32);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unit {}", self.0)
    }
}

impl fmt::Display for BaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Base {}", self.0)
    }
}

// --- Resource kinds & payloads ---

/// Kinds of material carried by asteroids. `Crystals` is the primary kind and
/// doubles as the shop currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ResourceKind {
    Crystals,
    Iron,
    Nickel,
    Ice,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Crystals,
        ResourceKind::Iron,
        ResourceKind::Nickel,
        ResourceKind::Ice,
    ];
    pub const PRIMARY: ResourceKind = ResourceKind::Crystals;

    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Crystals => "Crystals",
            ResourceKind::Iron => "Iron",
            ResourceKind::Nickel => "Nickel",
            ResourceKind::Ice => "Ice",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Quantities per resource kind. Zero entries are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Payload(BTreeMap<ResourceKind, u32>);

impl Payload {
    pub fn new() -> Self {
        Payload(BTreeMap::new())
    }

    pub fn get(&self, kind: ResourceKind) -> u32 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    pub fn add(&mut self, kind: ResourceKind, amount: u32) {
        if amount > 0 {
            *self.0.entry(kind).or_insert(0) += amount;
        }
    }

    /// Merges every entry of `other` into `self`.
    pub fn absorb(&mut self, other: &Payload) {
        for (kind, amount) in other.iter() {
            self.add(kind, amount);
        }
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, u32)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(ResourceKind, u32)> for Payload {
    fn from_iter<I: IntoIterator<Item = (ResourceKind, u32)>>(iter: I) -> Self {
        let mut payload = Payload::new();
        for (kind, amount) in iter {
            payload.add(kind, amount);
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_approx_eq!(a.distance(&b), 5.0);
        assert_approx_eq!(b.distance(&a), 5.0);
    }

    #[test]
    fn test_distance_with_malformed_point_is_unreachable() {
        let a = Point::new(f64::NAN, 0.0);
        let b = Point::new(1.0, 1.0);
        assert_eq!(a.distance(&b), f64::INFINITY);
        assert!(!(a.distance(&b) <= 1000.0));
    }

    #[test]
    fn test_normalized_zero_vector() {
        assert!(Point::ZERO.normalized().is_none());
        let n = Point::new(0.0, 2.0).normalized().unwrap();
        assert_approx_eq!(n.y, 1.0);
    }

    #[test]
    fn test_payload_skips_zero_and_merges() {
        let mut a = Payload::new();
        a.add(ResourceKind::Iron, 0);
        assert!(a.is_empty());
        a.add(ResourceKind::Crystals, 3);
        let b: Payload = [(ResourceKind::Crystals, 2), (ResourceKind::Ice, 4)]
            .into_iter()
            .collect();
        a.absorb(&b);
        assert_eq!(a.get(ResourceKind::Crystals), 5);
        assert_eq!(a.get(ResourceKind::Ice), 4);
        assert_eq!(a.total(), 9);
    }
}
