//! Resource entities: asteroids and the fragments they shatter into.

use crate::config::*;
use crate::store::Keyed;
use crate::types::{Payload, Point, ResourceId, ResourceKind};
use crate::utils;
use rand::Rng;

/// An asteroid or fragment floating in the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: ResourceId,
    pub position: Point,
    pub velocity: Point,
    pub size: f64, // Collision radius
    pub mass: f64,
    pub restitution: f64,
    pub health: f64,
    pub max_health: f64,
    pub payload: Payload,
    pub is_fragment: bool,
}

impl Keyed for Resource {
    type Key = ResourceId;
    fn key(&self) -> ResourceId {
        self.id
    }
}

// Issues resource ids
#[derive(Debug, Clone, Default)]
pub struct ResourceIds {
    next: u64,
}

impl ResourceIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> ResourceId {
        self.next += 1;
        ResourceId(self.next)
    }
}

/// Health granted to an asteroid of the given size factor, never below 1.
pub fn health_for(size_factor: f64) -> f64 {
    (size_factor * HEALTH_PER_SIZE).floor().max(1.0)
}

/// Total payload units carried by an asteroid of the given size factor, never below 1.
pub fn reward_for(size_factor: f64) -> u32 {
    ((size_factor * REWARD_PER_SIZE).floor() as u32).max(1)
}

/// Number of fragments an asteroid with `max_health` shatters into.
pub fn fragment_count(max_health: f64) -> usize {
    let units = (max_health.max(0.0) as u32) / HEALTH_PER_FRAGMENT_UNIT;
    MIN_FRAGMENTS + units as usize * FRAGMENTS_PER_UNIT
}

/// Splits `reward` across resource kinds: the primary kind gets
/// `PRIMARY_PAYLOAD_SHARE` (at least 1), the remainder is divided across the
/// other kinds by random weights. Every share is floored.
pub fn split_reward<R: Rng + ?Sized>(rng: &mut R, reward: u32) -> Payload {
    let mut payload = Payload::new();
    let primary = ((reward as f64 * PRIMARY_PAYLOAD_SHARE).floor() as u32).max(1);
    payload.add(ResourceKind::PRIMARY, primary);

    let remainder = reward.saturating_sub(primary);
    if remainder == 0 {
        return payload;
    }
    let others: Vec<ResourceKind> = ResourceKind::ALL
        .into_iter()
        .filter(|k| *k != ResourceKind::PRIMARY)
        .collect();
    let weights: Vec<f64> = others.iter().map(|_| rng.gen_range(0.0..1.0)).collect();
    let total_weight: f64 = weights.iter().sum();
    if total_weight <= 0.0 {
        return payload;
    }
    for (kind, weight) in others.into_iter().zip(weights) {
        let share = (remainder as f64 * weight / total_weight).floor() as u32;
        payload.add(kind, share);
    }
    payload
}

impl Resource {
    /// Builds an asteroid with explicit parameters.
    pub fn asteroid(
        id: ResourceId,
        size_factor: f64,
        position: Point,
        velocity: Point,
        payload: Payload,
    ) -> Self {
        let size = ASTEROID_BASE_SIZE * size_factor;
        let health = health_for(size_factor);
        Resource {
            id,
            position,
            velocity,
            size,
            mass: size.powi(3) * ASTEROID_DENSITY,
            restitution: ASTEROID_RESTITUTION,
            health,
            max_health: health,
            payload,
            is_fragment: false,
        }
    }

    /// Builds a fragment carrying `inherited / fragments` of each kind,
    /// rounded up so the split never loses payload. Velocity starts at zero.
    pub fn fragment(id: ResourceId, position: Point, inherited: &Payload, fragments: usize) -> Self {
        let parts = fragments.max(1) as u32;
        let payload = inherited
            .iter()
            .map(|(kind, amount)| (kind, amount.div_ceil(parts)))
            .collect();
        Resource {
            id,
            position,
            velocity: Point::ZERO,
            size: FRAGMENT_SIZE,
            mass: FRAGMENT_SIZE.powi(3) * FRAGMENT_DENSITY,
            restitution: FRAGMENT_RESTITUTION,
            health: 1.0,
            max_health: 1.0,
            payload,
            is_fragment: true,
        }
    }

    /// Fragments are always collectible; whole asteroids need the large-haul capability.
    pub fn collectible(&self, large_haul: bool) -> bool {
        self.is_fragment || large_haul
    }

    pub fn is_destroyed(&self) -> bool {
        self.health <= 0.0
    }

    pub fn health_ratio(&self) -> f64 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    // Renderer alpha: damaged asteroids fade towards half opacity
    pub fn display_alpha(&self) -> f64 {
        0.5 + self.health_ratio() * 0.5
    }

    /// Applies damage, keeping health within [0, max_health].
    /// Returns true when this hit destroyed the resource.
    pub fn apply_damage(&mut self, damage: f64) -> bool {
        self.health = (self.health - damage.max(0.0)).clamp(0.0, self.max_health);
        self.is_destroyed()
    }

    pub fn inverse_mass(&self) -> f64 {
        if self.mass > 0.0 { 1.0 / self.mass } else { 0.0 }
    }

    pub fn friction(&self) -> f64 {
        if self.is_fragment {
            FRAGMENT_FRICTION
        } else {
            ASTEROID_FRICTION
        }
    }
}

/// Spawns a randomly sized asteroid. Uses `at` when given, otherwise a random
/// point within `spawn_radius` of `center`. Drifts in a random direction at up
/// to `ASTEROID_DRIFT_MAX`.
pub fn spawn_asteroid<R: Rng + ?Sized>(
    rng: &mut R,
    id: ResourceId,
    center: Point,
    spawn_radius: f64,
    at: Option<Point>,
) -> Resource {
    let size_factor = rng.gen_range(MIN_SIZE_FACTOR..=MAX_SIZE_FACTOR);
    let position = match at {
        Some(p) => p,
        None => utils::random_point_in_disc(rng, center, spawn_radius),
    };
    let drift = utils::random_direction(rng) * rng.gen_range(0.0..=ASTEROID_DRIFT_MAX);
    let payload = split_reward(rng, reward_for(size_factor));
    Resource::asteroid(id, size_factor, position, drift, payload)
}

/// Shatters a destroyed asteroid into fragments. Each fragment is offset by up
/// to half the asteroid's radius and flung outwards at a random explosion
/// speed. The caller removes the original from the live set.
pub fn split_asteroid<R: Rng + ?Sized>(
    rng: &mut R,
    ids: &mut ResourceIds,
    asteroid: &Resource,
) -> Vec<Resource> {
    let count = fragment_count(asteroid.max_health);
    (0..count)
        .map(|_| {
            let position = utils::random_point_in_disc(rng, asteroid.position, asteroid.size / 2.0);
            let mut fragment = Resource::fragment(ids.next_id(), position, &asteroid.payload, count);
            let speed = rng.gen_range(MIN_EXPLOSION_SPEED..=MAX_EXPLOSION_SPEED);
            fragment.velocity = utils::random_direction(rng) * speed;
            fragment
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_asteroid_health_matches_size_factor() {
        let mut rng = rng();
        let mut ids = ResourceIds::new();
        for _ in 0..200 {
            let a = spawn_asteroid(&mut rng, ids.next_id(), Point::ZERO, 500.0, None);
            let factor = a.size / ASTEROID_BASE_SIZE;
            assert!((MIN_SIZE_FACTOR..=MAX_SIZE_FACTOR + 1e-9).contains(&factor));
            assert!((a.max_health - (factor * HEALTH_PER_SIZE).floor()).abs() <= 1.0);
            assert!(a.health >= 0.0 && a.health <= a.max_health);
            assert!(a.position.distance(&Point::ZERO) <= 500.0);
            assert!(a.velocity.length() <= ASTEROID_DRIFT_MAX + 1e-9);
        }
    }

    #[test]
    fn test_minimum_size_factor_still_yields_health_and_reward() {
        assert!(health_for(MIN_SIZE_FACTOR) >= 1.0);
        assert!(reward_for(MIN_SIZE_FACTOR) >= 1);
        // Degenerate factor still floors to the minimum
        assert_eq!(health_for(0.0), 1.0);
        assert_eq!(reward_for(0.0), 1);
    }

    #[test]
    fn test_split_reward_primary_share() {
        let mut rng = rng();
        let payload = split_reward(&mut rng, 50);
        assert_eq!(payload.get(ResourceKind::Crystals), 25);
        assert!(payload.total() <= 50);
        // A single reward unit always lands in the primary kind
        let tiny = split_reward(&mut rng, 1);
        assert_eq!(tiny.get(ResourceKind::Crystals), 1);
        assert_eq!(tiny.total(), 1);
    }

    #[test]
    fn test_explicit_position_is_used() {
        let mut rng = rng();
        let at = Point::new(12.0, -7.0);
        let a = spawn_asteroid(&mut rng, ResourceId(1), Point::ZERO, 5000.0, Some(at));
        assert_eq!(a.position, at);
    }

    #[test]
    fn test_asteroid_heavier_than_fragment() {
        let payload = Payload::new();
        let a = Resource::asteroid(ResourceId(1), 1.0, Point::ZERO, Point::ZERO, payload.clone());
        let f = Resource::fragment(ResourceId(2), Point::ZERO, &payload, 5);
        assert!(a.mass > f.mass);
        assert!(f.friction() > a.friction());
        assert_eq!(f.health, 1.0);
        assert_eq!(f.velocity, Point::ZERO);
    }

    #[test]
    fn test_fragment_count_scales_with_health() {
        assert_eq!(fragment_count(20.0), MIN_FRAGMENTS);
        assert_eq!(fragment_count(99.0), MIN_FRAGMENTS);
        assert_eq!(fragment_count(200.0), MIN_FRAGMENTS + 2 * FRAGMENTS_PER_UNIT);
    }

    #[test]
    fn test_split_conserves_payload() {
        let mut rng = rng();
        let mut ids = ResourceIds::new();
        let payload: Payload = [
            (ResourceKind::Crystals, 25),
            (ResourceKind::Iron, 13),
            (ResourceKind::Ice, 1),
        ]
        .into_iter()
        .collect();
        let mut asteroid = Resource::asteroid(ids.next_id(), 2.0, Point::new(50.0, 50.0), Point::ZERO, payload);
        assert_eq!(asteroid.max_health, 200.0);
        asteroid.health = 0.0;

        let fragments = split_asteroid(&mut rng, &mut ids, &asteroid);
        assert!(fragments.len() >= 5);
        for kind in ResourceKind::ALL {
            let summed: u32 = fragments.iter().map(|f| f.payload.get(kind)).sum();
            assert!(summed >= asteroid.payload.get(kind), "{kind} lost in split");
        }
        for f in &fragments {
            assert!(f.is_fragment);
            assert_ne!(f.id, asteroid.id);
            assert!(f.position.distance(&asteroid.position) <= asteroid.size / 2.0 + 1e-9);
            let speed = f.velocity.length();
            assert!(speed >= MIN_EXPLOSION_SPEED - 1e-9 && speed <= MAX_EXPLOSION_SPEED + 1e-9);
        }
    }

    #[test]
    fn test_apply_damage_clamps_health() {
        let mut a = Resource::asteroid(ResourceId(1), 1.0, Point::ZERO, Point::ZERO, Payload::new());
        assert!(!a.apply_damage(30.0));
        assert_approx_eq!(a.health, 70.0);
        assert_approx_eq!(a.display_alpha(), 0.5 + 0.7 * 0.5);
        assert!(a.apply_damage(500.0));
        assert_eq!(a.health, 0.0);
    }
}
