use crate::config::*;
use crate::resource::{Resource, ResourceIds, split_asteroid};
use crate::spatial::SpatialGrid;
use crate::store::EntityStore;
use crate::types::{BaseId, Point, ResourceId, UnitId};
use crate::utils;
use rand::Rng;
use serde::Serialize;

// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Owner {
    Base(BaseId),
    Unit(UnitId),
}

// A bullet travelling in a straight line until it hits an asteroid or runs out of range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Projectile {
    pub origin: Point,
    pub position: Point,
    pub direction: Point, // Unit vector, fixed at fire time
    pub speed: f64,       // Units per second
    pub traveled: f64,
    pub max_range: f64,
    pub damage: f64,
    pub owner: Owner,
}

/// An asteroid destroyed this tick
#[derive(Debug, Clone, PartialEq)]
pub struct Shatter {
    pub asteroid: ResourceId,
    pub position: Point,
    pub fragments: usize,
    pub owner: Owner,
}

/// Fires from `origin` towards `aim`, deviating by a random angle within
/// ±`spread_degrees`. Returns `None` if either point is malformed.
pub fn fire<R: Rng + ?Sized>(
    rng: &mut R,
    origin: Point,
    aim: Point,
    spread_degrees: f64,
    damage: f64,
    owner: Owner,
) -> Option<Projectile> {
    if !origin.is_finite() || !aim.is_finite() {
        return None;
    }
    let spread = if spread_degrees > 0.0 {
        rng.gen_range(-spread_degrees..=spread_degrees)
    } else {
        0.0
    };
    let angle = utils::angle_between(&origin, &aim) + spread.to_radians();
    crate::debug_weapon!(
        "{:?} fired from ({:.1}, {:.1}) at {:.1} deg (spread {:.2})",
        owner,
        origin.x,
        origin.y,
        angle.to_degrees(),
        spread
    );
    Some(Projectile {
        origin,
        position: origin,
        direction: Point::from_angle(angle),
        speed: BULLET_SPEED,
        traveled: 0.0,
        max_range: BULLET_MAX_RANGE,
        damage,
        owner,
    })
}

// Moves one projectile through its sub-steps. Returns true when it is spent
// (out of range or hit something). Destroyed asteroids are recorded but stay
// in the slice until the pass is over so grid indices remain valid.
fn advance(
    projectile: &mut Projectile,
    resources: &mut [Resource],
    grid: &SpatialGrid,
    dt_secs: f64,
    destroyed: &mut Vec<(ResourceId, Owner)>,
) -> bool {
    let step = projectile.speed * dt_secs / PROJECTILE_SUB_STEPS as f64;

    for _ in 0..PROJECTILE_SUB_STEPS {
        projectile.position += projectile.direction * step;
        projectile.traveled += step;

        if projectile.traveled > projectile.max_range {
            crate::debug_weapon!(
                "{:?} projectile expired after {:.0} units",
                projectile.owner,
                projectile.traveled
            );
            return true;
        }

        // Only whole asteroids stop bullets; lowest slot wins a tie
        let position = projectile.position;
        let hit = grid
            .neighbors(position)
            .filter(|&j| {
                let r = &resources[j];
                !r.is_fragment
                    && !r.is_destroyed()
                    && r.position.distance(&position) < r.size * BULLET_HIT_RADIUS_FACTOR
            })
            .min();

        if let Some(j) = hit {
            let target = &mut resources[j];
            let killed = target.apply_damage(projectile.damage);
            crate::debug_weapon!(
                "{:?} hit asteroid {} for {:.1}, health {:.1}/{:.1}",
                projectile.owner,
                target.id,
                projectile.damage,
                target.health,
                target.max_health
            );
            if killed {
                destroyed.push((target.id, projectile.owner));
            }
            return true;
        }
    }
    false
}

/// Advances every live projectile and resolves hits. Asteroids reduced to zero
/// health are split into fragments and removed from the store.
pub fn update_projectiles<R: Rng + ?Sized>(
    projectiles: &mut Vec<Projectile>,
    resources: &mut EntityStore<Resource>,
    grid: &mut SpatialGrid,
    ids: &mut ResourceIds,
    rng: &mut R,
    dt_secs: f64,
) -> Vec<Shatter> {
    if projectiles.is_empty() {
        return Vec::new();
    }
    grid.rebuild(resources.iter().map(|r| r.position));

    let mut destroyed = Vec::new();
    let mut i = 0;
    while i < projectiles.len() {
        if advance(&mut projectiles[i], resources.as_mut_slice(), grid, dt_secs, &mut destroyed) {
            projectiles.swap_remove(i);
        } else {
            i += 1;
        }
    }

    let mut shattered = Vec::with_capacity(destroyed.len());
    for (id, owner) in destroyed {
        let Some(asteroid) = resources.remove(id) else {
            continue;
        };
        let fragments = split_asteroid(rng, ids, &asteroid);
        let count = fragments.len();
        for fragment in fragments {
            resources.insert(fragment);
        }
        log::info!(
            "Asteroid {} shattered into {} fragments at ({:.0}, {:.0})",
            asteroid.id,
            count,
            asteroid.position.x,
            asteroid.position.y
        );
        shattered.push(Shatter {
            asteroid: asteroid.id,
            position: asteroid.position,
            fragments: count,
            owner,
        });
    }
    shattered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Payload, ResourceKind};
    use assert_approx_eq::assert_approx_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const DT: f64 = 1.0 / 60.0;

    fn target(id: u64, x: f64, health: f64) -> Resource {
        let payload: Payload = [(ResourceKind::Crystals, 10), (ResourceKind::Iron, 4)]
            .into_iter()
            .collect();
        let mut r = Resource::asteroid(ResourceId(id), 1.0, Point::new(x, 0.0), Point::ZERO, payload);
        r.health = health;
        r.max_health = health;
        r
    }

    fn run(
        projectiles: &mut Vec<Projectile>,
        resources: &mut EntityStore<Resource>,
        ids: &mut ResourceIds,
        ticks: usize,
    ) -> Vec<Shatter> {
        let mut rng = StdRng::seed_from_u64(3);
        let mut grid = SpatialGrid::new(GRID_CELL_SIZE);
        let mut all = Vec::new();
        for _ in 0..ticks {
            all.extend(update_projectiles(projectiles, resources, &mut grid, ids, &mut rng, DT));
        }
        all
    }

    #[test]
    fn test_fire_without_spread_goes_straight() {
        let mut rng = StdRng::seed_from_u64(1);
        let p = fire(&mut rng, Point::ZERO, Point::new(0.0, 10.0), 0.0, 20.0, Owner::Base(BaseId(1))).unwrap();
        assert_approx_eq!(p.direction.x, 0.0);
        assert_approx_eq!(p.direction.y, 1.0);
        assert_eq!(p.traveled, 0.0);
    }

    #[test]
    fn test_fire_spread_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let p = fire(&mut rng, Point::ZERO, Point::new(10.0, 0.0), 5.0, 1.0, Owner::Base(BaseId(1))).unwrap();
            let angle = p.direction.y.atan2(p.direction.x).to_degrees();
            assert!(angle.abs() <= 5.0 + 1e-9);
        }
        let bad = fire(&mut rng, Point::new(f64::NAN, 0.0), Point::ZERO, 5.0, 1.0, Owner::Base(BaseId(1)));
        assert!(bad.is_none());
    }

    #[test]
    fn test_projectile_expires_past_max_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = fire(&mut rng, Point::ZERO, Point::new(1.0, 0.0), 0.0, 1.0, Owner::Base(BaseId(1))).unwrap();
        p.traveled = BULLET_MAX_RANGE - 1.0;
        let mut projectiles = vec![p];
        let mut resources = EntityStore::new();
        let mut ids = ResourceIds::new();
        run(&mut projectiles, &mut resources, &mut ids, 1);
        assert!(projectiles.is_empty());
    }

    #[test]
    fn test_one_hit_kill_shatters_asteroid() {
        let mut ids = ResourceIds::new();
        let asteroid = target(ids.next_id().0, 100.0, 20.0);
        let asteroid_id = asteroid.id;
        let mut resources = EntityStore::new();
        resources.insert(asteroid);

        let mut rng = StdRng::seed_from_u64(5);
        let p = fire(&mut rng, Point::ZERO, Point::new(100.0, 0.0), 0.0, 20.0, Owner::Unit(UnitId(1))).unwrap();
        let mut projectiles = vec![p];

        // 100 units at 500/s needs 12 ticks at 60 Hz
        let shattered = run(&mut projectiles, &mut resources, &mut ids, 30);
        assert!(projectiles.is_empty());
        assert_eq!(shattered.len(), 1);
        assert_eq!(shattered[0].asteroid, asteroid_id);
        assert!(shattered[0].fragments >= MIN_FRAGMENTS);
        assert!(!resources.contains(asteroid_id));
        assert_eq!(resources.iter().filter(|r| r.id == asteroid_id).count(), 0);
        assert_eq!(resources.len(), shattered[0].fragments);
        assert!(resources.iter().all(|r| r.is_fragment));
    }

    #[test]
    fn test_partial_damage_keeps_asteroid() {
        let mut ids = ResourceIds::new();
        let mut resources = EntityStore::new();
        resources.insert(target(ids.next_id().0, 50.0, 100.0));
        let mut rng = StdRng::seed_from_u64(5);
        let mut projectiles = vec![
            fire(&mut rng, Point::ZERO, Point::new(50.0, 0.0), 0.0, 30.0, Owner::Base(BaseId(1))).unwrap(),
        ];
        let shattered = run(&mut projectiles, &mut resources, &mut ids, 20);
        assert!(shattered.is_empty());
        assert_eq!(resources.len(), 1);
        assert_approx_eq!(resources.as_slice()[0].health, 70.0);
    }

    #[test]
    fn test_fragments_do_not_stop_bullets() {
        let mut ids = ResourceIds::new();
        let mut resources = EntityStore::new();
        let fragment = Resource::fragment(ids.next_id(), Point::new(30.0, 0.0), &Payload::new(), 5);
        resources.insert(fragment);
        let mut rng = StdRng::seed_from_u64(5);
        let mut projectiles = vec![
            fire(&mut rng, Point::ZERO, Point::new(30.0, 0.0), 0.0, 30.0, Owner::Base(BaseId(1))).unwrap(),
        ];
        run(&mut projectiles, &mut resources, &mut ids, 10);
        assert_eq!(projectiles.len(), 1);
        assert!(projectiles[0].position.x > 30.0);
        assert_eq!(resources.as_slice()[0].health, 1.0);
    }
}
