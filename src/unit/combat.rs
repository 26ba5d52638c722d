// Miner behaviour: pick the nearest whole asteroid around the assigned base,
// close to attack range and shoot it apart so harvesters get fragments.

use super::{Movement, Unit, UnitContext, UnitState, UnitTarget};
use crate::base::{self, Base};
use crate::projectile::{self, Owner};
use crate::resource::Resource;
use crate::state::SimEvent;
use crate::types::{Point, ResourceId};

/// Nearest live asteroid (not fragment) to `from` within `range` of `base`.
pub fn find_asteroid_target(resources: &[Resource], base: &Base, range: f64, from: Point) -> Option<ResourceId> {
    let mut nearest = None;
    let mut min_distance = f64::INFINITY;
    for resource in resources {
        if resource.is_fragment || resource.is_destroyed() {
            continue;
        }
        if base.position.distance(&resource.position) > range {
            continue;
        }
        let dist = from.distance(&resource.position);
        if dist < min_distance {
            min_distance = dist;
            nearest = Some(resource.id);
        }
    }
    nearest
}

pub fn step(unit: &mut Unit, ctx: &mut UnitContext) {
    match unit.state {
        UnitState::Idle => idle(unit, ctx),
        UnitState::MovingToTarget | UnitState::AttackingTarget => engage(unit, ctx),
        UnitState::ReturningToBase => unit.return_to_base(ctx),
        UnitState::MovingToResource | UnitState::MovingToBaseLink => unit.reassess(ctx.tick),
    }
}

fn idle(unit: &mut Unit, ctx: &mut UnitContext) {
    if unit.low_fuel() {
        crate::debug_combat!(unit.id.0, ctx.tick, "Low fuel ({:.2}), heading home", unit.fuel);
        unit.force_return(ctx.tick);
        return;
    }
    if !unit.idle_ready(ctx.now_ms) {
        return;
    }
    let Some(home) = base::find(ctx.bases, unit.base).or_else(|| base::home(ctx.bases)) else {
        return;
    };
    if let Some(id) = find_asteroid_target(ctx.resources.as_slice(), home, unit.range, unit.position) {
        crate::debug_combat!(unit.id.0, ctx.tick, "Hunting asteroid {}", id);
        unit.target = Some(UnitTarget::Asteroid(id));
        unit.set_state(UnitState::MovingToTarget, ctx.tick);
    }
}

fn engage(unit: &mut Unit, ctx: &mut UnitContext) {
    let target = match unit.target {
        Some(UnitTarget::Asteroid(id)) => ctx
            .resources
            .get(id)
            .filter(|r| !r.is_destroyed())
            .map(|r| (r.id, r.position)),
        _ => None,
    };
    let Some((target_id, target_pos)) = target else {
        crate::debug_combat!(unit.id.0, ctx.tick, "Target gone");
        unit.reassess(ctx.tick);
        return;
    };

    if unit.position.distance(&target_pos) < unit.attack_range {
        unit.set_state(UnitState::AttackingTarget, ctx.tick);
        try_fire(unit, ctx, target_id, target_pos);
        return;
    }

    unit.set_state(UnitState::MovingToTarget, ctx.tick);
    if unit.move_towards(target_pos, ctx.dt_secs) == Movement::OutOfFuel {
        crate::debug_combat!(unit.id.0, ctx.tick, "Out of fuel chasing {}", target_id);
        unit.force_return(ctx.tick);
    }
}

// Fires at the target if the weapon has cooled down
fn try_fire(unit: &mut Unit, ctx: &mut UnitContext, target_id: ResourceId, target_pos: Point) {
    let ready = unit
        .last_shot_ms
        .is_none_or(|last| ctx.now_ms - last >= unit.fire_rate_ms);
    if !ready {
        return;
    }
    let Some(shot) = projectile::fire(
        &mut *ctx.rng,
        unit.position,
        target_pos,
        ctx.stats.spread_degrees,
        unit.damage,
        Owner::Unit(unit.id),
    ) else {
        return;
    };
    crate::debug_combat!(unit.id.0, ctx.tick, "Firing at {}", target_id);
    unit.last_shot_ms = Some(ctx.now_ms);
    ctx.events.push(SimEvent::ProjectileFired {
        position: unit.position,
        owner: shot.owner,
    });
    ctx.projectiles.push(shot);
}

#[cfg(test)]
mod tests {
    use super::super::UnitKind;
    use super::super::test_support::Fixture;
    use super::*;
    use crate::config::*;
    use crate::types::Payload;

    fn asteroid(id: u64, x: f64) -> Resource {
        Resource::asteroid(ResourceId(id), 1.0, Point::new(x, 0.0), Point::ZERO, Payload::new())
    }

    #[test]
    fn test_target_search_skips_fragments_and_far_asteroids() {
        let fixture = Fixture::new();
        let fragment = Resource::fragment(ResourceId(1), Point::new(10.0, 0.0), &Payload::new(), 5);
        let resources = vec![fragment, asteroid(2, MINER_RANGE + 50.0), asteroid(3, 400.0)];
        let found = find_asteroid_target(&resources, &fixture.bases[0], MINER_RANGE, Point::ZERO);
        assert_eq!(found, Some(ResourceId(3)));
    }

    #[test]
    fn test_miner_closes_in_then_fires() {
        let mut fixture = Fixture::new();
        fixture.resources.insert(asteroid(1, 300.0));
        let mut unit = fixture.unit(UnitKind::Miner);

        fixture.step(&mut unit);
        assert_eq!(unit.state, UnitState::MovingToTarget);

        let mut fired = false;
        for _ in 0..200 {
            fixture.step(&mut unit);
            if !fixture.projectiles.is_empty() {
                fired = true;
                break;
            }
        }
        assert!(fired);
        assert_eq!(unit.state, UnitState::AttackingTarget);
        assert!(unit.position.distance(&Point::new(300.0, 0.0)) < MINER_ATTACK_RANGE);
        assert_eq!(fixture.projectiles[0].owner, Owner::Unit(unit.id));
        assert_eq!(fixture.projectiles[0].damage, MINER_DAMAGE);
    }

    #[test]
    fn test_fire_rate_limits_shots() {
        let mut fixture = Fixture::new();
        fixture.resources.insert(asteroid(1, 50.0));
        let mut unit = fixture.unit(UnitKind::Miner);
        unit.state = UnitState::MovingToTarget;
        unit.target = Some(UnitTarget::Asteroid(ResourceId(1)));

        // 20 ticks at 60 Hz is ~333 ms, less than one cooldown
        for _ in 0..20 {
            fixture.step(&mut unit);
        }
        assert_eq!(fixture.projectiles.len(), 1);
    }

    #[test]
    fn test_destroyed_target_sends_miner_idle() {
        let mut fixture = Fixture::new();
        let mut dead = asteroid(1, 50.0);
        dead.health = 0.0;
        fixture.resources.insert(dead);
        let mut unit = fixture.unit(UnitKind::Miner);
        unit.state = UnitState::AttackingTarget;
        unit.target = Some(UnitTarget::Asteroid(ResourceId(1)));
        fixture.step(&mut unit);
        assert_eq!(unit.state, UnitState::Idle);
        assert_eq!(unit.target, None);
    }
}
