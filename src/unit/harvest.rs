// Harvester behaviour: find fragments around the assigned base (or a linked
// base), fly to them collecting anything in reach, bring the haul home.

use super::{Movement, Unit, UnitContext, UnitState, UnitTarget};
use crate::base::{self, Base};
use crate::config::PLAYER_SIZE;
use crate::resource::Resource;
use crate::types::{Point, ResourceId};

/// Nearest collectible resource to `from` among those within `range` of
/// `base`. Distance to the unit decides, not distance to the base; on a tie
/// the earlier resource wins.
pub fn find_local_resource(
    resources: &[Resource],
    base: &Base,
    range: f64,
    from: Point,
    large_haul: bool,
) -> Option<ResourceId> {
    let mut nearest = None;
    let mut min_distance = f64::INFINITY;
    for resource in resources {
        if resource.is_destroyed() || !resource.collectible(large_haul) {
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
        UnitState::MovingToResource => moving_to_resource(unit, ctx),
        UnitState::MovingToBaseLink => moving_to_base_link(unit, ctx),
        UnitState::ReturningToBase => unit.return_to_base(ctx),
        // Combat states belong to miners
        UnitState::MovingToTarget | UnitState::AttackingTarget => unit.reassess(ctx.tick),
    }
}

fn idle(unit: &mut Unit, ctx: &mut UnitContext) {
    if unit.low_fuel() {
        crate::debug_harvest!(unit.id.0, ctx.tick, "Low fuel ({:.2}/{:.0}), heading home", unit.fuel, unit.max_fuel);
        unit.force_return(ctx.tick);
        return;
    }
    if !unit.idle_ready(ctx.now_ms) {
        return;
    }
    let Some(current) = base::find(ctx.bases, unit.base).or_else(|| base::home(ctx.bases)) else {
        return;
    };
    let large_haul = ctx.stats.large_haul;

    if let Some(id) = find_local_resource(
        ctx.resources.as_slice(),
        current,
        current.collection_radius,
        unit.position,
        large_haul,
    ) {
        crate::debug_harvest!(unit.id.0, ctx.tick, "Targeting resource {} near {}", id, current.name);
        unit.base = current.id;
        unit.target = Some(UnitTarget::Resource(id));
        unit.set_state(UnitState::MovingToResource, ctx.tick);
        return;
    }

    // Nothing local: relay to a linked base that has work
    let relay = base::linked_to(ctx.bases, current.id).find(|link| {
        find_local_resource(
            ctx.resources.as_slice(),
            link,
            link.collection_radius,
            unit.position,
            large_haul,
        )
        .is_some()
    });
    if let Some(link) = relay {
        crate::debug_harvest!(unit.id.0, ctx.tick, "Relaying from {} to {}", current.name, link.name);
        unit.base = link.id;
        unit.target = Some(UnitTarget::Base(link.id));
        unit.set_state(UnitState::MovingToBaseLink, ctx.tick);
        return;
    }

    if !unit.cargo.is_empty() {
        // Nothing left to pick up, bring home what we have
        crate::debug_harvest!(unit.id.0, ctx.tick, "No more targets, returning with {} units", unit.collected_in_trip());
        unit.set_state(UnitState::ReturningToBase, ctx.tick);
    }
    // Otherwise stay idle and search again next tick
}

fn moving_to_resource(unit: &mut Unit, ctx: &mut UnitContext) {
    let destination = match unit.target {
        Some(UnitTarget::Resource(id)) => ctx.resources.get(id).map(|r| r.position),
        _ => None,
    };
    let Some(destination) = destination else {
        // Target vanished (collected by another unit or shattered)
        unit.reassess(ctx.tick);
        return;
    };

    let movement = unit.move_towards(destination, ctx.dt_secs);
    if movement == Movement::OutOfFuel {
        crate::debug_harvest!(unit.id.0, ctx.tick, "Out of fuel, returning with {} units", unit.collected_in_trip());
        unit.force_return(ctx.tick);
    }

    let collected_target = collect_in_reach(unit, ctx);

    if unit.state == UnitState::ReturningToBase {
        return;
    }
    if unit.cargo_full() {
        unit.force_return(ctx.tick);
        return;
    }
    if collected_target {
        unit.reassess(ctx.tick);
        return;
    }
    if movement == Movement::Arrived {
        // At the spot but the target wasn't picked up: look for the next one
        let next = base::find(ctx.bases, unit.base).and_then(|current| {
            find_local_resource(
                ctx.resources.as_slice(),
                current,
                current.collection_radius,
                unit.position,
                ctx.stats.large_haul,
            )
        });
        match next {
            Some(id) => unit.target = Some(UnitTarget::Resource(id)),
            None => unit.force_return(ctx.tick),
        }
    }
}

// Removes every collectible resource within reach and adds its payload to the
// unit's cargo. A full hold ends the trip afterwards, so the last pickups may
// overshoot capacity. Returns true if the formal target was among them.
fn collect_in_reach(unit: &mut Unit, ctx: &mut UnitContext) -> bool {
    let large_haul = ctx.stats.large_haul;
    let position = unit.position;
    let in_reach: Vec<ResourceId> = ctx
        .resources_near(position)
        .into_iter()
        .filter(|&id| {
            ctx.resources
                .get(id)
                .is_some_and(|r| r.collectible(large_haul) && position.distance(&r.position) < PLAYER_SIZE + r.size)
        })
        .collect();

    let mut collected_target = false;
    for id in in_reach {
        let Some(resource) = ctx.resources.remove(id) else {
            continue;
        };
        unit.cargo.absorb(&resource.payload);
        crate::debug_harvest!(
            unit.id.0,
            ctx.tick,
            "Collected {} ({} units, hold {}/{})",
            id,
            resource.payload.total(),
            unit.collected_in_trip(),
            unit.cargo_capacity
        );
        if unit.target == Some(UnitTarget::Resource(id)) {
            collected_target = true;
        }
    }
    collected_target
}

fn moving_to_base_link(unit: &mut Unit, ctx: &mut UnitContext) {
    let destination = match unit.target {
        Some(UnitTarget::Base(id)) => base::find(ctx.bases, id).map(|b| b.position),
        _ => None,
    };
    let Some(destination) = destination else {
        unit.reassess(ctx.tick);
        return;
    };
    match unit.move_towards(destination, ctx.dt_secs) {
        Movement::Arrived => {
            unit.target = None;
            unit.last_action_ms = Some(ctx.now_ms);
            unit.set_state(UnitState::Idle, ctx.tick);
        }
        Movement::OutOfFuel => unit.force_return(ctx.tick),
        Movement::Moving => {}
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Fixture;
    use super::super::UnitKind;
    use super::*;
    use crate::config::*;
    use crate::types::{BaseId, Payload, ResourceKind};

    fn fragment(id: u64, x: f64, y: f64, crystals: u32) -> Resource {
        let payload: Payload = [(ResourceKind::Crystals, crystals)].into_iter().collect();
        let mut f = Resource::fragment(ResourceId(id), Point::new(x, y), &payload, 1);
        f.velocity = Point::ZERO;
        f
    }

    #[test]
    fn test_nearest_to_unit_not_base() {
        let fixture = Fixture::new();
        let resources = vec![fragment(1, 100.0, 0.0, 1), fragment(2, 300.0, 0.0, 1)];
        let found = find_local_resource(&resources, &fixture.bases[0], 1000.0, Point::new(280.0, 0.0), false);
        assert_eq!(found, Some(ResourceId(2)));
    }

    #[test]
    fn test_whole_asteroids_need_large_haul() {
        let fixture = Fixture::new();
        let asteroid = Resource::asteroid(ResourceId(1), 1.0, Point::new(50.0, 0.0), Point::ZERO, Payload::new());
        let resources = vec![asteroid];
        assert_eq!(find_local_resource(&resources, &fixture.bases[0], 1000.0, Point::ZERO, false), None);
        assert_eq!(
            find_local_resource(&resources, &fixture.bases[0], 1000.0, Point::ZERO, true),
            Some(ResourceId(1))
        );
    }

    #[test]
    fn test_out_of_range_resources_are_ignored() {
        let fixture = Fixture::new();
        let resources = vec![fragment(1, 1500.0, 0.0, 1)];
        assert_eq!(find_local_resource(&resources, &fixture.bases[0], 1000.0, Point::ZERO, false), None);
    }

    #[test]
    fn test_tie_keeps_first_found() {
        let fixture = Fixture::new();
        let resources = vec![fragment(1, 100.0, 0.0, 1), fragment(2, -100.0, 0.0, 1)];
        let found = find_local_resource(&resources, &fixture.bases[0], 1000.0, Point::ZERO, false);
        assert_eq!(found, Some(ResourceId(1)));
    }

    #[test]
    fn test_idle_without_targets_keeps_timer() {
        let mut fixture = Fixture::new();
        let mut unit = fixture.unit(UnitKind::Harvester);
        unit.last_action_ms = Some(-5000.0);
        fixture.step(&mut unit);
        assert_eq!(unit.state, UnitState::Idle);
        assert_eq!(unit.last_action_ms, Some(-5000.0));
    }

    #[test]
    fn test_idle_waits_out_delay() {
        let mut fixture = Fixture::new();
        fixture.resources.insert(fragment(1, 100.0, 0.0, 1));
        let mut unit = fixture.unit(UnitKind::Harvester);
        unit.last_action_ms = Some(0.0);
        fixture.step(&mut unit);
        assert_eq!(unit.state, UnitState::Idle);
        fixture.now_ms = IDLE_DELAY_MS + 1.0;
        fixture.step(&mut unit);
        assert_eq!(unit.state, UnitState::MovingToResource);
        assert_eq!(unit.target, Some(UnitTarget::Resource(ResourceId(1))));
    }

    #[test]
    fn test_low_fuel_idle_returns_home() {
        let mut fixture = Fixture::new();
        fixture.resources.insert(fragment(1, 100.0, 0.0, 1));
        let mut unit = fixture.unit(UnitKind::Harvester);
        unit.position = Point::new(500.0, 0.0);
        unit.fuel = unit.max_fuel * 0.04;
        fixture.step(&mut unit);
        assert_eq!(unit.state, UnitState::ReturningToBase);
        assert_eq!(unit.target, None);
    }

    #[test]
    fn test_relays_to_linked_base() {
        let mut fixture = Fixture::new();
        fixture.bases[0].collection_radius = 100.0;
        fixture
            .bases
            .push(Base::new(BaseId(2), "Base 2", Point::new(300.0, 300.0), 100.0));
        fixture.resources.insert(fragment(1, 350.0, 300.0, 1));
        let mut unit = fixture.unit(UnitKind::Harvester);
        fixture.step(&mut unit);
        assert_eq!(unit.state, UnitState::MovingToBaseLink);
        assert_eq!(unit.target, Some(UnitTarget::Base(BaseId(2))));
        assert_eq!(unit.base, BaseId(2));

        for _ in 0..300 {
            fixture.step(&mut unit);
            if unit.state != UnitState::MovingToBaseLink {
                break;
            }
        }
        assert_eq!(unit.state, UnitState::Idle);
        assert_eq!(unit.position, Point::new(300.0, 300.0));
    }

    #[test]
    fn test_vacuums_resources_along_the_way() {
        let mut fixture = Fixture::new();
        fixture.resources.insert(fragment(1, 200.0, 0.0, 2));
        fixture.resources.insert(fragment(2, 12.0, 0.0, 3));
        let mut unit = fixture.unit(UnitKind::Harvester);
        unit.state = UnitState::MovingToResource;
        unit.target = Some(UnitTarget::Resource(ResourceId(1)));
        fixture.step(&mut unit);
        // The fragment at x=12 is within reach after the first step
        assert!(!fixture.resources.contains(ResourceId(2)));
        assert_eq!(unit.cargo.get(ResourceKind::Crystals), 3);
        assert_eq!(unit.state, UnitState::MovingToResource);
    }

    #[test]
    fn test_collecting_target_reassesses_immediately() {
        let mut fixture = Fixture::new();
        fixture.resources.insert(fragment(1, 5.0, 0.0, 1));
        let mut unit = fixture.unit(UnitKind::Harvester);
        unit.cargo_capacity = 100;
        unit.state = UnitState::MovingToResource;
        unit.target = Some(UnitTarget::Resource(ResourceId(1)));
        fixture.step(&mut unit);
        assert_eq!(unit.state, UnitState::Idle);
        assert_eq!(unit.target, None);
        assert_eq!(unit.last_action_ms, None);
    }

    #[test]
    fn test_idle_with_cargo_and_no_targets_returns() {
        let mut fixture = Fixture::new();
        let mut unit = fixture.unit(UnitKind::Harvester);
        unit.position = Point::new(400.0, 0.0);
        unit.cargo.add(ResourceKind::Crystals, 4);
        fixture.step(&mut unit);
        assert_eq!(unit.state, UnitState::ReturningToBase);
        assert_eq!(unit.target, None);
    }

    #[test]
    fn test_full_hold_returns() {
        let mut fixture = Fixture::new();
        fixture.resources.insert(fragment(1, 5.0, 0.0, 12));
        let mut unit = fixture.unit(UnitKind::Harvester);
        unit.state = UnitState::MovingToResource;
        unit.target = Some(UnitTarget::Resource(ResourceId(1)));
        fixture.step(&mut unit);
        assert_eq!(unit.state, UnitState::ReturningToBase);
        assert_eq!(unit.target, None);
    }

    #[test]
    fn test_collects_everything_in_reach_past_capacity() {
        let mut fixture = Fixture::new();
        fixture.resources.insert(fragment(1, 5.0, 0.0, 4));
        fixture.resources.insert(fragment(2, 0.0, 8.0, 4));
        let mut unit = fixture.unit(UnitKind::Harvester);
        unit.cargo_capacity = 10;
        unit.cargo.add(ResourceKind::Crystals, 8);
        unit.state = UnitState::MovingToResource;
        unit.target = Some(UnitTarget::Resource(ResourceId(1)));
        fixture.step(&mut unit);
        assert!(fixture.resources.is_empty());
        assert_eq!(unit.cargo.get(ResourceKind::Crystals), 16);
        assert_eq!(unit.state, UnitState::ReturningToBase);
    }

    #[test]
    fn test_missing_target_goes_idle() {
        let mut fixture = Fixture::new();
        let mut unit = fixture.unit(UnitKind::Harvester);
        unit.state = UnitState::MovingToResource;
        unit.target = Some(UnitTarget::Resource(ResourceId(77)));
        fixture.step(&mut unit);
        assert_eq!(unit.state, UnitState::Idle);
        assert_eq!(unit.target, None);
    }

    #[test]
    fn test_return_deposits_and_resets_cargo() {
        let mut fixture = Fixture::new();
        let mut unit = fixture.unit(UnitKind::Harvester);
        unit.position = Point::new(1.0, 0.0);
        unit.cargo.add(ResourceKind::Crystals, 7);
        unit.cargo.add(ResourceKind::Ice, 2);
        unit.state = UnitState::ReturningToBase;
        fixture.step(&mut unit);
        assert_eq!(unit.state, UnitState::Idle);
        assert_eq!(unit.collected_in_trip(), 0);
        assert_eq!(fixture.inventory.balance(ResourceKind::Crystals), 7);
        assert_eq!(fixture.inventory.balance(ResourceKind::Ice), 2);
        assert_eq!(unit.last_action_ms, Some(fixture.now_ms));
        assert_eq!(fixture.events.len(), 1);
    }
}
