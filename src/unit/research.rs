// Satellite behaviour: orbit the assigned base and accrue research every tick.
// Satellites carry no fuel and never leave IDLE.

use super::{Unit, UnitContext};
use crate::base;
use crate::config::{SATELLITE_ANGULAR_RATE, SATELLITE_RESEARCH_PER_TICK};
use crate::types::Point;
use std::f64::consts::TAU;

pub fn orbit_position(center: Point, radius: f64, angle: f64) -> Point {
    center + Point::from_angle(angle) * radius
}

pub fn step(unit: &mut Unit, ctx: &mut UnitContext) {
    let Some(anchor) = base::find(ctx.bases, unit.base).or_else(|| base::home(ctx.bases)) else {
        return;
    };
    unit.orbit_angle = (unit.orbit_angle + SATELLITE_ANGULAR_RATE * ctx.dt_secs).rem_euclid(TAU);
    unit.position = orbit_position(anchor.position, unit.range, unit.orbit_angle);
    ctx.inventory.add_research(SATELLITE_RESEARCH_PER_TICK);
    log::trace!(
        target: "research",
        "{} orbiting {} at {:.2} rad, research {:.2}",
        unit.id,
        anchor.name,
        unit.orbit_angle,
        ctx.inventory.research
    );
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Fixture;
    use super::super::{UnitKind, UnitState};
    use super::*;
    use crate::config::SATELLITE_ORBIT_RADIUS;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_satellite_orbits_and_researches() {
        let mut fixture = Fixture::new();
        fixture.bases[0].position = Point::new(100.0, 50.0);
        let mut unit = fixture.unit(UnitKind::Satellite);
        for _ in 0..120 {
            fixture.step(&mut unit);
            let radius = unit.position.distance(&fixture.bases[0].position);
            assert_approx_eq!(radius, SATELLITE_ORBIT_RADIUS);
        }
        assert_approx_eq!(fixture.inventory.research, 120.0 * SATELLITE_RESEARCH_PER_TICK);
        // Two seconds at the angular rate
        assert_approx_eq!(unit.orbit_angle, 2.0 * SATELLITE_ANGULAR_RATE);
        assert_eq!(unit.state, UnitState::Idle);
        assert_eq!(unit.fuel, 0.0);
    }
}
