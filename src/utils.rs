use crate::types::Point;
use rand::Rng;
use std::f64::consts::TAU;

/// Angle (radians) of the vector from `from` to `to`
pub fn angle_between(from: &Point, to: &Point) -> f64 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Uniform random direction
pub fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Point {
    Point::from_angle(rng.gen_range(0.0..TAU))
}

/// Random point within `radius` of `center`. The radius is drawn uniformly
/// (not area-uniform), so points cluster towards the center.
pub fn random_point_in_disc<R: Rng + ?Sized>(rng: &mut R, center: Point, radius: f64) -> Point {
    if radius <= 0.0 {
        return center;
    }
    let offset = rng.gen_range(0.0..radius);
    center + random_direction(rng) * offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_angle_between() {
        let origin = Point::ZERO;
        assert_approx_eq!(angle_between(&origin, &Point::new(1.0, 0.0)), 0.0);
        assert_approx_eq!(
            angle_between(&origin, &Point::new(0.0, 1.0)),
            std::f64::consts::FRAC_PI_2
        );
    }

    #[test]
    fn test_random_point_stays_in_disc() {
        let mut rng = StdRng::seed_from_u64(7);
        let center = Point::new(100.0, -50.0);
        for _ in 0..500 {
            let p = random_point_in_disc(&mut rng, center, 25.0);
            assert!(p.distance(&center) <= 25.0 + 1e-9);
        }
        assert_eq!(random_point_in_disc(&mut rng, center, 0.0), center);
    }
}
