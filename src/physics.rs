//! Lightweight rigid-circle physics for resources: pairwise overlap
//! resolution with inverse-mass separation and a 1-D restitution impulse,
//! then explicit Euler integration and linear friction decay.

use crate::resource::Resource;
use crate::spatial::SpatialGrid;
use crate::types::Point;

/// Resolves a single pair. Returns true if the circles overlapped.
///
/// Separation splits the overlap by inverse mass (heavier bodies move less).
/// The impulse uses the lower restitution of the two and is skipped when the
/// bodies are already separating along the normal.
pub fn resolve_collision(a: &mut Resource, b: &mut Resource) -> bool {
    let delta = b.position - a.position;
    let dist = delta.length();
    let min_dist = a.size + b.size;
    if !(dist < min_dist) {
        return false;
    }

    // Coincident centers: push apart along +x
    let normal = delta.normalized().unwrap_or(Point::new(1.0, 0.0));
    let inv_a = a.inverse_mass();
    let inv_b = b.inverse_mass();
    let inv_sum = inv_a + inv_b;
    if inv_sum <= 0.0 {
        return true;
    }

    let overlap = min_dist - dist;
    a.position -= normal * (overlap * inv_a / inv_sum);
    b.position += normal * (overlap * inv_b / inv_sum);

    let approach = (b.velocity - a.velocity).dot(&normal);
    if approach > 0.0 {
        return true; // Separating already
    }
    let restitution = a.restitution.min(b.restitution);
    let impulse = -(1.0 + restitution) * approach / inv_sum;
    a.velocity -= normal * (impulse * inv_a);
    b.velocity += normal * (impulse * inv_b);
    true
}

/// Advances position by velocity and applies `v *= (1 - k·dt)` friction.
pub fn integrate(resource: &mut Resource, dt_secs: f64) {
    resource.position += resource.velocity * dt_secs;
    let decay = (1.0 - resource.friction() * dt_secs).max(0.0);
    resource.velocity = resource.velocity * decay;
}

/// One physics tick over every live resource. Returns the number of
/// colliding pairs resolved.
pub fn step(resources: &mut [Resource], grid: &mut SpatialGrid, dt_secs: f64) -> usize {
    // Pairs come from where bodies stood before any were separated
    let positions: Vec<Point> = resources.iter().map(|r| r.position).collect();
    grid.rebuild(positions.iter().copied());

    let mut collisions = 0;
    let mut candidates: Vec<usize> = Vec::new();
    for (i, &position) in positions.iter().enumerate() {
        candidates.clear();
        candidates.extend(grid.neighbors(position).filter(|&j| j > i));
        for &j in &candidates {
            let (head, tail) = resources.split_at_mut(j);
            if resolve_collision(&mut head[i], &mut tail[0]) {
                collisions += 1;
            }
        }
    }

    for resource in resources.iter_mut() {
        integrate(resource, dt_secs);
    }

    if collisions > 0 {
        crate::debug_physics!("Resolved {} collisions among {} resources", collisions, resources.len());
    }
    collisions
}
