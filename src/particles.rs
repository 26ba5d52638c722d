use crate::base::{self, Base};
use crate::state::SimEvent;
use crate::types::Point;
use macroquad::prelude::{Color, GOLD, LIME, ORANGE, SKYBLUE, Vec2, YELLOW};
use rand::Rng;

// Represents a single particle, in world coordinates
#[derive(Debug, Clone)]
struct Particle {
    position: Vec2,
    velocity: Vec2,
    color: Color,
    lifetime: f32, // Time remaining in seconds
    initial_lifetime: f32,
}

impl Particle {
    fn new(position: Vec2, velocity: Vec2, color: Color, lifetime: f32) -> Self {
        Particle {
            position,
            velocity,
            color,
            lifetime,
            initial_lifetime: lifetime,
        }
    }

    fn update(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        self.lifetime -= dt;
        self.color.a = (self.lifetime / self.initial_lifetime).max(0.0);
    }

    fn is_alive(&self) -> bool {
        self.lifetime > 0.0
    }
}

fn to_vec2(p: Point) -> Vec2 {
    Vec2::new(p.x as f32, p.y as f32)
}

// Manages the visual-only particle effects fed by simulation events
#[derive(Debug)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    rng: rand::rngs::ThreadRng,
}

impl ParticleSystem {
    pub fn new() -> Self {
        ParticleSystem {
            particles: Vec::new(),
            rng: rand::thread_rng(),
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Spawns a burst of particles flying out in every direction.
    pub fn spawn_explosion(&mut self, position: Vec2, color: Color, count: usize, max_speed: f32, lifetime: f32) {
        for _ in 0..count {
            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let speed = self.rng.gen_range(0.0..=max_speed);
            let velocity = Vec2::new(angle.cos() * speed, angle.sin() * speed);
            let particle_lifetime = lifetime * self.rng.gen_range(0.5..=1.0);
            self.particles
                .push(Particle::new(position, velocity, color, particle_lifetime));
        }
    }

    /// Turns a simulation event into an effect. Events without a visual are ignored.
    pub fn handle_event(&mut self, event: &SimEvent, bases: &[Base]) {
        match event {
            SimEvent::AsteroidShattered { position, fragments, .. } => {
                self.spawn_explosion(to_vec2(*position), ORANGE, fragments * 4, 90.0, 0.8);
            }
            SimEvent::ProjectileFired { position, .. } => {
                self.spawn_explosion(to_vec2(*position), YELLOW, 3, 40.0, 0.15);
            }
            SimEvent::Deposited { base, .. } => {
                if let Some(b) = base::find(bases, *base) {
                    self.spawn_explosion(to_vec2(b.position), LIME, 8, 30.0, 0.5);
                }
            }
            SimEvent::BasePurchased { base } => {
                if let Some(b) = base::find(bases, *base) {
                    self.spawn_explosion(to_vec2(b.position), SKYBLUE, 30, 120.0, 1.2);
                }
            }
            SimEvent::UnitPurchased { .. } => {
                if let Some(home) = base::home(bases) {
                    self.spawn_explosion(to_vec2(home.position), GOLD, 12, 50.0, 0.6);
                }
            }
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.particles.retain_mut(|p| {
            p.update(dt);
            p.is_alive()
        });
    }

    /// Live particles as (world position, colour) pairs for the renderer.
    pub fn iter(&self) -> impl Iterator<Item = (Vec2, Color)> + '_ {
        self.particles.iter().map(|p| (p.position, p.color))
    }
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new()
    }
}
