//! Configuration constants for the harvester fleet simulation.
//!
//! World units are pixels at zoom 1.0; speeds are per second and
//! timers are milliseconds of simulation time.

// World and spawning
pub const MAX_RESOURCES: usize = 50_000; // Global live population ceiling
pub const INITIAL_ASTEROIDS: usize = 100; // Asteroids spawned around the home base at start
pub const LOCAL_SPAWN_RADIUS: f64 = 5000.0; // Spawn disc radius around a base
pub const SPAWN_INTERVAL_BASE_MS: f64 = 1000.0; // One asteroid per second before upgrades
pub const SPAWN_INTERVAL_FLOOR_MS: f64 = 100.0; // Fastest possible spawn interval
pub const GRID_CELL_SIZE: f64 = 64.0; // Broad-phase cell, > 2x the largest asteroid radius

// Resource entities
pub const ASTEROID_BASE_SIZE: f64 = 8.0; // Radius of a size-factor 1.0 asteroid
pub const FRAGMENT_SIZE: f64 = 3.0; // Radius of every fragment
pub const MIN_SIZE_FACTOR: f64 = 0.5;
pub const MAX_SIZE_FACTOR: f64 = 2.5;
pub const HEALTH_PER_SIZE: f64 = 100.0; // maxHealth = floor(factor * HEALTH_PER_SIZE)
pub const REWARD_PER_SIZE: f64 = 20.0; // reward = floor(factor * REWARD_PER_SIZE)
pub const PRIMARY_PAYLOAD_SHARE: f64 = 0.5; // Fraction of the reward paid in the primary kind
pub const ASTEROID_DRIFT_MAX: f64 = 10.0; // Initial drift speed cap (units/s)
pub const ASTEROID_DENSITY: f64 = 1.0;
pub const FRAGMENT_DENSITY: f64 = 0.5;
pub const ASTEROID_RESTITUTION: f64 = 0.8;
pub const FRAGMENT_RESTITUTION: f64 = 0.9;

// Splitting
pub const MIN_FRAGMENTS: usize = 5; // Every destroyed asteroid yields at least this many
pub const HEALTH_PER_FRAGMENT_UNIT: u32 = 100; // Each full unit of maxHealth adds a bonus
pub const FRAGMENTS_PER_UNIT: usize = 2; // Bonus fragments per health unit
pub const MIN_EXPLOSION_SPEED: f64 = 40.0;
pub const MAX_EXPLOSION_SPEED: f64 = 120.0;

// Physics
pub const ASTEROID_FRICTION: f64 = 0.05; // Velocity decay coefficient per second
pub const FRAGMENT_FRICTION: f64 = 1.5; // Fragments settle quickly

// Projectiles
pub const BULLET_SPEED: f64 = 500.0; // Units per second
pub const BULLET_MAX_RANGE: f64 = 5000.0; // Max travel distance before expiry
pub const BULLET_HIT_RADIUS_FACTOR: f64 = 0.75; // Hit threshold = target radius * factor
pub const BASE_LASER_DAMAGE: f64 = 20.0;
pub const FIRE_RATE_MS: f64 = 150.0; // Base fire cooldown
pub const BULLET_SPREAD_DEGREES: f64 = 5.0; // Base max angle deviation
pub const PROJECTILE_SUB_STEPS: u32 = 4; // Collision samples per tick of travel

// Units
pub const PLAYER_SIZE: f64 = 10.0; // Half-size of a unit hull, used for collection reach
pub const MOVEMENT_SPEED_BASE: f64 = 150.0; // Units per second
pub const CARGO_CAPACITY_BASE: u32 = 10;
pub const IDLE_DELAY_MS: f64 = 1000.0; // Pause at base between trips
pub const LOW_FUEL_FRACTION: f64 = 0.05; // Below this share of max fuel a unit heads home
pub const HARVESTER_MAX_FUEL: f64 = 100.0;
pub const HARVESTER_FUEL_RATE: f64 = 0.01; // Fuel per unit of distance travelled
pub const MINER_MAX_FUEL: f64 = 80.0;
pub const MINER_FUEL_RATE: f64 = 0.015;
pub const MINER_SPEED: f64 = 120.0;
pub const MINER_RANGE: f64 = 800.0; // Asteroid search radius around the miner's base
pub const MINER_ATTACK_RANGE: f64 = 150.0;
pub const MINER_FIRE_RATE_MS: f64 = 400.0;
pub const MINER_DAMAGE: f64 = 10.0;
pub const RESERVE_SPEED_FACTOR: f64 = 0.25; // Speed share when limping home on an empty tank
pub const REFUEL_RANGE: f64 = 40.0;
pub const REFUEL_RATE: f64 = 20.0; // Fuel per second while docked
pub const SATELLITE_ORBIT_RADIUS: f64 = 60.0;
pub const SATELLITE_ANGULAR_RATE: f64 = 0.5; // Radians per second
pub const SATELLITE_RESEARCH_PER_TICK: f64 = 0.01;

// Bases
pub const HARVESTER_RANGE: f64 = 1000.0; // Collection radius around a base
pub const MAX_BASE_LINK_DISTANCE: f64 = 500.0;
pub const BASE_MOVEMENT_SPEED: f64 = 150.0; // Units per second under manual steering
pub const BASE_PURCHASE_COST: u64 = 500;
pub const BASE_COST_GROWTH: f64 = 2.5;
pub const NEW_BASE_OFFSET: (f64, f64) = (300.0, 300.0);

// Economy
pub const STARTING_CRYSTALS: u64 = 1000;

// Rendering configuration
pub const WINDOW_WIDTH: i32 = 1280;
pub const WINDOW_HEIGHT: i32 = 800;
pub const UI_PANEL_WIDTH: i32 = 320; // Width of the side panel
pub const VIEW_WIDTH: i32 = WINDOW_WIDTH - UI_PANEL_WIDTH;
pub const DEFAULT_TICK_MS: f64 = 1000.0 / 60.0; // One tick per rendered frame
pub const MIN_ZOOM: f32 = 0.05;
pub const MAX_ZOOM: f32 = 5.0;
pub const ZOOM_STEP: f32 = 0.1;
