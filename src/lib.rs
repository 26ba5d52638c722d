//! Idle asteroid-harvesting simulation: a fleet of autonomous units mines and
//! hauls resources back to player bases while an upgrade shop tunes the fleet.

pub mod base;
pub mod config;
pub mod error;
pub mod game;
pub mod inventory;
pub mod logging;
pub mod particles;
pub mod physics;
pub mod projectile;
pub mod render;
pub mod resource;
pub mod spatial;
pub mod state;
pub mod store;
pub mod types;
pub mod unit;
pub mod upgrade;
pub mod utils;
