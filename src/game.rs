use crate::config;
use crate::error::CommandError;
use crate::particles::ParticleSystem;
use crate::render::Renderer;
use crate::state::{SimEvent, SimulationState};
use crate::types::{BaseId, Point, ResourceKind};
use crate::upgrade::{CATALOG, UpgradeView};
use log::{debug, info, warn};
use macroquad::prelude::{KeyCode, get_frame_time, is_key_down, is_key_pressed, next_frame};
use serde::Serialize;
use std::collections::VecDeque;

// Most ticks run per rendered frame before the accumulator is dropped
const MAX_TICKS_PER_FRAME: u32 = 5;

/// Player requests, queued by the input layer and applied at the start of the
/// next tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Aim(Point),
    ClearAim,
    NudgeBase { dx: f64, dy: f64 },
    SelectBase(BaseId),
    BuyUpgrade(String),
    BuyVehicle(String),
    BuyBase,
}

/// What the shop panel needs to draw.
#[derive(Debug, Clone, Serialize)]
pub struct ShopView {
    pub funds: u64,
    pub inventory: Vec<(ResourceKind, u64)>,
    pub research: f64,
    pub upgrades: Vec<UpgradeView>,
    pub base_cost: u64,
    pub can_buy_base: bool,
}

/// The Game struct owns the simulation and drives it one fixed tick at a time
pub struct Game {
    pub state: SimulationState,
    commands: VecDeque<Command>,
    impulse: (f64, f64),
}

impl Game {
    pub fn new(seed: u64, initial_asteroids: usize) -> Self {
        Game {
            state: SimulationState::new(seed, initial_asteroids),
            commands: VecDeque::new(),
            impulse: (0.0, 0.0),
        }
    }

    pub fn queue(&mut self, command: Command) {
        self.commands.push_back(command);
    }

    /// Advances the simulation by `dt_ms` milliseconds.
    pub fn tick(&mut self, dt_ms: f64) {
        let dt_secs = dt_ms / 1000.0;
        self.state.now_ms += dt_ms;

        // --- Player commands ---
        while let Some(command) = self.commands.pop_front() {
            if let Err(e) = self.apply(command) {
                if e.is_routine() {
                    debug!("Tick {}: command rejected: {}", self.state.tick, e);
                } else {
                    warn!("Tick {}: command rejected: {}", self.state.tick, e);
                }
            }
        }

        // --- Active base ---
        let (dx, dy) = std::mem::take(&mut self.impulse);
        self.state.move_active_base(dx, dy, dt_secs);
        self.state.fire_active_base();

        // --- World ---
        self.state.update_physics(dt_secs);
        self.state.update_projectiles(dt_secs);
        self.state.update_spawner(dt_ms);
        self.state.update_units(dt_secs);

        self.state.tick += 1;
    }

    fn apply(&mut self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::Aim(point) => {
                self.state.aim = point.is_finite().then_some(point);
            }
            Command::ClearAim => self.state.aim = None,
            Command::NudgeBase { dx, dy } => {
                self.impulse.0 += dx;
                self.impulse.1 += dy;
            }
            Command::SelectBase(id) => self.state.select_base(id)?,
            Command::BuyUpgrade(id) => {
                self.state.buy_upgrade(&id)?;
            }
            Command::BuyVehicle(kind) => {
                self.state.buy_vehicle(&kind)?;
            }
            Command::BuyBase => {
                self.state.buy_base()?;
            }
        }
        Ok(())
    }

    pub fn snapshot(&self) -> ShopView {
        let inventory = &self.state.inventory;
        ShopView {
            funds: inventory.funds(),
            inventory: inventory.summary(),
            research: inventory.research,
            upgrades: self.state.shop.view(inventory),
            base_cost: self.state.shop.base_cost,
            can_buy_base: inventory.can_afford(self.state.shop.base_cost),
        }
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.state.events)
    }

    /// Runs `ticks` ticks without a window and logs the outcome.
    pub fn run_headless(&mut self, ticks: u64, tick_ms: f64) {
        info!("Running {} headless ticks of {:.2} ms", ticks, tick_ms);
        for _ in 0..ticks {
            self.tick(tick_ms);
            self.state.events.clear();
        }
        let view = self.snapshot();
        info!(
            "Finished at tick {}: {} resources, {} units, {} bases",
            self.state.tick,
            self.state.resources.len(),
            self.state.units.len(),
            self.state.bases.len()
        );
        for (kind, amount) in view.inventory {
            info!("  {:<10} {}", kind.name(), amount);
        }
        info!("  research   {:.2}", view.research);
    }

    /// Run the main game loop using the provided renderer
    pub async fn run(&mut self, renderer: &mut Renderer, tick_ms: f64) {
        info!("Starting main loop...");
        let mut particles = ParticleSystem::new();
        let mut accumulator = 0.0_f64;

        while !Renderer::window_should_close() {
            renderer.handle_camera_input();
            self.read_input(renderer);

            // Fixed simulation steps
            accumulator += get_frame_time() as f64 * 1000.0;
            let mut steps = 0;
            while accumulator >= tick_ms && steps < MAX_TICKS_PER_FRAME {
                accumulator -= tick_ms;
                self.tick(tick_ms);
                steps += 1;
            }
            if steps == MAX_TICKS_PER_FRAME {
                accumulator = 0.0;
            }

            for event in self.drain_events() {
                particles.handle_event(&event, &self.state.bases);
            }
            particles.update(get_frame_time());

            let view = self.snapshot();
            renderer.draw_frame(&self.state, &particles, &view);
            next_frame().await;
        }
        info!("Exiting after {} ticks.", self.state.tick);
    }

    // Maps keyboard and mouse state onto queued commands
    fn read_input(&mut self, renderer: &Renderer) {
        if let Some(aim) = renderer.mouse_world_position() {
            if macroquad::input::is_mouse_button_down(macroquad::input::MouseButton::Left) {
                self.queue(Command::Aim(aim));
            } else {
                self.queue(Command::ClearAim);
            }
        }

        let mut dx = 0.0;
        let mut dy = 0.0;
        if is_key_down(KeyCode::A) {
            dx -= 1.0;
        }
        if is_key_down(KeyCode::D) {
            dx += 1.0;
        }
        if is_key_down(KeyCode::W) {
            dy -= 1.0;
        }
        if is_key_down(KeyCode::S) {
            dy += 1.0;
        }
        if dx != 0.0 || dy != 0.0 {
            self.queue(Command::NudgeBase { dx, dy });
        }

        if is_key_pressed(KeyCode::Tab) {
            let bases = &self.state.bases;
            if let Some(index) = bases.iter().position(|b| b.id == self.state.active_base) {
                let next = bases[(index + 1) % bases.len()].id;
                self.queue(Command::SelectBase(next));
            }
        }

        const UPGRADE_KEYS: [KeyCode; 10] = [
            KeyCode::Key1,
            KeyCode::Key2,
            KeyCode::Key3,
            KeyCode::Key4,
            KeyCode::Key5,
            KeyCode::Key6,
            KeyCode::Key7,
            KeyCode::Key8,
            KeyCode::Key9,
            KeyCode::Key0,
        ];
        for (key, def) in UPGRADE_KEYS.iter().zip(CATALOG.iter()) {
            if is_key_pressed(*key) {
                self.queue(Command::BuyUpgrade(def.id.to_string()));
            }
        }

        for (key, vehicle) in [
            (KeyCode::H, "harvester"),
            (KeyCode::M, "miner"),
            (KeyCode::R, "satellite"),
        ] {
            if is_key_pressed(key) {
                self.queue(Command::BuyVehicle(vehicle.to_string()));
            }
        }
        if is_key_pressed(KeyCode::B) {
            self.queue(Command::BuyBase);
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(0, config::INITIAL_ASTEROIDS)
    }
}
