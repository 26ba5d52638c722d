use crate::base;
use crate::config::{MAX_ZOOM, MIN_ZOOM, UI_PANEL_WIDTH, VIEW_WIDTH, WINDOW_HEIGHT, ZOOM_STEP};
use crate::game::ShopView;
use crate::particles::ParticleSystem;
use crate::resource::Resource;
use crate::state::SimulationState;
use crate::types::{Point, ResourceKind};
use crate::unit::{Unit, UnitKind};
use macroquad::prelude::*;

const PAN_SPEED: f32 = 600.0; // Screen pixels per second
const LABEL_MIN_ZOOM: f32 = 0.6; // Unit state labels are hidden when zoomed further out

fn point_to_vec2(p: Point) -> Vec2 {
    Vec2::new(p.x as f32, p.y as f32)
}

fn faded_color(mut color: Color, alpha: f32) -> Color {
    color.a *= alpha;
    color
}

fn kind_color(kind: ResourceKind) -> Color {
    match kind {
        ResourceKind::Crystals => Color::from_rgba(120, 220, 255, 255),
        ResourceKind::Iron => Color::from_rgba(190, 120, 90, 255),
        ResourceKind::Nickel => Color::from_rgba(200, 200, 150, 255),
        ResourceKind::Ice => Color::from_rgba(230, 240, 255, 255),
    }
}

fn unit_color(kind: UnitKind) -> Color {
    match kind {
        UnitKind::Harvester => Color::from_rgba(80, 220, 120, 255),
        UnitKind::Miner => Color::from_rgba(240, 90, 70, 255),
        UnitKind::Satellite => Color::from_rgba(200, 140, 255, 255),
    }
}

// Fragments show the kind they carry most of; whole asteroids are rock grey
fn resource_color(resource: &Resource) -> Color {
    let base = if resource.is_fragment {
        resource
            .payload
            .iter()
            .max_by_key(|(_, amount)| *amount)
            .map(|(kind, _)| kind_color(kind))
            .unwrap_or(GRAY)
    } else {
        Color::from_rgba(140, 130, 120, 255)
    };
    faded_color(base, resource.display_alpha() as f32)
}

/// World-to-screen mapping for the play area left of the side panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewCamera {
    pub center: Vec2, // World point shown in the middle of the view
    pub zoom: f32,    // Screen pixels per world unit
}

impl ViewCamera {
    pub fn new() -> Self {
        ViewCamera {
            center: Vec2::ZERO,
            zoom: 0.5,
        }
    }

    fn view_center() -> Vec2 {
        Vec2::new(VIEW_WIDTH as f32 / 2.0, WINDOW_HEIGHT as f32 / 2.0)
    }

    pub fn world_to_screen(&self, p: Point) -> Vec2 {
        (point_to_vec2(p) - self.center) * self.zoom + Self::view_center()
    }

    pub fn screen_to_world(&self, s: Vec2) -> Point {
        let w = (s - Self::view_center()) / self.zoom + self.center;
        Point::new(w.x as f64, w.y as f64)
    }

    pub fn zoom_by(&mut self, steps: f32) {
        self.zoom = (self.zoom * (1.0 + ZOOM_STEP * steps)).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Moves the view by a screen-space offset.
    pub fn pan(&mut self, screen_delta: Vec2) {
        self.center += screen_delta / self.zoom;
    }

    // True when a circle of world `radius` around `p` touches the view
    fn is_visible(&self, p: Point, radius: f64) -> bool {
        let s = self.world_to_screen(p);
        let r = radius as f32 * self.zoom;
        s.x + r >= 0.0 && s.x - r <= VIEW_WIDTH as f32 && s.y + r >= 0.0 && s.y - r <= WINDOW_HEIGHT as f32
    }
}

impl Default for ViewCamera {
    fn default() -> Self {
        Self::new()
    }
}

// Handles rendering the simulation state using macroquad
pub struct Renderer {
    pub camera: ViewCamera,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            camera: ViewCamera::new(),
        }
    }

    /// Arrow keys pan, +/- and the mouse wheel zoom.
    pub fn handle_camera_input(&mut self) {
        let dt = get_frame_time();
        let mut delta = Vec2::ZERO;
        if is_key_down(KeyCode::Left) {
            delta.x -= 1.0;
        }
        if is_key_down(KeyCode::Right) {
            delta.x += 1.0;
        }
        if is_key_down(KeyCode::Up) {
            delta.y -= 1.0;
        }
        if is_key_down(KeyCode::Down) {
            delta.y += 1.0;
        }
        if delta != Vec2::ZERO {
            self.camera.pan(delta * PAN_SPEED * dt);
        }

        if is_key_pressed(KeyCode::Equal) || is_key_pressed(KeyCode::KpAdd) {
            self.camera.zoom_by(1.0);
        }
        if is_key_pressed(KeyCode::Minus) || is_key_pressed(KeyCode::KpSubtract) {
            self.camera.zoom_by(-1.0);
        }
        let (_, wheel) = mouse_wheel();
        if wheel != 0.0 {
            self.camera.zoom_by(wheel.signum());
        }
    }

    /// Mouse position in world coordinates, None over the side panel.
    pub fn mouse_world_position(&self) -> Option<Point> {
        let (x, y) = mouse_position();
        if x >= VIEW_WIDTH as f32 {
            return None;
        }
        Some(self.camera.screen_to_world(Vec2::new(x, y)))
    }

    pub fn draw_frame(&mut self, state: &SimulationState, particles: &ParticleSystem, view: &ShopView) {
        clear_background(Color::from_rgba(5, 5, 15, 255));

        self.draw_bases(state);
        self.draw_resources(state);
        self.draw_projectiles(state);
        for unit in &state.units {
            self.draw_unit(unit);
        }
        self.draw_particles(particles);
        if let Some(aim) = state.aim {
            let s = self.camera.world_to_screen(aim);
            draw_circle_lines(s.x, s.y, 8.0, 1.0, RED);
        }

        self.draw_ui_panel(state, view);
    }

    fn draw_bases(&self, state: &SimulationState) {
        let cam = &self.camera;
        for (a, b) in base::links(&state.bases) {
            if let (Some(a), Some(b)) = (base::find(&state.bases, a), base::find(&state.bases, b)) {
                let sa = cam.world_to_screen(a.position);
                let sb = cam.world_to_screen(b.position);
                draw_line(sa.x, sa.y, sb.x, sb.y, 2.0, Color::from_rgba(80, 160, 255, 120));
            }
        }
        for b in &state.bases {
            let s = cam.world_to_screen(b.position);
            let active = b.id == state.active_base;
            draw_circle_lines(
                s.x,
                s.y,
                b.collection_radius as f32 * cam.zoom,
                1.0,
                Color::from_rgba(60, 90, 160, if active { 140 } else { 60 }),
            );
            let size = 14.0;
            draw_rectangle(s.x - size / 2.0, s.y - size / 2.0, size, size, if active { GOLD } else { SKYBLUE });
            draw_text(&b.name, s.x + size, s.y - size, 16.0, WHITE);
        }
    }

    fn draw_resources(&self, state: &SimulationState) {
        let cam = &self.camera;
        for resource in state.resources.iter() {
            if !cam.is_visible(resource.position, resource.size) {
                continue;
            }
            let s = cam.world_to_screen(resource.position);
            let r = (resource.size as f32 * cam.zoom).max(1.0);
            draw_circle(s.x, s.y, r, resource_color(resource));
        }
    }

    fn draw_projectiles(&self, state: &SimulationState) {
        let cam = &self.camera;
        for p in &state.projectiles {
            let head = cam.world_to_screen(p.position);
            let tail = cam.world_to_screen(p.position - p.direction * 8.0);
            draw_line(tail.x, tail.y, head.x, head.y, 2.0, YELLOW);
        }
    }

    fn draw_unit(&self, unit: &Unit) {
        let cam = &self.camera;
        if !cam.is_visible(unit.position, 20.0) {
            return;
        }
        let s = cam.world_to_screen(unit.position);
        let color = unit_color(unit.kind);
        match unit.kind {
            UnitKind::Satellite => draw_circle(s.x, s.y, 4.0, color),
            _ => draw_poly(s.x, s.y, 3, 7.0, 0.0, color),
        }
        if unit.kind.uses_fuel() && unit.max_fuel > 0.0 {
            let ratio = (unit.fuel / unit.max_fuel) as f32;
            draw_rectangle(s.x - 8.0, s.y + 9.0, 16.0 * ratio, 2.0, ORANGE);
        }
        if cam.zoom >= LABEL_MIN_ZOOM {
            draw_text(unit.state.label(), s.x + 10.0, s.y + 4.0, 12.0, faded_color(WHITE, 0.7));
        }
    }

    fn draw_particles(&self, particles: &ParticleSystem) {
        for (position, color) in particles.iter() {
            let s = (position - self.camera.center) * self.camera.zoom + ViewCamera::view_center();
            draw_circle(s.x, s.y, 2.0, color);
        }
    }

    fn draw_ui_panel(&self, state: &SimulationState, view: &ShopView) {
        let panel_x = VIEW_WIDTH as f32;
        let panel_width = UI_PANEL_WIDTH as f32;
        let padding = 12.0;
        let line = 18.0;
        let x = panel_x + padding;
        let mut y = 28.0;

        // Panel background (Dark Indigo)
        draw_rectangle(panel_x, 0.0, panel_width, WINDOW_HEIGHT as f32, Color::from_rgba(20, 20, 50, 255));
        draw_line(panel_x, 0.0, panel_x, WINDOW_HEIGHT as f32, 2.0, Color::from_rgba(60, 60, 120, 255));

        draw_text("HARVEST FLEET", x, y, 26.0, GOLD);
        y += line * 1.5;

        // --- Inventory ---
        for (kind, amount) in &view.inventory {
            draw_text(&format!("{:<10} {}", kind.name(), amount), x, y, 18.0, kind_color(*kind));
            y += line;
        }
        draw_text(&format!("Research   {:.1}", view.research), x, y, 18.0, LIGHTGRAY);
        y += line;
        draw_text(
            &format!(
                "Tick {}  rocks {}  units {}",
                state.tick,
                state.resources.len(),
                state.units.len()
            ),
            x,
            y,
            14.0,
            GRAY,
        );
        y += line * 1.5;

        // --- Upgrades ---
        const HOTKEYS: [&str; 10] = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "0"];
        for (i, upgrade) in view.upgrades.iter().enumerate() {
            let key = match upgrade.id {
                "vehicle-harvester" => "H",
                "vehicle-miner" => "M",
                "vehicle-satellite" => "R",
                _ => HOTKEYS.get(i).copied().unwrap_or(" "),
            };
            let cost = match upgrade.cost {
                Some(c) => c.to_string(),
                None => "sold out".to_string(),
            };
            let color = if upgrade.affordable { WHITE } else { DARKGRAY };
            draw_text(
                &format!("[{}] {:<18} L{:<3} {}", key, upgrade.name, upgrade.level, cost),
                x,
                y,
                14.0,
                color,
            );
            y += line;
        }
        let base_color = if view.can_buy_base { WHITE } else { DARKGRAY };
        draw_text(&format!("[B] New base            {}", view.base_cost), x, y, 14.0, base_color);
        y += line * 1.5;

        // --- Controls ---
        for help in [
            "Mouse (hold): aim active base",
            "WASD: move active base",
            "Tab: next base",
            "Arrows / +/-: pan and zoom",
            "Esc: quit",
        ] {
            draw_text(help, x, y, 14.0, GRAY);
            y += line * 0.9;
        }
    }

    pub fn window_should_close() -> bool {
        is_key_down(KeyCode::Escape) || is_quit_requested()
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
