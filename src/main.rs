use clap::Parser;
use harvestfleet::config::{self, UI_PANEL_WIDTH, VIEW_WIDTH, WINDOW_HEIGHT};
use harvestfleet::game::Game;
use harvestfleet::logging;
use harvestfleet::render::Renderer;
use harvestfleet::upgrade::CATALOG;
use log::{LevelFilter, error, info};
use macroquad::prelude::Conf;
use std::process;

// --- Command Line Arguments ---
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run the simulation without a window.
    #[arg(long)]
    headless: bool,

    /// Number of ticks to simulate in headless mode.
    #[arg(long, default_value_t = 3600)]
    ticks: u64,

    /// Fixed simulation step in milliseconds.
    #[arg(long, default_value_t = config::DEFAULT_TICK_MS)]
    tick_ms: f64,

    /// RNG seed (random when omitted).
    #[arg(long)]
    seed: Option<u64>,

    /// Asteroids spawned around the home base at start.
    #[arg(long, default_value_t = config::INITIAL_ASTEROIDS)]
    initial_asteroids: usize,

    /// Debug filter to specify log topics (e.g., "unit,harvest,shop")
    /// Available topics: unit, harvest, combat, research, physics, weapon, spawn, shop, base
    #[arg(long)]
    debug_filter: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the upgrade catalog as JSON and exit.
    #[arg(long)]
    dump_catalog: bool,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Harvest Fleet".to_owned(),
        window_width: VIEW_WIDTH + UI_PANEL_WIDTH,
        window_height: WINDOW_HEIGHT,
        window_resizable: false,
        ..Default::default()
    }
}

fn main() {
    let args = Args::parse();

    if args.dump_catalog {
        match serde_json::to_string_pretty(CATALOG) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize catalog: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    // Initialize the logger
    let log_level = match args.log_level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };
    if let Err(e) = logging::init_logger(log_level, args.debug_filter.clone()) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }

    if !(args.tick_ms.is_finite() && args.tick_ms > 0.0) {
        error!("--tick-ms must be a positive number, got {}", args.tick_ms);
        process::exit(1);
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    info!("Initializing Harvest Fleet (seed {})...", seed);
    let mut game = Game::new(seed, args.initial_asteroids);

    if args.headless {
        game.run_headless(args.ticks, args.tick_ms);
        return;
    }

    let tick_ms = args.tick_ms;
    macroquad::Window::from_config(window_conf(), async move {
        info!("Initializing macroquad rendering system");
        let mut renderer = Renderer::new();
        game.run(&mut renderer, tick_ms).await;
    });
}
