#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! The simulation core of a voxel engine: a column-chunked world of blocks
//! with seeded terrain generation, coloured light and sunlight propagation,
//! and per-section mesh building with ambient occlusion.
//!
//! ## Key Modules
//!
//! * `config` - JSON configuration of the world and its streaming distances
//! * `engine_state` - The world, its chunks, lighting, meshing and task management
//! * `error` - Error types surfaced by configuration loading and world edits
//!
//! ## Architecture
//!
//! The world follows a moving centre. Chunks around it are generated on a
//! worker pool, then lit and meshed on the thread that owns the world. The
//! geometry of each chunk section is kept ready for a renderer to upload.
//!
//! ## Usage
//!
//! ```no_run
//! use cgmath::Point3;
//! use voxel_world::{EngineConfig, EngineState};
//!
//! let mut engine = EngineState::new(EngineConfig::default())?;
//! engine.update(Point3::new(0.0, 80.0, 0.0));
//! # Ok::<(), voxel_world::ConfigError>(())
//! ```

use std::path::{Path, PathBuf};

use cgmath::Point3;
use log::info;
use web_time::{Duration, Instant};

pub mod config;
pub mod engine_state;
pub mod error;

pub use config::{EngineConfig, WorldConfig};
pub use engine_state::EngineState;
pub use error::{ConfigError, WorldError};

/// Config file read when no path is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "config/world.json";

/// Ticks run by the headless driver.
const DRIVER_TICKS: u32 = 240;
/// Camera movement along +x per tick, in blocks.
const CAMERA_SPEED: f32 = 0.5;
/// Ticks between progress reports.
const REPORT_INTERVAL: u32 = 60;
/// Longest wait for outstanding chunks once the camera stops.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the engine headless: loads the configuration, then flies a camera
/// along the x axis and reports how the world keeps up.
///
/// The config path is the first command line argument, falling back to
/// [`DEFAULT_CONFIG_PATH`] and then to the built-in defaults.
pub fn run() -> Result<(), ConfigError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = load_config(std::env::args().nth(1).map(PathBuf::from))?;
    let mut engine = EngineState::new(config)?;

    let start = Instant::now();
    let mut camera = Point3::new(0.5, 100.0, 0.5);
    let mut slowest = Duration::ZERO;
    let mut remeshed = 0;

    for tick in 1..=DRIVER_TICKS {
        let tick_start = Instant::now();
        remeshed += engine.update(camera).len();
        slowest = slowest.max(tick_start.elapsed());
        camera.x += CAMERA_SPEED;

        if tick % REPORT_INTERVAL == 0 {
            let world = engine.world();
            info!(
                "Tick {}: centre {:?}, {} chunks loaded, {} cached, {} sections remeshed, slowest tick {:?}",
                tick,
                world.centre(),
                world.chunks().len(),
                world.cached_chunk_count(),
                remeshed,
                slowest
            );
        }
    }

    let settle_deadline = Instant::now() + SETTLE_TIMEOUT;
    while !engine.world().is_settled() && Instant::now() < settle_deadline {
        remeshed += engine.update(camera).len();
        std::thread::sleep(Duration::from_millis(1));
    }
    remeshed += engine.update(camera).len();

    let visible = engine.world().section_models_in_render_range().count();
    info!(
        "Finished in {:?}: {} sections remeshed, {} sections in render range",
        start.elapsed(),
        remeshed,
        visible
    );
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<EngineConfig, ConfigError> {
    match path {
        Some(path) => EngineConfig::from_json_file(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            EngineConfig::from_json_file(DEFAULT_CONFIG_PATH)
        }
        None => {
            info!("No config file found, using defaults");
            Ok(EngineConfig::default())
        }
    }
}
