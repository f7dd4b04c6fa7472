//! # Voxel World Headless Driver
//!
//! Runs the world simulation without a window, streaming chunks around a
//! moving camera and logging progress.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- config/world.json
//! ```

fn main() {
    if let Err(err) = voxel_world::run() {
        log::error!("{}", err);
        eprintln!("voxel-world: {}", err);
        std::process::exit(1);
    }
}
