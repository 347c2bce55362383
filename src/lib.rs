#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Pathfinder
//!
//! A caching, concurrent pathfinding engine for agents moving through a
//! voxel world.
//!
//! Given the voxel an agent stands in and a target, the engine computes a
//! route that avoids solid geometry. Searches run on a small worker pool;
//! the caller gets a [`PathHandle`](pathfinding::PathHandle) back at once
//! and can block on it, poll it, or await it. Identical jobs are computed
//! once, and per-cell obstruction answers are cached for a short time.
//!
//! ## Key Modules
//!
//! * `pathfinding` - The `Pathfinder` façade, path cache, search strategies and obstruction oracle
//! * `voxels` - Blocks, chunks, the `World` and the `BlockAccess` interface hosts implement
//! * `cache` - The bounded single-flight cache both caches are built on
//! * `task_management` - The worker pool
//! * `core` - Shared concurrency primitives
//! * `config` - Engine tunables, loadable from JSON
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Point3;
//! use voxel_pathfinder::{Pathfinder, PathfinderConfig};
//! use voxel_pathfinder::voxels::{Block, BlockType, ChunkGenerator, World};
//!
//! let world = World::with_generator(ChunkGenerator::Layered {
//!     ground_height: 0,
//!     block: Block::new(BlockType::GRASS),
//! });
//! let pathfinder = Pathfinder::new(PathfinderConfig::default(), world).unwrap();
//!
//! let result = pathfinder
//!     .create_path(Point3::new(0, 0, 0), Point3::new(6, 0, 2))
//!     .wait()
//!     .unwrap();
//! assert!(result.found());
//! ```

use log::info;

pub mod cache;
pub mod config;
pub mod core;
pub mod error;
pub mod pathfinding;
pub mod task_management;
pub mod voxels;

pub use config::PathfinderConfig;
pub use error::{PathfinderError, Result};
pub use pathfinding::{PathHandle, PathRequest, PathResult, Pathfinder, TargetCategory};

/// Initializes `env_logger` on stdout, filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls do nothing.
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    let initialized = log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init()
        .is_ok();
    if initialized {
        info!("Logger initialized");
    }
}
