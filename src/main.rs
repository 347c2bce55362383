//! # Voxel Pathfinder Demo
//!
//! Generates Perlin terrain, drops an agent on it and routes it to a few
//! targets, logging each result.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json] [seed]
//! ```

use std::process::ExitCode;

use cgmath::Point3;
use log::{error, info, warn};
use voxel_pathfinder::voxels::{BlockAccess, ChunkGenerator, VoxelIndex, World};
use voxel_pathfinder::{init_logging, PathRequest, Pathfinder, PathfinderConfig, TargetCategory};
use web_time::Duration;

const DEFAULT_SEED: u32 = 2025;

/// The first air voxel above solid ground in column (x, z), scanning down from `top`.
fn surface(world: &World, x: i32, z: i32, top: i32) -> Option<VoxelIndex> {
    let mut above_is_air = false;
    for y in (-64..=top).rev() {
        let block = world.block_state(Point3::new(x, y, z), true)?;
        if block.blocks_movement() && above_is_air {
            return Some(Point3::new(x, y + 1, z));
        }
        above_is_air = !block.blocks_movement();
    }
    None
}

fn main() -> ExitCode {
    init_logging();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => match PathfinderConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("Could not load {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => PathfinderConfig::default(),
    };
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);

    let world = std::sync::Arc::new(World::with_generator(ChunkGenerator::Perlin { seed }));
    let pathfinder = match Pathfinder::new(config, world.clone()) {
        Ok(pathfinder) => pathfinder,
        Err(e) => {
            error!("Could not start pathfinder: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let Some(agent) = surface(&world, 0, 0, 48) else {
        error!("No ground under the agent");
        return ExitCode::FAILURE;
    };
    info!("Agent stands at {:?}", agent);

    let targets: Vec<_> = [(12, 4), (-9, 15), (20, -20)]
        .into_iter()
        .filter_map(|(x, z)| surface(&world, x, z, 48))
        .collect();

    let mut handles = Vec::new();
    for target in &targets {
        handles.push(pathfinder.create_path(agent, *target));
        handles.push(
            pathfinder.create_path_with(
                PathRequest::to_block(agent, *target).category(TargetCategory::Direct),
            ),
        );
    }
    // The block under the agent's first target: solid, so this one is a Reach job.
    if let Some(target) = targets.first() {
        handles.push(pathfinder.create_path(agent, Point3::new(target.x, target.y - 1, target.z)));
    }

    for handle in handles {
        match handle.wait_timeout(Duration::from_secs(30)) {
            Some(Ok(result)) if result.found() => info!(
                "{} ({:?}): {} waypoints to {:?} in {} ms",
                result.job_id,
                result.category,
                result.route.len(),
                result.final_waypoint(),
                result.elapsed.as_millis()
            ),
            Some(Ok(result)) => warn!("{} ({:?}): no route", result.job_id, result.category),
            Some(Err(e)) => error!("{} failed: {}", handle.job_id(), e),
            None => warn!("{} timed out", handle.job_id()),
        }
    }

    info!("Path cache holds {} routes", pathfinder.path_cache().len());
    ExitCode::SUCCESS
}
