use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cgmath::Point3;
use voxel_pathfinder::pathfinding::{ObstructionOracle, OpenSpace};
use voxel_pathfinder::voxels::chunk::Chunk;
use voxel_pathfinder::voxels::{world_to_doubled, Block, BlockType, ChunkGenerator, World};
use voxel_pathfinder::{
    PathRequest, PathResult, Pathfinder, PathfinderConfig, PathfinderError, TargetCategory,
};
use web_time::Duration;

const TIMEOUT: Duration = Duration::from_secs(60);

fn wait(handle: &voxel_pathfinder::PathHandle) -> Arc<PathResult> {
    handle
        .wait_timeout(TIMEOUT)
        .expect("job timed out")
        .expect("job failed")
}

fn counting_oracle(calls: Arc<AtomicUsize>) -> Arc<dyn ObstructionOracle> {
    Arc::new(move |x: i32, _y: i32, z: i32| {
        calls.fetch_add(1, Ordering::SeqCst);
        x == 6 && (-4..=4).contains(&z)
    })
}

#[test]
fn open_world_route_reaches_target() {
    let pathfinder = Pathfinder::new(
        PathfinderConfig::default(),
        World::with_generator(ChunkGenerator::Empty),
    )
    .unwrap();
    let result = wait(&pathfinder.create_path(Point3::new(0, 0, 0), Point3::new(5, 0, 0)));

    assert_eq!(result.category, TargetCategory::Precise);
    assert!(result.found());
    let last = result.final_waypoint().unwrap();
    let goal = Point3::new(5.5, 0.5, 0.5);
    assert!((last.x - goal.x).abs() <= 1.0);
    assert!((last.y - goal.y).abs() <= 1.0);
    assert!((last.z - goal.z).abs() <= 1.0);
    assert_eq!(result.route[0], Point3::new(0.5, 0.0, 0.5));
}

#[test]
fn walled_room_has_no_route() {
    // Known air in voxels x -16..47, y/z -16..15; everything outside is unknown.
    let world = World::new();
    for x in -1..=1 {
        for y in -1..=0 {
            for z in -1..=0 {
                world.insert_chunk(Chunk::empty(&Point3::new(x, y, z)));
            }
        }
    }
    world.fill(
        Point3::new(3, -16, -16),
        Point3::new(3, 15, 15),
        Block::new(BlockType::STONE),
    );

    let config = PathfinderConfig {
        search_margin: 4,
        max_expanded_nodes: 20_000,
        ..PathfinderConfig::default()
    };
    let pathfinder = Pathfinder::new(config, world).unwrap();
    let result = wait(&pathfinder.create_path(Point3::new(0, 0, 0), Point3::new(6, 0, 0)));

    assert!(!result.found());
    assert!(result.route.is_empty());
}

#[test]
fn unloaded_world_is_open() {
    // Nothing is known, but an unloaded world blocks nothing.
    let world = Arc::new(World::new());
    world.set_loaded(false);
    let pathfinder = Pathfinder::new(PathfinderConfig::default(), world.clone()).unwrap();
    let result = wait(&pathfinder.create_path(Point3::new(0, 0, 0), Point3::new(3, 0, 0)));
    assert!(result.found());
}

#[test]
fn same_id_computes_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let oracle = counting_oracle(calls.clone());
    let pathfinder =
        Pathfinder::with_oracle(PathfinderConfig::default(), Arc::new(OpenSpace)).unwrap();

    let request = PathRequest::to_block(Point3::new(0, 0, 0), Point3::new(10, 0, 0))
        .oracle(oracle.clone())
        .job_id("shared-job");
    let handles: Vec<_> = (0..8)
        .map(|_| pathfinder.create_path_with(request.clone()))
        .collect();
    let results: Vec<_> = handles.iter().map(wait).collect();
    for result in &results[1..] {
        assert!(Arc::ptr_eq(result, &results[0]));
    }
    assert_eq!(results[0].category, TargetCategory::Precise);
    let shared_calls = calls.load(Ordering::SeqCst);

    // One uncached computation of the same job costs as many oracle calls.
    let baseline =
        Pathfinder::with_oracle(PathfinderConfig::default(), Arc::new(OpenSpace)).unwrap();
    wait(&baseline.create_path_with(request));
    assert_eq!(calls.load(Ordering::SeqCst), shared_calls * 2);
}

#[test]
fn distinct_ids_compute_independently() {
    let pathfinder =
        Pathfinder::with_oracle(PathfinderConfig::default(), Arc::new(OpenSpace)).unwrap();
    let request = PathRequest::to_block(Point3::new(0, 0, 0), Point3::new(4, 0, 4));
    let a = wait(&pathfinder.create_path_with(request.clone().job_id("a")));
    let b = wait(&pathfinder.create_path_with(request.job_id("b")));
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(a.route, b.route);
    assert_eq!(pathfinder.path_cache().len(), 2);
}

#[test]
fn generated_ids_are_unique() {
    let pathfinder =
        Pathfinder::with_oracle(PathfinderConfig::default(), Arc::new(OpenSpace)).unwrap();
    let first = pathfinder.create_path(Point3::new(0, 0, 0), Point3::new(2, 0, 0));
    let second = pathfinder.create_path(Point3::new(0, 0, 0), Point3::new(2, 0, 0));
    assert_ne!(first.job_id(), second.job_id());
    assert!(!Arc::ptr_eq(&wait(&first), &wait(&second)));
}

#[test]
fn reach_stops_beside_solid_target() {
    let world = World::with_generator(ChunkGenerator::Layered {
        ground_height: 0,
        block: Block::new(BlockType::STONE),
    });
    world.fill(
        Point3::new(5, 0, 0),
        Point3::new(5, 2, 0),
        Block::new(BlockType::WOOD),
    );
    let pathfinder = Pathfinder::new(PathfinderConfig::default(), world).unwrap();
    let result = wait(&pathfinder.create_path(Point3::new(0, 0, 0), Point3::new(5, 1, 0)));

    assert_eq!(result.category, TargetCategory::Reach);
    assert!(result.found());
    let last = result.final_waypoint().unwrap();
    let goal_cell = world_to_doubled(result.goal);
    let last_cell = world_to_doubled(last);
    let radius = pathfinder.config().reach_radius;
    assert!((last_cell.x - goal_cell.x).abs() <= radius);
    assert!((last_cell.y - goal_cell.y).abs() <= radius);
    assert!((last_cell.z - goal_cell.z).abs() <= radius);
    assert!(!pathfinder
        .default_oracle()
        .is_blocked(last_cell.x, last_cell.y, last_cell.z));
}

#[test]
fn direct_route_is_no_longer_than_precise() {
    let pathfinder =
        Pathfinder::with_oracle(PathfinderConfig::default(), Arc::new(OpenSpace)).unwrap();
    let target = Point3::new(7, 2, -4);
    let precise = pathfinder.create_path_with(
        PathRequest::to_block(Point3::new(0, 0, 0), target).category(TargetCategory::Precise),
    );
    let direct = pathfinder.create_path_with(
        PathRequest::to_block(Point3::new(0, 0, 0), target).category(TargetCategory::Direct),
    );
    let (precise, direct) = (wait(&precise), wait(&direct));

    assert_eq!(direct.route.len(), 2);
    assert!(direct.route.len() < precise.route.len());
    assert_eq!(direct.final_waypoint(), precise.final_waypoint());
}

#[test]
fn direct_route_keeps_clear_of_walls() {
    let calls = Arc::new(AtomicUsize::new(0));
    let oracle = counting_oracle(calls);
    let pathfinder =
        Pathfinder::with_oracle(PathfinderConfig::default(), Arc::new(OpenSpace)).unwrap();
    let result = wait(&pathfinder.create_path_with(
        PathRequest::to_block(Point3::new(0, 0, 0), Point3::new(6, 0, 0))
            .oracle(oracle.clone())
            .category(TargetCategory::Direct),
    ));
    assert!(result.found());
    // The wall forces at least one bend.
    assert!(result.route.len() > 2);
    for waypoint in &result.route {
        let cell = world_to_doubled(*waypoint);
        assert!(!oracle.is_blocked(cell.x, cell.y, cell.z));
    }
}

#[test]
fn panicking_oracle_faults_the_handle() {
    let pathfinder =
        Pathfinder::with_oracle(PathfinderConfig::default(), Arc::new(OpenSpace)).unwrap();
    let exploding: Arc<dyn ObstructionOracle> =
        Arc::new(|_x: i32, _y: i32, _z: i32| -> bool { panic!("oracle failure") });

    for category in [Some(TargetCategory::Precise), None] {
        let mut request =
            PathRequest::to_block(Point3::new(0, 0, 0), Point3::new(3, 0, 0)).oracle(exploding.clone());
        if let Some(category) = category {
            request = request.category(category);
        }
        let handle = pathfinder.create_path_with(request);
        match handle.wait_timeout(TIMEOUT) {
            Some(Err(PathfinderError::ComputationFault(message))) => {
                assert!(message.contains("oracle failure"))
            }
            other => panic!("expected a computation fault, got {other:?}"),
        }
        assert!(!pathfinder.path_cache().contains(handle.job_id()));
    }

    // The pool is still serving jobs.
    assert!(wait(&pathfinder.create_path(Point3::new(0, 0, 0), Point3::new(1, 0, 0))).found());
}

#[test]
fn handle_can_be_awaited() {
    let pathfinder =
        Pathfinder::with_oracle(PathfinderConfig::default(), Arc::new(OpenSpace)).unwrap();
    let handle = pathfinder.create_path(Point3::new(0, 0, 0), Point3::new(3, 1, 2));
    let observer = handle.clone();
    let result = futures::executor::block_on(handle).unwrap();
    assert!(result.found());
    assert!(observer.is_ready());
    assert!(Arc::ptr_eq(&observer.try_result().unwrap().unwrap(), &result));
}

#[test]
fn invalidation_exposes_world_changes() {
    let world = Arc::new(World::with_generator(ChunkGenerator::Empty));
    let pathfinder = Pathfinder::new(PathfinderConfig::default(), world.clone()).unwrap();
    let oracle = pathfinder.default_oracle();

    assert!(!oracle.is_blocked(5, 0, 1));
    world.set_block(Point3::new(2, 0, 0), Block::new(BlockType::STONE));
    assert!(!oracle.is_blocked(5, 0, 1));
    pathfinder.invalidate_obstructions();
    assert!(oracle.is_blocked(5, 0, 1));
}

#[test]
fn path_cache_bound_from_json_config() {
    let config = PathfinderConfig::from_json_str(r#"{ "path_cache_capacity": 3, "worker_count": 2 }"#)
        .unwrap();
    let pathfinder = Pathfinder::with_oracle(config, Arc::new(OpenSpace)).unwrap();
    let handles: Vec<_> = (0..6)
        .map(|x| pathfinder.create_path(Point3::new(0, 0, 0), Point3::new(x, 0, 0)))
        .collect();
    for handle in &handles {
        wait(handle);
    }
    assert!(pathfinder.path_cache().len() <= 3);
    assert_eq!(pathfinder.path_cache().capacity(), 3);
}
