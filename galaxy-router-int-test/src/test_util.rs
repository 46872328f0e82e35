use galaxy_router::errors::RouterResult;
use galaxy_router::RoutingEngine;
use galaxy_router_spatial::{Point3, StarSystem};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::backtrace::Backtrace;
use std::collections::HashMap;
use std::time::Instant;

/// Installs the test logger once per process.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Runs `test` against the context produced by `before`, then hands the
/// context to `after` whether or not the test succeeded.
///
/// Any error is reported with its timing and a backtrace before failing the
/// test.
pub fn run_test<B, T, A>(before: B, test: T, after: A)
where
    B: FnOnce() -> RouterResult<TestContext>,
    T: FnOnce(TestContext) -> RouterResult<()>,
    A: FnOnce(TestContext) -> RouterResult<()>,
{
    init_logging();
    let start_time = Instant::now();
    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };

    let result = test(ctx.clone());
    let after_result = after(ctx);
    let elapsed = start_time.elapsed();
    log::debug!("Test body finished in {:?}", elapsed);

    if let Err(e) = result {
        eprintln!("\n==================== TEST FAILED ====================");
        eprintln!("Failed after {:?}", elapsed);
        eprintln!("Error: {:?}", e);
        eprintln!("\nBacktrace:\n{}", Backtrace::capture());
        eprintln!("=====================================================\n");
        panic!("Test failed: {}", e);
    }
    if let Err(e) = after_result {
        panic!("After run failed: {:?}", e);
    }
}

/// A loaded engine plus the systems it was loaded from.
#[derive(Clone)]
pub struct TestContext {
    engine: RoutingEngine,
    systems: Vec<StarSystem>,
}

impl TestContext {
    pub fn new(engine: RoutingEngine, systems: Vec<StarSystem>) -> Self {
        Self { engine, systems }
    }

    pub fn engine(&self) -> RoutingEngine {
        self.engine.clone()
    }

    pub fn systems(&self) -> &[StarSystem] {
        &self.systems
    }

    pub fn coords_of(&self, id64: u64) -> Option<Point3> {
        self.systems.iter().find(|s| s.id64 == id64).map(|s| s.coords)
    }
}

/// Context over `n` uniformly random systems in a cube of side `extent`.
pub fn create_test_context(n: usize, extent: f64, seed: u64) -> RouterResult<TestContext> {
    let systems = random_systems(n, extent, seed);
    let engine = RoutingEngine::builder().load(systems.clone())?;
    Ok(TestContext::new(engine, systems))
}

/// Context with a small node capacity, so even small datasets build deep trees.
pub fn create_deep_test_context(n: usize, extent: f64, seed: u64) -> RouterResult<TestContext> {
    let systems = random_systems(n, extent, seed);
    let engine = RoutingEngine::builder().node_capacity(4).load(systems.clone())?;
    Ok(TestContext::new(engine, systems))
}

pub fn cleanup(_ctx: TestContext) -> RouterResult<()> {
    Ok(())
}

/// `n` systems with ids `0..n`, uniformly spread over `[0, extent)^3`.
pub fn random_systems(n: usize, extent: f64, seed: u64) -> Vec<StarSystem> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n as u64)
        .map(|id| {
            StarSystem::new(
                id,
                rng.gen_range(0.0..extent),
                rng.gen_range(0.0..extent),
                rng.gen_range(0.0..extent),
            )
        })
        .collect()
}

/// `clusters` tight groups of `per_cluster` systems, the groups spaced far apart.
pub fn clustered_systems(clusters: usize, per_cluster: usize, seed: u64) -> Vec<StarSystem> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut systems = Vec::with_capacity(clusters * per_cluster);
    for c in 0..clusters {
        let center = Point3::new(c as f64 * 1000.0, 0.0, c as f64 * 500.0);
        for _ in 0..per_cluster {
            let id = systems.len() as u64;
            systems.push(StarSystem::new(
                id,
                center.x + rng.gen_range(-20.0..20.0),
                center.y + rng.gen_range(-20.0..20.0),
                center.z + rng.gen_range(-20.0..20.0),
            ));
        }
    }
    systems
}

/// Ids within `radius` of `center` by linear scan, sorted.
pub fn brute_force_within(systems: &[StarSystem], center: &Point3, radius: f64) -> Vec<u64> {
    let mut ids: Vec<u64> = systems
        .iter()
        .filter(|s| s.coords.distance(center) <= radius)
        .map(|s| s.id64)
        .collect();
    ids.sort_unstable();
    ids
}

/// The `k` nearest systems by linear scan, nearest first.
pub fn brute_force_nearest(systems: &[StarSystem], center: &Point3, k: usize) -> Vec<(u64, f64)> {
    let mut all: Vec<(usize, f64)> = systems
        .iter()
        .enumerate()
        .map(|(i, s)| (i, s.coords.distance(center)))
        .collect();
    all.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    all.into_iter().take(k).map(|(i, d)| (systems[i].id64, d)).collect()
}

/// Cost of the cheapest route by Dijkstra over the fully materialized jump
/// graph, or `None` if `goal` is unreachable. Quadratic; keep inputs small.
pub fn dijkstra(systems: &[StarSystem], start: u64, goal: u64, max_jump: f64) -> Option<f64> {
    let position: HashMap<u64, usize> =
        systems.iter().enumerate().map(|(i, s)| (s.id64, i)).collect();
    let source = *position.get(&start)?;
    let target = *position.get(&goal)?;

    let n = systems.len();
    let mut dist = vec![f64::INFINITY; n];
    let mut done = vec![false; n];
    dist[source] = 0.0;

    for _ in 0..n {
        let mut current = None;
        for i in 0..n {
            if !done[i] && dist[i].is_finite() && current.map_or(true, |c: usize| dist[i] < dist[c]) {
                current = Some(i);
            }
        }
        let current = current?;
        if current == target {
            return Some(dist[current]);
        }
        done[current] = true;
        for next in 0..n {
            if done[next] || next == current {
                continue;
            }
            let hop = systems[current].coords.distance(&systems[next].coords);
            if hop <= max_jump && dist[current] + hop < dist[next] {
                dist[next] = dist[current] + hop;
            }
        }
    }
    None
}

/// Panics unless `route` is a valid jump sequence from `start` to `goal`.
pub fn assert_valid_route(
    ctx: &TestContext,
    route: &[u64],
    start: u64,
    goal: u64,
    max_jump: f64,
    total_distance: f64,
) {
    assert_eq!(route.first(), Some(&start));
    assert_eq!(route.last(), Some(&goal));

    let mut seen = std::collections::HashSet::new();
    let mut sum = 0.0;
    for pair in route.windows(2) {
        assert!(seen.insert(pair[0]), "system {} visited twice", pair[0]);
        let a = ctx.coords_of(pair[0]).expect("route system is loaded");
        let b = ctx.coords_of(pair[1]).expect("route system is loaded");
        let hop = a.distance(&b);
        assert!(hop <= max_jump, "jump {} -> {} is {} > {}", pair[0], pair[1], hop, max_jump);
        sum += hop;
    }
    assert!((sum - total_distance).abs() < 1e-9, "sum {} != {}", sum, total_distance);
}
