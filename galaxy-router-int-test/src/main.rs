use galaxy_router::errors::RouterResult;
use galaxy_router::RoutingEngine;
use galaxy_router_int_test::test_util::random_systems;
use galaxy_router_spatial::Point3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() -> RouterResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Starting stress test...");

    let count = 1_000_000;
    let extent = 10_000.0;
    let systems = random_systems(count, extent, 1);

    let start = std::time::Instant::now();
    let engine = RoutingEngine::builder().load(systems)?;
    log::info!(
        "Loaded {} systems in {:?} ({:?})",
        count,
        start.elapsed(),
        engine.stats()?
    );

    let mut rng = StdRng::seed_from_u64(2);
    let start = std::time::Instant::now();
    let mut found = 0;
    for _ in 0..10_000 {
        let center = Point3::new(
            rng.gen_range(0.0..extent),
            rng.gen_range(0.0..extent),
            rng.gen_range(0.0..extent),
        );
        found += engine.systems_within_radius(&center, 200.0)?.len();
    }
    log::info!("Ran 10000 radius queries ({} hits) in {:?}", found, start.elapsed());

    let start = std::time::Instant::now();
    let mut routed = 0;
    for _ in 0..20 {
        let from = rng.gen_range(0..count as u64);
        let to = rng.gen_range(0..count as u64);
        let route = engine.find_route(from, to, 250.0)?;
        routed += route.jumps();
    }
    log::info!("Found 20 routes ({} jumps) in {:?}", routed, start.elapsed());
    Ok(())
}
