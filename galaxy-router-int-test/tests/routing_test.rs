//! A* routes checked against Dijkstra over the materialized jump graph.

use galaxy_router::{ErrorKind, RoutingEngine};
use galaxy_router_int_test::test_util::{
    assert_valid_route, cleanup, clustered_systems, create_test_context, dijkstra, run_test,
    TestContext,
};
use galaxy_router_spatial::StarSystem;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_routes_are_optimal() {
    run_test(
        || create_test_context(300, 100.0, 21),
        |ctx| {
            let engine = ctx.engine();
            let mut rng = StdRng::seed_from_u64(22);
            let mut connected = 0;
            for _ in 0..40 {
                let start = rng.gen_range(0..300u64);
                let goal = rng.gen_range(0..300u64);
                let max_jump = rng.gen_range(8.0..20.0);

                let route = engine.find_route(start, goal, max_jump)?;
                match dijkstra(ctx.systems(), start, goal, max_jump) {
                    Some(best) => {
                        connected += 1;
                        assert!(!route.is_empty(), "{} -> {} should connect", start, goal);
                        assert!(
                            (route.total_distance - best).abs() < 1e-9,
                            "{} -> {}: {} vs optimal {}",
                            start,
                            goal,
                            route.total_distance,
                            best
                        );
                        assert_valid_route(
                            &ctx,
                            &route.system_ids,
                            start,
                            goal,
                            max_jump,
                            route.total_distance,
                        );
                    }
                    None => assert!(route.is_empty()),
                }
            }
            assert!(connected > 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_routes_are_deterministic() {
    run_test(
        || create_test_context(400, 80.0, 23),
        |ctx| {
            let engine = ctx.engine();
            let first = engine.find_route(0, 399, 15.0)?;
            for _ in 0..5 {
                assert_eq!(engine.find_route(0, 399, 15.0)?, first);
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_no_route_between_clusters() {
    run_test(
        || {
            let systems = clustered_systems(2, 50, 24);
            let engine = RoutingEngine::builder().load(systems.clone())?;
            Ok(TestContext::new(engine, systems))
        },
        |ctx| {
            let engine = ctx.engine();
            // inside one cluster
            let route = engine.find_route(0, 49, 80.0)?;
            assert!(!route.is_empty());
            // the clusters are ~1100 ly apart
            let route = engine.find_route(0, 99, 80.0)?;
            assert!(route.is_empty());
            assert!(route.nodes_expanded >= 50);
            assert!(!engine.find_route(0, 99, 1_200.0)?.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_scenario_line() {
    run_test(
        || {
            let systems = vec![
                StarSystem::new(1, 0.0, 0.0, 0.0),
                StarSystem::new(2, 5.0, 0.0, 0.0),
                StarSystem::new(3, 11.0, 0.0, 0.0),
            ];
            let engine = RoutingEngine::builder().load(systems.clone())?;
            Ok(TestContext::new(engine, systems))
        },
        |ctx| {
            let engine = ctx.engine();
            let route = engine.find_route(1, 3, 6.0)?;
            assert_eq!(route.system_ids, vec![1, 2, 3]);
            assert_eq!(route.total_distance, 11.0);
            assert!(engine.find_route(1, 3, 4.9)?.is_empty());

            let single = engine.find_route(2, 2, 6.0)?;
            assert_eq!(single.system_ids, vec![2]);
            assert_eq!(single.total_distance, 0.0);

            assert!(engine.find_route(1, 2, 0.0)?.is_empty());
            assert!(engine.find_route(1, 2, -3.0)?.is_empty());
            assert_eq!(engine.find_route(1, 77, 6.0).unwrap_err().kind(), &ErrorKind::NotFound);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_route_uses_inserted_systems() {
    run_test(
        || {
            let systems = vec![
                StarSystem::new(1, 0.0, 0.0, 0.0),
                StarSystem::new(3, 20.0, 0.0, 0.0),
            ];
            let engine = RoutingEngine::builder().load(systems.clone())?;
            Ok(TestContext::new(engine, systems))
        },
        |ctx| {
            let engine = ctx.engine();
            assert!(engine.find_route(1, 3, 12.0)?.is_empty());
            engine.insert_system(StarSystem::new(2, 10.0, 1.0, 0.0))?;
            let route = engine.find_route(1, 3, 12.0)?;
            assert_eq!(route.system_ids, vec![1, 2, 3]);
            Ok(())
        },
        cleanup,
    )
}
