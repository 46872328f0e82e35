//! Radius and nearest-neighbour queries checked against linear scans.

use galaxy_router::ErrorKind;
use galaxy_router_int_test::test_util::{
    brute_force_nearest, brute_force_within, cleanup, clustered_systems, create_deep_test_context,
    create_test_context, init_logging, random_systems, run_test,
};
use galaxy_router_spatial::{Point3, RTreeConfig, SpatialIndex, StarSystem};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_center(rng: &mut StdRng, extent: f64) -> Point3 {
    Point3::new(
        rng.gen_range(-10.0..extent + 10.0),
        rng.gen_range(-10.0..extent + 10.0),
        rng.gen_range(-10.0..extent + 10.0),
    )
}

#[test]
fn test_within_matches_brute_force() {
    run_test(
        || create_test_context(5_000, 1_000.0, 1),
        |ctx| {
            let engine = ctx.engine();
            let mut rng = StdRng::seed_from_u64(2);
            for _ in 0..200 {
                let center = random_center(&mut rng, 1_000.0);
                let radius = rng.gen_range(0.0..150.0);
                let mut found = engine.systems_within_radius(&center, radius)?;
                found.sort_unstable();
                assert_eq!(found, brute_force_within(ctx.systems(), &center, radius));
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_within_on_deep_tree() {
    run_test(
        || create_deep_test_context(2_000, 200.0, 3),
        |ctx| {
            let engine = ctx.engine();
            assert!(engine.stats()?.tree_height >= 5);
            let mut rng = StdRng::seed_from_u64(4);
            for _ in 0..100 {
                let center = random_center(&mut rng, 200.0);
                let mut found = engine.systems_within_radius(&center, 25.0)?;
                found.sort_unstable();
                assert_eq!(found, brute_force_within(ctx.systems(), &center, 25.0));
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_nearest_matches_brute_force() {
    run_test(
        || create_test_context(3_000, 500.0, 5),
        |ctx| {
            let engine = ctx.engine();
            let mut rng = StdRng::seed_from_u64(6);
            for _ in 0..100 {
                let center = random_center(&mut rng, 500.0);
                let k = rng.gen_range(1..40);
                let found = engine.nearest_systems(&center, k)?;
                assert_eq!(found, brute_force_nearest(ctx.systems(), &center, k));
            }
            assert!(engine.nearest_systems(&Point3::new(0.0, 0.0, 0.0), 0)?.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_radius_zero_finds_exact_point() {
    run_test(
        || create_test_context(1_000, 100.0, 7),
        |ctx| {
            let engine = ctx.engine();
            for system in ctx.systems().iter().take(50) {
                let found = engine.systems_within_radius(&system.coords, 0.0)?;
                assert_eq!(found, vec![system.id64]);
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_negative_radius_is_rejected() {
    run_test(
        || create_test_context(10, 10.0, 8),
        |ctx| {
            let err = ctx
                .engine()
                .systems_within_radius(&Point3::new(0.0, 0.0, 0.0), -0.5)
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_incremental_index_matches_bulk_index() {
    init_logging();
    let systems = clustered_systems(6, 300, 9);
    let (initial, rest) = systems.split_at(100);

    let bulk = SpatialIndex::build_with_config(systems.clone(), RTreeConfig::new(8).unwrap()).unwrap();
    let mut incremental =
        SpatialIndex::build_with_config(initial.to_vec(), RTreeConfig::new(8).unwrap()).unwrap();
    for system in rest {
        incremental.insert(system.clone()).unwrap();
    }
    incremental.tree().validate().unwrap();
    assert_eq!(incremental.len(), bulk.len());

    let mut rng = StdRng::seed_from_u64(10);
    for _ in 0..100 {
        let center = Point3::new(
            rng.gen_range(-50.0..5_050.0),
            rng.gen_range(-30.0..30.0),
            rng.gen_range(-50.0..2_550.0),
        );
        let radius = rng.gen_range(0.0..60.0);
        let mut a = bulk.within(&center, radius).unwrap();
        let mut b = incremental.within(&center, radius).unwrap();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
        assert_eq!(a, brute_force_within(&systems, &center, radius));

        let near_bulk: Vec<f64> = bulk.nearest(&center, 5).unwrap().iter().map(|p| p.1).collect();
        let near_inc: Vec<f64> =
            incremental.nearest(&center, 5).unwrap().iter().map(|p| p.1).collect();
        assert_eq!(near_bulk, near_inc);
    }
}

#[test]
fn test_every_capacity_builds_valid_tree() {
    init_logging();
    let systems = random_systems(1_500, 300.0, 11);
    for capacity in [4, 7, 16, 32, 64, 256] {
        let index =
            SpatialIndex::build_with_config(systems.clone(), RTreeConfig::new(capacity).unwrap())
                .unwrap();
        index.tree().validate().unwrap();
        let stats = index.stats();
        assert_eq!(stats.total_entries, 1_500);
        let center = Point3::new(150.0, 150.0, 150.0);
        let mut found = index.within(&center, 40.0).unwrap();
        found.sort_unstable();
        assert_eq!(found, brute_force_within(&systems, &center, 40.0), "capacity {}", capacity);
    }
}

#[test]
fn test_coincident_systems() {
    init_logging();
    let systems: Vec<StarSystem> =
        (0..100u64).map(|id| StarSystem::new(id, 1.0, 2.0, 3.0)).collect();
    let index = SpatialIndex::build_with_config(systems, RTreeConfig::new(4).unwrap()).unwrap();
    assert_eq!(index.within(&Point3::new(1.0, 2.0, 3.0), 0.0).unwrap().len(), 100);
    let nearest = index.nearest(&Point3::new(0.0, 0.0, 0.0), 3).unwrap();
    assert_eq!(nearest.iter().map(|p| p.0).collect::<Vec<_>>(), vec![0, 1, 2]);
}
