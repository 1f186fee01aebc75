use approx::assert_relative_eq;
use stockpaths::core::{PathConvention, SimulationError, SimulationParameters};
use stockpaths::math::stream_rng;
use stockpaths::mc::{PathMatrix, PathSimulator, aggregate};

fn params(start: f64, mean: f64, std: f64, days: usize, paths: usize) -> SimulationParameters {
    SimulationParameters::builder()
        .starting_price(start)
        .mean_return(mean)
        .std_return(std)
        .horizon_days(days)
        .path_count(paths)
        .build()
        .expect("valid parameters")
}

#[test]
fn shape_and_finiteness() {
    for (days, paths) in [(1, 1), (5, 3), (30, 200)] {
        let m = PathSimulator::seeded(7)
            .simulate(&params(25.0, 0.001, 0.03, days, paths))
            .unwrap();
        assert_eq!(m.path_count(), paths);
        assert_eq!(m.horizon_days(), days);
        assert!(m.as_slice().iter().all(|v| v.is_finite()));
    }
}

#[test]
fn same_seed_reproduces_and_different_seeds_diverge() {
    let p = params(80.0, 0.0005, 0.02, 15, 100);
    let a = PathSimulator::seeded(123).simulate(&p).unwrap();
    let b = PathSimulator::seeded(123).simulate(&p).unwrap();
    let c = PathSimulator::seeded(124).simulate(&p).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn each_path_owns_its_stream() {
    // Row i equals a single-path run driven by stream i, whatever the scheduling.
    let seed = 99;
    let p = params(10.0, 0.0, 0.05, 12, 16);
    let sim = PathSimulator::seeded(seed);
    let matrix = sim.simulate(&p).unwrap();

    let single = SimulationParameters { path_count: 1, ..p };
    for i in 0..p.path_count {
        let row = sim
            .simulate_with_rng(&single, &mut stream_rng(seed, i))
            .unwrap();
        assert_eq!(row.row(0), matrix.row(i), "path {i}");
    }
}

#[test]
fn invalid_inputs_are_rejected_before_simulation() {
    let good = params(10.0, 0.0, 0.01, 3, 3);
    let bad = [
        SimulationParameters { horizon_days: 0, ..good },
        SimulationParameters { path_count: 0, ..good },
        SimulationParameters { starting_price: 0.0, ..good },
        SimulationParameters { starting_price: f64::INFINITY, ..good },
        SimulationParameters { std_return: -0.01, ..good },
        SimulationParameters { std_return: f64::NAN, ..good },
        SimulationParameters { mean_return: f64::INFINITY, ..good },
    ];
    for p in bad {
        assert!(
            matches!(
                PathSimulator::seeded(1).simulate(&p),
                Err(SimulationError::InvalidParameter(_))
            ),
            "{p:?}"
        );
    }
}

#[test]
fn one_day_horizon_under_both_conventions() {
    let p = params(40.0, 0.0, 0.05, 1, 50);

    let stepped = PathSimulator::seeded(3).simulate(&p).unwrap();
    assert_eq!(stepped.horizon_days(), 1);
    assert!(stepped.column(0).any(|v| v != 40.0));

    let anchored = PathSimulator::seeded(3)
        .with_convention(PathConvention::AnchoredStart)
        .simulate(&p)
        .unwrap();
    assert_eq!(anchored.horizon_days(), 1);
    assert!(anchored.column(0).all(|v| v == 40.0));
}

#[test]
fn anchored_start_shifts_stepped_paths_by_one_day() {
    let p = params(40.0, 0.001, 0.02, 6, 8);
    let stepped = PathSimulator::seeded(17).simulate(&p).unwrap();
    let anchored = PathSimulator::seeded(17)
        .with_convention(PathConvention::AnchoredStart)
        .simulate(&p)
        .unwrap();
    for (s, a) in stepped.rows().zip(anchored.rows()) {
        assert_eq!(a[0], 40.0);
        assert_eq!(&a[1..], &s[..5]);
    }
}

#[test]
fn walk_is_not_floored_at_zero() {
    let m = PathSimulator::seeded(5)
        .simulate(&params(100.0, 0.0, 2.0, 3, 2_000))
        .unwrap();
    assert!(m.as_slice().iter().all(|v| v.is_finite()));
    assert!(m.as_slice().iter().any(|&v| v < 0.0));
}

#[test]
fn zero_volatility_compounds_the_mean() {
    let m = PathSimulator::new()
        .simulate(&params(50.0, 0.02, 0.0, 4, 5))
        .unwrap();
    let daily = aggregate(&m).unwrap();
    for (d, entry) in daily.iter().enumerate() {
        assert_relative_eq!(
            entry.mean_price,
            50.0 * 1.02_f64.powi(d as i32 + 1),
            max_relative = 1.0e-12
        );
    }
}

#[test]
fn aggregate_of_hand_built_matrix() {
    let m = PathMatrix::from_rows(vec![vec![10.0, 20.0], vec![30.0, 40.0]]).unwrap();
    let daily = aggregate(&m).unwrap();
    assert_eq!(daily.len(), 2);
    assert_eq!((daily[0].day, daily[0].mean_price), (1, 20.0));
    assert_eq!((daily[1].day, daily[1].mean_price), (2, 30.0));

    let single = PathMatrix::from_rows(vec![vec![1.5, 2.5, 3.5]]).unwrap();
    let means: Vec<f64> = aggregate(&single).unwrap().iter().map(|e| e.mean_price).collect();
    assert_eq!(means, vec![1.5, 2.5, 3.5]);
}

#[test]
fn aggregate_rejects_empty_matrix() {
    let empty = PathMatrix::from_rows(Vec::new()).unwrap();
    assert_eq!(aggregate(&empty), Err(SimulationError::EmptyMatrix));
}
