use benchstop::{
    CriterionError, EntropyCriterion, ParamBag, StoppingCriterion,
    bench_utils::{Workload, generate_durations},
    entropy::{DEFAULT_MAX_ANGLE, DEFAULT_MIN_R2, EPSILON},
};

fn criterion_with(max_angle: f64, min_r2: f64) -> EntropyCriterion {
    let mut criterion = EntropyCriterion::new();
    criterion
        .initialize(
            &ParamBag::new()
                .with_float64("max-angle", max_angle)
                .with_float64("min-r2", min_r2),
        )
        .expect("initialize");
    criterion
}

fn first_finished(criterion: &EntropyCriterion, series: &[f64]) -> Option<usize> {
    (1..=series.len()).find(|&k| criterion.trend_converged(&series[..k]))
}

#[test]
fn test_samples_in_one_bucket_have_zero_entropy() {
    let mut criterion = EntropyCriterion::new();
    criterion.initialize(&ParamBag::new()).unwrap();
    for sample in [1.000000, 1.0000003, 1.0000004] {
        criterion.add_measurement(sample);
    }
    let bins: Vec<(f64, u64)> = criterion.bins().collect();
    assert_eq!(bins.len(), 1);
    assert_eq!(bins[0].1, 3);
    assert!((bins[0].0 - 1.0).abs() < EPSILON / 2.0);
    assert_eq!(criterion.entropy_history().last().copied(), Some(0.0));
}

#[test]
fn test_four_distinct_bins_have_two_bits() {
    let mut criterion = EntropyCriterion::new();
    criterion.initialize(&ParamBag::new()).unwrap();
    for sample in [1e-3, 2e-3, 3e-3, 4e-3] {
        criterion.add_measurement(sample);
    }
    assert_eq!(criterion.frequencies().len(), 4);
    let entropy = *criterion.entropy_history().last().unwrap();
    assert!((entropy - 2.0).abs() < 1e-12);
}

#[test]
fn test_bins_sorted_by_duration() {
    let mut criterion = EntropyCriterion::new();
    for sample in [3e-3, 1e-3, 2e-3, 1e-3] {
        criterion.add_measurement(sample);
    }
    let keys: Vec<f64> = criterion.bins().map(|(key, _)| key).collect();
    assert!(keys.windows(2).all(|w| w[0] < w[1]));
    let counts: Vec<u64> = criterion.bins().map(|(_, count)| count).collect();
    assert_eq!(counts, vec![2, 1, 1]);
}

#[test]
fn test_not_finished_below_two_points() {
    let mut criterion = criterion_with(1.0, 0.0);
    assert!(!criterion.is_finished());
    criterion.add_measurement(0.001);
    assert!(!criterion.is_finished());
    criterion.add_measurement(0.001);
    assert!(criterion.is_finished());
}

#[test]
fn test_constant_entropy_finishes() {
    let mut criterion = criterion_with(0.0, 1.0);
    for _ in 0..10 {
        criterion.add_measurement(0.25);
    }
    let trend = criterion.trend().unwrap();
    assert_eq!(trend.slope, 0.0);
    assert_eq!(trend.r2, 1.0);
    assert!(criterion.is_finished());
}

#[test]
fn test_history_tracks_sample_count() {
    let mut criterion = EntropyCriterion::new();
    criterion.initialize(&ParamBag::new()).unwrap();
    let samples = generate_durations(
        Workload::Noisy {
            mean_s: 1e-3,
            jitter: 0.05,
        },
        200,
        42,
    );
    for sample in samples {
        criterion.add_measurement(sample);
        let before = criterion.entropy_history().len();
        let _ = criterion.is_finished();
        let _ = criterion.is_finished();
        assert_eq!(before as u64, criterion.total_samples());
        assert_eq!(criterion.entropy_history().len(), before);
    }
    assert_eq!(criterion.total_samples(), 200);
}

#[test]
fn test_decreasing_then_plateau_stays_finished() {
    let mut series = vec![3.0, 2.0, 1.5, 1.25, 1.125];
    series.extend(std::iter::repeat_n(1.0, 25));
    let criterion = criterion_with(DEFAULT_MAX_ANGLE, 0.25);

    let first = first_finished(&criterion, &series).unwrap();
    assert_eq!(first, 2);
    for k in first..=series.len() {
        assert!(criterion.trend_converged(&series[..k]), "prefix {k}");
    }
}

#[test]
fn test_rising_then_plateau_finishes_once_slope_flattens() {
    let mut series = vec![0.0, 1.0, 1.5, 1.75, 1.875];
    series.extend(std::iter::repeat_n(2.0, 25));
    let criterion = criterion_with(0.1, 0.25);

    // Fitted slope over the first 13 points is ~0.110, over 14 points ~0.096.
    let first = first_finished(&criterion, &series).unwrap();
    assert_eq!(first, 14);
    for k in first..=series.len() {
        assert!(criterion.trend_converged(&series[..k]), "prefix {k}");
    }
    for k in 2..first {
        let fit = benchstop::LineFit::fit(&series[..k]).unwrap();
        assert!(fit.slope > 0.1);
    }
}

#[test]
fn test_initialize_resets_state_and_defaults() {
    let mut criterion = criterion_with(5.0, 0.0);
    for sample in [1e-3, 2e-3, 3e-3] {
        criterion.add_measurement(sample);
    }
    criterion.initialize(&ParamBag::new()).unwrap();
    assert_eq!(criterion.max_angle(), DEFAULT_MAX_ANGLE);
    assert_eq!(criterion.min_r2(), DEFAULT_MIN_R2);
    assert_eq!(criterion.total_samples(), 0);
    assert_eq!(criterion.total_time(), 0.0);
    assert!(criterion.entropy_history().is_empty());
    assert!(criterion.frequencies().is_empty());
}

#[test]
fn test_initialize_ignores_unrelated_params() {
    let mut criterion = EntropyCriterion::new();
    let params = ParamBag::new()
        .with_float64("max-noise", 0.5)
        .with_float64("min-r2", 0.9);
    criterion.initialize(&params).unwrap();
    assert_eq!(criterion.min_r2(), 0.9);
    assert_eq!(criterion.max_angle(), DEFAULT_MAX_ANGLE);
}

#[test]
fn test_initialize_type_mismatch_is_fatal() {
    let mut criterion = EntropyCriterion::new();
    let mut params = ParamBag::new();
    params.set_string("min-r2", "high");
    let err = criterion.initialize(&params).unwrap_err();
    assert_eq!(err, CriterionError::type_mismatch("min-r2", "float64", "string"));
}

#[test]
fn test_total_time_accumulates() {
    let mut criterion = EntropyCriterion::new();
    criterion.add_measurement(0.5);
    criterion.add_measurement(0.25);
    assert_eq!(criterion.total_time(), 0.75);
    assert_eq!(criterion.params().len(), 2);
}
