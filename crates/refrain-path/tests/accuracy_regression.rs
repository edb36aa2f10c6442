//! Accuracy regression tests for refrain-path.
//!
//! Hand-computed references pin the score-matrix recurrence and the
//! backtracking rules. Seeded random SSMs check structural properties that
//! must hold for any input.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use refrain_path::{
    DenseSsm, DistanceMatrixConfig, DistanceStrategy, InducedSegment, PathPoint, PathScoring,
    QueryRange, ScoreMatrixConfig, ScoreMatrixWorkspace, Segment, extract_path_family,
    induced_segments_for_range, segment_overlap_distance, segment_similarity,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const NEG: f64 = f64::NEG_INFINITY;

fn ones(n: usize) -> DenseSsm {
    DenseSsm::new(vec![1.0; n * n], 1.0).expect("valid test ssm")
}

/// Symmetric SSM with unit diagonal and uniform off-diagonal values.
fn random_ssm(n: usize, seed: u64) -> DenseSsm {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut rows = vec![vec![1.0; n]; n];
    for i in 0..n {
        for j in 0..i {
            let v = rng.gen_range(0.0..1.0);
            rows[i][j] = v;
            rows[j][i] = v;
        }
    }
    DenseSsm::from_rows(rows, 0.5).expect("valid test ssm")
}

fn random_queries(n: usize, count: usize, seed: u64) -> Vec<QueryRange> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let start = rng.gen_range(0..n - 2);
            let end = rng.gen_range(start + 2..=n);
            QueryRange::new(start, end).expect("non-empty query")
        })
        .collect()
}

// ---------------------------------------------------------------------------
// a) hand-computed references
// ---------------------------------------------------------------------------

#[test]
fn all_ones_reference_matrix() {
    let ssm = ones(4);
    let query = QueryRange::new(0, 3).unwrap();
    let mut ws = ScoreMatrixWorkspace::for_query(&ssm, query).unwrap();
    let d = ScoreMatrixConfig::default().compute(&ssm, query, &mut ws).unwrap();

    let expected = [
        [0.0, 1.0, NEG, NEG],
        [0.0, 1.0, 2.0, 2.0],
        [2.0, 3.0, 2.0, 3.0],
        [3.0, 4.0, 4.0, 4.0],
    ];
    for (y, row) in expected.iter().enumerate() {
        assert_eq!(d.row(y), row, "row {y}");
    }
    assert_eq!(d.score(), 4.0);
}

#[test]
fn all_ones_reference_family() {
    let ssm = ones(4);
    let query = QueryRange::new(0, 3).unwrap();
    let mut ws = ScoreMatrixWorkspace::new();
    let extraction = extract_path_family(&ssm, query, &ScoreMatrixConfig::default(), &mut ws).unwrap();

    let paths: Vec<Vec<PathPoint>> = extraction
        .family
        .iter()
        .map(|p| p.points().to_vec())
        .collect();
    assert_eq!(
        paths,
        vec![
            vec![PathPoint { x: 2, y: 3 }, PathPoint { x: 0, y: 2 }],
            vec![PathPoint { x: 2, y: 1 }, PathPoint { x: 0, y: 0 }],
        ]
    );

    let induced = extraction.family.induced_segments();
    assert_eq!(
        induced.as_slice(),
        &[
            InducedSegment { start: 2, end: 3 },
            InducedSegment { start: 0, end: 1 },
        ]
    );
}

#[test]
fn all_ones_reference_scores() {
    let ssm = ones(4);
    let query = QueryRange::new(0, 3).unwrap();
    let mut ws = ScoreMatrixWorkspace::for_query(&ssm, query).unwrap();
    let d = ScoreMatrixConfig::default().compute(&ssm, query, &mut ws).unwrap();
    let family = d.path_family().unwrap();

    assert_eq!(PathScoring::Brightness.score_family(&ssm, &d, &family), vec![1.0, 1.0]);
    assert_eq!(PathScoring::Accumulated.score_family(&ssm, &d, &family), vec![0.5, 0.5]);
}

#[test]
fn alignment_reference_values() {
    let ssm = ones(6);
    let seg = |s: f64, e: f64| Segment::new(s, e, 0).unwrap();
    // Diagonal over a 4x4 block: score 4 over 4 cells.
    assert!((segment_similarity(&ssm, &seg(0.0, 3.0), &seg(2.0, 5.0)).unwrap() - 1.0).abs() < 1e-12);
    // 1x3 block: terminal unreachable from the origin.
    assert_eq!(segment_similarity(&ssm, &seg(0.0, 0.0), &seg(0.0, 2.0)).unwrap(), 0.0);
    // 2x3 block: the horizontal knight reaches the terminal, 2 over 2 cells.
    assert!((segment_similarity(&ssm, &seg(0.0, 1.0), &seg(0.0, 2.0)).unwrap() - 1.0).abs() < 1e-12);
}

// ---------------------------------------------------------------------------
// b) structural invariants on seeded random SSMs
// ---------------------------------------------------------------------------

#[test]
fn elevator_holds_best_wraparound() {
    let ssm = random_ssm(24, 7);
    let config = ScoreMatrixConfig::default();
    let mut ws = ScoreMatrixWorkspace::with_capacity_for(24);
    for query in random_queries(24, 20, 11) {
        ws.prepare_for(&ssm, query).unwrap();
        let d = config.compute(&ssm, query, &mut ws).unwrap();
        assert_eq!(d.get(0, 0), 0.0);
        for y in 1..d.height() {
            let expected = d.get(0, y - 1).max(d.get(d.width() - 1, y - 1));
            assert_eq!(d.get(0, y), expected, "query {query:?} row {y}");
        }
    }
}

#[test]
fn paths_stay_in_bounds_and_move_backwards() {
    let ssm = random_ssm(32, 3);
    let config = ScoreMatrixConfig::default()
        .with_knight_move_ratio(1.5)
        .unwrap();
    let mut ws = ScoreMatrixWorkspace::with_capacity_for(32);
    for query in random_queries(32, 30, 5) {
        let extraction = extract_path_family(&ssm, query, &config, &mut ws).unwrap();
        assert_eq!(extraction.path_scores.len(), extraction.family.len());
        for path in &extraction.family {
            assert!(!path.is_empty());
            for point in path {
                assert!(point.x < extraction.width - 1, "x out of bounds in {query:?}");
                assert!(point.y < 32, "y out of bounds in {query:?}");
            }
            for pair in path.points().windows(2) {
                assert!(pair[1].y < pair[0].y, "rows must strictly decrease");
                assert!(pair[1].x <= pair[0].x, "columns must not increase");
            }
        }
        for &score in &extraction.path_scores {
            assert!((0.0..=1.0).contains(&score), "brightness {score} out of range");
        }
    }
}

#[test]
fn workspace_reuse_matches_fresh_allocation() {
    let ssm = random_ssm(20, 21);
    let config = ScoreMatrixConfig::default();
    let mut reused = ScoreMatrixWorkspace::with_capacity_for(20);
    for query in random_queries(20, 15, 22) {
        reused.prepare_for(&ssm, query).unwrap();
        let a = config.compute(&ssm, query, &mut reused).unwrap().as_slice().to_vec();
        let mut fresh = ScoreMatrixWorkspace::for_query(&ssm, query).unwrap();
        let b = config.compute(&ssm, query, &mut fresh).unwrap().as_slice().to_vec();
        assert_eq!(a, b);
    }
}

#[test]
fn overlap_distance_is_symmetric_and_bounded() {
    let ssm = random_ssm(24, 13);
    let config = ScoreMatrixConfig::default();
    let mut ws = ScoreMatrixWorkspace::with_capacity_for(24);
    let induced: Vec<_> = random_queries(24, 10, 17)
        .into_iter()
        .map(|q| induced_segments_for_range(&ssm, q, &config, &mut ws).unwrap())
        .collect();
    for a in &induced {
        for b in &induced {
            let ab = a.overlap_distance(b);
            assert_eq!(ab, b.overlap_distance(a));
            assert!((0.0..=1.0).contains(&ab));
        }
        if !a.is_empty() {
            assert_eq!(a.overlap_distance(a), 0.0);
        }
    }
}

#[test]
fn segment_overlap_distance_matches_matrix() {
    let ssm = random_ssm(24, 29);
    let segments = vec![
        Segment::new(0.0, 3.0, 0).unwrap(),
        Segment::new(4.0, 8.5, 1).unwrap(),
        Segment::new(2.5, 11.0, 0).unwrap(),
    ];
    let m = DistanceMatrixConfig::new(DistanceStrategy::Overlap)
        .build(&ssm, &segments)
        .unwrap();
    let config = ScoreMatrixConfig::default();
    for i in 0..segments.len() {
        for j in 0..segments.len() {
            let direct = segment_overlap_distance(&ssm, &segments[i], &segments[j], &config).unwrap();
            assert_eq!(m.get(i, j), direct, "pair ({i}, {j})");
        }
    }
}

#[test]
fn alignment_similarity_is_symmetric() {
    let ssm = random_ssm(24, 31);
    let segments = [
        Segment::new(0.0, 2.0, 0).unwrap(),
        Segment::new(3.0, 7.5, 0).unwrap(),
        Segment::new(5.0, 11.0, 0).unwrap(),
    ];
    for a in &segments {
        for b in &segments {
            let ab = segment_similarity(&ssm, a, b).unwrap();
            let ba = segment_similarity(&ssm, b, a).unwrap();
            assert!(ab.is_finite() && ab >= 0.0);
            assert!((ab - ba).abs() < 1e-12, "asymmetric similarity: {ab} vs {ba}");
        }
    }
}

#[test]
fn distance_matrix_is_symmetric_under_both_strategies() {
    let ssm = random_ssm(30, 41);
    let mut rng = ChaCha8Rng::seed_from_u64(43);
    let segments: Vec<Segment> = (0..8)
        .map(|i| {
            let start = rng.gen_range(0.0..10.0);
            let end = start + rng.gen_range(1.0..4.5);
            Segment::new(start, end, i % 3).unwrap()
        })
        .collect();

    for strategy in [DistanceStrategy::Alignment, DistanceStrategy::Overlap] {
        let m = DistanceMatrixConfig::new(strategy)
            .with_kappa(0.7)
            .unwrap()
            .build(&ssm, &segments)
            .unwrap();
        assert_eq!(m.len(), segments.len());
        for i in 0..m.len() {
            for j in 0..m.len() {
                assert_eq!(m.get(i, j), m.get(j, i));
                assert!(m.get(i, j).is_finite());
            }
        }
    }
}
