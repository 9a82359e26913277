//! Property-based tests for the measurement state machine.
//!
//! Run with: cargo test -- proptest

use meshview::{MeasurementTool, PickPhase, Point3};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_point() -> impl Strategy<Value = Point3> {
    prop::array::uniform3(-100.0..100.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

/// A click: `Some` for a surface hit, `None` for a miss.
fn arb_click() -> impl Strategy<Value = Option<Point3>> {
    prop::option::weighted(0.7, arb_point())
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// After N hits the tool holds 1 point for odd N and 2 for even N.
    #[test]
    fn proptest_hit_count_parity(hits in prop::collection::vec(arb_point(), 1..40)) {
        let mut tool = MeasurementTool::new();
        for p in &hits {
            tool.record_pick(*p);
        }
        let n = hits.len();
        let expected = if n % 2 == 0 { 2 } else { 1 };
        prop_assert_eq!(tool.state().len(), expected);
        prop_assert_eq!(tool.measurement().is_some(), n % 2 == 0);
        if n % 2 == 0 {
            prop_assert_eq!(tool.state().phase(), PickPhase::Complete);
        } else {
            prop_assert_eq!(tool.state().phase(), PickPhase::OnePoint);
        }
    }
}

proptest! {
    /// The measured distance does not depend on pick order.
    #[test]
    fn proptest_distance_is_symmetric(a in arb_point(), b in arb_point()) {
        let mut forward = MeasurementTool::new();
        forward.record_pick(a);
        forward.record_pick(b);
        let mut backward = MeasurementTool::new();
        backward.record_pick(b);
        backward.record_pick(a);

        let d1 = forward.measurement().unwrap().distance;
        let d2 = backward.measurement().unwrap().distance;
        prop_assert!((d1 - d2).abs() <= 1e-12 * d1.max(1.0));
        prop_assert!(d1 >= 0.0);
    }
}

proptest! {
    /// A third hit discards the pair and keeps only itself.
    #[test]
    fn proptest_third_hit_restarts(a in arb_point(), b in arb_point(), c in arb_point()) {
        let mut tool = MeasurementTool::new();
        tool.record_pick(a);
        tool.record_pick(b);
        tool.record_pick(c);
        prop_assert_eq!(tool.state().points(), &[c]);
        prop_assert!(tool.measurement().is_none());
    }
}

proptest! {
    /// Misses leave the state exactly as the hits alone would.
    #[test]
    fn proptest_misses_are_ignored(clicks in prop::collection::vec(arb_click(), 0..40)) {
        let mut with_misses = MeasurementTool::new();
        let mut hits_only = MeasurementTool::new();
        for click in &clicks {
            with_misses.handle_pick(*click);
            if let Some(p) = click {
                hits_only.record_pick(*p);
            }
        }
        prop_assert_eq!(with_misses.state(), hits_only.state());
    }
}

proptest! {
    /// A complete measurement always reports the distance between its points.
    #[test]
    fn proptest_distance_matches_points(hits in prop::collection::vec(arb_point(), 2..20)) {
        let mut tool = MeasurementTool::new();
        for p in &hits {
            tool.record_pick(*p);
        }
        if let Some(m) = tool.measurement() {
            let [a, b] = m.points;
            let expected = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2) + (a.z - b.z).powi(2)).sqrt();
            prop_assert!((m.distance - expected).abs() <= 1e-9);
            prop_assert_eq!(m.points[1], *hits.last().unwrap());
        }
    }
}
