use std::cmp::Ordering;

use proptest::prelude::*;

use llmrec::recommender::{LinUcb, PolicyConfig, PolicySnapshot};

const D: usize = 4;
const K: usize = 3;

fn observation() -> impl Strategy<Value = (Vec<f64>, usize, f64)> {
    (
        prop::collection::vec(-2.0f64..2.0, D),
        0..K,
        -1.0f64..2.5,
    )
}

fn engine() -> LinUcb {
    LinUcb::new(PolicyConfig {
        alpha: 0.7,
        d: D,
        n_actions: K,
    })
    .unwrap()
}

proptest! {
    #[test]
    fn design_matrices_stay_positive_definite(
        history in prop::collection::vec(observation(), 0..40),
    ) {
        let mut engine = engine();
        for (x, action, reward) in &history {
            engine.update(x, *action, *reward).unwrap();
        }
        for action in 0..K {
            let design = engine.state().design(action).unwrap();
            prop_assert!(design.is_symmetric(1e-9));
            prop_assert!(design.cholesky().is_ok());
        }
    }

    #[test]
    fn scores_are_ranked_and_bonus_non_negative(
        history in prop::collection::vec(observation(), 0..30),
        query in prop::collection::vec(-2.0f64..2.0, D),
    ) {
        let mut engine = engine();
        for (x, action, reward) in &history {
            engine.update(x, *action, *reward).unwrap();
        }
        let scores = engine.score(&query).unwrap();
        prop_assert_eq!(scores.len(), K);
        for pair in scores.windows(2) {
            let order = pair[0].total.total_cmp(&pair[1].total);
            prop_assert!(
                order == Ordering::Greater
                    || (order == Ordering::Equal && pair[0].action < pair[1].action)
            );
        }
        prop_assert!(scores.iter().all(|s| s.bonus >= 0.0));
        prop_assert_eq!(engine.select(&query).unwrap(), scores[0].action);
    }

    #[test]
    fn update_order_does_not_matter_for_sufficient_statistics(
        history in prop::collection::vec(observation(), 1..20),
    ) {
        let mut forward = engine();
        let mut backward = engine();
        for (x, action, reward) in &history {
            forward.update(x, *action, *reward).unwrap();
        }
        for (x, action, reward) in history.iter().rev() {
            backward.update(x, *action, *reward).unwrap();
        }
        for action in 0..K {
            let a = forward.state().design(action).unwrap().as_slice();
            let b = backward.state().design(action).unwrap().as_slice();
            for (u, v) in a.iter().zip(b) {
                prop_assert!((u - v).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn snapshot_json_round_trip_preserves_scores(
        history in prop::collection::vec(observation(), 0..20),
        query in prop::collection::vec(-2.0f64..2.0, D),
    ) {
        let mut engine = engine();
        for (x, action, reward) in &history {
            engine.update(x, *action, *reward).unwrap();
        }
        let json = engine.export().to_json_pretty().unwrap();
        let restored = LinUcb::import(&PolicySnapshot::from_json(&json).unwrap()).unwrap();
        let before = engine.score(&query).unwrap();
        let after = restored.score(&query).unwrap();
        for (a, b) in before.iter().zip(&after) {
            prop_assert!((a.total - b.total).abs() < 1e-12);
        }
    }
}
