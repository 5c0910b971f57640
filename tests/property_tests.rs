//! Property-based tests for usercf.
//!
//! Uses proptest to verify invariants across many random rating sets.

use proptest::prelude::*;
use std::collections::BTreeSet;
use usercf::prelude::*;
use usercf::recommend::Neighborhoods;

// ============================================================================
// Rating Generation Strategies
// ============================================================================

/// Half-star ratings in [0.5, 5.0]
fn rating() -> impl Strategy<Value = f64> {
    (1u32..=10).prop_map(|r| f64::from(r) * 0.5)
}

/// Dense-ish rating sets over a small user/item space so pairs overlap
fn random_samples() -> impl Strategy<Value = Vec<RatingSample>> {
    prop::collection::vec(
        (0usize..8, 0usize..12, rating()).prop_map(|(u, i, r)| RatingSample::new(u, i, r)),
        1..120,
    )
}

fn fit(samples: &[RatingSample], k: usize, min_common: usize) -> (RatingIndex, Neighborhoods) {
    let index = RatingIndex::from_samples(samples).unwrap();
    let config = CfConfig::new().with_k(k).with_min_common_items(min_common);
    let model = Neighborhoods::fit(&index, config).unwrap();
    (index, model)
}

fn co_rated(index: &RatingIndex, a: usize, b: usize) -> usize {
    match (index.items_of(a), index.items_of(b)) {
        (Some(x), Some(y)) => x.intersection(y).count(),
        _ => 0,
    }
}

// ============================================================================
// Neighbor List Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_lists_bounded_and_sorted(
        samples in random_samples(),
        k in 1usize..6,
        min_common in 0usize..4
    ) {
        let (_, model) = fit(&samples, k, min_common);

        for (&user, list) in model.neighbor_lists() {
            prop_assert!(list.len() <= k);
            let weights: Vec<f64> = list.iter().map(|n| n.weight).collect();
            prop_assert!(weights.windows(2).all(|w| w[0] >= w[1]));
            prop_assert!(weights.iter().all(|w| w.is_finite()));
            prop_assert!(list.iter().all(|n| n.user != user));
        }
    }

    #[test]
    fn prop_neighbors_exceed_co_rated_threshold(
        samples in random_samples(),
        min_common in 0usize..4
    ) {
        let (index, model) = fit(&samples, 5, min_common);

        for (&user, list) in model.neighbor_lists() {
            for n in list {
                prop_assert!(co_rated(&index, user, n.user) > min_common);
            }
        }
    }

    #[test]
    fn prop_one_list_per_rated_user(samples in random_samples()) {
        let (index, model) = fit(&samples, 3, 1);

        let rated: BTreeSet<usize> = samples.iter().map(|s| s.user).collect();
        let listed: BTreeSet<usize> = model.neighbor_lists().keys().copied().collect();
        prop_assert_eq!(rated, listed);
        prop_assert_eq!(model.num_users(), index.num_users());
    }

    #[test]
    fn prop_offer_keeps_stable_top_k(
        steps in prop::collection::vec(-4i32..=4, 0..40),
        k in 1usize..8
    ) {
        let mut list = NeighborList::new(k);
        for (user, &w) in steps.iter().enumerate() {
            list.offer(f64::from(w) / 4.0, user);
        }

        // stable sort keeps earlier offers ahead of later equal weights
        let mut expected: Vec<(f64, usize)> = steps
            .iter()
            .enumerate()
            .map(|(user, &w)| (f64::from(w) / 4.0, user))
            .collect();
        expected.sort_by(|a, b| b.0.total_cmp(&a.0));
        expected.truncate(k);

        let got: Vec<(f64, usize)> = list.iter().map(|n| (n.weight, n.user)).collect();
        prop_assert_eq!(got, expected);
    }
}

// ============================================================================
// Prediction Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_predictions_within_bounds(
        samples in random_samples(),
        k in 1usize..6,
        item in 0usize..14
    ) {
        let (_, model) = fit(&samples, k, 1);

        for &user in model.profiles().keys() {
            let p = model.predict(user, item).unwrap();
            prop_assert!((0.5..=5.0).contains(&p), "prediction {} out of bounds", p);
        }
    }

    #[test]
    fn prop_unrated_item_falls_back_to_average(samples in random_samples()) {
        let (_, model) = fit(&samples, 4, 0);

        for (&user, profile) in model.profiles() {
            // item 100 is outside the generated item range
            let p = model.predict(user, 100).unwrap();
            prop_assert!((p - profile.average()).abs() < 1e-12);
        }
    }
}

// ============================================================================
// Metric Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_rmse_of_identical_is_zero(values in prop::collection::vec(0.5..5.0f64, 1..50)) {
        prop_assert_eq!(rmse(&values, &values).unwrap(), 0.0);
    }

    #[test]
    fn prop_rmse_invariant_under_joint_permutation(
        pairs in prop::collection::vec((0.5..5.0f64, 0.5..5.0f64), 1..50)
    ) {
        let (p, t): (Vec<f64>, Vec<f64>) = pairs.iter().copied().unzip();
        let (rp, rt): (Vec<f64>, Vec<f64>) = pairs.iter().rev().copied().unzip();

        let forward = rmse(&p, &t).unwrap();
        let reversed = rmse(&rp, &rt).unwrap();
        prop_assert!((forward - reversed).abs() < 1e-9);
        prop_assert!(forward >= 0.0);
    }

    #[test]
    fn prop_rmse_symmetric_in_arguments(
        pairs in prop::collection::vec((0.5..5.0f64, 0.5..5.0f64), 1..50)
    ) {
        let (p, t): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        prop_assert_eq!(rmse(&p, &t).unwrap(), rmse(&t, &p).unwrap());
    }
}
