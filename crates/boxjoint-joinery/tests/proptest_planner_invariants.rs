//! Property-based invariant tests for finger planning.
//!
//! 1. Counts without an override are odd and at least `min_fingers`.
//! 2. Widths are non-negative and sum to the edge length.
//! 3. Every length inside an odd count's window yields that count.
//! 4. Side B's tab mask is the complement of side A's.

use boxjoint_joinery::{plan, MateSide};
use proptest::prelude::*;

proptest! {
    #[test]
    fn count_is_odd_and_bounded(
        length in 0.5f64..2000.0,
        target in 1.0f64..60.0,
        min_fingers in 1u32..12,
    ) {
        let p = plan(length, target, min_fingers, None).unwrap();
        prop_assert_eq!(p.count % 2, 1, "even count {} for length {}", p.count, length);
        prop_assert!(p.count >= min_fingers);
        prop_assert_eq!(p.widths.len(), p.count as usize);
    }
}

proptest! {
    #[test]
    fn widths_partition_length(
        length in 0.5f64..2000.0,
        target in 1.0f64..60.0,
        explicit in proptest::option::of(1u32..40),
    ) {
        let p = plan(length, target, 3, explicit).unwrap();
        let sum: f64 = p.widths.iter().sum();
        prop_assert!((sum - length).abs() < 1e-6, "sum {} != length {}", sum, length);
        prop_assert!(p.widths.iter().all(|w| *w >= 0.0));
        if let Some(n) = explicit {
            prop_assert_eq!(p.count, n);
        }
    }
}

proptest! {
    #[test]
    fn count_stable_within_window(
        half in 2u32..40,
        target in 2.0f64..40.0,
        frac_a in 0.0f64..1.0,
        frac_b in 0.0f64..1.0,
    ) {
        // Odd n owns the lengths whose floor(length / target) is n - 1 or n.
        let n = 2 * half + 1;
        let lo = (n - 1) as f64 * target + 1e-6;
        let hi = (n + 1) as f64 * target - 1e-6;
        let a = lo + (hi - lo) * frac_a;
        let b = lo + (hi - lo) * frac_b;

        let pa = plan(a, target, 3, None).unwrap();
        let pb = plan(b, target, 3, None).unwrap();
        prop_assert_eq!(pa.count, n);
        prop_assert_eq!(pb.count, n);
    }
}

proptest! {
    #[test]
    fn side_masks_are_complementary(
        length in 1.0f64..1000.0,
        target in 1.0f64..50.0,
    ) {
        let p = plan(length, target, 3, None).unwrap();
        let a = p.tab_mask(MateSide::A);
        let b = p.tab_mask(MateSide::B);
        prop_assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            prop_assert_ne!(x, y);
        }
    }
}

#[test]
fn small_perturbations_keep_count() {
    let base = plan(100.0, 12.0, 3, None).unwrap();
    let longer = plan(100.2, 12.0, 3, None).unwrap();
    let shorter = plan(99.9, 12.0, 3, None).unwrap();
    assert_eq!(base.count, 9);
    assert_eq!(longer.count, 9);
    assert_eq!(shorter.count, 9);
}
