use proptest::prelude::*;

use agent::sizing::{trade_amount, MAX_BALANCE_FRACTION, MIN_TRADE_AMOUNT};

proptest! {
    /// The stake clamp holds for any confidence on any balance large
    /// enough that the floor and cap do not cross ($1 = 5% of $20).
    #[test]
    fn stake_stays_inside_the_clamp(
        balance in 20.0f64..1_000_000.0f64,
        confidence in 0.0f64..1.0f64,
    ) {
        let amount = trade_amount(balance, confidence);
        prop_assert!(amount >= MIN_TRADE_AMOUNT.min(balance));
        prop_assert!(amount <= balance * MAX_BALANCE_FRACTION + 1e-9);
    }

    /// More confidence never means a smaller stake.
    #[test]
    fn stake_is_monotone_in_confidence(
        balance in 20.0f64..1_000_000.0f64,
        c1 in 0.0f64..1.0f64,
        c2 in 0.0f64..1.0f64,
    ) {
        let (lo, hi) = if c1 <= c2 { (c1, c2) } else { (c2, c1) };
        prop_assert!(trade_amount(balance, lo) <= trade_amount(balance, hi) + 1e-9);
    }

    /// Sizing never panics on degenerate balances.
    #[test]
    fn stake_never_panics(
        balance in 0.0f64..1_000_000.0f64,
        confidence in 0.0f64..1.0f64,
    ) {
        let amount = trade_amount(balance, confidence);
        prop_assert!(amount.is_finite());
        prop_assert!(amount >= 0.0);
    }
}
