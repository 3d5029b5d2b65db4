//! Tests for additive and multiplicative weighting

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use youngsim::spatial::{Cell, Dimension, WeightStrategy};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * b.abs().max(1.0)
    }

    // Tests the additive strategy sums shifted coordinates before raising to alpha
    // Verified by using the product in the additive branch
    #[test]
    fn test_additive_weight() {
        let strategy = WeightStrategy::Additive;
        assert!(close(strategy.weight(&Cell::new([0, 0]), 1.0), 2.0));
        assert!(close(strategy.weight(&Cell::new([2, 3]), 1.0), 7.0));
        assert!(close(strategy.weight(&Cell::new([2, 3]), 2.0), 49.0));
        assert!(close(strategy.weight(&Cell::new([1, 1, 1]), 0.5), 6.0_f64.sqrt()));
    }

    // Tests the multiplicative strategy multiplies shifted coordinates
    // Verified by using the sum in the multiplicative branch
    #[test]
    fn test_multiplicative_weight() {
        let strategy = WeightStrategy::Multiplicative;
        assert!(close(strategy.weight(&Cell::new([0, 0, 0]), 3.0), 1.0));
        assert!(close(strategy.weight(&Cell::new([1, 1, 1]), 1.0), 8.0));
        assert!(close(strategy.weight(&Cell::new([2, 3]), 1.0), 12.0));
    }

    // Tests log-weights agree with weights and stay finite once weights overflow
    // Verified by raising the base to alpha before taking the logarithm
    #[test]
    fn test_log_weight() {
        let cell = Cell::new([2, 3, 4]);
        for strategy in [WeightStrategy::Additive, WeightStrategy::Multiplicative] {
            assert!(close(
                strategy.log_weight(&cell, 1.5),
                strategy.weight(&cell, 1.5).ln()
            ));
        }

        let overflowing = WeightStrategy::Multiplicative;
        assert!(overflowing.weight(&cell, 200.0).is_infinite());
        let log_weight = overflowing.log_weight(&cell, 200.0);
        assert!(close(log_weight, 200.0 * 60.0_f64.ln()));
        assert!(log_weight.is_finite());
    }

    // Tests the default strategy per dimension and the names
    // Verified by swapping the defaults
    #[test]
    fn test_strategy_for_dimension() {
        assert_eq!(
            WeightStrategy::for_dimension(Dimension::Two),
            WeightStrategy::Additive
        );
        assert_eq!(
            WeightStrategy::for_dimension(Dimension::Three),
            WeightStrategy::Multiplicative
        );
        assert_eq!(WeightStrategy::Multiplicative.to_string(), "multiplicative");
    }

    proptest! {
        // Tests weights are finite, at least one, and non-decreasing along every axis
        // Verified by subtracting coordinates in the base
        #[test]
        fn test_weight_monotone_in_each_coordinate(
            x in 0u32..200,
            y in 0u32..200,
            z in 0u32..200,
            alpha in 0.01f64..4.0,
        ) {
            let cell = Cell::new([x, y, z]);
            for strategy in [WeightStrategy::Additive, WeightStrategy::Multiplicative] {
                let weight = strategy.weight(&cell, alpha);
                prop_assert!(weight.is_finite());
                prop_assert!(weight >= 1.0);
                for axis in 0..3 {
                    let next = cell.successor(axis).map(|c| strategy.weight(&c, alpha));
                    prop_assert!(next.is_some_and(|w| w >= weight));
                }
            }
        }
    }
}
