//! Tests for multi-run accumulation

#[cfg(test)]
mod tests {
    use youngsim::GrowthError;
    use youngsim::algorithm::accumulator::Accumulator;
    use youngsim::algorithm::executor::CancellationToken;
    use youngsim::algorithm::observer::{GrowthObserver, GrowthSnapshot};
    use youngsim::io::configuration::{GrowthParameters, SimulationConfig};
    use youngsim::spatial::{Cell, WeightStrategy};

    /// Cancels once a given run reaches a given step
    struct CancelAt {
        token: CancellationToken,
        run: usize,
        step: usize,
    }

    impl GrowthObserver<2> for CancelAt {
        fn on_step(&self, snapshot: &GrowthSnapshot<'_, 2>) {
            if snapshot.run == self.run && snapshot.step >= self.step {
                self.token.cancel();
            }
        }
    }

    fn parameters<const D: usize>(n_steps: i64, runs: i64, seed: u64) -> GrowthParameters<D> {
        GrowthParameters::new(n_steps, 1.0, runs)
            .expect("Failed to validate parameters")
            .with_seed(seed)
    }

    // Tests counts are unavailable before any accumulation
    // Verified by returning an empty tally instead of an error
    #[test]
    fn test_no_data_before_simulate() {
        let accumulator = Accumulator::<2>::new();
        assert!(matches!(
            accumulator.get_counts(),
            Err(GrowthError::NoDataAvailable { .. })
        ));
        assert!(accumulator.json_data().is_err());
    }

    // Tests the summed counts equal the summed final sizes and the origin is in every run
    // Verified by counting insertions instead of final cells
    #[test]
    fn test_counts_conserve_cells() {
        let mut accumulator = Accumulator::<2>::new();
        let report = accumulator
            .simulate(&parameters(40, 12, 3))
            .expect("Failed to accumulate");
        assert_eq!(report.completed_runs, 12);
        assert_eq!(report.recorded_runs(), 12);
        assert_eq!(report.total_cells, 12 * 41);

        let counts = accumulator.get_counts().expect("Counts should exist");
        assert_eq!(counts.runs(), 12);
        assert_eq!(counts.total(), 12 * 41);
        assert_eq!(counts.count(&Cell::origin()), 12);
        assert!(counts.iter().all(|(_, count)| (1..=12).contains(&count)));
    }

    // Tests a seeded accumulation is reproducible
    // Verified by deriving run seeds from entropy
    #[test]
    fn test_seeded_accumulation_is_deterministic() {
        let mut first = Accumulator::<3>::new();
        let mut second = Accumulator::<3>::new();
        first.simulate(&parameters(30, 6, 17)).expect("Failed to accumulate");
        second.simulate(&parameters(30, 6, 17)).expect("Failed to accumulate");
        assert_eq!(first.get_counts().ok(), second.get_counts().ok());
    }

    // Tests results do not depend on the worker count
    // Verified by seeding runs from the worker index
    #[test]
    fn test_thread_count_does_not_change_counts() {
        let mut single = Accumulator::<2>::new().with_threads(1);
        let mut several = Accumulator::<2>::new().with_threads(4);
        single.simulate(&parameters(25, 9, 5)).expect("Failed to accumulate");
        several.simulate(&parameters(25, 9, 5)).expect("Failed to accumulate");
        assert_eq!(single.get_counts().ok(), several.get_counts().ok());
    }

    // Tests each accumulation replaces the previous counts
    // Verified by merging into the existing tally
    #[test]
    fn test_simulate_replaces_counts() {
        let mut accumulator = Accumulator::<2>::new();
        accumulator.simulate(&parameters(10, 5, 1)).expect("Failed to accumulate");
        accumulator.simulate(&parameters(10, 3, 2)).expect("Failed to accumulate");
        let counts = accumulator.get_counts().expect("Counts should exist");
        assert_eq!(counts.runs(), 3);
        assert_eq!(counts.total(), 33);

        accumulator.reset();
        assert!(accumulator.get_counts().is_err());
    }

    // Tests invalid configurations fail before touching existing counts
    // Verified by resetting before validation
    #[test]
    fn test_invalid_config_keeps_previous_counts() {
        let mut accumulator = Accumulator::<2>::new();
        accumulator.simulate(&parameters(10, 4, 9)).expect("Failed to accumulate");

        let invalid = SimulationConfig {
            runs: 0,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            accumulator.simulate_config(&invalid),
            Err(GrowthError::InvalidConfiguration { .. })
        ));
        assert_eq!(accumulator.get_counts().map(|c| c.runs()).ok(), Some(4));

        let wrong_dimension = SimulationConfig {
            dimension: 3,
            ..SimulationConfig::default()
        };
        assert!(accumulator.simulate_config(&wrong_dimension).is_err());
    }

    // Tests configurations drive weighting, seed and initial cells
    // Verified by ignoring the configured initial cells
    #[test]
    fn test_simulate_config() {
        let config = SimulationConfig {
            dimension: 2,
            n_steps: 5,
            alpha: 2.0,
            runs: 3,
            initial_cells: Some(vec![vec![0, 0], vec![1, 0], vec![2, 0]]),
            seed: Some(8),
            weighting: Some(WeightStrategy::Multiplicative),
        };
        let mut accumulator = Accumulator::<2>::new();
        let report = accumulator.simulate_config(&config).expect("Failed to accumulate");
        assert_eq!(report.total_cells, 3 * 8);

        let counts = accumulator.get_counts().expect("Counts should exist");
        assert_eq!(counts.count(&Cell::new([2, 0])), 3);
    }

    // Tests cancelled runs are reported but not counted
    // Verified by recording cancelled diagrams
    #[test]
    fn test_cancelled_runs_are_not_counted() {
        let mut accumulator = Accumulator::<2>::new();
        accumulator.cancellation_token().cancel();
        let report = accumulator
            .simulate(&parameters(50, 4, 2))
            .expect("Failed to accumulate");
        assert_eq!(report.cancelled_runs, 4);
        assert_eq!(report.recorded_runs(), 0);
        assert!(matches!(
            accumulator.get_counts(),
            Err(GrowthError::NoDataAvailable { .. })
        ));
    }

    // Tests cancelling a partly grown run keeps finished runs and drops the partial diagram
    // Verified by recording cancelled runs' diagrams
    #[test]
    fn test_cancellation_mid_run_drops_partial_diagram() {
        let token = CancellationToken::new();
        let observer = CancelAt {
            token: token.clone(),
            run: 1,
            step: 20,
        };
        let mut accumulator = Accumulator::<2>::new()
            .with_threads(1)
            .with_cancellation(token.clone());
        let report = accumulator
            .simulate_observed(&parameters(50, 4, 2), &observer)
            .expect("Failed to accumulate");

        assert!(accumulator.cancellation_token().is_cancelled());
        assert_eq!(report.completed_runs, 1);
        assert_eq!(report.cancelled_runs, 3);
        assert_eq!(report.total_cells, 51);

        let counts = accumulator.get_counts().expect("Counts should exist");
        assert_eq!(counts.total(), report.total_cells);
        assert_eq!(counts.total() % 51, 0);
        assert_eq!(counts.runs(), 1);
        assert_eq!(counts.count(&Cell::origin()), 1);
    }

    // Tests zero-step runs record only the initial diagram
    // Verified by skipping runs with no insertions
    #[test]
    fn test_zero_steps_counts_initial_diagram() {
        let mut accumulator = Accumulator::<3>::new();
        accumulator.simulate(&parameters(0, 7, 4)).expect("Failed to accumulate");
        let counts = accumulator.get_counts().expect("Counts should exist");
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.count(&Cell::origin()), 7);

        let report = accumulator.json_data().expect("Failed to build report");
        assert_eq!(report.runs, 7);
        assert_eq!(report.dimensions.max_z, Some(1));
    }
}
