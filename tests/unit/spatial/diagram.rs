//! Tests for order-ideal diagrams and their incremental frontier

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use std::collections::BTreeSet;
    use youngsim::GrowthError;
    use youngsim::spatial::diagram::Insertion;
    use youngsim::spatial::{Cell, LatticeDiagram, WeightStrategy};

    fn frontier_set<const D: usize>(diagram: &LatticeDiagram<D>) -> BTreeSet<Cell<D>> {
        diagram.frontier().copied().collect()
    }

    // Tests an origin-only diagram has exactly the unit vectors as frontier
    // Verified by also admitting the diagonal neighbor
    #[test]
    fn test_origin_frontier_is_unit_vectors() {
        let planar = LatticeDiagram::<2>::new(WeightStrategy::Additive);
        assert_eq!(
            frontier_set(&planar),
            BTreeSet::from([Cell::new([0, 1]), Cell::new([1, 0])])
        );

        let solid = LatticeDiagram::<3>::new(WeightStrategy::Multiplicative);
        assert_eq!(solid.frontier_len(), 3);
        assert_eq!(frontier_set(&solid), solid.addable_cells());
        assert_eq!(solid.len(), 1);
        assert_eq!(solid.initial_size(), 1);
    }

    // Tests the insertion record reports the vacated slot and appended cells
    // Verified by appending successors without the predecessor check
    #[test]
    fn test_add_cell_reports_frontier_edits() {
        let mut diagram = LatticeDiagram::<2>::new(WeightStrategy::Additive);
        assert_eq!(diagram.frontier_cell(1), Some(&Cell::new([1, 0])));

        let insertion = diagram.add_cell(Cell::new([1, 0])).ok();
        assert_eq!(
            insertion,
            Some(Insertion {
                vacated: 1,
                appended: vec![Cell::new([2, 0])],
            })
        );

        let insertion = diagram.add_cell(Cell::new([0, 1])).ok();
        assert_eq!(
            insertion.map(|i| i.appended),
            Some(vec![Cell::new([1, 1]), Cell::new([0, 2])])
        );
        assert_eq!(frontier_set(&diagram), diagram.addable_cells());
        assert_eq!(
            diagram.inserted().copied().collect::<Vec<_>>(),
            vec![Cell::new([1, 0]), Cell::new([0, 1])]
        );
    }

    // Tests non-addable insertions fail and leave the diagram untouched
    // Verified by inserting without checking the frontier
    #[test]
    fn test_add_cell_rejects_non_addable_cells() {
        let mut diagram = LatticeDiagram::<2>::new(WeightStrategy::Additive);

        let gap = diagram.add_cell(Cell::new([1, 1]));
        assert!(matches!(gap, Err(GrowthError::InvariantViolation { .. })));

        let present = diagram.add_cell(Cell::origin());
        assert!(matches!(
            present,
            Err(GrowthError::InvariantViolation { ref reason, .. }) if reason.contains("already")
        ));

        assert_eq!(diagram.len(), 1);
        assert_eq!(diagram.frontier_len(), 2);
        assert!(diagram.is_order_ideal());
    }

    // Tests initial sets must be non-empty and closed under decrease
    // Verified by skipping the predecessor scan
    #[test]
    fn test_from_cells_validates_order_ideal() {
        let empty = LatticeDiagram::<2>::from_cells(Vec::new(), WeightStrategy::Additive);
        assert!(matches!(
            empty,
            Err(GrowthError::InvalidConfiguration { .. })
        ));

        let missing = LatticeDiagram::from_cells(
            [Cell::new([0, 0]), Cell::new([0, 2])],
            WeightStrategy::Additive,
        );
        assert!(matches!(
            missing,
            Err(GrowthError::InvalidConfiguration { ref reason, .. }) if reason.contains("(0, 1)")
        ));

        let valid = LatticeDiagram::from_cells(
            [
                Cell::new([0, 0]),
                Cell::new([1, 0]),
                Cell::new([0, 1]),
                Cell::new([0, 1]),
            ],
            WeightStrategy::Additive,
        );
        assert_eq!(valid.as_ref().map(LatticeDiagram::len).ok(), Some(3));
        assert_eq!(valid.map(|d| d.initial_size()).ok(), Some(3));
    }

    // Tests frontier order does not depend on the order initial cells are listed in
    // Verified by building the frontier in caller order
    #[test]
    fn test_from_cells_is_order_independent() {
        let cells = [
            Cell::new([0, 0, 0]),
            Cell::new([1, 0, 0]),
            Cell::new([0, 1, 0]),
            Cell::new([0, 0, 1]),
        ];
        let forward = LatticeDiagram::from_cells(cells, WeightStrategy::Multiplicative)
            .expect("Failed to build diagram");
        let reversed = LatticeDiagram::from_cells(
            cells.iter().rev().copied(),
            WeightStrategy::Multiplicative,
        )
        .expect("Failed to build diagram");

        assert_eq!(
            forward.frontier().collect::<Vec<_>>(),
            reversed.frontier().collect::<Vec<_>>()
        );
        assert_eq!(forward.sorted_cells(), reversed.sorted_cells());
    }

    // Tests weights come from the diagram's strategy
    // Verified by ignoring the configured strategy
    #[test]
    fn test_weight_uses_strategy() {
        let additive = LatticeDiagram::<2>::new(WeightStrategy::Additive);
        let multiplicative = LatticeDiagram::<2>::new(WeightStrategy::Multiplicative);
        let cell = Cell::new([1, 2]);
        assert!((additive.weight(&cell, 1.0) - 5.0).abs() < 1e-12);
        assert!((multiplicative.weight(&cell, 1.0) - 6.0).abs() < 1e-12);
        assert!(additive.is_addable(&Cell::new([1, 0])));
        assert!(!additive.is_addable(&cell));
    }

    proptest! {
        // Tests any sequence of frontier insertions keeps the order ideal and the frontier exact
        // Verified by omitting the predecessor check for appended cells
        #[test]
        fn test_random_insertions_preserve_invariant(choices in prop::collection::vec(0usize..64, 0..60)) {
            let mut diagram = LatticeDiagram::<3>::new(WeightStrategy::Multiplicative);
            for (step, choice) in choices.iter().enumerate() {
                let slot = choice % diagram.frontier_len();
                let cell = *diagram.frontier_cell(slot).expect("Slot is in range");
                prop_assert!(diagram.add_cell(cell).is_ok());
                prop_assert_eq!(diagram.len(), step + 2);
                prop_assert!(diagram.is_order_ideal());
                prop_assert_eq!(frontier_set(&diagram), diagram.addable_cells());
            }
        }
    }
}
