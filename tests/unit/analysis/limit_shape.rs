//! Tests for limit-shape estimation

#[cfg(test)]
mod tests {
    use youngsim::GrowthError;
    use youngsim::analysis::counts::AccumulatedCounts;
    use youngsim::analysis::limit_shape::LimitShapeEstimator;
    use youngsim::spatial::Cell;

    fn planar(cells: &[[u32; 2]]) -> AccumulatedCounts<2> {
        AccumulatedCounts::from_entries(cells.iter().map(|&c| (Cell::new(c), 1)), 1)
    }

    fn solid(cells: &[[u32; 3]]) -> AccumulatedCounts<3> {
        AccumulatedCounts::from_entries(cells.iter().map(|&c| (Cell::new(c), 1)), 1)
    }

    fn cube() -> AccumulatedCounts<3> {
        let mut cells = Vec::new();
        for x in 0..2 {
            for y in 0..2 {
                for z in 0..2 {
                    cells.push([x, y, z]);
                }
            }
        }
        solid(&cells)
    }

    // Tests scaling uses the largest coordinate sum to the power 1/D
    // Verified by using the cell count as the size
    #[test]
    fn test_scaling_factor() {
        let estimator = LimitShapeEstimator::new();
        let counts = planar(&[[0, 0], [1, 0], [0, 1], [1, 1], [4, 0]]);
        let scaling = estimator.scaling_factor(&counts).expect("Failed to scale");
        assert!((scaling - 2.0).abs() < 1e-12);

        let origin = solid(&[[0, 0, 0]]);
        let scaling = estimator.scaling_factor(&origin).expect("Failed to scale");
        assert!((scaling - 1.0).abs() < 1e-12);

        let fixed = estimator.with_scaling(2.5).expect("Failed to set scaling");
        assert!((fixed.scaling_factor(&origin).unwrap_or(0.0) - 2.5).abs() < 1e-12);

        assert!(matches!(
            estimator.scaling_factor(&AccumulatedCounts::<2>::new()),
            Err(GrowthError::NoDataAvailable { .. })
        ));
    }

    // Tests estimator options are validated
    // Verified by accepting a single grid point
    #[test]
    fn test_estimator_options() {
        let estimator = LimitShapeEstimator::new();
        assert!(estimator.with_scaling(0.0).is_err());
        assert!(estimator.with_scaling(f64::NAN).is_err());
        assert!(estimator.with_resolution(1).is_err());
        assert!(estimator.with_resolution(2).is_ok());
    }

    // Tests a fully counted square interpolates to a constant defined everywhere
    // Verified by masking with the lattice bounding box shrunk by one cell
    #[test]
    fn test_full_square() {
        let counts = planar(&[
            [0, 0],
            [1, 0],
            [2, 0],
            [0, 1],
            [1, 1],
            [2, 1],
            [0, 2],
            [1, 2],
            [2, 2],
        ]);
        let shape = LimitShapeEstimator::new()
            .with_resolution(5)
            .and_then(|estimator| estimator.estimate_2d(&counts))
            .expect("Failed to estimate");

        assert!((shape.scaling - 2.0).abs() < 1e-12);
        assert_eq!(shape.values.dim(), (5, 5));
        assert_eq!(shape.defined_count(), 25);
        assert!((shape.grid_x.last().copied().unwrap_or(0.0) - 1.0).abs() < 1e-12);
        for i in 0..5 {
            for j in 0..5 {
                let value = shape.value(i, j).unwrap_or(f64::NAN);
                assert!((value - 1.0).abs() < 1e-9, "Expected 1 at ({i}, {j}), got {value}");
            }
        }
    }

    // Tests grid points outside the counted hull stay undefined
    // Verified by defining every grid point
    #[test]
    fn test_outside_hull_is_undefined() {
        let counts = planar(&[[0, 0], [1, 0], [0, 1]]);
        let shape = LimitShapeEstimator::new()
            .with_resolution(3)
            .and_then(|estimator| estimator.estimate_2d(&counts))
            .expect("Failed to estimate");

        assert_eq!(shape.value(2, 2), None);
        assert!(shape.value(1, 1).is_some(), "Hull boundary is inside");
        assert!((shape.value(0, 0).unwrap_or(0.0) - 1.0).abs() < 1e-9);
        assert!(
            shape
                .values
                .iter()
                .flatten()
                .all(|v| (0.0..=1.0).contains(v))
        );
        assert_eq!(shape.defined_count(), 6);
    }

    // Tests planar estimation needs enough spread-out samples
    // Verified by skipping the per-axis knot check
    #[test]
    fn test_planar_insufficient_samples() {
        let estimator = LimitShapeEstimator::new();
        assert!(matches!(
            estimator.estimate_2d(&AccumulatedCounts::new()),
            Err(GrowthError::NoDataAvailable { .. })
        ));
        assert!(matches!(
            estimator.estimate_2d(&planar(&[[0, 0], [1, 0]])),
            Err(GrowthError::InsufficientSamples { required: 3, available: 2, .. })
        ));
        assert!(matches!(
            estimator.estimate_2d(&planar(&[[0, 0], [1, 0], [2, 0]])),
            Err(GrowthError::InsufficientSamples { required: 2, available: 1, .. })
        ));
    }

    // Tests the padded density volume falls to zero past the counted cells
    // Verified by removing the empty padding layer
    #[test]
    fn test_density_volume_is_padded() {
        let volume = LimitShapeEstimator::new()
            .with_resolution(3)
            .and_then(|estimator| estimator.density_3d(&cube()))
            .expect("Failed to estimate");

        assert_eq!(volume.values.dim(), (3, 3, 3));
        assert!((volume.values[[0, 0, 0]] - 1.0).abs() < 1e-9);
        assert!(volume.values[[2, 2, 2]].abs() < 1e-9);
        assert!(volume.values.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    // Tests a counted cube yields a closed surface inside the padded lattice
    // Verified by extracting at level zero
    #[test]
    fn test_solid_isosurface() {
        let surface = LimitShapeEstimator::new()
            .with_resolution(9)
            .and_then(|estimator| estimator.estimate_3d(&cube(), 0.5))
            .expect("Failed to estimate");

        assert!(!surface.faces.is_empty());
        assert!((surface.level - 0.5).abs() < f64::EPSILON);
        let bound = 2.0 / surface.scaling;
        assert!(
            surface
                .vertices
                .iter()
                .flatten()
                .all(|&c| (0.0..=bound + 1e-9).contains(&c))
        );
        assert!(
            surface
                .faces
                .iter()
                .flatten()
                .all(|&i| i < surface.vertices.len())
        );
    }

    // Tests solid estimation rejects bad levels and sparse counts
    // Verified by accepting a level of one
    #[test]
    fn test_solid_errors() {
        let estimator = LimitShapeEstimator::new();
        for level in [0.0, 1.0, -0.5, f64::NAN] {
            assert!(matches!(
                estimator.estimate_3d(&cube(), level),
                Err(GrowthError::InvalidConfiguration { .. })
            ));
        }
        assert!(matches!(
            estimator.estimate_3d(&solid(&[[0, 0, 0], [1, 0, 0], [0, 1, 0]]), 0.5),
            Err(GrowthError::InsufficientSamples { required: 4, .. })
        ));
        assert!(matches!(
            estimator.density_3d(&AccumulatedCounts::new()),
            Err(GrowthError::NoDataAvailable { .. })
        ));
    }
}
