//! Tests for planar convex hulls

#[cfg(test)]
mod tests {
    use youngsim::math::hull::ConvexHull;

    // Tests interior points are dropped and vertices run counter-clockwise
    // Verified by keeping right turns in the chain
    #[test]
    fn test_square_hull() {
        let hull = ConvexHull::new(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.5, 0.5]]);
        assert_eq!(
            hull.vertices(),
            &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]
        );
        assert!((hull.area() - 1.0).abs() < 1e-12);
        assert!(!hull.is_degenerate());
    }

    // Tests containment for interior, boundary and exterior points
    // Verified by flipping the orientation test
    #[test]
    fn test_contains() {
        let hull = ConvexHull::new(&[[0.0, 0.0], [2.0, 0.0], [0.0, 2.0]]);
        assert!(hull.contains([0.5, 0.5], 1e-9));
        assert!(hull.contains([1.0, 1.0], 1e-9), "Boundary points are inside");
        assert!(hull.contains([0.0, 0.0], 1e-9));
        assert!(!hull.contains([1.5, 1.5], 1e-9));
        assert!(!hull.contains([-0.1, 0.5], 1e-9));
    }

    // Tests collinear and tiny inputs produce degenerate hulls that contain nothing
    // Verified by reporting area before removing collinear points
    #[test]
    fn test_degenerate_hulls() {
        let line = ConvexHull::new(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]]);
        assert!(line.is_degenerate());
        assert!(!line.contains([1.0, 0.0], 1e-9));

        let pair = ConvexHull::new(&[[0.0, 0.0], [1.0, 1.0], [1.0, 1.0]]);
        assert_eq!(pair.vertices().len(), 2);
        assert!(pair.area().abs() < f64::EPSILON);
    }
}
