//! Planar convex hulls for masking interpolated grids

/// Twice the signed area of triangle `(origin, a, b)`; positive for a left turn
fn cross(origin: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - origin[0]).mul_add(b[1] - origin[1], -((a[1] - origin[1]) * (b[0] - origin[0])))
}

/// Convex hull of a planar point set, vertices in counter-clockwise order
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexHull {
    vertices: Vec<[f64; 2]>,
}

impl ConvexHull {
    /// Build the hull with Andrew's monotone chain
    ///
    /// Collinear boundary points are dropped. Degenerate inputs produce hulls with
    /// fewer than three vertices.
    pub fn new(points: &[[f64; 2]]) -> Self {
        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));
        sorted.dedup();

        if sorted.len() < 3 {
            return Self { vertices: sorted };
        }

        let mut lower: Vec<[f64; 2]> = Vec::with_capacity(sorted.len());
        for &point in &sorted {
            Self::push_turning(&mut lower, point);
        }
        let mut upper: Vec<[f64; 2]> = Vec::with_capacity(sorted.len());
        for &point in sorted.iter().rev() {
            Self::push_turning(&mut upper, point);
        }

        // Each chain ends where the other begins
        lower.pop();
        upper.pop();
        lower.extend(upper);
        Self { vertices: lower }
    }

    fn push_turning(chain: &mut Vec<[f64; 2]>, point: [f64; 2]) {
        while let [.., a, b] = chain.as_slice() {
            if cross(*a, *b, point) > 0.0 {
                break;
            }
            chain.pop();
        }
        chain.push(point);
    }

    /// Hull vertices in counter-clockwise order
    pub fn vertices(&self) -> &[[f64; 2]] {
        &self.vertices
    }

    /// Enclosed area; zero for degenerate hulls
    pub fn area(&self) -> f64 {
        if self.vertices.len() < 3 {
            return 0.0;
        }
        let origin = self.vertices.first().copied().unwrap_or([0.0, 0.0]);
        self.vertices
            .windows(2)
            .skip(1)
            .map(|edge| match edge {
                [a, b] => cross(origin, *a, *b),
                _ => 0.0,
            })
            .sum::<f64>()
            / 2.0
    }

    /// Whether the hull encloses a region of positive area
    pub fn is_degenerate(&self) -> bool {
        self.area() <= f64::EPSILON
    }

    /// Whether a point lies inside or on the boundary, up to `tolerance`
    ///
    /// Degenerate hulls contain nothing.
    pub fn contains(&self, point: [f64; 2], tolerance: f64) -> bool {
        if self.is_degenerate() {
            return false;
        }
        let count = self.vertices.len();
        self.vertices.iter().enumerate().all(|(i, &a)| {
            let b = self.vertices.get((i + 1) % count).copied().unwrap_or(a);
            let edge_length = (b[0] - a[0]).hypot(b[1] - a[1]);
            cross(a, b, point) >= -tolerance * edge_length
        })
    }
}
