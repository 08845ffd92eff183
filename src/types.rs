use nalgebra::Vector3;

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox3 {
    pub min: Vector3<f64>,
    pub max: Vector3<f64>,
}

impl BBox3 {
    pub fn new(min: Vector3<f64>, max: Vector3<f64>) -> Self { Self { min, max } }
    pub fn center(&self) -> Vector3<f64> { (self.min + self.max) * 0.5 }
    pub fn size(&self) -> Vector3<f64> { self.max - self.min }
    pub fn contains(&self, p: Vector3<f64>) -> bool {
        p.x >= self.min.x && p.x <= self.max.x &&
        p.y >= self.min.y && p.y <= self.max.y &&
        p.z >= self.min.z && p.z <= self.max.z
    }

    /// Smallest box enclosing every point, or `None` for an empty slice.
    pub fn from_points(points: &[Vector3<f64>]) -> Option<Self> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min = min.inf(p);
            max = max.sup(p);
        }
        Some(Self { min, max })
    }

    /// Smallest box enclosing both boxes.
    pub fn merge(&self, other: &BBox3) -> BBox3 {
        BBox3::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Overlap of both boxes. May be inverted (empty) if they are disjoint.
    pub fn intersect(&self, other: &BBox3) -> BBox3 {
        BBox3::new(self.min.sup(&other.min), self.max.inf(&other.max))
    }

    /// Grow the box by `amount` on every side.
    pub fn expand(&self, amount: f64) -> BBox3 {
        let ext = Vector3::new(amount, amount, amount);
        BBox3::new(self.min - ext, self.max + ext)
    }

    /// `true` when the box has zero or negative extent along some axis.
    pub fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y || self.min.z >= self.max.z
    }

    /// The 8 corners, bottom face (z = min) first, counter-clockwise.
    pub fn corners(&self) -> [Vector3<f64>; 8] {
        let (mn, mx) = (self.min, self.max);
        [
            Vector3::new(mn.x, mn.y, mn.z),
            Vector3::new(mx.x, mn.y, mn.z),
            Vector3::new(mx.x, mx.y, mn.z),
            Vector3::new(mn.x, mx.y, mn.z),
            Vector3::new(mn.x, mn.y, mx.z),
            Vector3::new(mx.x, mn.y, mx.z),
            Vector3::new(mx.x, mx.y, mx.z),
            Vector3::new(mn.x, mx.y, mx.z),
        ]
    }
}
