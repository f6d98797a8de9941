use crate::math::{Mat4, Vec2, Vec3};

/// Axis-aligned bounding boxes
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: Vec2,
    pub max: Vec2,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb2 {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Aabb2 { min, max }
    }

    /// Rectangle spanned by two arbitrary corners, whichever way round they are.
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Aabb2 {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Inclusive containment test. Non-finite rectangles contain nothing.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

impl Aabb3 {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Aabb3 { min, max }
    }

    /// Inverted box that any point expands.
    pub fn empty() -> Self {
        Aabb3 {
            min: Vec3::splat(f64::INFINITY),
            max: Vec3::splat(f64::NEG_INFINITY),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut b = Self::empty();
        for p in points {
            b.expand(p);
        }
        b
    }

    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    pub fn expand(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Box enclosing all eight corners after an affine transform.
    pub fn transformed(&self, m: &Mat4) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self::from_points(self.corners().into_iter().map(|c| m.transform_point(c)))
    }
}

#[cfg(test)]
mod tests {
    use super::{Aabb2, Aabb3};
    use crate::math::{Mat4, Vec2, Vec3};

    #[test]
    fn corners_in_any_order_make_the_same_rect() {
        let a = Aabb2::from_corners(Vec2::new(10.0, 2.0), Vec2::new(4.0, 8.0));
        assert_eq!(a, Aabb2::new(Vec2::new(4.0, 2.0), Vec2::new(10.0, 8.0)));
        assert!(a.contains(Vec2::new(4.0, 8.0)));
        assert!(!a.contains(Vec2::new(3.9, 5.0)));
    }

    #[test]
    fn nan_rect_contains_nothing() {
        let a = Aabb2::from_corners(Vec2::new(f64::NAN, 0.0), Vec2::new(f64::NAN, 1.0));
        assert!(!a.contains(Vec2::new(0.0, 0.5)));
    }

    #[test]
    fn from_points_and_empty() {
        assert!(Aabb3::empty().is_empty());
        let b = Aabb3::from_points([Vec3::new(1.0, -1.0, 0.0), Vec3::new(-2.0, 3.0, 0.5)]);
        assert_eq!(b.min, Vec3::new(-2.0, -1.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, 3.0, 0.5));
    }

    #[test]
    fn transformed_encloses_scaled_and_moved_box() {
        let b = Aabb3::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let m = Mat4::translation(Vec3::new(5.0, 0.0, 0.0)) * Mat4::uniform_scale(2.0);
        let t = b.transformed(&m);
        assert_eq!(t.min, Vec3::new(3.0, -2.0, -2.0));
        assert_eq!(t.max, Vec3::new(7.0, 2.0, 2.0));
    }
}
