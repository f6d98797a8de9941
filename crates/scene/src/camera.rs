use foundation::math::{Mat4, MercatorCoordinate, Vec3};

/// Camera described entirely by matrices.
///
/// The overlay keeps two of these: the render camera, whose projection is the
/// full host view matrix composed with the model placement, and a picking
/// camera that mirrors it and is only used to project points to the screen.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Camera {
    pub projection: Mat4,
    pub world: Mat4,
    pub world_inverse: Mat4,
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies projection and world transforms from `other`.
    pub fn mirror_from(&mut self, other: &Camera) {
        self.projection = other.projection;
        self.world = other.world;
        self.world_inverse = other.world_inverse;
    }

    /// Combined transform from scene space to clip space.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.world_inverse
    }

    /// Projects a scene-space point to normalized device coordinates.
    pub fn project(&self, p: Vec3) -> Vec3 {
        self.projection.project_point(self.world_inverse.transform_point(p))
    }
}

/// Placement of the model in mercator space: translate to the anchor, then
/// rotate about X, Y and Z (applied to the model in Z, Y, X order).
pub fn model_transform(anchor: MercatorCoordinate, rotate_rad: [f64; 3]) -> Mat4 {
    Mat4::translation(anchor.as_vec3())
        * Mat4::rotation_x(rotate_rad[0])
        * Mat4::rotation_y(rotate_rad[1])
        * Mat4::rotation_z(rotate_rad[2])
}

#[cfg(test)]
mod tests {
    use super::{Camera, model_transform};
    use foundation::math::{Mat4, MercatorCoordinate, Vec3};
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn default_camera_projects_identity() {
        let cam = Camera::new();
        assert_eq!(cam.project(Vec3::new(0.25, -0.5, 0.1)), Vec3::new(0.25, -0.5, 0.1));
    }

    #[test]
    fn mirror_copies_all_matrices() {
        let mut src = Camera::new();
        src.projection = Mat4::uniform_scale(3.0);
        src.world = Mat4::translation(Vec3::new(1.0, 0.0, 0.0));
        src.world_inverse = Mat4::translation(Vec3::new(-1.0, 0.0, 0.0));

        let mut dst = Camera::new();
        dst.mirror_from(&src);
        assert_eq!(dst, src);
        assert_eq!(dst.project(Vec3::new(1.0, 1.0, 0.0)), Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn model_transform_rotates_before_translating() {
        let anchor = MercatorCoordinate::new(0.5, 0.25, 0.0);
        let m = model_transform(anchor, [FRAC_PI_2, 0.0, 0.0]);
        let p = m.transform_point(Vec3::Y);
        assert!((p.x - 0.5).abs() < 1e-12);
        assert!((p.y - 0.25).abs() < 1e-12);
        assert!((p.z - 1.0).abs() < 1e-12);
    }
}
