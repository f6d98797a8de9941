use super::Vec3;

/// 4x4 matrix stored column-major, the layout map engines hand to custom
/// layers and the layout WGSL expects.
///
/// Element `(row, col)` lives at `cols[col * 4 + row]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    pub cols: [f64; 16],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        cols: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub const fn from_cols_array(cols: [f64; 16]) -> Self {
        Self { cols }
    }

    /// Builds a matrix from a column-major slice; `None` unless it holds exactly 16 values.
    pub fn from_cols_slice(values: &[f64]) -> Option<Self> {
        let cols: [f64; 16] = values.try_into().ok()?;
        Some(Self { cols })
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cols[col * 4 + row]
    }

    pub fn translation(t: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[12] = t.x;
        m.cols[13] = t.y;
        m.cols[14] = t.z;
        m
    }

    pub fn scale(s: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[0] = s.x;
        m.cols[5] = s.y;
        m.cols[10] = s.z;
        m
    }

    pub fn uniform_scale(s: f64) -> Self {
        Self::scale(Vec3::splat(s))
    }

    /// Right-handed rotation of `angle_rad` about a unit `axis`.
    pub fn rotation_axis(axis: Vec3, angle_rad: f64) -> Self {
        let (s, c) = angle_rad.sin_cos();
        let t = 1.0 - c;
        let Vec3 { x, y, z } = axis;
        let (tx, ty) = (t * x, t * y);

        Self::from_cols_array([
            tx * x + c,
            tx * y + s * z,
            tx * z - s * y,
            0.0,
            tx * y - s * z,
            ty * y + c,
            ty * z + s * x,
            0.0,
            tx * z + s * y,
            ty * z - s * x,
            t * z * z + c,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
        ])
    }

    pub fn rotation_x(angle_rad: f64) -> Self {
        Self::rotation_axis(Vec3::X, angle_rad)
    }

    pub fn rotation_y(angle_rad: f64) -> Self {
        Self::rotation_axis(Vec3::Y, angle_rad)
    }

    pub fn rotation_z(angle_rad: f64) -> Self {
        Self::rotation_axis(Vec3::Z, angle_rad)
    }

    /// Transforms a point with an implicit `w = 1`, ignoring the projective row.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let m = &self.cols;
        Vec3::new(
            m[0] * p.x + m[4] * p.y + m[8] * p.z + m[12],
            m[1] * p.x + m[5] * p.y + m[9] * p.z + m[13],
            m[2] * p.x + m[6] * p.y + m[10] * p.z + m[14],
        )
    }

    /// Transforms a point and applies the perspective divide.
    ///
    /// The divide is unconditional: points behind the eye come out mirrored,
    /// and `w == 0` yields non-finite coordinates.
    pub fn project_point(&self, p: Vec3) -> Vec3 {
        let m = &self.cols;
        let w = m[3] * p.x + m[7] * p.y + m[11] * p.z + m[15];
        let inv_w = 1.0 / w;
        self.transform_point(p) * inv_w
    }

    /// Transforms a direction (no translation).
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        let m = &self.cols;
        Vec3::new(
            m[0] * v.x + m[4] * v.y + m[8] * v.z,
            m[1] * v.x + m[5] * v.y + m[9] * v.z,
            m[2] * v.x + m[6] * v.y + m[10] * v.z,
        )
    }

    /// Column-major `f32` columns for GPU upload.
    pub fn to_f32_cols(&self) -> [[f32; 4]; 4] {
        let mut out = [[0.0f32; 4]; 4];
        for (col, out_col) in out.iter_mut().enumerate() {
            for (row, v) in out_col.iter_mut().enumerate() {
                *v = self.get(row, col) as f32;
            }
        }
        out
    }
}

impl std::ops::Mul for Mat4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        let mut out = [0.0f64; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = (0..4).map(|k| self.get(row, k) * rhs.get(k, col)).sum();
            }
        }
        Self::from_cols_array(out)
    }
}
