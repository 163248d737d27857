use crate::Vec3;

/// Orthonormal basis built around a w axis.
///
/// Used to express directions sampled in a canonical frame (z up) in the
/// frame of a surface normal.
#[derive(Debug, Copy, Clone)]
pub struct Onb {
    pub u: Vec3,
    pub v: Vec3,
    pub w: Vec3,
}

impl Onb {
    /// Build a basis whose w axis is `w` (need not be normalized).
    pub fn from_w(w: Vec3) -> Self {
        let w = w.normalize();
        let a = if w.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
        let v = w.cross(a).normalize();
        let u = w.cross(v);
        Self { u, v, w }
    }

    /// Transform a vector from basis coordinates to world coordinates.
    pub fn local(&self, a: Vec3) -> Vec3 {
        a.x * self.u + a.y * self.v + a.z * self.w
    }
}
