use glam::{Mat4, Quat, Vec3};

/// Local TRS transform of a single skeleton node.
///
/// Composes as `T * R * S`: a point in the node's local space is scaled,
/// then rotated, then translated into the parent's space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Decomposes an affine matrix into TRS.
    ///
    /// Shear is lost; bind transforms from importers are expected to be
    /// free of it.
    #[must_use]
    pub fn from_matrix(mat: &Mat4) -> Self {
        let (scale, rotation, translation) = mat.to_scale_rotation_translation();
        Self {
            translation,
            rotation: rotation.normalize(),
            scale,
        }
    }

    /// Builds `translate * rotate * scale`.
    #[inline]
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Moves from `self` toward `target` by `weight`.
    ///
    /// Translation and scale are lerped componentwise, rotation is slerped
    /// and renormalized. `weight == 0` yields `self`, `weight == 1` yields
    /// `target`.
    #[must_use]
    pub fn blend(&self, target: &Self, weight: f32) -> Self {
        Self {
            translation: self.translation.lerp(target.translation, weight),
            rotation: self.rotation.slerp(target.rotation, weight).normalize(),
            scale: self.scale.lerp(target.scale, weight),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Transform> for Mat4 {
    fn from(t: Transform) -> Self {
        t.to_matrix()
    }
}
