use glam::{Quat, Vec3};

/// Values a keyframe track can interpolate between.
pub trait Interpolatable: Copy + Sized {
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self;

    /// Hook applied to every sampled value, including single-key tracks.
    #[inline]
    fn finalize(self) -> Self {
        self
    }
}

impl Interpolatable for f32 {
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        start + (end - start) * t
    }
}

impl Interpolatable for Vec3 {
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        start.lerp(*end, t)
    }
}

impl Interpolatable for Quat {
    /// Spherical interpolation along the shorter arc.
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        start.slerp(*end, t)
    }

    /// Renormalizes to keep floating-point drift off the unit sphere.
    #[inline]
    fn finalize(self) -> Self {
        self.normalize()
    }
}
