/// Time-based transition from the primary clip to the secondary clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossFade {
    /// Fade length in seconds.
    duration: f32,
    elapsed: f32,
}

impl CrossFade {
    /// `duration` must be positive and finite; callers validate.
    #[must_use]
    pub(crate) fn new(duration: f32) -> Self {
        Self {
            duration,
            elapsed: 0.0,
        }
    }

    pub(crate) fn advance(&mut self, dt: f32) {
        if !dt.is_finite() {
            return;
        }
        self.elapsed = (self.elapsed + dt).max(0.0);
    }

    /// Fade length in seconds.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Fraction of the fade completed, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Blend factor toward the primary clip.
    #[must_use]
    pub fn primary_weight(&self) -> f32 {
        1.0 - self.progress()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}
