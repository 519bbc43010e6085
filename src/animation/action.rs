use std::sync::Arc;

use crate::animation::binder::Binder;
use crate::animation::bone::BoneCursor;
use crate::animation::clip::AnimationClip;
use crate::errors::Result;
use crate::scene::{SkeletonHierarchy, Transform};
use crate::settings::KeyLookup;

/// Wraps `time` into `[0, duration)`.
#[inline]
#[must_use]
pub fn wrap_time(time: f32, duration: f32) -> f32 {
    let t = time.rem_euclid(duration);
    // rem_euclid can round up to `duration` for tiny negative inputs
    if t >= duration { 0.0 } else { t }
}

/// One clip being played: the clip, its own time cursor and its sampling
/// state.
#[derive(Debug, Clone)]
pub struct ClipPlayback {
    clip: Arc<AnimationClip>,
    /// Current time in ticks, always within `[0, duration)`.
    time: f32,
    /// Clip bone animating each hierarchy node.
    node_bones: Vec<Option<usize>>,
    /// One cursor set per clip bone.
    cursors: Vec<BoneCursor>,
}

impl ClipPlayback {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>, hierarchy: &SkeletonHierarchy) -> Self {
        let node_bones = Binder::bind(hierarchy, &clip);
        let cursors = vec![BoneCursor::default(); clip.bones().len()];
        Self {
            clip,
            time: 0.0,
            node_bones,
            cursors,
        }
    }

    #[inline]
    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    /// Current time in ticks.
    #[inline]
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advances by `dt` seconds at the clip's tick rate and loops. A
    /// non-finite `dt` is ignored.
    pub fn advance(&mut self, dt: f32) {
        if !dt.is_finite() {
            log::warn!(
                "Ignoring non-finite time step {dt} for clip '{}'",
                self.clip.name()
            );
            return;
        }
        let time = self.time + self.clip.ticks_per_second() * dt;
        self.time = wrap_time(time, self.clip.duration());
    }

    /// Local pose of hierarchy node `node` at the current time, or `None`
    /// when this clip does not animate it.
    pub fn sample_node(
        &mut self,
        node: usize,
        rest: &Transform,
        lookup: KeyLookup,
    ) -> Result<Option<Transform>> {
        let Some(bone_index) = self.node_bones.get(node).copied().flatten() else {
            return Ok(None);
        };
        let bone = &self.clip.bones()[bone_index];
        let cursor = &mut self.cursors[bone_index];
        bone.sample_with_cursor(self.time, rest, cursor, lookup)
            .map(Some)
    }
}
