use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::animation::bone::Bone;
use crate::assets::ImportedClip;
use crate::errors::{AnimationError, Result};
use crate::scene::{BoneInfo, BoneRegistry};
use crate::settings::LoadSettings;

/// A named set of animated bones bound to a skeleton's [`BoneRegistry`].
///
/// Immutable after construction and shared between players through `Arc`.
#[derive(Debug)]
pub struct AnimationClip {
    name: String,
    /// Length in ticks.
    duration: f32,
    ticks_per_second: f32,
    bones: Vec<Bone>,
    bone_lookup: FxHashMap<String, usize>,
    registry: Arc<BoneRegistry>,
}

impl AnimationClip {
    /// Second phase of the two-phase load: binds imported channels to the
    /// already-final ids of `registry`.
    pub fn from_imported(
        imported: &ImportedClip,
        registry: &Arc<BoneRegistry>,
        settings: &LoadSettings,
    ) -> Result<Self> {
        let invalid = |reason: String| AnimationError::InvalidClip {
            clip: imported.name.clone(),
            reason,
        };

        if !imported.duration.is_finite() || imported.duration <= 0.0 {
            return Err(invalid(format!(
                "duration must be positive, got {}",
                imported.duration
            )));
        }

        let ticks_per_second =
            if imported.ticks_per_second.is_finite() && imported.ticks_per_second > 0.0 {
                imported.ticks_per_second
            } else {
                log::warn!(
                    "Clip '{}' has ticks_per_second {}; using {}",
                    imported.name,
                    imported.ticks_per_second,
                    settings.default_ticks_per_second
                );
                settings.default_ticks_per_second
            };

        let mut bones = Vec::with_capacity(imported.channels.len());
        let mut bone_lookup = FxHashMap::default();

        for channel in &imported.channels {
            if bone_lookup.contains_key(&channel.bone_name) {
                log::warn!(
                    "Clip '{}' has more than one channel for bone '{}'; keeping the first",
                    imported.name,
                    channel.bone_name
                );
                continue;
            }
            let info = registry.get(&channel.bone_name).ok_or_else(|| {
                invalid(format!(
                    "bone '{}' is missing from the skeleton registry",
                    channel.bone_name
                ))
            })?;
            bone_lookup.insert(channel.bone_name.clone(), bones.len());
            bones.push(Bone::from_channel(channel, info.id)?);
        }

        let clip = Self {
            name: imported.name.clone(),
            duration: imported.duration,
            ticks_per_second,
            bones,
            bone_lookup,
            registry: Arc::clone(registry),
        };

        let extent = clip.keyframe_extent();
        if (extent - clip.duration).abs() > f32::EPSILON * clip.duration.max(1.0) {
            log::debug!(
                "Clip '{}': keyframes end at {} ticks but duration is {}",
                clip.name,
                extent,
                clip.duration
            );
        }

        Ok(clip)
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Length in ticks.
    #[inline]
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    #[must_use]
    pub fn ticks_per_second(&self) -> f32 {
        self.ticks_per_second
    }

    /// Length in seconds at normal playback rate.
    #[inline]
    #[must_use]
    pub fn duration_seconds(&self) -> f32 {
        self.duration / self.ticks_per_second
    }

    /// Latest key time over all bones. Zero for a clip with no bones.
    #[must_use]
    pub fn keyframe_extent(&self) -> f32 {
        self.bones.iter().map(Bone::end_time).fold(0.0_f32, f32::max)
    }

    /// The bone animating `name`, if this clip moves that node at all.
    #[must_use]
    pub fn find_bone(&self, name: &str) -> Option<&Bone> {
        self.bone_index(name).map(|i| &self.bones[i])
    }

    #[must_use]
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bone_lookup.get(name).copied()
    }

    #[must_use]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Id and offset for `name` from the shared skeleton registry.
    #[must_use]
    pub fn bone_info(&self, name: &str) -> Option<&BoneInfo> {
        self.registry.get(name)
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<BoneRegistry> {
        &self.registry
    }

    /// Whether `registry` is the exact table this clip was bound to.
    #[must_use]
    pub fn uses_registry(&self, registry: &Arc<BoneRegistry>) -> bool {
        Arc::ptr_eq(&self.registry, registry)
    }
}
