//! Per-character animation player.
//!
//! An [`AnimationPlayer`] owns the mutable side of animation: up to two clip
//! playbacks with independent time cursors, and the skinning matrix buffer
//! handed to the renderer. The immutable side (hierarchy, bone registry,
//! clips) is shared through `Arc`.
//!
//! Frame flow:
//!
//! ```rust,ignore
//! player.advance(dt);
//! let matrices = player.evaluate(blend)?;
//! ```
//!
//! or, with a running crossfade, `player.update_and_evaluate(dt)?`.

use std::sync::Arc;

use glam::Mat4;

use crate::animation::action::ClipPlayback;
use crate::animation::clip::AnimationClip;
use crate::animation::crossfade::CrossFade;
use crate::animation::library::AnimationLibrary;
use crate::errors::{AnimationError, Result};
use crate::scene::{BoneInfo, BoneRegistry, SkeletonHierarchy, SkeletonNode};
use crate::settings::PlayerSettings;

/// Observable playback mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerMode {
    /// No clip; the output holds identity matrices.
    Idle,
    /// One clip drives the pose.
    SingleClip,
    /// Two clips are blended with a caller-supplied factor.
    DualClip,
}

#[derive(Debug, Default)]
enum PlaybackState {
    #[default]
    Idle,
    Single {
        primary: ClipPlayback,
    },
    Dual {
        primary: ClipPlayback,
        secondary: ClipPlayback,
        fade: Option<CrossFade>,
    },
}

#[derive(Debug)]
pub struct AnimationPlayer {
    hierarchy: Arc<SkeletonHierarchy>,
    registry: Arc<BoneRegistry>,
    settings: PlayerSettings,

    /// Registry entry of each hierarchy node, resolved once.
    node_slots: Vec<Option<BoneInfo>>,

    state: PlaybackState,

    // === Runtime Data ===
    /// Global transform of each node from the last evaluation.
    globals: Vec<Mat4>,
    /// Pose under construction; swapped into `globals` on success.
    scratch: Vec<Mat4>,
    /// Indexed by bone id; unused slots stay identity.
    skinning_matrices: Vec<Mat4>,
}

/// Walks the hierarchy in storage (depth-first pre-order) order, composing
/// `global = parent_global * local` into `globals`.
fn accumulate_globals<F>(
    hierarchy: &SkeletonHierarchy,
    globals: &mut [Mat4],
    mut local_of: F,
) -> Result<()>
where
    F: FnMut(usize, &SkeletonNode) -> Result<Mat4>,
{
    for (index, node) in hierarchy.iter() {
        let i = index.index();
        let parent_global = node.parent.map_or(Mat4::IDENTITY, |p| globals[p.index()]);
        globals[i] = parent_global * local_of(i, node)?;
    }
    Ok(())
}

impl AnimationPlayer {
    /// Creates an idle player for the skeleton of `library`.
    pub fn new(library: &AnimationLibrary, settings: PlayerSettings) -> Result<Self> {
        Self::with_skeleton(
            Arc::clone(library.hierarchy()),
            Arc::clone(library.registry()),
            settings,
        )
    }

    pub fn with_skeleton(
        hierarchy: Arc<SkeletonHierarchy>,
        registry: Arc<BoneRegistry>,
        settings: PlayerSettings,
    ) -> Result<Self> {
        if registry.len() > settings.max_bones {
            return Err(AnimationError::BoneCapacityExceeded {
                bones: registry.len(),
                capacity: settings.max_bones,
            });
        }

        let node_slots = hierarchy
            .iter()
            .map(|(_, node)| registry.get(&node.name).copied())
            .collect();

        Ok(Self {
            globals: vec![Mat4::IDENTITY; hierarchy.len()],
            scratch: vec![Mat4::IDENTITY; hierarchy.len()],
            skinning_matrices: vec![Mat4::IDENTITY; settings.max_bones],
            hierarchy,
            registry,
            settings,
            node_slots,
            state: PlaybackState::Idle,
        })
    }

    // ========================================================================
    // State transitions
    // ========================================================================

    fn bind(&self, clip: Arc<AnimationClip>) -> Result<ClipPlayback> {
        if !clip.uses_registry(&self.registry) {
            return Err(AnimationError::SkeletonMismatch {
                clip: clip.name().to_string(),
            });
        }
        Ok(ClipPlayback::new(clip, &self.hierarchy))
    }

    /// Plays `clip` alone from time zero, dropping any secondary clip.
    pub fn play(&mut self, clip: Arc<AnimationClip>) -> Result<()> {
        let primary = self.bind(clip)?;
        self.state = PlaybackState::Single { primary };
        Ok(())
    }

    /// Plays two clips for blending, both from time zero.
    pub fn play_blend(
        &mut self,
        primary: Arc<AnimationClip>,
        secondary: Arc<AnimationClip>,
    ) -> Result<()> {
        let primary = self.bind(primary)?;
        let secondary = self.bind(secondary)?;
        self.state = PlaybackState::Dual {
            primary,
            secondary,
            fade: None,
        };
        Ok(())
    }

    /// Adds (or replaces) the secondary clip at time zero without touching
    /// the primary clip or its time.
    pub fn start_secondary(&mut self, clip: Arc<AnimationClip>) -> Result<()> {
        if matches!(self.state, PlaybackState::Idle) {
            return Err(AnimationError::PlayerIdle);
        }
        let secondary = self.bind(clip)?;
        self.state = match std::mem::take(&mut self.state) {
            PlaybackState::Single { primary } | PlaybackState::Dual { primary, .. } => {
                PlaybackState::Dual {
                    primary,
                    secondary,
                    fade: None,
                }
            }
            PlaybackState::Idle => PlaybackState::Idle,
        };
        Ok(())
    }

    /// Drops the secondary clip. No-op unless two clips are playing.
    pub fn clear_secondary(&mut self) {
        self.state = match std::mem::take(&mut self.state) {
            PlaybackState::Dual { primary, .. } => PlaybackState::Single { primary },
            other => other,
        };
    }

    /// Exchanges primary and secondary, each keeping its elapsed time.
    pub fn swap_primary_secondary(&mut self) -> Result<()> {
        match std::mem::take(&mut self.state) {
            PlaybackState::Dual {
                primary, secondary, ..
            } => {
                self.state = PlaybackState::Dual {
                    primary: secondary,
                    secondary: primary,
                    fade: None,
                };
                Ok(())
            }
            other => {
                self.state = other;
                Err(AnimationError::NoSecondaryClip)
            }
        }
    }

    /// Returns to idle and resets the output to identity.
    pub fn stop(&mut self) {
        self.state = PlaybackState::Idle;
        self.skinning_matrices.fill(Mat4::IDENTITY);
    }

    /// Starts `clip` as secondary and fades it in over `seconds`.
    ///
    /// Drive the fade with [`update`](Self::update); once it completes the
    /// faded-in clip becomes the only clip, keeping its elapsed time.
    pub fn cross_fade(&mut self, clip: Arc<AnimationClip>, seconds: f32) -> Result<()> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(AnimationError::InvalidFade(seconds));
        }
        self.start_secondary(clip)?;
        if let PlaybackState::Dual { fade, .. } = &mut self.state {
            *fade = Some(CrossFade::new(seconds));
        }
        Ok(())
    }

    // ========================================================================
    // Per-frame
    // ========================================================================

    /// Advances every active clip by `dt` seconds. Each clip loops on its
    /// own duration; the two time cursors are never phase locked.
    pub fn advance(&mut self, dt: f32) {
        match &mut self.state {
            PlaybackState::Idle => {}
            PlaybackState::Single { primary } => primary.advance(dt),
            PlaybackState::Dual {
                primary, secondary, ..
            } => {
                primary.advance(dt);
                secondary.advance(dt);
            }
        }
    }

    /// [`advance`](Self::advance) plus crossfade progress. A finished fade
    /// promotes the secondary clip and drops the old primary.
    pub fn update(&mut self, dt: f32) {
        self.advance(dt);

        let finished = match &mut self.state {
            PlaybackState::Dual {
                fade: Some(fade), ..
            } => {
                fade.advance(dt);
                fade.is_finished()
            }
            _ => false,
        };

        if finished {
            self.state = match std::mem::take(&mut self.state) {
                PlaybackState::Dual { secondary, .. } => {
                    log::debug!("Crossfade to '{}' finished", secondary.clip().name());
                    PlaybackState::Single { primary: secondary }
                }
                other => other,
            };
        }
    }

    /// Blend factor implied by the running crossfade, `1.0` without one.
    #[must_use]
    pub fn current_blend_factor(&self) -> f32 {
        match &self.state {
            PlaybackState::Dual {
                fade: Some(fade), ..
            } => fade.primary_weight(),
            _ => 1.0,
        }
    }

    /// [`update`](Self::update) followed by [`evaluate`](Self::evaluate) with
    /// [`current_blend_factor`](Self::current_blend_factor).
    pub fn update_and_evaluate(&mut self, dt: f32) -> Result<&[Mat4]> {
        self.update(dt);
        let blend = self.current_blend_factor();
        self.evaluate(blend)
    }

    /// Poses the skeleton at the current time(s) and refreshes the skinning
    /// matrices.
    ///
    /// `blend_factor` weights the primary clip against the secondary one and
    /// must lie in `[0, 1]` when two clips are playing; it is ignored with a
    /// single clip. Fails while idle. On error the previous output is left
    /// untouched.
    pub fn evaluate(&mut self, blend_factor: f32) -> Result<&[Mat4]> {
        let lookup = self.settings.key_lookup;
        let hierarchy = &self.hierarchy;
        let globals = &mut self.scratch;

        match &mut self.state {
            PlaybackState::Idle => return Err(AnimationError::PlayerIdle),
            PlaybackState::Single { primary } => {
                accumulate_globals(hierarchy, globals, |index, node| {
                    let pose = primary.sample_node(index, &node.rest_pose, lookup)?;
                    Ok(pose.map_or(node.bind_transform, |p| p.to_matrix()))
                })?;
            }
            PlaybackState::Dual {
                primary, secondary, ..
            } => {
                if !(0.0..=1.0).contains(&blend_factor) {
                    return Err(AnimationError::BlendFactorOutOfRange(blend_factor));
                }
                accumulate_globals(hierarchy, globals, |index, node| {
                    let a = primary.sample_node(index, &node.rest_pose, lookup)?;
                    let b = secondary.sample_node(index, &node.rest_pose, lookup)?;
                    Ok(match (a, b) {
                        (Some(a), Some(b)) => b.blend(&a, blend_factor).to_matrix(),
                        (Some(only), None) | (None, Some(only)) => only.to_matrix(),
                        (None, None) => node.bind_transform,
                    })
                })?;
            }
        }

        std::mem::swap(&mut self.globals, &mut self.scratch);

        for (global, slot) in self.globals.iter().zip(&self.node_slots) {
            let Some(info) = slot else { continue };
            if let Some(matrix) = self.skinning_matrices.get_mut(info.id) {
                *matrix = info.skinning_matrix(*global);
            }
        }

        Ok(&self.skinning_matrices)
    }

    // ========================================================================
    // Getters
    // ========================================================================

    #[must_use]
    pub fn mode(&self) -> PlayerMode {
        match self.state {
            PlaybackState::Idle => PlayerMode::Idle,
            PlaybackState::Single { .. } => PlayerMode::SingleClip,
            PlaybackState::Dual { .. } => PlayerMode::DualClip,
        }
    }

    /// Whether the renderer should treat draws with this player as skinned.
    #[must_use]
    pub fn is_skinned(&self) -> bool {
        !matches!(self.state, PlaybackState::Idle)
    }

    #[must_use]
    pub fn primary(&self) -> Option<&ClipPlayback> {
        match &self.state {
            PlaybackState::Idle => None,
            PlaybackState::Single { primary } | PlaybackState::Dual { primary, .. } => {
                Some(primary)
            }
        }
    }

    #[must_use]
    pub fn secondary(&self) -> Option<&ClipPlayback> {
        match &self.state {
            PlaybackState::Dual { secondary, .. } => Some(secondary),
            _ => None,
        }
    }

    /// Primary clip time in ticks.
    #[must_use]
    pub fn primary_time(&self) -> Option<f32> {
        self.primary().map(ClipPlayback::time)
    }

    /// Secondary clip time in ticks.
    #[must_use]
    pub fn secondary_time(&self) -> Option<f32> {
        self.secondary().map(ClipPlayback::time)
    }

    #[must_use]
    pub fn crossfade(&self) -> Option<&CrossFade> {
        match &self.state {
            PlaybackState::Dual { fade, .. } => fade.as_ref(),
            _ => None,
        }
    }

    /// Final skinning matrices, indexed by bone id. Valid until the next
    /// [`evaluate`](Self::evaluate).
    #[inline]
    #[must_use]
    pub fn skinning_matrices(&self) -> &[Mat4] {
        &self.skinning_matrices
    }

    /// Global node transforms from the last evaluation, in hierarchy
    /// storage order.
    #[inline]
    #[must_use]
    pub fn global_transforms(&self) -> &[Mat4] {
        &self.globals
    }

    #[must_use]
    pub fn hierarchy(&self) -> &Arc<SkeletonHierarchy> {
        &self.hierarchy
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<BoneRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }
}
