//! Player & Loader Settings
//!
//! This module defines the knobs that shape how clips are loaded and how an
//! [`AnimationPlayer`](crate::animation::AnimationPlayer) samples them.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use posekit::settings::{KeyLookup, PlayerSettings};
//!
//! // Default: 100 skinning slots, clamp late samples to the last segment
//! let settings = PlayerSettings::default();
//!
//! // Fail fast when a clip's duration outruns its keyframes
//! let settings = PlayerSettings {
//!     key_lookup: KeyLookup::Strict,
//!     ..Default::default()
//! };
//! ```

/// Default number of skinning matrix slots per player.
pub const DEFAULT_MAX_BONES: usize = 100;

/// Ticks per second assumed when an imported clip leaves the rate unspecified.
pub const DEFAULT_TICKS_PER_SECOND: f32 = 25.0;

// ---------------------------------------------------------------------------
// KeyLookup
// ---------------------------------------------------------------------------

/// What a multi-key track does when asked for a time at or past its final key.
///
/// The player wraps time into `[0, duration)` before sampling, so this only
/// matters for assets whose declared duration exceeds their keyframe extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyLookup {
    /// Fail with [`AnimationError::KeyTimeOutOfRange`](crate::errors::AnimationError::KeyTimeOutOfRange).
    Strict,
    /// Clamp to the last segment, which holds the final key's value.
    #[default]
    ClampToLastSegment,
}

// ---------------------------------------------------------------------------
// PlayerSettings
// ---------------------------------------------------------------------------

/// Per-player configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSettings {
    /// Number of slots in the skinning matrix buffer.
    ///
    /// Must be at least the number of bones registered for the skeleton,
    /// otherwise player construction fails.
    pub max_bones: usize,

    /// Late-sample policy for keyframe lookup.
    pub key_lookup: KeyLookup,
}

impl Default for PlayerSettings {
    #[inline]
    fn default() -> Self {
        Self {
            max_bones: DEFAULT_MAX_BONES,
            key_lookup: KeyLookup::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// LoadSettings
// ---------------------------------------------------------------------------

/// Options applied while building an [`AnimationLibrary`](crate::animation::AnimationLibrary).
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSettings {
    /// Replacement for a non-positive `ticks_per_second` in imported clips.
    pub default_ticks_per_second: f32,
}

impl Default for LoadSettings {
    #[inline]
    fn default() -> Self {
        Self {
            default_ticks_per_second: DEFAULT_TICKS_PER_SECOND,
        }
    }
}
