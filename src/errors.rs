//! Error Types
//!
//! This module defines the error type used throughout the animation core.
//!
//! # Overview
//!
//! [`AnimationError`] covers two families of failure:
//! - Load errors: malformed or missing asset data. Loading of that asset is
//!   aborted and the error is surfaced to the caller.
//! - Precondition violations: caller misuse of an [`AnimationPlayer`]
//!   (blend factor out of range, evaluating while idle, mixing skeletons).
//!   These fail immediately and leave the player untouched.
//!
//! Degenerate keyframe data (two keys sharing a timestamp) is not an error;
//! it is resolved locally during sampling.
//!
//! # Usage
//!
//! ```rust,ignore
//! use posekit::errors::{AnimationError, Result};
//!
//! fn load() -> Result<()> {
//!     Ok(())
//! }
//! ```
//!
//! [`AnimationPlayer`]: crate::animation::AnimationPlayer

use thiserror::Error;

/// Which property of a bone a keyframe channel drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Translation,
    Rotation,
    Scale,
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Translation => "translation",
            Self::Rotation => "rotation",
            Self::Scale => "scale",
        };
        f.write_str(name)
    }
}

/// The error type for the animation core.
#[derive(Error, Debug)]
pub enum AnimationError {
    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// A keyframe track was constructed without any keys.
    #[error("Keyframe track is empty")]
    EmptyTrack,

    /// A keyframe track has a different number of timestamps and values.
    #[error("Keyframe track has {times} timestamps but {values} values")]
    TrackLengthMismatch {
        /// Number of timestamps
        times: usize,
        /// Number of values
        values: usize,
    },

    /// A bone channel could not be built.
    #[error("Invalid {channel} channel for bone '{bone}': {source}")]
    InvalidChannel {
        /// Name of the animated bone
        bone: String,
        /// The offending channel
        channel: ChannelKind,
        /// Underlying track error
        #[source]
        source: Box<AnimationError>,
    },

    /// The skeleton hierarchy has no root node.
    #[error("Skeleton hierarchy has no root node")]
    MissingRoot,

    /// The skeleton hierarchy has more than one root node.
    #[error("Skeleton hierarchy has {count} root nodes, expected exactly one")]
    MultipleRoots {
        /// Number of parentless nodes found
        count: usize,
    },

    /// A node refers to a parent index that does not exist.
    #[error("Node '{node}' refers to missing parent index {parent}")]
    InvalidParent {
        /// Name of the node
        node: String,
        /// The invalid parent index
        parent: usize,
    },

    /// The skeleton hierarchy contains a cycle or unreachable nodes.
    #[error("Skeleton hierarchy is not a tree: node '{node}' is unreachable from the root")]
    CyclicHierarchy {
        /// A node that is not reachable from the root
        node: String,
    },

    /// Clip-level metadata is unusable.
    #[error("Invalid animation clip '{clip}': {reason}")]
    InvalidClip {
        /// Name of the clip
        clip: String,
        /// What is wrong with it
        reason: String,
    },

    /// Two clips in one library share a name.
    #[error("Duplicate animation clip name: {0}")]
    DuplicateClip(String),

    /// The skeleton registers more bones than a player can hold.
    #[error("Skeleton registers {bones} bones but the player holds at most {capacity}")]
    BoneCapacityExceeded {
        /// Number of registered bones
        bones: usize,
        /// Capacity of the skinning matrix buffer
        capacity: usize,
    },

    // ========================================================================
    // Precondition Violations
    // ========================================================================
    /// Blend factor outside `[0, 1]` (or NaN).
    #[error("Blend factor {0} is outside [0, 1]")]
    BlendFactorOutOfRange(f32),

    /// The player has no clip to play from.
    #[error("Animation player is idle")]
    PlayerIdle,

    /// A dual-clip operation was requested without a secondary clip.
    #[error("Animation player has no secondary clip")]
    NoSecondaryClip,

    /// A clip built for another skeleton was handed to a player.
    #[error("Clip '{clip}' does not share this player's skeleton")]
    SkeletonMismatch {
        /// Name of the rejected clip
        clip: String,
    },

    /// Crossfade length must be positive and finite.
    #[error("Invalid crossfade duration: {0}")]
    InvalidFade(f32),

    /// Strict key lookup was asked for a time at or past the final key.
    #[error("Sample time {time} is at or beyond the final key at {last}")]
    KeyTimeOutOfRange {
        /// Requested time
        time: f32,
        /// Timestamp of the final key
        last: f32,
    },
}

impl AnimationError {
    /// Returns `true` for malformed or missing asset data.
    #[must_use]
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyTrack
                | Self::TrackLengthMismatch { .. }
                | Self::InvalidChannel { .. }
                | Self::MissingRoot
                | Self::MultipleRoots { .. }
                | Self::InvalidParent { .. }
                | Self::CyclicHierarchy { .. }
                | Self::InvalidClip { .. }
                | Self::DuplicateClip(_)
                | Self::BoneCapacityExceeded { .. }
        )
    }

    /// Returns `true` for caller contract violations.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        !self.is_load_error()
    }
}

/// Alias for `Result<T, AnimationError>`.
pub type Result<T> = std::result::Result<T, AnimationError>;
