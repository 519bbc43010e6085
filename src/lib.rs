//! posekit: skeletal animation evaluation core.
//!
//! Turns keyframe channels and a bone hierarchy into a per-frame array of
//! skinning matrices, optionally blending two clips that play on independent
//! timelines.
//!
//! ```rust,ignore
//! use posekit::{AnimationLibrary, AnimationPlayer, PlayerSettings};
//!
//! let library = AnimationLibrary::load(&imported)?;
//! let mut player = AnimationPlayer::new(&library, PlayerSettings::default())?;
//! player.play(library.clip("idle").unwrap())?;
//!
//! // every frame
//! player.advance(dt);
//! let matrices = player.evaluate(1.0)?;
//! ```

pub mod animation;
pub mod assets;
pub mod errors;
pub mod scene;
pub mod settings;

pub use animation::{
    AnimationClip, AnimationLibrary, AnimationPlayer, Bone, KeyframeTrack, PlayerMode,
};
pub use assets::{ImportedAsset, ImportedChannel, ImportedClip, ImportedNode, ImportedSkin};
pub use errors::{AnimationError, Result};
pub use scene::{BoneInfo, BoneRegistry, SkeletonHierarchy, Transform};
pub use settings::{KeyLookup, LoadSettings, PlayerSettings};
