//! Skeletal animation: keyframe tracks, bones, clips and the per-character
//! player that turns them into skinning matrices.

pub mod action;
pub mod binder;
pub mod bone;
pub mod clip;
pub mod crossfade;
pub mod library;
pub mod player;
pub mod tracks;
mod values;

pub use action::ClipPlayback;
pub use binder::Binder;
pub use bone::{Bone, BoneCursor};
pub use clip::AnimationClip;
pub use crossfade::CrossFade;
pub use library::AnimationLibrary;
pub use player::{AnimationPlayer, PlayerMode};
pub use tracks::{KeyframeCursor, KeyframeTrack, interpolation_factor};
pub use values::Interpolatable;
