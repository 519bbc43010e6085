//! Importer-facing data model.
//!
//! Plain data an asset importer produces for one character: the skeleton
//! tree, the inverse bind matrices and the keyframe channels of every clip.
//! Nothing here parses files; [`AnimationLibrary::load`] turns an
//! [`ImportedAsset`] into shareable runtime data.
//!
//! [`AnimationLibrary::load`]: crate::animation::AnimationLibrary::load

pub mod clip_asset;
pub mod skeleton_asset;

pub use clip_asset::{ImportedChannel, ImportedClip};
pub use skeleton_asset::{FlatNode, ImportedNode, ImportedSkin};

/// Everything needed to build an animation library for one character.
#[derive(Debug, Clone)]
pub struct ImportedAsset {
    pub root: ImportedNode,
    pub skin: ImportedSkin,
    pub clips: Vec<ImportedClip>,
}
