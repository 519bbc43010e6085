use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::animation::clip::AnimationClip;
use crate::assets::{ImportedAsset, ImportedClip, ImportedSkin};
use crate::errors::{AnimationError, Result};
use crate::scene::{BoneRegistry, BoneRegistryBuilder, SkeletonHierarchy};
use crate::settings::LoadSettings;

/// Load-once animation data of one character asset.
///
/// Everything inside is immutable and reference counted, so one library can
/// feed any number of players, on any number of threads, once loading has
/// finished.
#[derive(Debug, Clone)]
pub struct AnimationLibrary {
    hierarchy: Arc<SkeletonHierarchy>,
    registry: Arc<BoneRegistry>,
    clips: Vec<Arc<AnimationClip>>,
    by_name: FxHashMap<String, usize>,
}

impl AnimationLibrary {
    pub fn load(asset: &ImportedAsset) -> Result<Self> {
        Self::load_with(asset, &LoadSettings::default())
    }

    pub fn load_with(asset: &ImportedAsset, settings: &LoadSettings) -> Result<Self> {
        let hierarchy = SkeletonHierarchy::from_imported(&asset.root);
        Self::from_parts(hierarchy, &asset.skin, &asset.clips, settings)
    }

    /// Builds a library around an already constructed hierarchy (for
    /// instance one created with [`SkeletonHierarchy::from_flat`]).
    pub fn from_parts(
        hierarchy: SkeletonHierarchy,
        skin: &ImportedSkin,
        clips: &[ImportedClip],
        settings: &LoadSettings,
    ) -> Result<Self> {
        // Phase one: every bone name of the skeleton gets its final id
        let mut builder = BoneRegistryBuilder::new();
        builder.add_skin(skin);
        for clip in clips {
            builder.add_clip(clip);
        }
        let registry = builder.build();

        // Phase two: bind clips to the finished registry
        let mut loaded = Vec::with_capacity(clips.len());
        let mut by_name = FxHashMap::default();
        for imported in clips {
            if by_name.contains_key(&imported.name) {
                return Err(AnimationError::DuplicateClip(imported.name.clone()));
            }
            let clip = AnimationClip::from_imported(imported, &registry, settings)?;
            by_name.insert(imported.name.clone(), loaded.len());
            loaded.push(Arc::new(clip));
        }

        log::info!(
            "Loaded animation library: {} nodes, {} bones, {} clips",
            hierarchy.len(),
            registry.len(),
            loaded.len()
        );

        Ok(Self {
            hierarchy: Arc::new(hierarchy),
            registry,
            clips: loaded,
            by_name,
        })
    }

    #[must_use]
    pub fn hierarchy(&self) -> &Arc<SkeletonHierarchy> {
        &self.hierarchy
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<BoneRegistry> {
        &self.registry
    }

    /// Shared handle to the clip called `name`.
    #[must_use]
    pub fn clip(&self, name: &str) -> Option<Arc<AnimationClip>> {
        self.by_name.get(name).map(|&i| Arc::clone(&self.clips[i]))
    }

    /// Clips in load order.
    pub fn clips(&self) -> impl Iterator<Item = &Arc<AnimationClip>> {
        self.clips.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}
