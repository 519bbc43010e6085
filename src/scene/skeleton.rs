use std::sync::Arc;

use glam::Mat4;
use rustc_hash::FxHashMap;

use crate::assets::{ImportedClip, ImportedSkin};

/// Global id and inverse bind matrix of one bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneInfo {
    /// Slot in the skinning matrix buffer. Shared by every clip of a skeleton.
    pub id: usize,
    /// Inverse bind matrix: bind/model space -> bone local space.
    pub offset: Mat4,
}

impl BoneInfo {
    /// Final skinning matrix for a bone whose current global pose is `global`.
    ///
    /// Order matters: the offset takes a bind-space vertex into bone space
    /// first, then the posed global transform takes it back out.
    #[inline]
    #[must_use]
    pub fn skinning_matrix(&self, global: Mat4) -> Mat4 {
        global * self.offset
    }
}

/// Final bone-name -> [`BoneInfo`] table of one skeleton.
///
/// Built once through [`BoneRegistryBuilder`] before any clip is bound, so
/// ids never depend on the order in which clips are later used.
#[derive(Debug, Default)]
pub struct BoneRegistry {
    bones: FxHashMap<String, BoneInfo>,
    names: Vec<String>,
}

impl BoneRegistry {
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BoneInfo> {
        self.bones.get(name)
    }

    /// Number of registered bones. Ids are `0..len()`.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Bone name for an id.
    #[must_use]
    pub fn name(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// `(name, info)` pairs ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoneInfo)> {
        self.names
            .iter()
            .filter_map(|name| self.bones.get(name).map(|info| (name.as_str(), info)))
    }
}

/// First phase of the two-phase load: collects every bone name of a
/// skeleton and assigns ids in first-seen order.
#[derive(Debug, Default)]
pub struct BoneRegistryBuilder {
    registry: BoneRegistry,
}

impl BoneRegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a bone, returning its id. A name seen before keeps its
    /// original id and offset.
    pub fn register(&mut self, name: &str, offset: Mat4) -> usize {
        if let Some(info) = self.registry.bones.get(name) {
            return info.id;
        }
        let id = self.registry.names.len();
        self.registry.names.push(name.to_string());
        self.registry
            .bones
            .insert(name.to_string(), BoneInfo { id, offset });
        id
    }

    /// Registers every skinned bone with its inverse bind matrix.
    pub fn add_skin(&mut self, skin: &ImportedSkin) -> &mut Self {
        for (name, offset) in &skin.bones {
            if self.registry.bones.contains_key(name) {
                log::warn!("Skin lists bone '{name}' more than once; keeping the first offset");
            }
            self.register(name, *offset);
        }
        self
    }

    /// Registers every animated channel of a clip. Bones the skin does not
    /// know get an identity offset.
    pub fn add_clip(&mut self, clip: &ImportedClip) -> &mut Self {
        for channel in &clip.channels {
            if !self.registry.bones.contains_key(&channel.bone_name) {
                log::debug!(
                    "Clip '{}' animates unskinned bone '{}'",
                    clip.name,
                    channel.bone_name
                );
            }
            self.register(&channel.bone_name, Mat4::IDENTITY);
        }
        self
    }

    #[must_use]
    pub fn build(self) -> Arc<BoneRegistry> {
        Arc::new(self.registry)
    }
}
