use crate::animation::clip::AnimationClip;
use crate::scene::SkeletonHierarchy;

pub struct Binder;

impl Binder {
    /// Resolves a clip against a hierarchy once, so per-frame evaluation
    /// needs no name lookups.
    ///
    /// The result is indexed by node (storage order) and holds the index of
    /// the clip bone animating that node. Clip bones with no matching node
    /// are left out; they never reach the output.
    #[must_use]
    pub fn bind(hierarchy: &SkeletonHierarchy, clip: &AnimationClip) -> Vec<Option<usize>> {
        let bindings: Vec<Option<usize>> = hierarchy
            .iter()
            .map(|(_, node)| clip.bone_index(&node.name))
            .collect();

        if log::log_enabled!(log::Level::Debug) {
            for bone in clip.bones() {
                if hierarchy.find(bone.name()).is_none() {
                    log::debug!(
                        "Clip '{}': bone '{}' has no node in the hierarchy",
                        clip.name(),
                        bone.name()
                    );
                }
            }
        }

        bindings
    }
}
