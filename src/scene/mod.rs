//! Skeleton data shared by every clip and player of one character:
//! - Transform: local TRS pose of a node
//! - SkeletonHierarchy: arena-owned bone tree
//! - BoneRegistry: bone name -> (id, inverse bind matrix)

pub mod hierarchy;
pub mod skeleton;
pub mod transform;

pub use hierarchy::{NodeIndex, SkeletonHierarchy, SkeletonNode};
pub use skeleton::{BoneInfo, BoneRegistry, BoneRegistryBuilder};
pub use transform::Transform;
