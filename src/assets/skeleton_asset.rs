use glam::Mat4;

/// Imported node tree: the shape an importer hands over for a skeleton.
#[derive(Debug, Clone)]
pub struct ImportedNode {
    pub name: String,
    /// Local bind transform relative to the parent node.
    pub transform: Mat4,
    pub children: Vec<ImportedNode>,
}

impl ImportedNode {
    #[must_use]
    pub fn new(name: impl Into<String>, transform: Mat4) -> Self {
        Self {
            name: name.into(),
            transform,
            children: Vec::new(),
        }
    }

    /// Builder helper: appends a child and returns `self`.
    #[must_use]
    pub fn with_child(mut self, child: ImportedNode) -> Self {
        self.children.push(child);
        self
    }
}

/// One entry of a flattened skeleton, parents referenced by index.
#[derive(Debug, Clone)]
pub struct FlatNode {
    pub name: String,
    pub parent: Option<usize>,
    pub transform: Mat4,
}

/// Per-bone inverse bind matrices, in the importer's bone order.
#[derive(Debug, Clone, Default)]
pub struct ImportedSkin {
    pub bones: Vec<(String, Mat4)>,
}

impl ImportedSkin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_bone(mut self, name: impl Into<String>, inverse_bind: Mat4) -> Self {
        self.bones.push((name.into(), inverse_bind));
        self
    }
}
