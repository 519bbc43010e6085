use glam::{Quat, Vec3};

/// Keyframes for one bone as delivered by the importer.
///
/// An empty list means the bone does not animate that property.
#[derive(Debug, Clone, Default)]
pub struct ImportedChannel {
    pub bone_name: String,
    pub positions: Vec<(f32, Vec3)>,
    pub rotations: Vec<(f32, Quat)>,
    pub scales: Vec<(f32, Vec3)>,
}

impl ImportedChannel {
    #[must_use]
    pub fn new(bone_name: impl Into<String>) -> Self {
        Self {
            bone_name: bone_name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_positions(mut self, keys: Vec<(f32, Vec3)>) -> Self {
        self.positions = keys;
        self
    }

    #[must_use]
    pub fn with_rotations(mut self, keys: Vec<(f32, Quat)>) -> Self {
        self.rotations = keys;
        self
    }

    #[must_use]
    pub fn with_scales(mut self, keys: Vec<(f32, Vec3)>) -> Self {
        self.scales = keys;
        self
    }
}

/// A clip as delivered by the importer. Times are in ticks.
#[derive(Debug, Clone)]
pub struct ImportedClip {
    pub name: String,
    pub duration: f32,
    pub ticks_per_second: f32,
    pub channels: Vec<ImportedChannel>,
}

impl ImportedClip {
    #[must_use]
    pub fn new(name: impl Into<String>, duration: f32, ticks_per_second: f32) -> Self {
        Self {
            name: name.into(),
            duration,
            ticks_per_second,
            channels: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_channel(mut self, channel: ImportedChannel) -> Self {
        self.channels.push(channel);
        self
    }
}
