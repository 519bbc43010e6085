use glam::{Mat4, Quat, Vec3};

use crate::animation::tracks::{KeyframeCursor, KeyframeTrack};
use crate::animation::values::Interpolatable;
use crate::assets::ImportedChannel;
use crate::errors::{AnimationError, ChannelKind, Result};
use crate::scene::Transform;
use crate::settings::KeyLookup;

/// Per-channel search cursors for one bone.
#[derive(Debug, Clone, Default)]
pub struct BoneCursor {
    pub translation: KeyframeCursor,
    pub rotation: KeyframeCursor,
    pub scale: KeyframeCursor,
}

/// Keyframe channels of one skeleton node within a clip.
///
/// Each channel is optional and independently keyed. A missing channel
/// means the clip does not animate that property.
#[derive(Debug, Clone)]
pub struct Bone {
    name: String,
    id: usize,
    translation: Option<KeyframeTrack<Vec3>>,
    rotation: Option<KeyframeTrack<Quat>>,
    scale: Option<KeyframeTrack<Vec3>>,
}

fn build_channel<T: Interpolatable>(
    bone: &str,
    channel: ChannelKind,
    keys: &[(f32, T)],
) -> Result<Option<KeyframeTrack<T>>> {
    if keys.is_empty() {
        return Ok(None);
    }
    KeyframeTrack::from_keys(keys)
        .map(Some)
        .map_err(|source| AnimationError::InvalidChannel {
            bone: bone.to_string(),
            channel,
            source: Box::new(source),
        })
}

fn sample_channel<T: Interpolatable>(
    track: Option<&KeyframeTrack<T>>,
    time: f32,
    cursor: Option<&mut KeyframeCursor>,
    fallback: T,
    lookup: KeyLookup,
) -> Result<T> {
    match (track, cursor) {
        (None, _) => Ok(fallback),
        (Some(track), Some(cursor)) => track.sample_with_cursor(time, cursor, lookup),
        (Some(track), None) => track.sample(time, lookup),
    }
}

impl Bone {
    pub fn new(
        name: impl Into<String>,
        id: usize,
        translation: Option<KeyframeTrack<Vec3>>,
        rotation: Option<KeyframeTrack<Quat>>,
        scale: Option<KeyframeTrack<Vec3>>,
    ) -> Self {
        Self {
            name: name.into(),
            id,
            translation,
            rotation,
            scale,
        }
    }

    /// Builds a bone from importer keys. Empty key lists become absent
    /// channels.
    pub fn from_channel(channel: &ImportedChannel, id: usize) -> Result<Self> {
        let name = channel.bone_name.as_str();
        Ok(Self::new(
            name,
            id,
            build_channel(name, ChannelKind::Translation, &channel.positions)?,
            build_channel(name, ChannelKind::Rotation, &channel.rotations)?,
            build_channel(name, ChannelKind::Scale, &channel.scales)?,
        ))
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    #[must_use]
    pub fn translation(&self) -> Option<&KeyframeTrack<Vec3>> {
        self.translation.as_ref()
    }

    #[must_use]
    pub fn rotation(&self) -> Option<&KeyframeTrack<Quat>> {
        self.rotation.as_ref()
    }

    #[must_use]
    pub fn scale(&self) -> Option<&KeyframeTrack<Vec3>> {
        self.scale.as_ref()
    }

    /// Latest key time over all present channels.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        [
            self.translation.as_ref().map(KeyframeTrack::end_time),
            self.rotation.as_ref().map(KeyframeTrack::end_time),
            self.scale.as_ref().map(KeyframeTrack::end_time),
        ]
        .into_iter()
        .flatten()
        .fold(0.0_f32, f32::max)
    }

    /// Local TRS at `time`; channels this bone does not animate are taken
    /// from `rest`.
    pub fn sample(&self, time: f32, rest: &Transform, lookup: KeyLookup) -> Result<Transform> {
        let translation =
            sample_channel(self.translation.as_ref(), time, None, rest.translation, lookup)?;
        let rotation = sample_channel(self.rotation.as_ref(), time, None, rest.rotation, lookup)?;
        let scale = sample_channel(self.scale.as_ref(), time, None, rest.scale, lookup)?;
        Ok(Transform::new(translation, rotation, scale))
    }

    /// Same as [`sample`](Self::sample), searching keys from `cursor`.
    pub fn sample_with_cursor(
        &self,
        time: f32,
        rest: &Transform,
        cursor: &mut BoneCursor,
        lookup: KeyLookup,
    ) -> Result<Transform> {
        Ok(Transform {
            translation: sample_channel(
                self.translation.as_ref(),
                time,
                Some(&mut cursor.translation),
                rest.translation,
                lookup,
            )?,
            rotation: sample_channel(
                self.rotation.as_ref(),
                time,
                Some(&mut cursor.rotation),
                rest.rotation,
                lookup,
            )?,
            scale: sample_channel(
                self.scale.as_ref(),
                time,
                Some(&mut cursor.scale),
                rest.scale,
                lookup,
            )?,
        })
    }

    /// Local transform matrix `T * R * S` at `time`. Missing channels
    /// contribute identity.
    pub fn evaluate(&self, time: f32, lookup: KeyLookup) -> Result<Mat4> {
        Ok(self.sample(time, &Transform::IDENTITY, lookup)?.to_matrix())
    }
}
