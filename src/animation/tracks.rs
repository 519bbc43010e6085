use crate::animation::values::Interpolatable;
use crate::errors::{AnimationError, Result};
use crate::settings::KeyLookup;

const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the last segment a track was sampled in.
///
/// Pure acceleration state: sampling with a cursor always returns the same
/// value as sampling without one.
#[derive(Debug, Clone, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Interpolation factor of `time` inside the segment `[t0, t1]`, clamped to
/// `[0, 1]`.
///
/// A zero-length (or inverted) segment comes from duplicated timestamps; it
/// snaps to the later key instead of dividing by zero.
#[inline]
#[must_use]
pub fn interpolation_factor(time: f32, t0: f32, t1: f32) -> f32 {
    let dt = t1 - t0;
    if dt > 0.0 {
        ((time - t0) / dt).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Ordered `(time, value)` samples of one animated property.
///
/// Times are in clip ticks and assumed strictly increasing.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    times: Vec<f32>,
    values: Vec<T>,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    pub fn new(times: Vec<f32>, values: Vec<T>) -> Result<Self> {
        if times.len() != values.len() {
            return Err(AnimationError::TrackLengthMismatch {
                times: times.len(),
                values: values.len(),
            });
        }
        if times.is_empty() {
            return Err(AnimationError::EmptyTrack);
        }
        Ok(Self { times, values })
    }

    /// Builds a track from importer-style `(time, value)` pairs.
    pub fn from_keys(keys: &[(f32, T)]) -> Result<Self> {
        let (times, values): (Vec<f32>, Vec<T>) = keys.iter().copied().unzip();
        Self::new(times, values)
    }

    #[inline]
    #[must_use]
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    #[inline]
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always `false`: construction rejects empty tracks.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Timestamp of the final key.
    #[inline]
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times[self.times.len() - 1]
    }

    /// Index of the segment `[i, i + 1]` to interpolate in for `time`: the
    /// last key with `times[i] <= time`.
    ///
    /// Times before the first key use segment 0. Times at or past the final
    /// key are handled according to `lookup`. Single-key tracks always
    /// return 0.
    pub fn bracket(&self, time: f32, lookup: KeyLookup) -> Result<usize> {
        if self.times.len() == 1 {
            return Ok(0);
        }
        let next_idx = self.times.partition_point(|&t| t <= time);
        self.resolve_segment(next_idx.saturating_sub(1), time, lookup)
    }

    /// Stateless sample at `time`.
    pub fn sample(&self, time: f32, lookup: KeyLookup) -> Result<T> {
        if self.times.len() == 1 {
            return Ok(self.values[0].finalize());
        }
        let segment = self.bracket(time, lookup)?;
        Ok(self.interpolate_segment(segment, time))
    }

    /// Sample at `time`, starting the key search from `cursor`.
    ///
    /// Sequential playback stays within a few segments of the previous
    /// sample, so a short linear scan around the cursor usually hits. Large
    /// jumps (scrubbing, loop wrap) fall back to binary search.
    pub fn sample_with_cursor(
        &self,
        time: f32,
        cursor: &mut KeyframeCursor,
        lookup: KeyLookup,
    ) -> Result<T> {
        let len = self.times.len();
        if len == 1 {
            return Ok(self.values[0].finalize());
        }
        let last = len - 1;

        // Cursor may be stale (e.g. left over from a longer track)
        let i = cursor.last_index.min(last - 1);

        let found = if time >= self.times[i] {
            // Forward: time >= times[idx] holds for every idx visited
            (i..=(i + MAX_SCAN_OFFSET).min(last))
                .find(|&idx| idx == last || time < self.times[idx + 1])
        } else {
            // Backward: time < times[idx + 1] holds for every idx visited
            (i.saturating_sub(MAX_SCAN_OFFSET)..i)
                .rev()
                .find(|&idx| time >= self.times[idx])
        };

        let index = found.unwrap_or_else(|| {
            self.times
                .partition_point(|&t| t <= time)
                .saturating_sub(1)
        });

        let segment = self.resolve_segment(index, time, lookup)?;
        cursor.last_index = segment;
        Ok(self.interpolate_segment(segment, time))
    }

    fn resolve_segment(&self, index: usize, time: f32, lookup: KeyLookup) -> Result<usize> {
        let last = self.times.len() - 1;
        if index < last {
            return Ok(index);
        }
        match lookup {
            KeyLookup::Strict => Err(AnimationError::KeyTimeOutOfRange {
                time,
                last: self.times[last],
            }),
            KeyLookup::ClampToLastSegment => Ok(last - 1),
        }
    }

    fn interpolate_segment(&self, index: usize, time: f32) -> T {
        let next_idx = index + 1;
        let t = interpolation_factor(time, self.times[index], self.times[next_idx]);
        T::interpolate_linear(&self.values[index], &self.values[next_idx], t).finalize()
    }
}
