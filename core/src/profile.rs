//! Per-rope burn profiles derived from relative segment densities.

use thiserror::Error;

/// Errors raised while normalizing segment weights into a [`BurnProfile`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ProfileError {
    /// No segment weights were supplied.
    #[error("burn profile requires at least one segment weight")]
    Empty,
    /// The reference duration was zero, negative, or not finite.
    #[error("reference duration must be a positive finite number of minutes, got {0}")]
    InvalidReference(f64),
    /// A segment weight was negative or not finite.
    #[error("segment weight {index} must be a non-negative finite number, got {value}")]
    InvalidWeight {
        /// Position of the offending weight.
        index: usize,
        /// Value that was rejected.
        value: f64,
    },
}

/// Ordered per-segment burn times of a single rope, in minutes.
///
/// Each entry is the time one burning end needs to consume that segment when it
/// is the only flame on its side. Profiles are immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct BurnProfile {
    segment_minutes: Vec<f64>,
}

impl BurnProfile {
    /// Scales raw density weights so one end burns the whole rope in `reference_minutes`.
    ///
    /// A weight vector summing to zero is returned unchanged rather than
    /// rejected; such a rope burns out instantly once lit.
    pub fn normalize(weights: &[f64], reference_minutes: f64) -> Result<Self, ProfileError> {
        if weights.is_empty() {
            return Err(ProfileError::Empty);
        }
        if !reference_minutes.is_finite() || reference_minutes <= 0.0 {
            return Err(ProfileError::InvalidReference(reference_minutes));
        }
        if let Some((index, &value)) = weights
            .iter()
            .enumerate()
            .find(|(_, weight)| !weight.is_finite() || **weight < 0.0)
        {
            return Err(ProfileError::InvalidWeight { index, value });
        }

        Ok(Self::scaled(weights, reference_minutes))
    }

    /// Scales weights that are already known to be valid.
    pub(crate) fn scaled(weights: &[f64], reference_minutes: f64) -> Self {
        let sum: f64 = weights.iter().sum();
        if sum == 0.0 {
            return Self {
                segment_minutes: weights.to_vec(),
            };
        }

        let scale = reference_minutes / sum;
        Self {
            segment_minutes: weights.iter().map(|weight| weight * scale).collect(),
        }
    }

    /// Number of segments the rope is divided into. Never zero.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segment_minutes.len()
    }

    /// Normalized length of a single segment.
    #[must_use]
    pub fn segment_length(&self) -> f64 {
        1.0 / self.segment_minutes.len() as f64
    }

    /// Per-segment burn times in minutes, ordered from the left end.
    #[must_use]
    pub fn segment_minutes(&self) -> &[f64] {
        &self.segment_minutes
    }

    /// Burn time of the segment at `index` in seconds, if it exists.
    #[must_use]
    pub fn segment_seconds(&self, index: usize) -> Option<f64> {
        self.segment_minutes.get(index).map(|minutes| minutes * 60.0)
    }

    /// Time one end needs to consume the entire rope, in minutes.
    #[must_use]
    pub fn total_minutes(&self) -> f64 {
        self.segment_minutes.iter().sum()
    }
}
