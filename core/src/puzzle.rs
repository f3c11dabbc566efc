//! Static puzzle definitions consumed by the world at startup.

use thiserror::Error;

use crate::{
    BurnProfile, ProfileError, RopeId, DEFAULT_ROPE_A_WEIGHTS, DEFAULT_ROPE_B_WEIGHTS,
    REFERENCE_DURATION_MINUTES, TARGET_SECONDS, TARGET_TOLERANCE_SECONDS,
};

/// Errors raised while assembling a [`PuzzleDefinition`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum PuzzleError {
    /// One rope's weights could not be normalized.
    #[error("rope {rope} has an invalid burn profile")]
    Profile {
        /// Rope whose weights were rejected.
        rope: RopeId,
        /// Underlying normalization failure.
        #[source]
        source: ProfileError,
    },
    /// The tolerance window swallows the whole target.
    #[error("target tolerance of {tolerance_seconds}s must be smaller than the {target_seconds}s target")]
    ToleranceTooWide {
        /// Requested target in seconds.
        target_seconds: u64,
        /// Requested tolerance in seconds.
        tolerance_seconds: u64,
    },
}

/// Both ropes' burn profiles plus the success window for one puzzle instance.
#[derive(Clone, Debug, PartialEq)]
pub struct PuzzleDefinition {
    profiles: [BurnProfile; 2],
    target_seconds: u64,
    tolerance_seconds: u64,
}

impl PuzzleDefinition {
    /// Builds a puzzle from raw rope weights and a success window.
    pub fn new(
        rope_a_weights: &[f64],
        rope_b_weights: &[f64],
        reference_minutes: f64,
        target_seconds: u64,
        tolerance_seconds: u64,
    ) -> Result<Self, PuzzleError> {
        if tolerance_seconds >= target_seconds {
            return Err(PuzzleError::ToleranceTooWide {
                target_seconds,
                tolerance_seconds,
            });
        }

        let profile = |rope: RopeId, weights: &[f64]| {
            BurnProfile::normalize(weights, reference_minutes)
                .map_err(|source| PuzzleError::Profile { rope, source })
        };

        Ok(Self {
            profiles: [
                profile(RopeId::A, rope_a_weights)?,
                profile(RopeId::B, rope_b_weights)?,
            ],
            target_seconds,
            tolerance_seconds,
        })
    }

    /// Burn profile of the requested rope.
    #[must_use]
    pub fn profile(&self, rope: RopeId) -> &BurnProfile {
        &self.profiles[rope.index()]
    }

    /// Elapsed time, in whole seconds, that solves the puzzle.
    #[must_use]
    pub const fn target_seconds(&self) -> u64 {
        self.target_seconds
    }

    /// Accepted deviation from the target, in whole seconds.
    #[must_use]
    pub const fn tolerance_seconds(&self) -> u64 {
        self.tolerance_seconds
    }
}

impl Default for PuzzleDefinition {
    /// The built-in two-rope puzzle: measure 45 minutes with two 60-minute ropes.
    fn default() -> Self {
        Self {
            profiles: [
                BurnProfile::scaled(&DEFAULT_ROPE_A_WEIGHTS, REFERENCE_DURATION_MINUTES),
                BurnProfile::scaled(&DEFAULT_ROPE_B_WEIGHTS, REFERENCE_DURATION_MINUTES),
            ],
            target_seconds: TARGET_SECONDS,
            tolerance_seconds: TARGET_TOLERANCE_SECONDS,
        }
    }
}
