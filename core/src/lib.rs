#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the rope timer engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Burn profiles and puzzle definitions are built
//! once at startup and shared read-only with the world.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

mod profile;
mod puzzle;

pub use profile::{BurnProfile, ProfileError};
pub use puzzle::{PuzzleDefinition, PuzzleError};

/// Time a single burning end needs to consume a whole rope, in minutes.
pub const REFERENCE_DURATION_MINUTES: f64 = 60.0;

/// Elapsed time, in whole seconds, at which the puzzle counts as solved.
pub const TARGET_SECONDS: u64 = 45 * 60;

/// Accepted deviation from [`TARGET_SECONDS`], in whole seconds.
pub const TARGET_TOLERANCE_SECONDS: u64 = 1;

/// Largest slice of simulated time the world advances the ropes by at once.
pub const MAX_SUBSTEP: Duration = Duration::from_secs(15);

/// Simulated time covered by a single manual step (0.02 simulated minutes).
pub const STEP_QUANTUM: Duration = Duration::from_millis(1_200);

/// Segment weights of the first rope in the built-in puzzle.
pub const DEFAULT_ROPE_A_WEIGHTS: [f64; 8] = [0.4, 1.6, 0.8, 1.2, 0.6, 1.8, 0.9, 1.1];

/// Segment weights of the second rope in the built-in puzzle.
pub const DEFAULT_ROPE_B_WEIGHTS: [f64; 8] = [1.2, 0.7, 1.4, 0.5, 1.9, 0.8, 1.1, 0.6];

/// Identifies one of the two ropes in the puzzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RopeId {
    /// The first rope, drawn on top by renderers.
    A,
    /// The second rope.
    B,
}

impl RopeId {
    /// Both ropes in deterministic processing order.
    pub const ALL: [RopeId; 2] = [RopeId::A, RopeId::B];

    /// Returns the rope whose completion releases this rope's waiting ends.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// Zero-based index of the rope, usable for fixed-size storage.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

impl fmt::Display for RopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
        }
    }
}

/// One of the two ignitable ends of a rope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// End at normalized position zero; its front moves toward increasing positions.
    Left,
    /// End at normalized position one; its front moves toward decreasing positions.
    Right,
}

impl Side {
    /// Both sides in deterministic processing order.
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    /// Zero-based index of the side, usable for fixed-size storage.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Selection of rope ends addressed by a single ignition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ends {
    /// Only the left end.
    Left,
    /// Only the right end.
    Right,
    /// Both ends at once.
    Both,
}

impl Ends {
    /// Reports whether the selection includes the provided side.
    #[must_use]
    pub const fn contains(self, side: Side) -> bool {
        matches!(
            (self, side),
            (Self::Both, _) | (Self::Left, Side::Left) | (Self::Right, Side::Right)
        )
    }
}

impl From<Side> for Ends {
    fn from(side: Side) -> Self {
        match side {
            Side::Left => Self::Left,
            Side::Right => Self::Right,
        }
    }
}

/// User-declared intention attached to a single rope end.
///
/// Triggers are plain data resolved by the world; they never hold callbacks,
/// which keeps the controller inspectable and serializable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndTrigger {
    /// The end is left alone.
    #[default]
    None,
    /// The end is lit when pending ignitions are next applied.
    FireNow,
    /// The end is lit the instant the other rope finishes burning.
    FireOnOtherComplete,
}

impl fmt::Display for EndTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::FireNow => f.write_str("now"),
            Self::FireOnOtherComplete => f.write_str("wait"),
        }
    }
}

/// Coarse lifecycle state of a single rope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RopePhase {
    /// No end has been lit yet.
    NotStarted,
    /// At least one flame has been lit and the fronts have not met.
    Burning,
    /// The fronts met; the rope is fully consumed.
    Completed,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Records the trigger for one rope end without touching combustion state.
    SetTrigger {
        /// Rope owning the end.
        rope: RopeId,
        /// End receiving the trigger.
        side: Side,
        /// Intention to record.
        trigger: EndTrigger,
    },
    /// Resets every trigger to [`EndTrigger::None`].
    ClearTriggers,
    /// Lights every end whose trigger is [`EndTrigger::FireNow`].
    ApplyPendingIgnitions,
    /// Lights the selected ends of a rope directly, bypassing triggers.
    Ignite {
        /// Rope to ignite.
        rope: RopeId,
        /// Ends to light.
        ends: Ends,
    },
    /// Latches pending ignitions and enters the running state if anything burns.
    Start,
    /// Leaves the running state; the ropes keep their combustion state.
    Pause,
    /// Advances a paused simulation by [`STEP_QUANTUM`].
    Step,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Restores both ropes and the clock to their initial state. Triggers survive.
    Reset,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a trigger was recorded.
    TriggerChanged {
        /// Rope owning the end.
        rope: RopeId,
        /// End whose trigger changed.
        side: Side,
        /// Newly recorded trigger.
        trigger: EndTrigger,
    },
    /// Confirms that all triggers were cleared.
    TriggersCleared,
    /// Announces that a flame started burning from a rope end.
    EndIgnited {
        /// Rope that caught fire.
        rope: RopeId,
        /// End that was lit.
        side: Side,
    },
    /// Announces that a waiting trigger was promoted because the other rope finished.
    ///
    /// Waiting ends on a rope that is itself already consumed are left untouched.
    TriggerPromoted {
        /// Rope owning the promoted end.
        rope: RopeId,
        /// End whose trigger became [`EndTrigger::FireNow`].
        side: Side,
    },
    /// Announces that a rope burnt out completely.
    RopeCompleted {
        /// Rope that completed.
        rope: RopeId,
        /// Simulated time elapsed when the fronts met.
        elapsed: Duration,
    },
    /// Indicates that the simulation clock advanced while flames were burning.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the run flag changed.
    PlaybackChanged {
        /// Whether the simulation is now running.
        running: bool,
    },
    /// Announces that the last flame went out during a tick.
    BurnStopped {
        /// Elapsed simulated time, rounded to whole seconds.
        elapsed_seconds: u64,
    },
    /// Confirms that ropes and clock returned to their initial state.
    SimulationReset,
}

/// Immutable representation of a single rope's combustion state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RopeSnapshot {
    /// Rope described by the snapshot.
    pub rope: RopeId,
    /// Coarse lifecycle state.
    pub phase: RopePhase,
    /// Number of segments the rope is divided into.
    pub segment_count: usize,
    /// Segment currently eaten from the left.
    pub left_index: usize,
    /// Normalized length consumed from the left cursor's segment.
    pub left_consumed: f64,
    /// Segment currently eaten from the right.
    pub right_index: usize,
    /// Normalized length consumed from the right cursor's segment.
    pub right_consumed: f64,
    /// Whether a flame burns from the left end.
    pub left_active: bool,
    /// Whether a flame burns from the right end.
    pub right_active: bool,
    /// Whether the rope is fully consumed.
    pub completed: bool,
    /// Share of the rope length burnt away from the left end, in `[0, 1]`.
    pub burnt_from_left: f64,
    /// Share of the rope length burnt away from the right end, in `[0, 1]`.
    pub burnt_from_right: f64,
}

impl RopeSnapshot {
    /// Reports whether a flame burns from the provided side.
    #[must_use]
    pub const fn is_active(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left_active,
            Side::Right => self.right_active,
        }
    }
}
