//! Combustion state machine for a single rope.
//!
//! Lengths are normalized to the unit interval, so a rope of `n` segments has
//! segments of length `1/n` regardless of how a renderer draws it. Each active
//! end consumes the segment under its cursor at
//! `segment_length / segment_seconds` units of length per simulated second.

use rope_timer_core::{BurnProfile, Ends, RopeId, RopePhase, RopeSnapshot, Side};

/// Slack, in simulated seconds, within which a front counts as having finished a segment.
const TIME_EPSILON: f64 = 1e-9;

/// Floor applied to segment burn times so zero-weight segments burn instantly.
const MIN_SEGMENT_SECONDS: f64 = 1e-12;

/// Reports that a rope burnt out during an [`RopeBurnState::advance`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Burnout {
    /// Simulated seconds into the advanced interval at which the fronts met.
    pub after: f64,
}

/// Mutable combustion state of one rope, owning its immutable burn profile.
#[derive(Clone, Debug, PartialEq)]
pub struct RopeBurnState {
    profile: BurnProfile,
    combustion: Combustion,
}

impl RopeBurnState {
    /// Creates an unlit rope burning according to `profile`.
    #[must_use]
    pub fn new(profile: BurnProfile) -> Self {
        let combustion = Combustion::fresh(&profile);
        Self {
            profile,
            combustion,
        }
    }

    /// Restores the rope to its unlit, unburnt state.
    pub fn restart(&mut self) {
        self.combustion = Combustion::fresh(&self.profile);
    }

    /// Burn profile the rope was created with.
    #[must_use]
    pub fn profile(&self) -> &BurnProfile {
        &self.profile
    }

    /// Lights the selected ends and returns the sides that were not already burning.
    ///
    /// Completed ropes cannot be relit; the call is then a no-op.
    #[must_use]
    pub fn ignite(&mut self, ends: Ends) -> Vec<Side> {
        if self.combustion.completed {
            return Vec::new();
        }

        let mut lit = Vec::with_capacity(2);
        for side in Side::ALL {
            if ends.contains(side) && !self.combustion.active(side) {
                *self.combustion.active_mut(side) = true;
                lit.push(side);
            }
        }
        lit
    }

    /// Burns the rope for `dt` simulated seconds.
    ///
    /// A front that finishes its segment moves on and keeps burning for the rest
    /// of `dt` at the next segment's own rate, so one call may cross any number
    /// of segments. Returns a [`Burnout`] exactly once, on the call during which
    /// the fronts meet; afterwards every call is a no-op.
    #[must_use]
    pub fn advance(&mut self, dt: f64) -> Option<Burnout> {
        self.combustion.burn(&self.profile, dt)
    }

    /// Predicts how many simulated seconds remain until the rope burns out.
    ///
    /// Returns `None` when the rope is already consumed or nothing is burning.
    #[must_use]
    pub fn time_to_completion(&self) -> Option<f64> {
        if self.combustion.completed || !self.is_burning() {
            return None;
        }
        let mut probe = self.combustion;
        probe
            .burn(&self.profile, f64::INFINITY)
            .map(|burnout| burnout.after)
    }

    /// Reports whether a flame currently burns from the provided side.
    #[must_use]
    pub fn is_active(&self, side: Side) -> bool {
        self.combustion.active(side)
    }

    /// Reports whether any flame is burning on this rope.
    #[must_use]
    pub fn is_burning(&self) -> bool {
        self.combustion.left_active || self.combustion.right_active
    }

    /// Reports whether the rope has burnt out.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.combustion.completed
    }

    /// Coarse lifecycle state of the rope.
    #[must_use]
    pub fn phase(&self) -> RopePhase {
        if self.combustion.completed {
            RopePhase::Completed
        } else if self.is_burning() {
            RopePhase::Burning
        } else {
            RopePhase::NotStarted
        }
    }

    /// Shares of the rope length burnt away from the left and right ends.
    ///
    /// Renderers place the flames and burn overlays at these offsets.
    #[must_use]
    pub fn burnt_fractions(&self) -> (f64, f64) {
        let state = &self.combustion;
        let length = self.profile.segment_length();
        let last = self.profile.segment_count() - 1;
        let from_left =
            (state.left_index as f64 * length + state.left_consumed.min(length)).min(1.0);
        let from_right = ((last - state.right_index) as f64 * length
            + state.right_consumed.min(length))
        .min(1.0);
        (from_left, from_right)
    }

    /// Captures the state a renderer needs to draw the rope.
    #[must_use]
    pub fn snapshot(&self, rope: RopeId) -> RopeSnapshot {
        let state = &self.combustion;
        let (burnt_from_left, burnt_from_right) = self.burnt_fractions();

        RopeSnapshot {
            rope,
            phase: self.phase(),
            segment_count: self.profile.segment_count(),
            left_index: state.left_index,
            left_consumed: state.left_consumed,
            right_index: state.right_index,
            right_consumed: state.right_consumed,
            left_active: state.left_active,
            right_active: state.right_active,
            completed: state.completed,
            burnt_from_left,
            burnt_from_right,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Combustion {
    left_index: usize,
    right_index: usize,
    left_consumed: f64,
    right_consumed: f64,
    left_active: bool,
    right_active: bool,
    completed: bool,
}

impl Combustion {
    fn fresh(profile: &BurnProfile) -> Self {
        Self {
            left_index: 0,
            right_index: profile.segment_count() - 1,
            left_consumed: 0.0,
            right_consumed: 0.0,
            left_active: false,
            right_active: false,
            completed: false,
        }
    }

    fn active(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left_active,
            Side::Right => self.right_active,
        }
    }

    fn active_mut(&mut self, side: Side) -> &mut bool {
        match side {
            Side::Left => &mut self.left_active,
            Side::Right => &mut self.right_active,
        }
    }

    fn burn(&mut self, profile: &BurnProfile, dt: f64) -> Option<Burnout> {
        if self.completed || dt.is_nan() || dt < 0.0 {
            return None;
        }

        let mut remaining = dt;
        let mut spent = 0.0;
        while !self.completed && (self.left_active || self.right_active) {
            let (step, crossed) = self.burn_to_boundary(profile, remaining);
            remaining -= step;
            spent += step;
            if !crossed && remaining <= 0.0 {
                break;
            }
        }

        self.completed.then_some(Burnout { after: spent })
    }

    /// Burns until the next segment boundary or until `budget` runs out.
    ///
    /// Returns the seconds consumed and whether any front crossed a boundary.
    fn burn_to_boundary(&mut self, profile: &BurnProfile, budget: f64) -> (f64, bool) {
        let length = profile.segment_length();
        let left_rate = self.rate(profile, Side::Left);
        let right_rate = self.rate(profile, Side::Right);

        if self.left_index == self.right_index {
            let gap = (length - self.left_consumed - self.right_consumed).max(0.0);
            let to_close = gap / (left_rate + right_rate);
            if budget + TIME_EPSILON >= to_close {
                let step = to_close.min(budget);
                self.left_consumed += left_rate * step;
                self.right_consumed = length - self.left_consumed;
                self.finish();
                return (step, true);
            }
            self.left_consumed += left_rate * budget;
            self.right_consumed += right_rate * budget;
            return (budget, false);
        }

        let left_finish = time_to_finish(length, self.left_consumed, left_rate);
        let right_finish = time_to_finish(length, self.right_consumed, right_rate);
        let step = budget.min(left_finish).min(right_finish);
        self.left_consumed += left_rate * step;
        self.right_consumed += right_rate * step;

        let left_done = left_finish - step <= TIME_EPSILON;
        let right_done = right_finish - step <= TIME_EPSILON;

        // The left front moves first; when both fronts finish adjacent segments
        // together the right front stays fully consumed on the shared segment.
        if left_done {
            self.left_index += 1;
            self.left_consumed = 0.0;
        }
        if right_done {
            if self.right_index > self.left_index {
                self.right_index -= 1;
                self.right_consumed = 0.0;
            } else {
                self.right_consumed = length;
            }
        }

        if self.left_index == self.right_index
            && self.left_consumed + self.right_consumed >= length
        {
            self.finish();
        }

        (step, left_done || right_done)
    }

    fn rate(&self, profile: &BurnProfile, side: Side) -> f64 {
        if !self.active(side) {
            return 0.0;
        }
        let index = match side {
            Side::Left => self.left_index,
            Side::Right => self.right_index,
        };
        let seconds = profile
            .segment_seconds(index)
            .unwrap_or(0.0)
            .max(MIN_SEGMENT_SECONDS);
        profile.segment_length() / seconds
    }

    fn finish(&mut self) {
        self.completed = true;
        self.left_active = false;
        self.right_active = false;
    }
}

fn time_to_finish(length: f64, consumed: f64, rate: f64) -> f64 {
    if rate > 0.0 {
        (length - consumed).max(0.0) / rate
    } else {
        f64::INFINITY
    }
}
