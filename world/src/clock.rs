use std::time::Duration;

/// Elapsed simulated time plus the run and success flags.
///
/// Whole seconds are kept as an integer and only the sub-second remainder is
/// carried as a float, so many tiny ticks report the same integral time as one
/// large tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct SimulationClock {
    whole_seconds: u64,
    remainder: f64,
    running: bool,
    target_reached: bool,
}

impl SimulationClock {
    pub(crate) fn advance(&mut self, seconds: f64) {
        if seconds.is_nan() || seconds <= 0.0 {
            return;
        }
        self.remainder += seconds;
        let whole = self.remainder.floor();
        self.whole_seconds = self.whole_seconds.saturating_add(whole as u64);
        self.remainder -= whole;
    }

    /// Elapsed time rounded to the nearest whole second.
    pub(crate) fn elapsed_seconds(&self) -> u64 {
        if self.remainder >= 0.5 {
            self.whole_seconds.saturating_add(1)
        } else {
            self.whole_seconds
        }
    }

    pub(crate) fn elapsed(&self) -> Duration {
        Duration::from_secs(self.whole_seconds) + Duration::from_secs_f64(self.remainder)
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) fn set_running(&mut self, running: bool) -> bool {
        let changed = self.running != running;
        self.running = running;
        changed
    }

    pub(crate) fn target_reached(&self) -> bool {
        self.target_reached
    }

    pub(crate) fn mark_target_reached(&mut self) {
        self.target_reached = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remainder_carries_into_whole_seconds() {
        let mut clock = SimulationClock::default();
        for _ in 0..4 {
            clock.advance(0.25);
        }
        assert_eq!(clock.whole_seconds, 1);
        assert_eq!(clock.elapsed_seconds(), 1);
        assert_eq!(clock.elapsed(), Duration::from_secs(1));
    }

    #[test]
    fn elapsed_seconds_round_to_nearest() {
        let mut clock = SimulationClock::default();
        clock.advance(2.4);
        assert_eq!(clock.elapsed_seconds(), 2);
        clock.advance(0.2);
        assert_eq!(clock.elapsed_seconds(), 3);
    }

    #[test]
    fn non_positive_advances_are_ignored() {
        let mut clock = SimulationClock::default();
        clock.advance(-1.0);
        clock.advance(f64::NAN);
        assert_eq!(clock, SimulationClock::default());
    }

    #[test]
    fn running_flag_reports_changes() {
        let mut clock = SimulationClock::default();
        assert!(clock.set_running(true));
        assert!(!clock.set_running(true));
        assert!(clock.is_running());
    }
}
