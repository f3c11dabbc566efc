//! Run report and timeline rendered by the command-line adapter.

use std::{fmt, time::Duration};

use rope_timer_core::{EndTrigger, Event, RopeId, RopeSnapshot, Side};
use serde::Serialize;

/// Formats whole seconds as `M:SS`, the way the puzzle clock reads.
pub(crate) fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Trigger configured for one rope end before the run started.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct TriggerLine {
    pub(crate) rope: RopeId,
    pub(crate) side: Side,
    pub(crate) trigger: String,
}

/// Something noteworthy that happened during the burn.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct TimelineEntry {
    pub(crate) seconds: f64,
    pub(crate) clock: String,
    pub(crate) event: String,
}

impl TimelineEntry {
    fn new(at: Duration, event: String) -> Self {
        let seconds = at.as_secs_f64();
        Self {
            seconds,
            clock: format_clock(seconds.round() as u64),
            event,
        }
    }
}

/// Appends the notable `events` of one frame, which started at `frame_start`.
///
/// Ignitions that follow a burnout inside the same frame share its instant.
pub(crate) fn record(timeline: &mut Vec<TimelineEntry>, events: &[Event], frame_start: Duration) {
    let mut at = frame_start;
    for event in events {
        let description = match event {
            Event::EndIgnited { rope, side } => format!("rope {rope} lit at the {side} end"),
            Event::TriggerPromoted { rope, side } => {
                format!("rope {rope} {side} end stops waiting")
            }
            Event::RopeCompleted { rope, elapsed } => {
                at = *elapsed;
                format!("rope {rope} burnt out")
            }
            Event::BurnStopped { .. } => "all flames out".to_owned(),
            _ => continue,
        };
        timeline.push(TimelineEntry::new(at, description));
    }
}

/// Outcome of one simulated run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct Report {
    pub(crate) triggers: Vec<TriggerLine>,
    pub(crate) timeline: Vec<TimelineEntry>,
    pub(crate) elapsed_seconds: u64,
    pub(crate) elapsed: String,
    pub(crate) target_seconds: u64,
    pub(crate) tolerance_seconds: u64,
    pub(crate) target_reached: bool,
    pub(crate) ropes: [RopeSnapshot; 2],
}

impl Report {
    pub(crate) fn triggers_from(lookup: impl Fn(RopeId, Side) -> EndTrigger) -> Vec<TriggerLine> {
        RopeId::ALL
            .into_iter()
            .flat_map(|rope| Side::ALL.into_iter().map(move |side| (rope, side)))
            .map(|(rope, side)| TriggerLine {
                rope,
                side,
                trigger: lookup(rope, side).to_string(),
            })
            .collect()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "target {} (±{} s)",
            format_clock(self.target_seconds),
            self.tolerance_seconds
        )?;
        writeln!(f, "triggers:")?;
        for line in &self.triggers {
            let side = line.side.to_string();
            writeln!(f, "  {} {side:<5} {}", line.rope, line.trigger)?;
        }
        writeln!(f, "timeline:")?;
        if self.timeline.is_empty() {
            writeln!(f, "  nothing was lit")?;
        }
        for entry in &self.timeline {
            writeln!(f, "  {:>6}  {}", entry.clock, entry.event)?;
        }
        writeln!(f, "elapsed {} ({} s)", self.elapsed, self.elapsed_seconds)?;
        if self.target_reached {
            writeln!(f, "result: target reached")
        } else {
            writeln!(
                f,
                "result: missed by {} s",
                self.elapsed_seconds.abs_diff(self.target_seconds)
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pads_seconds() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(2_700), "45:00");
        assert_eq!(format_clock(3_600), "60:00");
    }

    #[test]
    fn promoted_ignition_shares_the_burnout_instant() {
        let mut timeline = Vec::new();
        let events = [
            Event::TimeAdvanced {
                dt: Duration::from_secs(15),
            },
            Event::RopeCompleted {
                rope: RopeId::A,
                elapsed: Duration::from_secs(1_800),
            },
            Event::TriggerPromoted {
                rope: RopeId::B,
                side: Side::Right,
            },
            Event::EndIgnited {
                rope: RopeId::B,
                side: Side::Right,
            },
        ];
        record(&mut timeline, &events, Duration::from_secs(1_790));

        let clocks: Vec<&str> = timeline.iter().map(|entry| entry.clock.as_str()).collect();
        assert_eq!(clocks, ["30:00", "30:00", "30:00"]);
        assert_eq!(timeline[2].event, "rope B lit at the right end");
    }

    #[test]
    fn trigger_lines_cover_every_end() {
        let lines = Report::triggers_from(|rope, side| match (rope, side) {
            (RopeId::B, Side::Right) => EndTrigger::FireOnOtherComplete,
            _ => EndTrigger::FireNow,
        });
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3].trigger, "wait");
        assert_eq!(lines[0].trigger, "now");
    }
}
