#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure playback system that turns frame input into rope timer commands.
//!
//! Adapters forward the real time elapsed since the previous frame together
//! with the buttons pressed on that frame. The system mirrors the world's run
//! flag from broadcast events and emits `Start`, `Pause`, `Step`, `Tick` and
//! trigger commands for the run/pause, step and reset controls.

use std::time::Duration;

use rope_timer_core::{Command, EndTrigger, Event, RopeId, Side, MAX_SUBSTEP};

/// Simulated seconds per real second by default: one simulated minute per second.
pub const DEFAULT_SPEED: f64 = 60.0;

/// Configuration parameters required to construct the playback system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    speed: f64,
    max_frame: Duration,
}

impl Config {
    /// Creates a configuration from a time scale and a per-frame simulated cap.
    ///
    /// `speed` is the number of simulated seconds covered by one real second.
    /// `max_frame` bounds the simulated time a single frame may cover, which
    /// keeps a stalled frame loop from jumping the clock.
    #[must_use]
    pub const fn new(speed: f64, max_frame: Duration) -> Self {
        Self { speed, max_frame }
    }

    /// Simulated seconds per real second.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED, MAX_SUBSTEP)
    }
}

/// Trigger chosen for one rope end through the renderer's end menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerSelection {
    /// Rope owning the end.
    pub rope: RopeId,
    /// End that was clicked.
    pub side: Side,
    /// Menu entry that was picked.
    pub trigger: EndTrigger,
}

/// Input snapshot distilled from adapter-provided frame data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackInput {
    /// Real time elapsed since the previous frame.
    pub frame_dt: Duration,
    /// Indicates whether the run/pause control was pressed on this frame.
    pub toggle_run: bool,
    /// Indicates whether the manual step control was pressed on this frame.
    pub step: bool,
    /// Indicates whether the reset control was pressed on this frame.
    pub reset: bool,
    /// Trigger picked from an end menu on this frame, if any.
    pub selection: Option<TriggerSelection>,
}

/// Playback system that translates frame input into world commands.
#[derive(Debug, Clone)]
pub struct Playback {
    config: Config,
    running: bool,
    target_check_pending: bool,
}

impl Default for Playback {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Playback {
    /// Creates a paused playback system using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            running: false,
            target_check_pending: false,
        }
    }

    /// Mirrors the world's run flag as observed through events.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Returns `true` once after the flames went out, then `false` until they go out again.
    ///
    /// Adapters use this to evaluate the success rule exactly when burning stops.
    pub fn take_target_check(&mut self) -> bool {
        std::mem::take(&mut self.target_check_pending)
    }

    /// Consumes world events and frame input to emit playback commands.
    pub fn handle(&mut self, events: &[Event], input: &PlaybackInput, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::PlaybackChanged { running } => self.running = *running,
                Event::BurnStopped { .. } => {
                    self.running = false;
                    self.target_check_pending = true;
                }
                Event::SimulationReset => {
                    self.running = false;
                    self.target_check_pending = false;
                }
                _ => {}
            }
        }

        if input.reset {
            out.push(Command::ClearTriggers);
            out.push(Command::Reset);
            return;
        }

        if let Some(selection) = input.selection {
            out.push(Command::SetTrigger {
                rope: selection.rope,
                side: selection.side,
                trigger: selection.trigger,
            });
            if self.running && selection.trigger == EndTrigger::FireNow {
                out.push(Command::ApplyPendingIgnitions);
            }
        }

        if input.toggle_run {
            out.push(if self.running {
                Command::Pause
            } else {
                Command::Start
            });
            return;
        }

        if !self.running {
            if input.step {
                out.push(Command::Step);
            }
            return;
        }

        let dt = self.simulated(input.frame_dt);
        if !dt.is_zero() {
            out.push(Command::Tick { dt });
        }
    }

    fn simulated(&self, frame_dt: Duration) -> Duration {
        Duration::try_from_secs_f64(frame_dt.as_secs_f64() * self.config.speed)
            .map_or(Duration::ZERO, |dt| dt.min(self.config.max_frame))
    }
}
