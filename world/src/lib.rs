#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for the rope timer.
//!
//! The [`World`] owns both ropes, the four end triggers and the simulation
//! clock. Every mutation goes through [`apply`]; the [`query`] module exposes
//! read-only views for renderers and systems.

mod clock;
mod rope;

use std::time::Duration;

use rope_timer_core::{
    Command, EndTrigger, Ends, Event, PuzzleDefinition, RopeId, Side, MAX_SUBSTEP, STEP_QUANTUM,
};
use tracing::{debug, trace};

use crate::clock::SimulationClock;
pub use crate::rope::{Burnout, RopeBurnState};

/// Represents the authoritative rope timer state.
#[derive(Clone, Debug)]
pub struct World {
    ropes: [RopeBurnState; 2],
    triggers: [[EndTrigger; 2]; 2],
    clock: SimulationClock,
}

impl World {
    /// Creates a world with both ropes unlit and every trigger cleared.
    #[must_use]
    pub fn new(puzzle: &PuzzleDefinition) -> Self {
        Self {
            ropes: [
                RopeBurnState::new(puzzle.profile(RopeId::A).clone()),
                RopeBurnState::new(puzzle.profile(RopeId::B).clone()),
            ],
            triggers: [[EndTrigger::None; 2]; 2],
            clock: SimulationClock::default(),
        }
    }

    fn rope(&self, rope: RopeId) -> &RopeBurnState {
        &self.ropes[rope.index()]
    }

    fn rope_mut(&mut self, rope: RopeId) -> &mut RopeBurnState {
        &mut self.ropes[rope.index()]
    }

    fn trigger_mut(&mut self, rope: RopeId, side: Side) -> &mut EndTrigger {
        &mut self.triggers[rope.index()][side.index()]
    }

    fn is_burning(&self) -> bool {
        self.ropes.iter().any(RopeBurnState::is_burning)
    }

    fn ignite(&mut self, rope: RopeId, ends: Ends, out_events: &mut Vec<Event>) {
        for side in self.rope_mut(rope).ignite(ends) {
            debug!(%rope, %side, "end ignited");
            out_events.push(Event::EndIgnited { rope, side });
        }
    }

    fn promote(&mut self, rope: RopeId, side: Side, out_events: &mut Vec<Event>) {
        *self.trigger_mut(rope, side) = EndTrigger::FireNow;
        debug!(%rope, %side, "waiting trigger promoted");
        out_events.push(Event::TriggerPromoted { rope, side });
        self.ignite(rope, side.into(), out_events);
    }

    fn apply_pending_ignitions(&mut self, out_events: &mut Vec<Event>) {
        for rope in RopeId::ALL {
            for side in Side::ALL {
                match self.triggers[rope.index()][side.index()] {
                    EndTrigger::FireNow => self.ignite(rope, side.into(), out_events),
                    EndTrigger::FireOnOtherComplete
                        if self.rope(rope.other()).is_completed()
                            && !self.rope(rope).is_completed() =>
                    {
                        self.promote(rope, side, out_events);
                    }
                    EndTrigger::FireOnOtherComplete | EndTrigger::None => {}
                }
            }
        }
    }

    fn on_rope_completed(&mut self, done: RopeId, out_events: &mut Vec<Event>) {
        let elapsed = self.clock.elapsed();
        debug!(rope = %done, elapsed_secs = elapsed.as_secs_f64(), "rope burnt out");
        out_events.push(Event::RopeCompleted {
            rope: done,
            elapsed,
        });

        // A rope that burnt out in the same slice has nothing left to light.
        let other = done.other();
        if self.rope(other).is_completed() {
            return;
        }
        for side in Side::ALL {
            if self.triggers[other.index()][side.index()] == EndTrigger::FireOnOtherComplete {
                self.promote(other, side, out_events);
            }
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if !self.is_burning() {
            return;
        }

        let max_substep = MAX_SUBSTEP.as_secs_f64();
        let mut remaining = dt.as_secs_f64();
        let mut advanced = 0.0;

        while remaining > 0.0 && self.is_burning() {
            // Cut the slice at the next burnout so waiting ends light without delay.
            let slice = self
                .ropes
                .iter()
                .filter_map(RopeBurnState::time_to_completion)
                .fold(remaining.min(max_substep), f64::min);

            let mut burnt_out = [false; 2];
            for rope in RopeId::ALL {
                burnt_out[rope.index()] = self.rope_mut(rope).advance(slice).is_some();
            }

            remaining -= slice;
            advanced += slice;
            self.clock.advance(slice);
            trace!(slice, remaining, "ropes advanced");

            for rope in RopeId::ALL {
                if burnt_out[rope.index()] {
                    self.on_rope_completed(rope, out_events);
                }
            }

            if slice <= 0.0 && !burnt_out.contains(&true) {
                break;
            }
        }

        if advanced > 0.0 {
            let dt = if remaining <= 0.0 {
                dt
            } else {
                Duration::from_secs_f64(advanced)
            };
            out_events.push(Event::TimeAdvanced { dt });
        }

        if !self.is_burning() {
            if self.clock.set_running(false) {
                out_events.push(Event::PlaybackChanged { running: false });
            }
            let elapsed_seconds = self.clock.elapsed_seconds();
            debug!(elapsed_seconds, "all flames out");
            out_events.push(Event::BurnStopped { elapsed_seconds });
        }
    }

    fn reset(&mut self, out_events: &mut Vec<Event>) {
        for rope in &mut self.ropes {
            rope.restart();
        }
        self.clock = SimulationClock::default();
        out_events.push(Event::SimulationReset);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(&PuzzleDefinition::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SetTrigger {
            rope,
            side,
            trigger,
        } => {
            *world.trigger_mut(rope, side) = trigger;
            out_events.push(Event::TriggerChanged {
                rope,
                side,
                trigger,
            });
        }
        Command::ClearTriggers => {
            world.triggers = [[EndTrigger::None; 2]; 2];
            out_events.push(Event::TriggersCleared);
        }
        Command::ApplyPendingIgnitions => world.apply_pending_ignitions(out_events),
        Command::Ignite { rope, ends } => world.ignite(rope, ends, out_events),
        Command::Start => {
            if world.clock.is_running() {
                return;
            }
            world.apply_pending_ignitions(out_events);
            if world.is_burning() && world.clock.set_running(true) {
                out_events.push(Event::PlaybackChanged { running: true });
            }
        }
        Command::Pause => {
            if world.clock.set_running(false) {
                out_events.push(Event::PlaybackChanged { running: false });
            }
        }
        Command::Step => {
            if world.clock.is_running() {
                return;
            }
            world.apply_pending_ignitions(out_events);
            world.tick(STEP_QUANTUM, out_events);
        }
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::Reset => world.reset(out_events),
    }
}

/// Reports, at most once per reset, that the burn stopped on the target time.
///
/// Succeeds when the rounded elapsed time lies within `tolerance_seconds` of
/// `target_seconds` while the simulation is neither running nor burning. Every
/// later call returns `false` until [`Command::Reset`] is applied.
pub fn check_target(world: &mut World, target_seconds: u64, tolerance_seconds: u64) -> bool {
    if world.clock.target_reached() || world.clock.is_running() || world.is_burning() {
        return false;
    }

    let elapsed = world.clock.elapsed_seconds();
    if elapsed.abs_diff(target_seconds) > tolerance_seconds {
        return false;
    }

    world.clock.mark_target_reached();
    debug!(elapsed, target_seconds, "target reached");
    true
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use rope_timer_core::{BurnProfile, EndTrigger, RopeId, RopeSnapshot, Side};

    use super::World;

    /// Captures the combustion state of one rope.
    #[must_use]
    pub fn rope(world: &World, rope: RopeId) -> RopeSnapshot {
        world.rope(rope).snapshot(rope)
    }

    /// Captures both ropes in deterministic order.
    #[must_use]
    pub fn ropes(world: &World) -> [RopeSnapshot; 2] {
        [rope(world, RopeId::A), rope(world, RopeId::B)]
    }

    /// Burn profile the rope was built from.
    #[must_use]
    pub fn profile(world: &World, rope: RopeId) -> &BurnProfile {
        world.rope(rope).profile()
    }

    /// Trigger currently recorded for a rope end.
    #[must_use]
    pub fn trigger(world: &World, rope: RopeId, side: Side) -> EndTrigger {
        world.triggers[rope.index()][side.index()]
    }

    /// Elapsed simulated time, rounded to whole seconds.
    #[must_use]
    pub fn elapsed_seconds(world: &World) -> u64 {
        world.clock.elapsed_seconds()
    }

    /// Elapsed simulated time with sub-second precision.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.clock.elapsed()
    }

    /// Reports whether the run flag is set.
    #[must_use]
    pub fn is_running(world: &World) -> bool {
        world.clock.is_running()
    }

    /// Reports whether any end of either rope is burning.
    ///
    /// Frame loops keep scheduling ticks while this holds.
    #[must_use]
    pub fn is_burning(world: &World) -> bool {
        world.is_burning()
    }

    /// Reports whether the one-shot success signal has fired since the last reset.
    #[must_use]
    pub fn target_reached(world: &World) -> bool {
        world.clock.target_reached()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_world() -> World {
        let puzzle = PuzzleDefinition::new(&[1.0; 8], &[1.0; 8], 60.0, 2_700, 1)
            .expect("uniform puzzle is valid");
        World::new(&puzzle)
    }

    fn run(world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, command, &mut events);
        events
    }

    #[test]
    fn set_trigger_does_not_ignite() {
        let mut world = World::default();
        let events = run(
            &mut world,
            Command::SetTrigger {
                rope: RopeId::A,
                side: Side::Left,
                trigger: EndTrigger::FireNow,
            },
        );
        assert_eq!(events.len(), 1);
        assert!(!query::is_burning(&world));
        assert_eq!(
            query::trigger(&world, RopeId::A, Side::Left),
            EndTrigger::FireNow
        );
    }

    #[test]
    fn start_without_pending_ignitions_stays_paused() {
        let mut world = World::default();
        let events = run(&mut world, Command::Start);
        assert!(events.is_empty());
        assert!(!query::is_running(&world));
    }

    #[test]
    fn start_latches_pending_ignitions() {
        let mut world = World::default();
        let _ = run(
            &mut world,
            Command::SetTrigger {
                rope: RopeId::B,
                side: Side::Right,
                trigger: EndTrigger::FireNow,
            },
        );
        let events = run(&mut world, Command::Start);
        assert_eq!(
            events,
            vec![
                Event::EndIgnited {
                    rope: RopeId::B,
                    side: Side::Right
                },
                Event::PlaybackChanged { running: true },
            ]
        );
        assert!(query::is_running(&world));
    }

    #[test]
    fn step_is_ignored_while_running() {
        let mut world = World::default();
        let _ = run(
            &mut world,
            Command::Ignite {
                rope: RopeId::A,
                ends: Ends::Left,
            },
        );
        let _ = run(&mut world, Command::Start);
        assert!(run(&mut world, Command::Step).is_empty());
        let _ = run(&mut world, Command::Pause);
        let events = run(&mut world, Command::Step);
        assert_eq!(events, vec![Event::TimeAdvanced { dt: STEP_QUANTUM }]);
    }

    #[test]
    fn tick_without_flames_leaves_clock_untouched() {
        let mut world = World::default();
        assert!(run(&mut world, Command::Tick { dt: MAX_SUBSTEP }).is_empty());
        assert_eq!(query::elapsed_seconds(&world), 0);
    }

    #[test]
    fn clock_stops_when_last_flame_goes_out() {
        let mut world = uniform_world();
        let _ = run(
            &mut world,
            Command::Ignite {
                rope: RopeId::A,
                ends: Ends::Both,
            },
        );
        let _ = run(&mut world, Command::Start);
        let events = run(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(4_000),
            },
        );
        assert_eq!(query::elapsed_seconds(&world), 1_800);
        assert!(!query::is_running(&world));
        assert_eq!(events.last(), Some(&Event::BurnStopped { elapsed_seconds: 1_800 }));
        assert!(events.contains(&Event::PlaybackChanged { running: false }));
    }

    #[test]
    fn waiting_trigger_already_satisfied_fires_on_apply() {
        let mut world = uniform_world();
        let _ = run(
            &mut world,
            Command::Ignite {
                rope: RopeId::A,
                ends: Ends::Both,
            },
        );
        let _ = run(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1_800),
            },
        );
        let _ = run(
            &mut world,
            Command::SetTrigger {
                rope: RopeId::B,
                side: Side::Left,
                trigger: EndTrigger::FireOnOtherComplete,
            },
        );
        assert!(!query::rope(&world, RopeId::B).left_active);

        let events = run(&mut world, Command::ApplyPendingIgnitions);
        assert_eq!(
            events,
            vec![
                Event::TriggerPromoted {
                    rope: RopeId::B,
                    side: Side::Left
                },
                Event::EndIgnited {
                    rope: RopeId::B,
                    side: Side::Left
                },
            ]
        );
    }

    #[test]
    fn waiting_end_on_a_rope_consumed_in_the_same_slice_stays_waiting() {
        let mut world = uniform_world();
        for rope in RopeId::ALL {
            let _ = run(
                &mut world,
                Command::Ignite {
                    rope,
                    ends: Ends::Both,
                },
            );
        }
        let _ = run(
            &mut world,
            Command::SetTrigger {
                rope: RopeId::A,
                side: Side::Left,
                trigger: EndTrigger::FireOnOtherComplete,
            },
        );

        let events = run(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(2_000),
            },
        );
        let completed = events
            .iter()
            .filter(|event| matches!(event, Event::RopeCompleted { .. }))
            .count();
        assert_eq!(completed, 2);
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::TriggerPromoted { .. })));
        assert_eq!(
            query::trigger(&world, RopeId::A, Side::Left),
            EndTrigger::FireOnOtherComplete
        );

        assert!(run(&mut world, Command::ApplyPendingIgnitions).is_empty());
    }

    #[test]
    fn query_exposes_the_puzzle_profiles() {
        let puzzle = PuzzleDefinition::default();
        let world = World::new(&puzzle);
        for rope in RopeId::ALL {
            assert_eq!(query::profile(&world, rope), puzzle.profile(rope));
        }
    }

    #[test]
    fn reset_keeps_triggers_but_clears_clock() {
        let mut world = uniform_world();
        let _ = run(
            &mut world,
            Command::SetTrigger {
                rope: RopeId::A,
                side: Side::Right,
                trigger: EndTrigger::FireNow,
            },
        );
        let _ = run(&mut world, Command::Start);
        let _ = run(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(90),
            },
        );
        let events = run(&mut world, Command::Reset);
        assert_eq!(events, vec![Event::SimulationReset]);
        assert_eq!(query::elapsed_seconds(&world), 0);
        assert!(!query::is_running(&world));
        assert!(!query::is_burning(&world));
        assert_eq!(
            query::trigger(&world, RopeId::A, Side::Right),
            EndTrigger::FireNow
        );

        let _ = run(&mut world, Command::ClearTriggers);
        assert_eq!(
            query::trigger(&world, RopeId::A, Side::Right),
            EndTrigger::None
        );
    }

    #[test]
    fn check_target_requires_stopped_simulation() {
        let mut world = uniform_world();
        let _ = run(
            &mut world,
            Command::Ignite {
                rope: RopeId::A,
                ends: Ends::Left,
            },
        );
        let _ = run(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(2_700),
            },
        );
        assert_eq!(query::elapsed_seconds(&world), 2_700);
        assert!(!check_target(&mut world, 2_700, 1), "still burning");
    }
}
