#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays the rope timer puzzle frame by frame.

mod puzzle_file;
mod report;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use rope_timer_core::{Command, EndTrigger, Event, PuzzleDefinition, RopeId, Side, MAX_SUBSTEP};
use rope_timer_system_playback::{Config, Playback, PlaybackInput, TriggerSelection, DEFAULT_SPEED};
use rope_timer_world::{self as world, check_target, query, World};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::report::{format_clock, Report};

/// Trigger layout that measures forty-five minutes with the default ropes.
const CANONICAL_SOLUTION: [TriggerSelection; 4] = [
    TriggerSelection {
        rope: RopeId::A,
        side: Side::Left,
        trigger: EndTrigger::FireNow,
    },
    TriggerSelection {
        rope: RopeId::A,
        side: Side::Right,
        trigger: EndTrigger::FireNow,
    },
    TriggerSelection {
        rope: RopeId::B,
        side: Side::Left,
        trigger: EndTrigger::FireNow,
    },
    TriggerSelection {
        rope: RopeId::B,
        side: Side::Right,
        trigger: EndTrigger::FireOnOtherComplete,
    },
];

/// Measure forty-five minutes with two unevenly burning ropes.
#[derive(Debug, Parser)]
#[command(name = "rope-timer", version, about)]
struct Cli {
    /// TOML puzzle definition; the built-in ropes are used when omitted.
    #[arg(long, value_name = "FILE")]
    puzzle: Option<PathBuf>,

    /// End trigger as ROPE:SIDE:MODE, e.g. `a:left:now` or `b:right:wait`.
    ///
    /// Repeat for several ends. Without any, the known solution is played.
    #[arg(long = "trigger", value_name = "ROPE:SIDE:MODE", value_parser = parse_trigger)]
    triggers: Vec<TriggerSelection>,

    /// Real milliseconds covered by each synthetic frame.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Simulated seconds per real second.
    #[arg(long, default_value_t = DEFAULT_SPEED)]
    speed: f64,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Entry point for the rope timer command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rope_timer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let puzzle = match &cli.puzzle {
        Some(path) => puzzle_file::load(path)?,
        None => PuzzleDefinition::default(),
    };
    let triggers = if cli.triggers.is_empty() {
        CANONICAL_SOLUTION.to_vec()
    } else {
        cli.triggers.clone()
    };

    let report = simulate(&puzzle, &triggers, &cli)?;
    match cli.format {
        OutputFormat::Text => print!("{report}"),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize report")?
        ),
    }
    Ok(())
}

/// Parses `ROPE:SIDE:MODE` where MODE is `now`, `wait` or `none`.
fn parse_trigger(value: &str) -> Result<TriggerSelection, String> {
    let mut parts = value.split(':');
    let (Some(rope), Some(side), Some(mode), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected ROPE:SIDE:MODE, got `{value}`"));
    };

    let rope = match rope.trim().to_ascii_lowercase().as_str() {
        "a" => RopeId::A,
        "b" => RopeId::B,
        other => return Err(format!("unknown rope `{other}`; expected `a` or `b`")),
    };
    let side = match side.trim().to_ascii_lowercase().as_str() {
        "l" | "left" => Side::Left,
        "r" | "right" => Side::Right,
        other => return Err(format!("unknown side `{other}`; expected `left` or `right`")),
    };
    let trigger = match mode.trim().to_ascii_lowercase().as_str() {
        "now" => EndTrigger::FireNow,
        "wait" => EndTrigger::FireOnOtherComplete,
        "none" => EndTrigger::None,
        other => {
            return Err(format!(
                "unknown mode `{other}`; expected `now`, `wait` or `none`"
            ))
        }
    };

    Ok(TriggerSelection {
        rope,
        side,
        trigger,
    })
}

/// Drives one world and playback pair through synthetic frames.
struct Session {
    world: World,
    playback: Playback,
    events: Vec<Event>,
    timeline: Vec<report::TimelineEntry>,
}

impl Session {
    fn new(puzzle: &PuzzleDefinition, config: Config) -> Self {
        Self {
            world: World::new(puzzle),
            playback: Playback::new(config),
            events: Vec::new(),
            timeline: Vec::new(),
        }
    }

    fn frame(&mut self, input: PlaybackInput) {
        let mut commands: Vec<Command> = Vec::new();
        self.playback.handle(&self.events, &input, &mut commands);
        self.events.clear();

        let frame_start = query::elapsed(&self.world);
        for command in commands {
            world::apply(&mut self.world, command, &mut self.events);
        }
        report::record(&mut self.timeline, &self.events, frame_start);
    }
}

fn simulate(puzzle: &PuzzleDefinition, triggers: &[TriggerSelection], cli: &Cli) -> Result<Report> {
    if !cli.speed.is_finite() || cli.speed <= 0.0 {
        bail!("speed must be a positive number, got {}", cli.speed);
    }
    if cli.frame_ms == 0 {
        bail!("frame-ms must be at least 1");
    }

    let config = Config::new(cli.speed, MAX_SUBSTEP);
    let frame_dt = Duration::from_millis(cli.frame_ms);
    let mut session = Session::new(puzzle, config);

    for selection in triggers {
        session.frame(PlaybackInput {
            selection: Some(*selection),
            ..PlaybackInput::default()
        });
    }
    let configured = Report::triggers_from(|rope, side| query::trigger(&session.world, rope, side));

    info!(speed = config.speed(), frame_ms = cli.frame_ms, "starting burn");
    session.frame(PlaybackInput {
        toggle_run: true,
        ..PlaybackInput::default()
    });

    let mut target_reached = false;
    let mut frames: u64 = 0;
    loop {
        if session.playback.take_target_check() {
            target_reached = check_target(
                &mut session.world,
                puzzle.target_seconds(),
                puzzle.tolerance_seconds(),
            );
            break;
        }
        if !query::is_running(&session.world)
            && !session.playback.is_running()
            && session.events.is_empty()
        {
            break;
        }

        session.frame(PlaybackInput {
            frame_dt,
            ..PlaybackInput::default()
        });
        frames += 1;
    }
    debug!(frames, "frame loop finished");

    let elapsed_seconds = query::elapsed_seconds(&session.world);
    info!(
        elapsed = %format_clock(elapsed_seconds),
        target_reached,
        "burn finished"
    );

    Ok(Report {
        triggers: configured,
        timeline: session.timeline,
        elapsed_seconds,
        elapsed: format_clock(elapsed_seconds),
        target_seconds: puzzle.target_seconds(),
        tolerance_seconds: puzzle.tolerance_seconds(),
        target_reached,
        ropes: query::ropes(&session.world),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(frame_ms: u64, speed: f64) -> Cli {
        Cli {
            puzzle: None,
            triggers: Vec::new(),
            frame_ms,
            speed,
            format: OutputFormat::Text,
        }
    }

    #[test]
    fn parses_trigger_flags() {
        assert_eq!(
            parse_trigger("b:right:wait"),
            Ok(TriggerSelection {
                rope: RopeId::B,
                side: Side::Right,
                trigger: EndTrigger::FireOnOtherComplete,
            })
        );
        assert_eq!(
            parse_trigger("A:L:now").map(|selection| selection.side),
            Ok(Side::Left)
        );
        assert!(parse_trigger("a:left").is_err());
        assert!(parse_trigger("c:left:now").is_err());
        assert!(parse_trigger("a:middle:now").is_err());
        assert!(parse_trigger("a:left:later").is_err());
        assert!(parse_trigger("a:left:now:extra").is_err());
    }

    #[test]
    fn canonical_solution_reaches_the_target() {
        let puzzle = PuzzleDefinition::default();
        let report =
            simulate(&puzzle, &CANONICAL_SOLUTION, &cli(16, 600.0)).expect("valid settings");

        assert!(report.target_reached);
        assert_eq!(report.elapsed, "45:00");
        assert!(report.ropes.iter().all(|rope| rope.completed));
        assert_eq!(report.triggers[3].trigger, "wait");

        let burnouts: Vec<&str> = report
            .timeline
            .iter()
            .filter(|entry| entry.event.ends_with("burnt out"))
            .map(|entry| entry.clock.as_str())
            .collect();
        assert_eq!(burnouts, ["30:00", "45:00"]);
    }

    #[test]
    fn single_end_misses_the_target() {
        let puzzle = PuzzleDefinition::default();
        let triggers = [TriggerSelection {
            rope: RopeId::A,
            side: Side::Left,
            trigger: EndTrigger::FireNow,
        }];
        let report = simulate(&puzzle, &triggers, &cli(16, 3_600.0)).expect("valid settings");

        assert!(!report.target_reached);
        assert_eq!(report.elapsed_seconds, 3_600);
        assert!(report.to_string().contains("missed by 900 s"));
    }

    #[test]
    fn waiting_only_never_starts() {
        let puzzle = PuzzleDefinition::default();
        let triggers = [TriggerSelection {
            rope: RopeId::B,
            side: Side::Left,
            trigger: EndTrigger::FireOnOtherComplete,
        }];
        let report = simulate(&puzzle, &triggers, &cli(16, 60.0)).expect("valid settings");

        assert!(!report.target_reached);
        assert_eq!(report.elapsed_seconds, 0);
        assert!(report.timeline.is_empty());
    }

    #[test]
    fn rejects_invalid_pacing() {
        let puzzle = PuzzleDefinition::default();
        assert!(simulate(&puzzle, &CANONICAL_SOLUTION, &cli(0, 60.0)).is_err());
        assert!(simulate(&puzzle, &CANONICAL_SOLUTION, &cli(16, f64::NAN)).is_err());
        assert!(simulate(&puzzle, &CANONICAL_SOLUTION, &cli(16, -1.0)).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
