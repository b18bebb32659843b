#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Worm session in the terminal.

mod script;
mod terminal;

use std::{fs, io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use worm_core::{Command, GameConfig, GameStatus, Level};
use worm_rendering::{RenderingBackend, StatusBanner, TextFrame};
use worm_system_level_progression::{LevelInput, LevelProgression};
use worm_world::{self as world, query, World};

use crate::{script::ScriptStep, terminal::TerminalBackend};

/// Runs a headless Worm session and prints the board as text.
#[derive(Debug, Parser)]
#[command(name = "worm", version)]
struct Args {
    /// TOML file with game settings; missing keys keep their defaults.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Board width in cells, wall ring included.
    #[arg(long)]
    columns: Option<u32>,
    /// Board height in cells, wall ring included.
    #[arg(long)]
    rows: Option<u32>,
    /// Segments the worm starts with.
    #[arg(long)]
    initial_length: Option<u32>,
    /// Starting level, 1 (slowest) to 10 (fastest).
    #[arg(long, value_parser = parse_level)]
    level: Option<Level>,
    /// Seed for prize placement.
    #[arg(long)]
    seed: Option<u64>,
    /// One step per tick: U D L R steer, P pauses, N starts a new game,
    /// + and - change the level, '.' waits.
    #[arg(long, default_value = "")]
    script: String,
    /// Ticks to simulate.
    #[arg(long, default_value_t = 200)]
    ticks: u64,
    /// Print the board after every tick instead of only at the end.
    #[arg(long)]
    trace: bool,
    /// Color the board with ANSI escapes.
    #[arg(long)]
    color: bool,
}

impl Args {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("could not read {}", path.display()))?;
                parse_config(&text)
                    .with_context(|| format!("could not parse {}", path.display()))?
            }
            None => GameConfig::default(),
        };

        if let Some(columns) = self.columns {
            config.columns = columns;
        }
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(initial_length) = self.initial_length {
            config.initial_length = initial_length;
        }
        if let Some(level) = self.level {
            config.level = level;
        }
        if let Some(seed) = self.seed {
            config.rng_seed = seed;
        }
        Ok(config)
    }
}

fn parse_level(value: &str) -> std::result::Result<Level, String> {
    let raw: u8 = value.parse().map_err(|error| format!("{error}"))?;
    Level::try_from(raw).map_err(|error| error.to_string())
}

fn parse_config(text: &str) -> Result<GameConfig> {
    Ok(toml::from_str(text)?)
}

/// Entry point for the Worm command-line interface.
fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Args::parse();
    let config = args.game_config()?;
    let steps = script::parse(&args.script).context("invalid --script")?;
    let mut world = World::new(config).context("could not start the game")?;
    println!("{}", query::welcome_banner(&world));

    let stdout = io::stdout();
    let mut backend = TerminalBackend::new(stdout.lock(), args.color);
    run(&mut world, &steps, args.ticks, args.trace, &mut backend)?;

    println!(
        "status: {:?}, tick {}, length {}, prizes left {}, next level {}",
        query::status(&world),
        query::tick_index(&world),
        query::worm_length(&world),
        query::remaining_prizes(&world),
        query::next_level(&world).get()
    );
    Ok(())
}

/// Feeds one script step and one tick per iteration, keeping `frame` in sync
/// through the world's change log.
fn run<B>(
    world: &mut World,
    steps: &[ScriptStep],
    ticks: u64,
    trace: bool,
    backend: &mut B,
) -> Result<()>
where
    B: RenderingBackend,
{
    let (columns, rows) = query::dimensions(world);
    let mut frame = TextFrame::new(columns, rows);
    let _ = frame.apply(&world::drain_cell_changes(world));

    let mut progression = LevelProgression::new();
    let mut steps = steps.iter();
    let mut events = Vec::new();
    let mut commands = Vec::new();

    for _ in 0..ticks {
        let mut input = LevelInput::default();
        match steps.next() {
            Some(ScriptStep::Command(command)) => commands.push(*command),
            Some(ScriptStep::RaiseLevel) => input.raise = true,
            Some(ScriptStep::LowerLevel) => input.lower = true,
            Some(ScriptStep::Wait) | None => {}
        }
        commands.push(Command::Tick);
        for command in commands.drain(..) {
            world::apply(world, command, &mut events)?;
        }

        progression.handle(&events, input, query::next_level(world), &mut commands);
        for command in commands.drain(..) {
            world::apply(world, command, &mut events)?;
        }
        events.clear();

        let changes = world::drain_changes(world);
        if let Some(region) = frame.apply(&changes.cells) {
            debug!(
                "repainting {:?}..={:?} (full board: {})",
                region.min(),
                region.max(),
                region.is_full_board()
            );
        }
        if changes
            .statuses
            .iter()
            .any(|transition| transition.to == GameStatus::YouWin)
        {
            info!("{} games won", progression.wins());
        }

        let status = query::status(world);
        if trace {
            backend.present(&frame, StatusBanner::for_status(status))?;
        }
        if status.is_terminal() && steps.len() == 0 {
            break;
        }
    }

    if !trace {
        backend.present(&frame, StatusBanner::for_status(query::status(world)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use worm_core::ConfigError;

    #[derive(Default)]
    struct RecordingBackend {
        frames: Vec<(TextFrame, Option<StatusBanner>)>,
    }

    impl RenderingBackend for RecordingBackend {
        fn present(&mut self, frame: &TextFrame, banner: Option<StatusBanner>) -> Result<()> {
            self.frames.push((frame.clone(), banner));
            Ok(())
        }
    }

    fn args(extra: &[&str]) -> Args {
        Args::parse_from(std::iter::once("worm").chain(extra.iter().copied()))
    }

    #[test]
    fn toml_keys_are_optional() {
        let config = parse_config("columns = 20\nlevel = 7\n").expect("valid toml");

        assert_eq!(config.columns, 20);
        assert_eq!(config.rows, GameConfig::default().rows);
        assert_eq!(config.level, Level::new(7).expect("valid level"));
    }

    #[test]
    fn toml_rejects_unknown_keys_and_bad_levels() {
        assert!(parse_config("colums = 20\n").is_err());
        assert!(parse_config("level = 11\n").is_err());
    }

    #[test]
    fn flags_override_defaults() {
        let config = args(&["--columns", "16", "--rows", "9", "--level", "10", "--seed", "5"])
            .game_config()
            .expect("no config file");

        assert_eq!((config.columns, config.rows), (16, 9));
        assert_eq!(config.level, Level::MAX);
        assert_eq!(config.rng_seed, 5);
        assert_eq!(config.initial_length, 4);
    }

    #[test]
    fn level_flag_is_range_checked() {
        assert!(Args::try_parse_from(["worm", "--level", "0"]).is_err());
        assert_eq!(
            parse_level("12"),
            Err(ConfigError::LevelOutOfRange { level: 12 }.to_string())
        );
    }

    #[test]
    fn run_keeps_the_frame_in_sync_with_the_world() {
        let config = args(&["--level", "10"]).game_config().expect("defaults");
        let mut world = World::new(config).expect("valid config");
        let mut backend = RecordingBackend::default();
        let steps = script::parse("..U..").expect("valid script");

        run(&mut world, &steps, 5, true, &mut backend).expect("run succeeds");

        assert_eq!(backend.frames.len(), 5);
        let (last, banner) = backend.frames.last().expect("frames recorded");
        assert_eq!(*banner, None);
        assert_eq!(*last, TextFrame::from_board(&query::board_view(&world)));
    }

    #[test]
    fn reversal_ends_the_run_with_a_banner() {
        let config = args(&["--level", "10"]).game_config().expect("defaults");
        let mut world = World::new(config).expect("valid config");
        let mut backend = RecordingBackend::default();
        let steps = script::parse("L").expect("valid script");

        run(&mut world, &steps, 50, false, &mut backend).expect("run succeeds");

        assert_eq!(query::status(&world), GameStatus::GameOver);
        assert_eq!(query::tick_index(&world), 1);
        assert_eq!(backend.frames.len(), 1);
        assert_eq!(backend.frames[0].1, Some(StatusBanner::GameOver));
    }
}
