//! Scripted input: one step per simulated tick.

use std::{error::Error, fmt};

use worm_core::{Command, Heading};

/// Input applied before a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ScriptStep {
    /// Forward a command to the world.
    Command(Command),
    /// Ask the level progression system for a faster next game.
    RaiseLevel,
    /// Ask the level progression system for a slower next game.
    LowerLevel,
    /// Tick without input.
    Wait,
}

/// Parses a script such as `"RRU.P"` into steps.
///
/// `U D L R` steer, `P` toggles pause, `N` starts a new game, `+`/`-` change
/// the level and `.` waits. Letters are case-insensitive and whitespace is
/// skipped.
pub(crate) fn parse(script: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    script
        .chars()
        .enumerate()
        .filter(|(_, symbol)| !symbol.is_whitespace())
        .map(|(position, symbol)| {
            step_for(symbol).ok_or(ScriptError::UnknownSymbol { position, symbol })
        })
        .collect()
}

fn step_for(symbol: char) -> Option<ScriptStep> {
    let steer = |heading| Some(ScriptStep::Command(Command::SetDirection { heading }));
    match symbol.to_ascii_uppercase() {
        'U' => steer(Heading::Top),
        'D' => steer(Heading::Bottom),
        'L' => steer(Heading::Left),
        'R' => steer(Heading::Right),
        'P' => Some(ScriptStep::Command(Command::TogglePause)),
        'N' => Some(ScriptStep::Command(Command::NewGame)),
        '+' => Some(ScriptStep::RaiseLevel),
        '-' => Some(ScriptStep::LowerLevel),
        '.' => Some(ScriptStep::Wait),
        _ => None,
    }
}

/// Errors that can occur while parsing a script.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ScriptError {
    /// The script contained a character with no meaning.
    UnknownSymbol {
        /// Zero-based character offset.
        position: usize,
        /// Offending character.
        symbol: char,
    },
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSymbol { position, symbol } => {
                write!(f, "unknown script step '{symbol}' at position {position}")
            }
        }
    }
}

impl Error for ScriptError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_step_kind() {
        let steps = parse("uR p\tN+-.").expect("valid script");

        assert_eq!(
            steps,
            vec![
                ScriptStep::Command(Command::SetDirection {
                    heading: Heading::Top
                }),
                ScriptStep::Command(Command::SetDirection {
                    heading: Heading::Right
                }),
                ScriptStep::Command(Command::TogglePause),
                ScriptStep::Command(Command::NewGame),
                ScriptStep::RaiseLevel,
                ScriptStep::LowerLevel,
                ScriptStep::Wait,
            ]
        );
    }

    #[test]
    fn empty_script_has_no_steps() {
        assert_eq!(parse(""), Ok(Vec::new()));
    }

    #[test]
    fn reports_the_offending_symbol() {
        let error = parse("RRx").expect_err("x is not a step");

        assert_eq!(
            error,
            ScriptError::UnknownSymbol {
                position: 2,
                symbol: 'x'
            }
        );
        assert_eq!(error.to_string(), "unknown script step 'x' at position 2");
    }
}
