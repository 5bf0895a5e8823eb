//! Movement commands shared by the speech and gesture input paths

pub mod speech;

pub use speech::{SpeechEvent, SpeechFault, SpeechIntake, SpeechOutcome};

use serde::{Deserialize, Serialize};

/// A discrete movement command applied to the airplane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Up,
    Down,
    Left,
    Right,
    /// No movement (hand near center, or nothing recognized)
    None,
}

impl Default for Command {
    fn default() -> Self {
        Self::None
    }
}

impl Command {
    /// True for the four directional commands
    pub fn is_motion(self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::None => "none",
        }
    }
}

/// Keyword scan order is fixed so multi-keyword transcripts always
/// produce commands in the same sequence.
const KEYWORDS: [(&str, Command); 4] = [
    ("up", Command::Up),
    ("down", Command::Down),
    ("left", Command::Left),
    ("right", Command::Right),
];

/// Extract movement commands from a transcript.
///
/// Matching is case-insensitive substring containment; every keyword
/// present in the transcript yields one command.
pub fn commands_in_transcript(text: &str) -> Vec<Command> {
    let lowered = text.to_lowercase();
    let mut commands = Vec::new();
    for (keyword, command) in KEYWORDS {
        if lowered.contains(keyword) {
            commands.push(command);
        }
    }
    commands
}
