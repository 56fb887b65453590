//! Robot commands and the recorder that timestamps them.

use robotml_types::ast::{Direction, Unit};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Direction of a `move` command, as the simulator expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

impl From<Direction> for MoveDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Forward => MoveDirection::Forward,
            Direction::Backward => MoveDirection::Backward,
            Direction::Left => MoveDirection::Left,
            Direction::Right => MoveDirection::Right,
        }
    }
}

/// What the robot is told to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CommandKind {
    /// Rotate by `angle` degrees; negative turns the other way.
    Turn { angle: f64 },
    /// Travel `distance` along `direction`. Backward moves carry a negative
    /// distance.
    Move {
        distance: f64,
        unit: Unit,
        direction: MoveDirection,
    },
    SetSpeed { value: f64 },
}

/// A command together with the logical time it was issued at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotCommand {
    #[serde(flatten)]
    pub kind: CommandKind,
    pub timestamp: u64,
}

/// Output of one interpreter run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterpreterResult {
    pub commands: Vec<RobotCommand>,
    /// The timestamp of every command, in order.
    pub timestamps: Vec<u64>,
}

impl InterpreterResult {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Command kinds without their timestamps.
    pub fn kinds(&self) -> impl Iterator<Item = &CommandKind> {
        self.commands.iter().map(|c| &c.kind)
    }
}

/// Appends commands with a logical clock that starts at 1 and advances by
/// exactly one per command.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    commands: Vec<RobotCommand>,
    clock: u64,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a command and return the timestamp it was given.
    pub fn record(&mut self, kind: CommandKind) -> u64 {
        self.clock += 1;
        debug!(timestamp = self.clock, command = ?kind, "robot command");
        self.commands.push(RobotCommand {
            kind,
            timestamp: self.clock,
        });
        self.clock
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn finish(self) -> InterpreterResult {
        let timestamps = self.commands.iter().map(|c| c.timestamp).collect();
        InterpreterResult {
            commands: self.commands,
            timestamps,
        }
    }
}
