//! Command types for pose control and inter-task communication.
//!
//! Defines the text commands a TCP client sends, their parsing, the [`CommandReader`]
//! that frames them out of a byte stream, and [`execute`], which runs a parsed command
//! against a [`Controller`].
//!
//! Used by the network and motion tasks.
use core::fmt::{self, Display, Formatter};
use core::str::FromStr;

use heapless::Vec;
use log::info;

use super::controller::{Controller, Pose};
use super::error::Error;
use crate::bus::Bus;
use crate::config::CENTER_DURATION_MS;
use crate::motion::clock::Clock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoseCommand {
    /// `c`: move every joint to the center position.
    Center,
    /// `r`: read the pose back from the servos.
    ReadPose,
    /// `m <ms> <p0> .. <pn>`: interpolate to a pose.
    Move { duration_ms: u32, pose: Pose },
    /// `p <id> <position>`: command a single servo directly.
    SetPosition { id: u8, position: u16 },
    /// `t <id> <0|1>`: torque off or on.
    Torque { id: u8, enable: bool },
    /// `q`: close the connection.
    CloseConnection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseCommandError {
    Empty,
    Unknown,
    MissingArgument,
    InvalidNumber,
    TooManyValues,
    InvalidUtf8,
    /// The line did not fit in the reader's buffer and was dropped.
    LineTooLong,
}

impl Display for ParseCommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ParseCommandError::Empty => "empty command",
            ParseCommandError::Unknown => "unknown command",
            ParseCommandError::MissingArgument => "missing argument",
            ParseCommandError::InvalidNumber => "invalid number",
            ParseCommandError::TooManyValues => "too many values",
            ParseCommandError::InvalidUtf8 => "line is not utf-8",
            ParseCommandError::LineTooLong => "line too long",
        };
        f.write_str(msg)
    }
}

fn number<T: FromStr>(token: Option<&str>) -> Result<T, ParseCommandError> {
    token
        .ok_or(ParseCommandError::MissingArgument)?
        .parse()
        .map_err(|_| ParseCommandError::InvalidNumber)
}

impl TryFrom<&str> for PoseCommand {
    type Error = ParseCommandError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut tokens = value.split_whitespace();

        let cmd = tokens.next().ok_or(ParseCommandError::Empty)?;
        let command = match cmd {
            "c" => PoseCommand::Center,
            "r" => PoseCommand::ReadPose,
            "q" => PoseCommand::CloseConnection,
            "m" => {
                let duration_ms = number(tokens.next())?;
                let mut pose = Pose::new();
                for token in tokens.by_ref() {
                    pose.push(number(Some(token))?)
                        .map_err(|_| ParseCommandError::TooManyValues)?;
                }
                if pose.is_empty() {
                    return Err(ParseCommandError::MissingArgument);
                }
                PoseCommand::Move { duration_ms, pose }
            }
            "p" => PoseCommand::SetPosition {
                id: number(tokens.next())?,
                position: number(tokens.next())?,
            },
            "t" => PoseCommand::Torque {
                id: number(tokens.next())?,
                enable: number::<u8>(tokens.next())? != 0,
            },
            _ => return Err(ParseCommandError::Unknown),
        };

        if tokens.next().is_some() {
            return Err(ParseCommandError::TooManyValues);
        }
        Ok(command)
    }
}

/// Splits a byte stream into `\n`-terminated lines and parses each as a [`PoseCommand`].
///
/// Bytes after the last newline are kept until a later chunk completes the line, so a
/// command split across reads is parsed once, whole. Blank lines are skipped.
#[derive(Debug, Default)]
pub struct CommandReader<const N: usize> {
    line: Vec<u8, N>,
    overflow: bool,
}

impl<const N: usize> CommandReader<N> {
    pub const fn new() -> Self {
        Self {
            line: Vec::new(),
            overflow: false,
        }
    }

    /// Bytes of an unfinished line held back from earlier chunks.
    pub fn pending(&self) -> &[u8] {
        &self.line
    }

    /// Consumes `input` up to and including the next complete line and returns its
    /// command. Returns `None` once `input` is exhausted without completing a line.
    pub fn next_command(
        &mut self,
        input: &mut &[u8],
    ) -> Option<Result<PoseCommand, ParseCommandError>> {
        while let Some((&byte, rest)) = input.split_first() {
            *input = rest;
            if byte != b'\n' {
                if self.line.push(byte).is_err() {
                    self.overflow = true;
                }
                continue;
            }

            let parsed = if self.overflow {
                Some(Err(ParseCommandError::LineTooLong))
            } else {
                match core::str::from_utf8(&self.line) {
                    Ok(text) if text.trim().is_empty() => None,
                    Ok(text) => Some(PoseCommand::try_from(text)),
                    Err(_) => Some(Err(ParseCommandError::InvalidUtf8)),
                }
            };
            self.line.clear();
            self.overflow = false;
            if parsed.is_some() {
                return parsed;
            }
        }
        None
    }
}

/// Runs `command` on `controller`. [`PoseCommand::CloseConnection`] belongs to the
/// connection and is a no-op here.
pub async fn execute<B, C>(
    controller: &mut Controller<B, C>,
    command: &PoseCommand,
) -> Result<(), Error<B::Error>>
where
    B: Bus,
    C: Clock,
{
    let stamp = "[MOTION]";
    match command {
        PoseCommand::Center => {
            let center = controller.config().center_position;
            let pose: Pose = controller.ids().iter().map(|_| center).collect();
            let frames = controller.move_to(&pose, CENTER_DURATION_MS).await?;
            info!("{stamp} centered in {frames} frames");
        }
        PoseCommand::ReadPose => {
            controller.read_current_pose().await?;
            info!("{stamp} pose {:?}", controller.current_pose());
        }
        PoseCommand::Move { duration_ms, pose } => {
            let frames = controller.move_to(pose, *duration_ms).await?;
            info!("{stamp} move done in {frames} frames");
        }
        PoseCommand::SetPosition { id, position } => {
            let status = controller.set_position(*id, *position).await?;
            info!("{stamp} servo {id} -> {position} ({status})");
        }
        PoseCommand::Torque { id, enable } => {
            let status = controller.set_torque(*id, *enable).await?;
            info!("{stamp} servo {id} torque {enable} ({status})");
        }
        PoseCommand::CloseConnection => {}
    }
    Ok(())
}
