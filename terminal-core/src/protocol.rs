//! The engine's line protocol.
//!
//! The engine writes one JSON document per line on our stdin and expects two
//! lines back (build stack, then deploy stack) after every deploy-phase frame.

use serde::Serialize;
use serde_json::Value;
use std::io::{BufRead, Write};

use crate::config::GameConfig;
use crate::constants::PHASE_DEPLOY;
use crate::error::FrameError;
use crate::frame::{EngineMessage, TurnFrame};
use crate::state::Submission;

/// Callbacks driven by [`run`].
pub trait AlgoCore {
    fn on_game_start(&mut self, config: &GameConfig) -> Result<(), FrameError>;

    /// Decide one turn. An error still answers the engine, with an empty turn.
    fn on_turn(&mut self, frame: &TurnFrame) -> Result<Submission, FrameError>;

    fn on_action_frame(&mut self, frame: &TurnFrame);
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub turns: u32,
    pub action_frames: u32,
    pub skipped_lines: u32,
    pub game_over: bool,
}

/// Pump engine lines into `algo` until game over or end of input.
pub fn run<A, R, W>(algo: &mut A, reader: R, writer: &mut W) -> Result<SessionSummary, FrameError>
where
    A: AlgoCore,
    R: BufRead,
    W: Write,
{
    let mut summary = SessionSummary::default();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match EngineMessage::parse(line) {
            Ok(EngineMessage::Config(config)) => {
                tracing::info!(units = config.unit_information.len(), "game config received");
                algo.on_game_start(&config)?;
            }
            Ok(EngineMessage::Turn(frame)) => {
                let submission = algo.on_turn(&frame).unwrap_or_else(|err| {
                    tracing::error!(turn = frame.turn_number(), %err, "turn failed; submitting no orders");
                    Submission::empty()
                });
                submit(writer, &submission)?;
                summary.turns += 1;
            }
            Ok(EngineMessage::ActionFrame(frame)) => {
                algo.on_action_frame(&frame);
                summary.action_frames += 1;
            }
            Ok(EngineMessage::GameOver) => {
                tracing::info!(turns = summary.turns, "game over");
                summary.game_over = true;
                break;
            }
            Err(err) if declares_deploy_phase(line) => {
                tracing::error!(%err, "unreadable turn frame; submitting no orders");
                submit(writer, &Submission::empty())?;
                summary.turns += 1;
            }
            Err(err) => {
                tracing::warn!(%err, "skipping unreadable engine line");
                summary.skipped_lines += 1;
            }
        }
    }

    Ok(summary)
}

/// Write both stacks, flushing after each line.
pub fn submit<W: Write>(writer: &mut W, submission: &Submission) -> Result<(), FrameError> {
    writeln!(writer, "{}", submission.build)?;
    writer.flush()?;
    writeln!(writer, "{}", submission.deploy)?;
    writer.flush()?;
    Ok(())
}

// The engine waits for an answer to every deploy frame, even one we cannot read.
fn declares_deploy_phase(line: &str) -> bool {
    serde_json::from_str::<Value>(line)
        .ok()
        .and_then(|value| value.get("turnInfo")?.get(0)?.as_f64())
        .is_some_and(|phase| phase as i64 == PHASE_DEPLOY)
}
