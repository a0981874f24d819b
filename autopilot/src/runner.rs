use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;
use terminal_core::protocol::{run, SessionSummary};

use crate::agent::{LaneAgent, TurnSummary};
use crate::strategy::StrategyLayout;

#[derive(Clone, Debug, Serialize)]
pub struct ReplayMetrics {
    pub transcript: String,
    pub session: SessionSummary,
    pub breaches_recorded: usize,
    pub malformed_frames: u32,
    pub build_orders: usize,
    pub deploy_orders: usize,
    pub turns: Vec<TurnSummary>,
}

#[derive(Clone, Debug)]
pub struct ReplayArtifact {
    pub metrics: ReplayMetrics,
    /// Exactly what the agent would have written to the engine.
    pub output: Vec<u8>,
}

/// Play one game over stdin/stdout.
pub fn play(layout: StrategyLayout) -> Result<SessionSummary> {
    let mut agent = LaneAgent::new(layout);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let summary = run(&mut agent, stdin.lock(), &mut writer).context("engine session failed")?;
    tracing::info!(
        turns = summary.turns,
        action_frames = summary.action_frames,
        game_over = summary.game_over,
        "session finished"
    );
    Ok(summary)
}

/// Feed a recorded engine transcript (one engine line per line) through a
/// fresh agent.
pub fn replay_transcript(path: &Path, layout: StrategyLayout) -> Result<ReplayArtifact> {
    let file = File::open(path).with_context(|| format!("failed opening {}", path.display()))?;
    let mut agent = LaneAgent::new(layout);
    let mut output = Vec::new();
    let session = run(&mut agent, BufReader::new(file), &mut output)
        .with_context(|| format!("replay failed for {}", path.display()))?;

    let turns = agent.turns().to_vec();
    let metrics = ReplayMetrics {
        transcript: path.display().to_string(),
        session,
        breaches_recorded: agent.strategy().scored_on().len(),
        malformed_frames: agent.malformed_frames(),
        build_orders: turns.iter().map(|t| t.build_orders).sum(),
        deploy_orders: turns.iter().map(|t| t.deploy_orders).sum(),
        turns,
    };
    Ok(ReplayArtifact { metrics, output })
}

pub fn write_output(path: &Path, output: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }
    fs::write(path, output).with_context(|| format!("failed writing {}", path.display()))?;
    Ok(())
}
