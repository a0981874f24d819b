use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::runner::{replay_transcript, write_output, ReplayMetrics};
use crate::strategy::{PhaseSlot, StrategyLayout};
use crate::util::transcript_label;

pub const REPORT_FILE: &str = "replay-report.json";

#[derive(Clone, Debug)]
pub struct ReplayConfig {
    pub transcripts: Vec<PathBuf>,
    pub out_dir: PathBuf,
    pub jobs: Option<usize>,
    pub layout: StrategyLayout,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReplayRecord {
    pub label: String,
    pub output_path: String,
    pub metrics: ReplayMetrics,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ReplayTotals {
    pub turns: u32,
    pub action_frames: u32,
    pub completed_games: usize,
    pub breaches_recorded: usize,
    pub malformed_frames: u32,
    pub build_orders: usize,
    pub deploy_orders: usize,
    pub accepted: usize,
    pub rejected: usize,
    /// Turn counts per dispatch slot, keyed by slot name.
    pub slots: BTreeMap<String, u32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReplayReport {
    pub generated_unix_s: u64,
    pub jobs: Option<usize>,
    pub run_count: usize,
    pub totals: ReplayTotals,
    pub runs: Vec<ReplayRecord>,
}

pub fn run_replay(config: ReplayConfig) -> Result<ReplayReport> {
    if config.transcripts.is_empty() {
        return Err(anyhow!("replay requires at least one transcript"));
    }
    if let Some(jobs) = config.jobs {
        if jobs == 0 {
            return Err(anyhow!("replay --jobs must be >= 1 when provided"));
        }
    }
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed creating {}", config.out_dir.display()))?;

    let run_one = |(index, path): (usize, &PathBuf)| -> Result<ReplayRecord> {
        let artifact = replay_transcript(path, config.layout.clone())?;
        let label = format!("{index:03}-{}", transcript_label(path));
        let output_path = config.out_dir.join(format!("{label}.out"));
        write_output(&output_path, &artifact.output)?;
        Ok(ReplayRecord {
            label,
            output_path: output_path.display().to_string(),
            metrics: artifact.metrics,
        })
    };

    let results: Vec<Result<ReplayRecord>> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| config.transcripts.par_iter().enumerate().map(run_one).collect())
    } else {
        config.transcripts.par_iter().enumerate().map(run_one).collect()
    };

    let mut runs = Vec::with_capacity(results.len());
    for result in results {
        runs.push(result?);
    }

    let report = ReplayReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        jobs: config.jobs,
        run_count: runs.len(),
        totals: totals(&runs),
        runs,
    };

    let report_path = config.out_dir.join(REPORT_FILE);
    fs::write(
        &report_path,
        serde_json::to_vec_pretty(&report).context("failed to serialize replay report")?,
    )
    .with_context(|| format!("failed writing {}", report_path.display()))?;

    Ok(report)
}

fn totals(runs: &[ReplayRecord]) -> ReplayTotals {
    let mut totals = ReplayTotals::default();
    for run in runs {
        let metrics = &run.metrics;
        totals.turns += metrics.session.turns;
        totals.action_frames += metrics.session.action_frames;
        totals.completed_games += usize::from(metrics.session.game_over);
        totals.breaches_recorded += metrics.breaches_recorded;
        totals.malformed_frames += metrics.malformed_frames;
        totals.build_orders += metrics.build_orders;
        totals.deploy_orders += metrics.deploy_orders;
        for turn in &metrics.turns {
            totals.accepted += turn.accepted;
            totals.rejected += turn.rejected;
            if let Some(slot) = turn.slot {
                *totals.slots.entry(slot_name(slot).to_string()).or_default() += 1;
            }
        }
    }
    totals
}

fn slot_name(slot: PhaseSlot) -> &'static str {
    match slot {
        PhaseSlot::Hold => "hold",
        PhaseSlot::Attack => "attack",
        PhaseSlot::Fortify => "fortify",
        PhaseSlot::Defend => "defend",
    }
}
