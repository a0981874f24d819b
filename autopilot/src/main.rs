use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use terminal_autopilot::replay::{run_replay, ReplayConfig, REPORT_FILE};
use terminal_autopilot::runner::play;
use terminal_autopilot::strategy::StrategyLayout;
use terminal_autopilot::util::parse_transcript_csv;
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "terminal-autopilot")]
#[command(about = "Rule-based lane-defense agent for the Terminal engine")]
struct Cli {
    /// Log filter used when RUST_LOG is unset. Logs always go to stderr.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play one game over stdin/stdout (what the engine's run script invokes)
    Play {
        #[arg(long)]
        strategy: Option<PathBuf>,
    },
    /// Replay recorded engine transcripts and summarize every decision
    Replay {
        /// Comma-separated transcript files or directories
        #[arg(long)]
        transcripts: String,
        #[arg(long, default_value = "replays")]
        out_dir: PathBuf,
        #[arg(long)]
        jobs: Option<usize>,
        #[arg(long)]
        strategy: Option<PathBuf>,
    },
    /// Print the default strategy layout as JSON
    Layout {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let Cli { log_level, command } = Cli::parse();
    init_tracing(&log_level);

    match command.unwrap_or(Commands::Play { strategy: None }) {
        Commands::Play { strategy } => {
            let layout = StrategyLayout::load(strategy.as_deref())?;
            play(layout)?;
        }
        Commands::Replay {
            transcripts,
            out_dir,
            jobs,
            strategy,
        } => {
            let layout = StrategyLayout::load(strategy.as_deref())?;
            let report = run_replay(ReplayConfig {
                transcripts: parse_transcript_csv(&transcripts)?,
                out_dir: out_dir.clone(),
                jobs,
                layout,
            })?;
            println!("runs={}", report.run_count);
            println!("turns={}", report.totals.turns);
            println!("completed_games={}", report.totals.completed_games);
            println!("deploy_orders={}", report.totals.deploy_orders);
            println!("report={}", out_dir.join(REPORT_FILE).display());
        }
        Commands::Layout { output } => {
            let encoded = serde_json::to_vec_pretty(&StrategyLayout::default())?;
            if let Some(path) = output {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, encoded)
                    .with_context(|| format!("failed writing {}", path.display()))?;
                println!("wrote={}", path.display());
            } else {
                println!("{}", String::from_utf8_lossy(&encoded));
            }
        }
    }

    Ok(())
}
