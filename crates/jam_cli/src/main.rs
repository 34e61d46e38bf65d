//! jam_cli - headless possession session runner
//!
//! Usage:
//!   jam_cli run --seed 42 --ticks 2400
//!   jam_cli run --seed 7 --multiplayer --difficulty 4
//!   RUST_LOG=jam_core=debug jam_cli run --config tournament.yaml
//!   jam_cli schema

mod script;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use jam_core::models::{PlayerStats, Score};
use jam_core::modifiers::DifficultyOutcome;
use jam_core::{
    authority_schema, AuthorityRole, EngineConfig, LoopbackHub, PassOptions, PlayerId, PossessionSession, ShotOptions,
    TeamSide,
};
use script::{Action, Script};

/// Ticks run with no input after the main loop so both replicas settle
const SETTLE_TICKS: u32 = 200;

#[derive(Parser)]
#[command(name = "jam_cli")]
#[command(about = "Run seeded 2-on-2 possession sessions headlessly", long_about = None)]
struct Cli {
    /// Debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive a scripted session and print the box score as JSON
    Run {
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Tick budget (stops early when the game clock runs out)
        #[arg(long, default_value_t = 2400)]
        ticks: u32,

        /// Engine config (.json / .yaml / .yml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Difficulty preset id ("1".."5", "NIGHTMARE")
        #[arg(long)]
        difficulty: Option<String>,

        /// Coordinator + client over the loopback hub
        #[arg(long, default_value = "false")]
        multiplayer: bool,
    },

    /// Print the JSON schema of the replicated authority messages
    Schema,
}

#[derive(Serialize)]
struct PlayerLine {
    id: PlayerId,
    name: String,
    team: TeamSide,
    stats: PlayerStats,
}

#[derive(Serialize)]
struct ReplicaCheck {
    client_score: Score,
    agreed: bool,
}

#[derive(Serialize)]
struct BoxScore {
    seed: u64,
    ticks: u64,
    score: Score,
    players: Vec<PlayerLine>,
    events: BTreeMap<&'static str, u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    multiplayer: Option<ReplicaCheck>,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run { seed, ticks, config, difficulty, multiplayer } => {
            let config = match config {
                Some(path) => EngineConfig::load(&path).with_context(|| format!("loading config {}", path.display()))?,
                None => EngineConfig::arcade(),
            };
            run(seed, ticks, config, difficulty.as_deref(), multiplayer)
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&authority_schema())?);
            Ok(())
        }
    }
}

fn apply_difficulty(session: &mut PossessionSession, id: &str) {
    match session.apply_difficulty(id) {
        DifficultyOutcome::Applied(preset) => info!("difficulty {} applied", preset),
        DifficultyOutcome::Unchanged => debug!("difficulty already applied"),
        DifficultyOutcome::Baseline => warn!("unknown difficulty '{}', keeping baseline", id),
    }
}

fn run(seed: u64, ticks: u32, config: EngineConfig, difficulty: Option<&str>, multiplayer: bool) -> Result<()> {
    let mut coordinator = PossessionSession::new(config.clone(), script::roster(), seed).context("starting session")?;
    let mut client = None;
    if multiplayer {
        let hub = LoopbackHub::new();
        coordinator = coordinator.with_role(AuthorityRole::Coordinator, Box::new(hub.coordinator()));
        let replica = PossessionSession::new(config, script::roster(), seed)
            .context("starting client session")?
            .with_role(AuthorityRole::Client, Box::new(hub.client()));
        client = Some(replica);
        info!("multiplayer session {}", hub.session());
    }
    if let Some(id) = difficulty {
        apply_difficulty(&mut coordinator, id);
        if let Some(client) = client.as_mut() {
            apply_difficulty(client, id);
        }
    }

    let mut script = Script::new();
    for _ in 0..ticks {
        if coordinator.is_finished() {
            break;
        }
        let plan = script.plan(coordinator.store().state(), coordinator.config());
        for (id, pos) in plan.moves {
            coordinator.move_player(id, pos)?;
            if let Some(client) = client.as_mut() {
                client.move_player(id, pos)?;
            }
        }
        if let Some(action) = plan.action {
            // away inputs go through the client when there is one
            let team = coordinator.store().state().team_of(action.actor());
            let target = match client.as_mut() {
                Some(client) if team == Some(TeamSide::Away) => client,
                _ => &mut coordinator,
            };
            perform(target, action);
        }
        coordinator.tick();
        if let Some(client) = client.as_mut() {
            client.tick();
        }
    }

    let replica = match client.as_mut() {
        Some(client) => {
            for _ in 0..SETTLE_TICKS {
                coordinator.tick();
                client.tick();
            }
            let client_score = client.store().state().score;
            Some(ReplicaCheck { client_score, agreed: client_score == coordinator.store().state().score })
        }
        None => None,
    };

    let state = coordinator.store().state();
    let report = BoxScore {
        seed,
        ticks: state.tick,
        score: state.score,
        players: state
            .players
            .iter()
            .map(|p| PlayerLine { id: p.id, name: p.name.clone(), team: p.team, stats: p.stats })
            .collect(),
        events: coordinator.bus().counts().iter().map(|(k, v)| (*k, *v)).collect(),
        multiplayer: replica,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(check) = &report.multiplayer {
        if !check.agreed {
            bail!("client score {:?} diverged from coordinator {:?}", check.client_score, report.score);
        }
    }
    Ok(())
}

fn perform(session: &mut PossessionSession, action: Action) {
    let result = match action {
        Action::Shoot(shooter) => session.attempt_shot(shooter, ShotOptions::default()).map(|o| format!("{:?}", o)),
        Action::Pass { passer, receiver } => {
            session.attempt_pass(passer, receiver, PassOptions::default()).map(|o| format!("{:?}", o))
        }
    };
    match result {
        Ok(outcome) => debug!("{:?} -> {}", action, outcome),
        Err(rejection) => debug!("{:?} rejected: {}", action, rejection),
    }
}
