use anyhow::Result;
use clap::{Parser, ValueEnum};
use hide_seek::game::GameConfig;
use hide_seek::modes::{Playback, PlaybackConfig, TrainMode, VisualizeMode, run_headless};
use hide_seek::rl::{Policies, load_policies};
use hide_seek::settings::Settings;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_MODEL_PATH: &str = "models/policies.json";

#[derive(Parser)]
#[command(name = "hide-seek")]
#[command(version, about = "Seeker and hider agents trained with tabular Q-learning")]
struct Cli {
    /// What to run
    #[arg(long, default_value = "demo")]
    mode: Mode,

    /// JSON settings file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where trained tables are saved (train, demo) or loaded from (watch)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Number of training episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// Grid side length
    #[arg(long)]
    grid_size: Option<usize>,

    /// Walls placed per layout
    #[arg(long)]
    walls: Option<usize>,

    /// Turns before an episode is cut off
    #[arg(long)]
    max_steps: Option<usize>,

    /// Exploration rate during training
    #[arg(long)]
    epsilon: Option<f64>,

    /// Learning rate
    #[arg(long)]
    alpha: Option<f64>,

    /// Discount factor
    #[arg(long)]
    gamma: Option<f64>,

    /// Seed for reproducible layouts and exploration
    #[arg(long)]
    seed: Option<u64>,

    /// Playback turns per second
    #[arg(long)]
    fps: Option<u32>,

    /// Print playback snapshots as text instead of opening the TUI
    #[arg(long)]
    headless: bool,

    /// Episodes to print in headless playback
    #[arg(long, default_value = "1")]
    watch_episodes: usize,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Train both agents and save their tables
    Train,
    /// Watch previously saved tables play
    Watch,
    /// Train in memory, then watch the result
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    apply_overrides(&cli, &mut settings);

    match cli.mode {
        Mode::Train => {
            train(settings)?;
        }
        Mode::Watch => {
            let path = cli
                .model
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));
            let (policies, metadata) = load_policies(&path)?;
            info!(
                episodes_trained = metadata.episodes_trained,
                training_steps = metadata.training_steps,
                version = %metadata.version,
                "loaded tables from {:?}",
                path
            );

            // the saved layout settings win; only explicit flags change them
            let trained_size = metadata.game_config.grid_size;
            let mut game_config = metadata.game_config;
            apply_game_overrides(&cli, &mut game_config);
            if game_config.grid_size != trained_size {
                warn!(
                    trained = trained_size,
                    playing = game_config.grid_size,
                    "playing on a different grid size than the tables were trained on"
                );
            }

            watch(&cli, policies, game_config, settings.playback, settings.training.seed).await?;
        }
        Mode::Demo => {
            let game_config = settings.training.game_config.clone();
            let seed = settings.training.seed;
            let playback = settings.playback.clone();
            let policies = train(settings)?;
            watch(&cli, policies, game_config, playback, seed).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn train(settings: Settings) -> Result<Policies> {
    let mut train_mode = TrainMode::new(settings.training)?;
    train_mode.run()?;
    Ok(train_mode.into_policies())
}

async fn watch(
    cli: &Cli,
    policies: Policies,
    game_config: GameConfig,
    playback_config: PlaybackConfig,
    seed: Option<u64>,
) -> Result<()> {
    if cli.headless {
        let mut playback = Playback::new(policies, game_config, seed)?;
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        return run_headless(&mut playback, cli.watch_episodes, &mut out);
    }

    let mut visualize_mode = VisualizeMode::new(policies, game_config, playback_config, seed)?;
    visualize_mode.run().await
}

fn apply_overrides(cli: &Cli, settings: &mut Settings) {
    let training = &mut settings.training;
    if let Some(episodes) = cli.episodes {
        training.num_episodes = episodes;
    }
    if let Some(seed) = cli.seed {
        training.seed = Some(seed);
    }
    match cli.mode {
        Mode::Train => {
            if cli.model.is_some() || training.save_path.is_none() {
                training.save_path =
                    Some(cli.model.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)));
            }
        }
        Mode::Demo if cli.model.is_some() => training.save_path = cli.model.clone(),
        _ => {}
    }
    apply_game_overrides(cli, &mut training.game_config);

    let learning = &mut training.learning_config;
    if let Some(epsilon) = cli.epsilon {
        learning.epsilon = epsilon;
    }
    if let Some(alpha) = cli.alpha {
        learning.alpha = alpha;
    }
    if let Some(gamma) = cli.gamma {
        learning.gamma = gamma;
    }

    if let Some(fps) = cli.fps {
        settings.playback.fps = fps;
    }
}

fn apply_game_overrides(cli: &Cli, game_config: &mut GameConfig) {
    if let Some(size) = cli.grid_size {
        game_config.grid_size = size;
    }
    if let Some(walls) = cli.walls {
        game_config.num_walls = walls;
    }
    if let Some(max_steps) = cli.max_steps {
        game_config.max_steps = max_steps;
    }
}
