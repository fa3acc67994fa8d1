//! Queue Simulator CLI Tool
//!
//! Drives a matchmaking engine the way a host process would: admits a synthetic
//! stream of participants and calls `tick` on a fixed cadence until enough
//! participants have been matched.
//!
//! Usage:
//!   cargo run --bin queue-sim -- --help
//!   cargo run --bin queue-sim -- --total 500 --admit-every-ms 5 --tick-ms 20
//!   cargo run --bin queue-sim -- --config queue.toml --json --seed 7
//!   cargo run --bin queue-sim -- --total 200 --metrics

use anyhow::Result;
use clap::Parser;
use parlor_queue::config::AppConfig;
use parlor_queue::queue::MatchmakingEngine;
use parlor_queue::types::{Category, MatchedGroup, Preference};
use parlor_queue::utils::current_timestamp;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use tokio::signal;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

/// Parlor Queue Simulator - synthetic load for the matchmaking engine
#[derive(Parser)]
#[command(
    name = "queue-sim",
    version,
    about = "Feeds synthetic participants into the parlor-queue engine and reports matches"
)]
struct Args {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", help = "Path to configuration file (TOML format)")]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(short, long, value_name = "LEVEL", help = "Override log level (trace, debug, info, warn, error)")]
    log_level: Option<String>,

    /// Stop after this many participants have been matched
    #[arg(long, default_value = "3000")]
    total: u64,

    /// Milliseconds between synthetic admissions
    #[arg(long, default_value = "2")]
    admit_every_ms: u64,

    /// Milliseconds between engine ticks
    #[arg(long, default_value = "10")]
    tick_ms: u64,

    /// Widen interval override in seconds
    #[arg(long, value_name = "SECONDS")]
    widen_interval: Option<u64>,

    /// Print each formed group as a JSON line on stdout
    #[arg(long)]
    json: bool,

    /// Seed for the participant generator
    #[arg(long)]
    seed: Option<u64>,

    /// Seconds to keep ticking after the last admission before giving up
    #[arg(long, default_value = "60")]
    drain_seconds: u64,

    /// Print Prometheus metrics on stderr when the simulation ends
    #[arg(long)]
    metrics: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load configuration from file or environment, then apply CLI overrides
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::from_env()?,
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }
    if let Some(seconds) = args.widen_interval {
        config.engine.widen_interval_seconds = seconds;
    }

    parlor_queue::config::validate_config(&config)?;
    Ok(config)
}

/// Synthetic participant tiers: (id prefix, lowest rating, weight out of 10)
const TIERS: [(&str, i32, u32); 3] = [
    ("beginner", 1000, 4),
    ("intermediate", 1500, 4),
    ("expert", 2000, 2),
];

/// Generates participants across skill tiers
struct ParticipantGenerator {
    rng: StdRng,
    next_suffix: u64,
    max_category: Category,
    max_exponent: u32,
}

impl ParticipantGenerator {
    fn new(seed: Option<u64>, config: &AppConfig) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            rng,
            next_suffix: 0,
            max_category: config.engine.max_category,
            max_exponent: config.engine.max_group_size.trailing_zeros(),
        }
    }

    fn next_participant(&mut self) -> (String, Preference) {
        let roll = self.rng.gen_range(1..=10);
        let mut threshold = 0;
        let (prefix, base_rating, _) = TIERS
            .iter()
            .copied()
            .find(|(_, _, weight)| {
                threshold += weight;
                roll <= threshold
            })
            .unwrap_or(TIERS[0]);

        let rating = base_rating + self.rng.gen_range(0..500);
        let category = self.rng.gen_range(1..=self.max_category);
        let exponent = self.rng.gen_range(1.min(self.max_exponent)..=self.max_exponent);
        let group_size = 1u32 << exponent;

        let id = format!("{}_{}", prefix, self.next_suffix);
        self.next_suffix += 1;

        (id, Preference::new(rating, category, group_size))
    }
}

/// Wait for Ctrl+C
async fn wait_for_shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Parlor Queue Simulator");
    info!("   Service: {}", config.service.name);
    info!(
        "   Categories: 1..={}, group sizes up to {}",
        config.engine.max_category, config.engine.max_group_size
    );
    info!("   Widen interval: {}s", config.engine.widen_interval_seconds);
    info!("   Target matched participants: {}", args.total);

    let formed: Rc<RefCell<Vec<MatchedGroup<String>>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = formed.clone();
    let mut engine = MatchmakingEngine::new(
        config.engine.clone(),
        move |category: Category, ids: Vec<String>| {
            sink.borrow_mut().push(MatchedGroup {
                category,
                group_size: ids.len() as u32,
                ids,
                formed_at: current_timestamp(),
            });
        },
    )?;

    let mut generator = ParticipantGenerator::new(args.seed, &config);
    let mut admit_interval = interval(Duration::from_millis(args.admit_every_ms.max(1)));
    let mut tick_interval = interval(Duration::from_millis(args.tick_ms.max(1)));
    admit_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = wait_for_shutdown_signal();
    tokio::pin!(shutdown);

    let mut admitted: u64 = 0;
    let mut matched: u64 = 0;
    let mut drain_deadline: Option<Instant> = None;

    while matched < args.total {
        tokio::select! {
            _ = admit_interval.tick(), if admitted < args.total => {
                let (id, preference) = generator.next_participant();
                match engine.admit(id.clone(), preference) {
                    Ok(estimate) => {
                        admitted += 1;
                        if admitted == args.total {
                            drain_deadline = Some(Instant::now() + Duration::from_secs(args.drain_seconds));
                        }
                        info!(
                            "Admitted {:<20} rating: {:<4} category: {:<2} size: {:<2} estimated wait: {}s",
                            id, preference.rating, preference.category, preference.group_size, estimate
                        );
                    }
                    Err(e) => warn!("Admission of {} failed (code {}): {}", id, e.code(), e),
                }
            }
            _ = tick_interval.tick() => {
                engine.tick();

                for group in formed.borrow_mut().drain(..) {
                    matched += group.ids.len() as u64;
                    if args.json {
                        match serde_json::to_string(&group) {
                            Ok(line) => println!("{}", line),
                            Err(e) => warn!("Failed to serialize group: {}", e),
                        }
                    }
                    info!(
                        "Match complete - category: {}, size: {}, members: {:?}, matched: {}, waiting: {}",
                        group.category, group.group_size, group.ids, matched, engine.len()
                    );
                }

                if drain_deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                    warn!(
                        "No complete groups left to form - {} participant(s) still waiting",
                        engine.len()
                    );
                    break;
                }
            }
            _ = &mut shutdown => {
                info!("Received Ctrl+C, stopping simulation");
                break;
            }
        }
    }

    let stats = engine.stats();
    info!(
        "Simulation finished - admitted: {}, matched: {}, groups: {}, widenings: {}, still waiting: {}",
        stats.participants_admitted,
        stats.participants_matched,
        stats.groups_formed,
        stats.widenings,
        stats.participants_waiting
    );

    let mut keys: Vec<_> = engine.wait_statistics().all().keys().copied().collect();
    keys.sort();
    for key in keys {
        if let Some(wait) = engine.wait_statistics().get(&key) {
            info!(
                "  bucket {}: {} matched, mean wait {:.1}s, max {:.1}s",
                key,
                wait.sample_count,
                wait.mean().as_secs_f64(),
                wait.max().as_secs_f64()
            );
        }
    }

    if args.metrics {
        let metrics = engine.metrics();
        metrics.update_from_engine_stats(&stats);
        eprint!("{}", metrics.encode_text()?);
    }

    Ok(())
}
