// Native CLI for nuibridge - issue host events and watch live data

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::sync::Arc;

use nuibridge::{
    config::{BridgeArgs, Config},
    environment::{self, HostSignals},
    fingerprint::{Fingerprint, IdOrder},
    poller::{LivePoller, RawSource},
    preferences::{self, PreferenceStore, ThemePreference},
    view::{LoadState, Notice},
    FetchOptions, NuiBridge,
};

/// nuibridge - talk to the game-server host the way the admin panel does
#[derive(Parser, Debug)]
#[command(name = "nuibridge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Request bridge for the game-server admin panel", long_about = None)]
struct Cli {
    #[command(flatten)]
    bridge: BridgeArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Issue one event and print the response
    Call {
        /// Event name (e.g. getPlayers)
        event: String,
        /// JSON payload
        #[arg(long)]
        payload: Option<String>,
        /// JSON value returned in browser mode or when the host fails
        #[arg(long)]
        fallback: Option<String>,
        /// Per-call timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Poll an event and print every change
    Watch {
        /// Event name (e.g. getPlayers)
        event: String,
        /// JSON payload
        #[arg(long)]
        payload: Option<String>,
        /// Record field to fingerprint; whole response when omitted
        #[arg(long)]
        id_field: Option<String>,
        /// Treat a reorder of the same records as a change
        #[arg(long)]
        ordered: bool,
    },
    /// Show or change the persisted theme preference
    Theme {
        /// New theme: dark, light or system
        value: Option<ThemePreference>,
    },
}

fn parse_json(raw: Option<&str>, what: &str) -> Result<Option<Value>> {
    raw.map(|s| serde_json::from_str(s).with_context(|| format!("Invalid {what} JSON: {s}")))
        .transpose()
}

fn print_notice(notice: &Notice) {
    eprintln!("[{:?}] {}: {}", notice.level, notice.title, notice.description);
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();
    nuibridge::platform::init_logging(log::Level::Info);

    let cli = Cli::parse();
    let cfg = Config::from_args(cli.bridge).context("Failed to load configuration")?;
    cfg.log_summary();

    let env = environment::install(cfg.environment(&HostSignals::detect()));
    let bridge = Arc::new(NuiBridge::from_config(&cfg, env));

    match cli.command {
        Command::Call {
            event,
            payload,
            fallback,
            timeout_ms,
        } => {
            let payload = parse_json(payload.as_deref(), "payload")?;
            let mut opts = FetchOptions::<Value>::new();
            opts.fallback = parse_json(fallback.as_deref(), "fallback")?;
            if let Some(ms) = timeout_ms {
                opts = opts.timeout(std::time::Duration::from_millis(ms));
            }

            let response = bridge
                .fetch_nui(&event, payload.as_ref(), opts)
                .await
                .with_context(|| format!("{event} failed"))?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Watch {
            event,
            payload,
            id_field,
            ordered,
        } => {
            let payload = parse_json(payload.as_deref(), "payload")?;
            let order = if ordered {
                IdOrder::Sensitive
            } else {
                IdOrder::Insensitive
            };
            let source = RawSource::<Value>::new(bridge.clone(), event.clone(), payload);
            let (poller, mut rx) =
                LivePoller::new(source, cfg.poll_interval, move |v: &Value| match &id_field {
                    Some(key) => Fingerprint::of_json_ids(v, key, order),
                    None => Fingerprint::of_json(v),
                });
            let handle = poller.spawn();
            let mut state: LoadState<Value> = LoadState::default();

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    next = rx.recv() => {
                        let Some(update) = next else { break };
                        if let Some(notice) = state.apply(update, &event, |v| {
                            v.is_null() || v.as_array().is_some_and(|a| a.is_empty())
                        }) {
                            print_notice(&notice);
                        }
                        match &state {
                            LoadState::Ready(v) => println!("{}", serde_json::to_string_pretty(v)?),
                            other => {
                                if let Some(text) = other.placeholder() {
                                    println!("{text}");
                                }
                            }
                        }
                    }
                }
            }

            if let Some(stats) = handle.stop().await {
                log::info!(
                    "[nui][watch] {} cycles, {} updates, {} unchanged, {} failures",
                    stats.cycles,
                    stats.updates,
                    stats.unchanged,
                    stats.failures
                );
            }
        }
        Command::Theme { value } => {
            let store = PreferenceStore::new(&cfg.prefs_path);
            match value {
                None => println!("{}", store.load_theme()?),
                Some(theme) => {
                    store.save_theme(theme)?;
                    preferences::sync_theme(&bridge, theme).await;
                    println!("{theme}");
                }
            }
        }
    }

    Ok(())
}
