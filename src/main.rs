//! Binary entrypoint for the itemlimit administration CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml` and an empty limits file
//! - `add <item> [quantity]` - set a cap (0 or no quantity bans the item)
//! - `remove <item>` - drop a cap
//! - `list [page]` - show the caps, paged
//! - `check <item>` - show one item's cap
//! - `clear` - drop every cap
//! - `status [--json]` - summary of the configuration and the registry
//!
//! Edits go through the same handler as the in-game `/itemlimit` command,
//! run as the console, so replies and audit lines match. A running server
//! picks up the file on its next start.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::info;

use itemlimit::config::Config;
use itemlimit::host::OpenCatalog;
use itemlimit::limits::commands::{handle_limit_command, CommandContext};
use itemlimit::limits::{CommandSender, LimitRegistry};
use itemlimit::storage::TomlLimitStore;

#[derive(Parser)]
#[command(name = "itemlimit")]
#[command(about = "Per-player item possession limits for game servers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a default configuration and an empty limits file
    Init,
    /// Limit an item type (omit the quantity or use 0 to ban it)
    Add {
        item: String,
        quantity: Option<String>,
    },
    /// Remove an item's limit
    Remove { item: String },
    /// List limited items
    List { page: Option<String> },
    /// Show the limit for one item type
    Check { item: String },
    /// Remove every limit
    Clear,
    /// Show configuration and registry summary
    Status {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args: Vec<String> = match cli.command {
        Commands::Init => {
            init_logging(&None, cli.verbose);
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
            let config = Config::load(&cli.config).await?;
            open_registry(&config).save()?;
            info!("Limits file ready at {}", config.limits_path().display());
            return Ok(());
        }
        Commands::Status { json } => {
            let config = load_config(&cli.config, cli.verbose).await?;
            return show_status(&config, json);
        }
        Commands::Add { item, quantity } => {
            let mut args = vec!["add".to_string(), item];
            args.extend(quantity);
            args
        }
        Commands::Remove { item } => vec!["remove".to_string(), item],
        Commands::List { page } => {
            let mut args = vec!["list".to_string()];
            args.extend(page);
            args
        }
        Commands::Check { item } => vec!["check".to_string(), item],
        Commands::Clear => vec!["clear".to_string()],
    };
    let config = load_config(&cli.config, cli.verbose).await?;
    run_admin_command(&config, &args)
}

async fn load_config(path: &str, verbosity: u8) -> Result<Config> {
    let config = Config::load(path).await?;
    init_logging(&Some(config.clone()), verbosity);
    Ok(config)
}

fn open_registry(config: &Config) -> LimitRegistry {
    let store = TomlLimitStore::new(config.limits_path());
    LimitRegistry::load(Box::new(store), &OpenCatalog, config.limiter.max_cap)
}

fn run_admin_command(config: &Config, args: &[String]) -> Result<()> {
    let mut registry = open_registry(config);
    let ctx = CommandContext {
        catalog: &OpenCatalog,
        messages: &config.messages,
        max_cap: config.limiter.max_cap,
        page_size: config.limiter.list_page_size,
    };
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let outcome = handle_limit_command(&mut registry, &ctx, &CommandSender::console(), &args);
    for line in &outcome.replies {
        println!("{}", line);
    }
    for line in &outcome.broadcasts {
        println!("[broadcast] {}", line);
    }
    match outcome.error {
        Some(e) => Err(anyhow!(e)),
        None => Ok(()),
    }
}

fn show_status(config: &Config, json: bool) -> Result<()> {
    let registry = open_registry(config);
    let entries = registry.sorted_entries();
    let banned = entries.iter().filter(|(_, cap)| *cap == 0).count();
    if json {
        let limits: serde_json::Map<String, serde_json::Value> = entries
            .iter()
            .map(|(item, cap)| (item.name().to_string(), serde_json::Value::from(*cap)))
            .collect();
        let payload = serde_json::json!({
            "deployment": config.limiter.deployment.name(),
            "limits_file": config.limits_path().display().to_string(),
            "limited": entries.len(),
            "banned": banned,
            "sweep_interval_ticks": config.limiter.sweep_interval_ticks,
            "ban_enforcement": config.limiter.ban_enforcement,
            "limits": limits,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }
    println!("{} v{}", config.limiter.deployment.name(), env!("CARGO_PKG_VERSION"));
    println!("Limits file: {}", config.limits_path().display());
    println!("Limited items: {} ({} banned)", entries.len(), banned);
    if config.limiter.sweep_interval_ticks == 0 {
        println!("Periodic sweep: disabled");
    } else {
        println!("Periodic sweep: every {} ticks", config.limiter.sweep_interval_ticks);
    }
    println!("Login enforcement delay: {} ticks", config.limiter.login_delay_ticks);
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity wins over the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });
    let audit_path = config.as_ref().and_then(|c| c.logging.audit_file.clone());

    match log_file {
        Some(f) => {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            // Foreground runs also echo to the console
            let is_tty = atty::is(atty::Stream::Stdout);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());

                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }

                if record.target() == "audit" {
                    if let Some(ref path) = audit_path {
                        if let Ok(mut af) = std::fs::OpenOptions::new()
                            .create(true)
                            .append(true)
                            .open(path)
                        {
                            let _ = writeln!(af, "{}", line);
                        }
                    }
                }

                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if record.target() == "audit" {
                    if let Some(ref path) = audit_path {
                        if let Ok(mut af) = std::fs::OpenOptions::new()
                            .create(true)
                            .append(true)
                            .open(path)
                        {
                            let _ = writeln!(af, "{}", line);
                        }
                    }
                }
                writeln!(fmt, "{}", line)
            });
        }
    }
    let _ = builder.try_init();
}
