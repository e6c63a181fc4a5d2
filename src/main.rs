mod gateway;

use clap::{Parser, Subcommand};
use parrot_channels::{qr::generate_qr_terminal, telegram::TelegramChannel, whatsapp::WhatsAppChannel};
use parrot_core::{config, shellexpand, traits::Channel};
use parrot_store::Store;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "parrot", version, about = "Parrot — auto-reply relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the relay.
    Start,
    /// Check configuration and bridge reachability.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start => start(&cli.config).await,
        Commands::Status => status(&cli.config).await,
    }
}

async fn start(config_path: &str) -> anyhow::Result<()> {
    let cfg = config::load(config_path)?;
    let _log_guard = init_logging(&cfg)?;

    // Build channels.
    let mut channels: HashMap<String, Arc<dyn Channel>> = HashMap::new();
    let mut whatsapp: Option<Arc<WhatsAppChannel>> = None;

    if let Some(ref tg) = cfg.channel.telegram {
        if tg.enabled {
            if tg.bot_token.is_empty() {
                anyhow::bail!(
                    "Telegram is enabled but bot_token is empty. \
                     Set it in config.toml."
                );
            }
            let channel = TelegramChannel::new(tg.clone());
            channels.insert("telegram".to_string(), Arc::new(channel));
        }
    }

    if let Some(ref wa) = cfg.channel.whatsapp {
        if wa.enabled {
            let channel = Arc::new(WhatsAppChannel::new(wa.clone()));
            whatsapp = Some(channel.clone());
            channels.insert("whatsapp".to_string(), channel);
        }
    }

    if channels.is_empty() {
        anyhow::bail!("No channels enabled. Enable at least one channel in config.toml.");
    }

    // Build the store. Failure here is fatal, before any command handling.
    let store = Store::new(&cfg.store).await?;

    // Surface the pairing QR in the terminal until the bridge links.
    if let Some(wa) = whatsapp {
        tokio::spawn(pairing_display(wa));
    }

    println!("Parrot — starting relay...");
    let gw = Arc::new(gateway::Gateway::new(
        channels,
        store,
        cfg.auth.clone(),
        cfg.reply.clone(),
    ));
    gw.run().await
}

async fn status(config_path: &str) -> anyhow::Result<()> {
    let cfg = config::load(config_path)?;
    println!("Parrot — Status Check\n");
    println!("Config: {config_path}");
    println!("Store:  {}", shellexpand(&cfg.store.db_path));
    println!(
        "Auth:   {}",
        if cfg.auth.admins.is_empty() {
            "open mode (no admins configured)".to_string()
        } else {
            format!("{} admin(s)", cfg.auth.admins.len())
        }
    );
    println!();

    match cfg.channel.telegram {
        Some(ref tg) if tg.enabled && !tg.bot_token.is_empty() => {
            println!("  telegram: configured")
        }
        Some(ref tg) if tg.enabled => println!("  telegram: enabled but missing bot_token"),
        Some(_) => println!("  telegram: disabled"),
        None => println!("  telegram: not configured"),
    }

    match cfg.channel.whatsapp {
        Some(ref wa) if wa.enabled => {
            let channel = WhatsAppChannel::new(wa.clone());
            match channel.probe().await {
                Ok(true) => println!("  whatsapp: bridge linked"),
                Ok(false) => println!("  whatsapp: bridge reachable, pairing required"),
                Err(e) => println!("  whatsapp: {e}"),
            }
        }
        Some(_) => println!("  whatsapp: disabled"),
        None => println!("  whatsapp: not configured"),
    }

    Ok(())
}

/// Initialize tracing: console output plus a daily-rolling file in
/// `{data_dir}/logs`. The returned guard must stay alive for the process.
fn init_logging(cfg: &config::Config) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    let logs_dir = PathBuf::from(shellexpand(&cfg.parrot.data_dir)).join("logs");
    std::fs::create_dir_all(&logs_dir)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.parrot.log_level.clone()));

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "parrot.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    Ok(guard)
}

/// Render pairing QR codes until the WhatsApp bridge reports a linked session.
async fn pairing_display(wa: Arc<WhatsAppChannel>) {
    let mut shown: Option<String> = None;
    loop {
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;

        if wa.is_connected() {
            if shown.is_some() {
                println!("WhatsApp linked.");
            }
            return;
        }

        if let Some(code) = wa.current_qr().await {
            if shown.as_deref() != Some(code.as_str()) {
                match generate_qr_terminal(&code) {
                    Ok(rendered) => {
                        println!("\nScan with WhatsApp to link this relay:\n{rendered}")
                    }
                    Err(e) => tracing::warn!("failed to render pairing QR: {e}"),
                }
                shown = Some(code);
            }
        }
    }
}
