use zerog_project::{
    load_accounts, parse_tx_count, AccountRunner, RandomSelector, Scheduler, ZeroGConfig,
    ZeroGSessions,
};

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use core_logic::{setup_logger, IpifyProbe, ProxyPool};
use dialoguer::{theme::ColorfulTheme, Input};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};

const BANNER: &str = r#"
  ██████╗  ██████╗     ███████╗██╗    ██╗ █████╗ ██████╗
 ██╔═████╗██╔════╝     ██╔════╝██║    ██║██╔══██╗██╔══██╗
 ██║██╔██║██║  ███╗    ███████╗██║ █╗ ██║███████║██████╔╝
 ████╔╝██║██║   ██║    ╚════██║██║███╗██║██╔══██║██╔═══╝
 ╚██████╔╝╚██████╔╝    ███████║╚███╔███╔╝██║  ██║██║
  ╚═════╝  ╚═════╝     ╚══════╝ ╚══╝╚══╝ ╚═╝  ╚═╝╚═╝
"#;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Optional TOML file overriding the built-in testnet settings
    #[arg(short, long)]
    config: Option<String>,
    /// Private key file, one key per line
    #[arg(short, long)]
    keys: Option<String>,
    /// Proxy list, one URI per line
    #[arg(short, long)]
    proxies: Option<String>,
    /// Daily transaction count per account; prompts when omitted
    #[arg(short, long)]
    tx_count: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_guard = setup_logger();

    if let Err(e) = run(Args::parse()).await {
        error!("Fatal: {:#}", e);
        drop(log_guard);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    println!("{}", BANNER.cyan().bold());
    println!("{}", "  0G Newton testnet swap bot".cyan());
    println!();

    let config = match ZeroGConfig::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:#}", e);
            return Ok(());
        }
    };
    info!("Configuration loaded for chain ID: {}", config.chain_id);

    let raw_count = match args.tx_count {
        Some(count) => count,
        None => Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt("Enter daily transaction count")
            .interact_text()?,
    };
    let daily_tx_count = match parse_tx_count(&raw_count) {
        Ok(count) => count,
        Err(e) => {
            error!("{}", e);
            return Ok(());
        }
    };

    let key_file = args.keys.unwrap_or_else(|| config.key_file.clone());
    let accounts = match load_accounts(&key_file) {
        Ok(accounts) => accounts,
        Err(e) => {
            error!("Failed to load keys from {}: {:#}", key_file, e);
            return Ok(());
        }
    };
    info!("Loaded {} accounts from {}", accounts.len(), key_file);

    let proxy_file = args.proxies.unwrap_or_else(|| config.proxy_file.clone());
    let probe = IpifyProbe::new(config.ip_probe_url.clone(), config.probe_timeout());
    let proxies = ProxyPool::load(&proxy_file, Box::new(probe));

    let interval = config.pass_interval();
    let sessions = ZeroGSessions::new(config)?;
    let selector = RandomSelector::new(StdRng::from_entropy(), sessions.contracts());
    let runner = AccountRunner::new(
        sessions,
        proxies,
        selector,
        StdRng::from_entropy(),
        daily_tx_count,
    );

    info!(
        "Running {} transactions per account, every {} hours",
        daily_tx_count,
        interval.as_secs() / 3600
    );
    Scheduler::new(runner, accounts, interval).run().await;
    Ok(())
}
