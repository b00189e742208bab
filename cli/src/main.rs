//! chainrelay CLI — exercise RPC provider facades from the terminal.
//!
//! Usage:
//! ```bash
//! # Test an endpoint through a vendor facade
//! chainrelay test --provider publicnode --network eth_mainnet --transport wss
//!
//! # Send a raw JSON-RPC call
//! chainrelay call --provider alchemy --token $KEY --method eth_getBalance \
//!     --params '["0x0000000000000000000000000000000000000000", "latest"]'
//!
//! # Load settings from a JSON file
//! chainrelay test --config provider.json
//! ```

mod logging;

use std::env;
use std::process;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use serde_json::Value;

use chainrelay_core::events::{CONNECT, DISCONNECT};
use chainrelay_core::{Network, ProviderEvent, Transport};
use chainrelay_providers::{ProviderConfig, ProviderKind, RelayProvider};

/// Environment variable consulted when `--token` is absent.
const TOKEN_ENV: &str = "CHAINRELAY_TOKEN";

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let level = parse_flag(&args, "--log-level").unwrap_or_else(|| "warn".into());
    logging::init_tracing(&level, has_flag(&args, "--json-logs"));

    let result = match args[1].as_str() {
        "test" => cmd_test(&args[2..]).await,
        "call" => cmd_call(&args[2..]).await,
        "providers" => {
            cmd_providers();
            Ok(())
        }
        "networks" => {
            cmd_networks();
            Ok(())
        }
        "version" | "--version" | "-V" => {
            println!("chainrelay {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("chainrelay {}", env!("CARGO_PKG_VERSION"));
    println!("Exercise blockchain RPC provider facades\n");
    println!("USAGE:");
    println!("    chainrelay <COMMAND> [FLAGS]\n");
    println!("COMMANDS:");
    println!("    test       Connect and fetch the latest block number");
    println!("    call       Send a raw JSON-RPC call");
    println!("    providers  List built-in provider URL builders");
    println!("    networks   List supported networks");
    println!("    version    Print version");
    println!("    help       Print this help\n");
    println!("PROVIDER FLAGS:");
    println!("    --config <FILE>        JSON provider config (flags below override it)");
    println!("    --provider <NAME>      quicknode | alchemy | infura | publicnode");
    println!("    --network <NAME|ID>    default: eth_mainnet");
    println!("    --transport <KIND>     https | wss  (default: https)");
    println!("    --token <TOKEN>        API key / endpoint token (or ${TOKEN_ENV})");
    println!("    --host <HOST>          Host override\n");
    println!("CALL FLAGS:");
    println!("    --method <METHOD>      JSON-RPC method  [required]");
    println!("    --params <JSON>        JSON array of params (default: [])\n");
    println!("GLOBAL FLAGS:");
    println!("    --log-level <LEVEL>    default: warn (RUST_LOG overrides)");
    println!("    --json-logs            Emit logs as JSON");
}

/// Merge `--config` with the individual provider flags.
fn resolve_config(args: &[String]) -> Result<ProviderConfig> {
    let mut config = match parse_flag(args, "--config") {
        Some(path) => ProviderConfig::from_file(&path)?,
        None => {
            let provider = parse_flag(args, "--provider")
                .context("--provider or --config is required")?;
            ProviderConfig::new(provider.parse::<ProviderKind>()?)
        }
    };

    if let Some(provider) = parse_flag(args, "--provider") {
        config.provider = provider.parse()?;
    }
    if let Some(network) = parse_flag(args, "--network") {
        config.network = network.parse::<Network>()?;
    }
    if let Some(transport) = parse_flag(args, "--transport") {
        config.transport = transport.parse::<Transport>()?;
    }
    if let Some(token) = parse_flag(args, "--token").or_else(|| env::var(TOKEN_ENV).ok()) {
        config.token = token;
    }
    if let Some(host) = parse_flag(args, "--host") {
        config.host = host;
    }
    Ok(config)
}

fn watch_connection(provider: &RelayProvider) {
    provider.on(CONNECT, |ev| {
        if let ProviderEvent::Connect { .. } = ev {
            tracing::info!("connected");
        }
    });
    provider.on(DISCONNECT, |ev| {
        if let ProviderEvent::Disconnect { code, reason } = ev {
            tracing::info!(code, reason = %reason, "disconnected");
        }
    });
}

async fn cmd_test(args: &[String]) -> Result<()> {
    let config = resolve_config(args)?;
    let provider = config.build()?;
    watch_connection(&provider);

    println!(
        "Testing {} on {} over {}...",
        provider.name(),
        provider.network(),
        provider.transport()
    );

    provider.connect().await?;
    let start = Instant::now();
    let block: String = provider.call("eth_blockNumber", vec![]).await?;
    let latency = start.elapsed();

    let block_num = u64::from_str_radix(block.trim_start_matches("0x"), 16)
        .with_context(|| format!("node returned a malformed block number: {block}"))?;

    println!("  Status:        OK");
    println!("  Block number:  {block_num} ({block})");
    println!("  Latency:       {}ms", latency.as_millis());
    println!("  Connection:    {}", provider.status());
    println!("  Subscriptions: {}", provider.supports_subscriptions());

    provider.disconnect(None, None).await?;
    Ok(())
}

async fn cmd_call(args: &[String]) -> Result<()> {
    let config = resolve_config(args)?;
    let method = parse_flag(args, "--method").context("--method is required")?;
    let params = match parse_flag(args, "--params") {
        Some(raw) => match serde_json::from_str::<Value>(&raw).context("--params must be JSON")? {
            Value::Array(items) => items,
            other => bail!("--params must be a JSON array, got {other}"),
        },
        None => vec![],
    };

    let provider = config.build()?;
    watch_connection(&provider);

    let result: Value = provider.call(&method, params).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    provider.disconnect(None, None).await?;
    Ok(())
}

fn cmd_providers() {
    println!("Built-in provider URL builders:\n");
    println!("  quicknode  QuickNode (https://quicknode.com)");
    println!("             URL:  {{https|wss}}://<host>/<token>");
    println!("             Auth: endpoint host + token");
    println!();
    println!("  alchemy    Alchemy (https://alchemy.com)");
    println!("             URL:  {{https|wss}}://<network>.g.alchemy.com/v2/<token>");
    println!("             Auth: API key");
    println!();
    println!("  infura     Infura (https://infura.io)");
    println!("             URL:  https://<network>.infura.io/v3/<token>");
    println!("             Auth: project ID");
    println!();
    println!("  publicnode Free public endpoints (no API key needed)");
    println!("             URL:  {{https|wss}}://<network>.publicnode.com");
}

fn cmd_networks() {
    println!("Supported networks:\n");
    for network in Network::ALL {
        println!("  {:<18} chain id {}", network.as_str(), network.chain_id());
    }
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}
