//! bch-bridge CLI - one bridge operation per invocation, answered by a wallet fixture
//!
//! Every command runs through `WalletBridge`, so argument checks and provider
//! response checks behave exactly as they do for an embedded DApp:
//!   bch-bridge address --fixture wallet.json             → "bitcoincash:q..."
//!   bch-bridge balance --fixture wallet.json --dapp-id <id>
//!   bch-bridge build-tx 76a914...88ac:50000 --fixture wallet.json
//!
//! Output format:
//!   --json     Output compact JSON (default for non-tty)
//!   --pretty   Pretty-print JSON (default for tty)
//!
//! Failures print {"error": ..., "kind": "illegal_argument" | "provider"} on stderr and exit 1.

use bch_wallet_bridge::logging::{init_logging_with, LogFormat};
use bch_wallet_bridge::{
    BridgeConfig, BridgeError, BridgeResult, ChangeType, FixtureProvider, TransactionOutput, WalletBridge,
};
use serde_json::{json, Value};
use std::env;
use std::io::IsTerminal;
use tracing::debug;

type Bridge = WalletBridge<FixtureProvider>;

#[tokio::main]
async fn main() {
    init_logging_with(LogFormat::from_env(), "warn");

    let args: Vec<String> = env::args().collect();
    let opts = ParsedArgs::parse(&args[1..]);

    if opts.help {
        print_usage();
        return;
    }

    if opts.version {
        println!("bch-bridge {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let Some(command) = opts.command.clone() else {
        print_usage();
        return;
    };

    let result = match open_bridge(&opts).await {
        Ok(bridge) => run(&command, &bridge, &opts).await,
        Err(e) => Err(e),
    };

    let pretty = !opts.json && (opts.pretty || std::io::stdout().is_terminal());
    match result {
        Ok(output) => println!("{}", render(&output, pretty)),
        Err(e) => {
            eprintln!("{}", render(&json!({"error": error_chain(&e), "kind": e.kind()}), pretty));
            std::process::exit(1);
        }
    }
}

async fn run(command: &str, bridge: &Bridge, opts: &ParsedArgs) -> BridgeResult<Value> {
    debug!(command, "Running bridge command");
    let dapp = opts.dapp_id.as_deref();
    match command {
        "address" => Ok(json!(bridge.get_address(opts.change()?, opts.index()?, dapp).await?)),
        "addresses" => Ok(json!(bridge.get_addresses(opts.change()?, opts.start()?, opts.size()?, dapp).await?)),
        "address-index" => Ok(json!(bridge.get_address_index(opts.change()?, dapp).await?)),
        "redeem-script" => Ok(json!(bridge.get_redeem_script(opts.arg(0, "p2sh address")?, dapp).await?)),
        "redeem-scripts" => Ok(json!(bridge.get_redeem_scripts(dapp).await?)),
        "add-redeem-script" => {
            bridge.add_redeem_script(opts.arg(0, "redeem script")?, dapp).await?;
            Ok(json!({"added": true}))
        }
        "utxos" => Ok(json!(bridge.get_utxos(dapp).await?)),
        "balance" => Ok(json!({"satoshis": bridge.get_balance(dapp).await?})),
        "sign" => Ok(json!({"signature": bridge.sign(opts.arg(0, "address")?, opts.arg(1, "data")?).await?})),
        "build-tx" => {
            let outputs = opts.args.iter().map(|output| parse_output(output)).collect::<BridgeResult<Vec<_>>>()?;
            Ok(json!({"rawTx": bridge.build_transaction(&outputs, dapp).await?}))
        }
        "protocol-version" => Ok(json!(bridge.get_protocol_version().await?)),
        "network" => {
            let network = bridge.get_network().await?;
            Ok(json!({"magic": network.magic_hex(), "name": network.name}))
        }
        "fee" => Ok(json!({"satoshisPerByte": bridge.get_fee_per_byte().await?})),
        other => Err(BridgeError::illegal_argument(format!("Unknown command: {}", other))),
    }
}

async fn open_bridge(opts: &ParsedArgs) -> BridgeResult<Bridge> {
    let path = opts.fixture.as_deref()
        .ok_or_else(|| BridgeError::illegal_argument("--fixture <path> is required (env: BCH_BRIDGE_FIXTURE)"))?;
    let provider = FixtureProvider::load(path).await.map_err(BridgeError::from_provider)?;

    let mut config = BridgeConfig::new();
    if let Some(id) = &opts.default_dapp_id {
        config = config.with_default_dapp_id(id.clone());
    }
    if opts.sequential {
        config = config.with_sequential_utxo_queries();
    }
    WalletBridge::from_config(provider, config)
}

/// `<lockScriptHex>:<satoshis>`
fn parse_output(output: &str) -> BridgeResult<TransactionOutput> {
    let (script, amount) = output.rsplit_once(':')
        .ok_or_else(|| BridgeError::illegal_argument(format!("output '{}' must be <lockScript>:<amount>", output)))?;
    let amount = amount.parse::<u64>()
        .map_err(|_| BridgeError::illegal_argument(format!("output amount '{}' is not a satoshi value", amount)))?;
    Ok(TransactionOutput::new(script, amount))
}

fn error_chain(e: &BridgeError) -> String {
    match e {
        BridgeError::Provider(source) => format!("provider error: {:#}", source),
        other => other.to_string(),
    }
}

fn render(value: &Value, pretty: bool) -> String {
    let rendered = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    rendered.unwrap_or_else(|_| value.to_string())
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    args: Vec<String>,
    fixture: Option<String>,
    dapp_id: Option<String>,
    default_dapp_id: Option<String>,
    change: Option<String>,
    index: Option<String>,
    start: Option<String>,
    size: Option<String>,
    sequential: bool,
    // Output options
    json: bool,
    pretty: bool,
    help: bool,
    version: bool,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Self {
        let mut opts = ParsedArgs::default();
        let mut positional = Vec::new();
        let mut i = 0;

        while i < args.len() {
            let arg = &args[i];
            let value = args.get(i + 1).cloned();
            let mut takes_value = |slot: &mut Option<String>| {
                if value.is_some() {
                    *slot = value.clone();
                    i += 1;
                }
            };
            match arg.as_str() {
                "--help" | "-h" => opts.help = true,
                "--version" | "-V" => opts.version = true,
                "--json" => opts.json = true,
                "--pretty" => opts.pretty = true,
                "--sequential" => opts.sequential = true,
                "--fixture" | "-f" => takes_value(&mut opts.fixture),
                "--dapp-id" | "-d" => takes_value(&mut opts.dapp_id),
                "--default-dapp-id" => takes_value(&mut opts.default_dapp_id),
                "--change" | "-c" => takes_value(&mut opts.change),
                "--index" | "-i" => takes_value(&mut opts.index),
                "--start" | "-s" => takes_value(&mut opts.start),
                "--size" | "-n" => takes_value(&mut opts.size),
                _ if !arg.starts_with('-') => positional.push(arg.clone()),
                _ => {} // Ignore unknown flags
            }
            i += 1;
        }

        // First positional is command, the rest are its arguments
        if !positional.is_empty() {
            opts.command = Some(positional.remove(0));
        }
        opts.args = positional;

        // Environment (lower priority than CLI args)
        if opts.fixture.is_none() {
            opts.fixture = env::var("BCH_BRIDGE_FIXTURE").ok().filter(|s| !s.is_empty());
        }
        if opts.default_dapp_id.is_none() {
            opts.default_dapp_id = env::var("BCH_BRIDGE_DAPP_ID").ok().filter(|s| !s.is_empty());
        }

        opts
    }

    fn arg(&self, n: usize, name: &str) -> BridgeResult<&str> {
        self.args.get(n).map(String::as_str)
            .ok_or_else(|| BridgeError::illegal_argument(format!("missing argument: <{}>", name)))
    }

    fn change(&self) -> BridgeResult<ChangeType> {
        match self.change.as_deref() {
            None => Ok(ChangeType::Receive),
            Some(raw) => ChangeType::from_str(raw)
                .ok_or_else(|| BridgeError::illegal_argument(format!("--change must be receive or change, got '{}'", raw))),
        }
    }

    fn index(&self) -> BridgeResult<Option<u32>> { parse_u32("--index", self.index.as_deref()) }
    fn start(&self) -> BridgeResult<Option<u32>> { parse_u32("--start", self.start.as_deref()) }
    fn size(&self) -> BridgeResult<Option<u32>> { parse_u32("--size", self.size.as_deref()) }
}

fn parse_u32(flag: &str, raw: Option<&str>) -> BridgeResult<Option<u32>> {
    raw.map(|s| s.parse::<u32>().map_err(|_| BridgeError::illegal_argument(format!("{} is an invalid value: '{}'", flag, s))))
        .transpose()
}

fn print_usage() {
    println!(
        r#"bch-bridge - BCH wallet bridge CLI

USAGE:
    bch-bridge <command> [args] [options]

COMMANDS:
    address                         Address at --index (or current index)
    addresses                       --size addresses from --start
    address-index                   Current address index
    redeem-script <p2sh>            Stored redeem script for a P2SH CashAddr
    redeem-scripts                  All stored redeem scripts
    add-redeem-script <hex>         Store a redeem script
    utxos                           Unspendable then spendable UTXOs
    balance                         Sum of UTXO values
    sign <address> <hex>            Sign data with the address key
    build-tx <lockScript:amount>... Build a signed transaction
    protocol-version                Provider protocol version
    network                         Network from magic bytes
    fee                             Fee rate (satoshis per byte)

BRIDGE OPTIONS:
    --fixture, -f <path>            Wallet fixture JSON (env: BCH_BRIDGE_FIXTURE)
    --dapp-id, -d <id>              DApp id for this call
    --default-dapp-id <id>          Default DApp id (env: BCH_BRIDGE_DAPP_ID)
    --change, -c <branch>           receive|change (default: receive)
    --index, -i <n>                 Address index
    --start, -s <n>                 First address index
    --size, -n <n>                  Number of addresses
    --sequential                    Query UTXOs one after the other

OUTPUT OPTIONS:
    --json                          Compact JSON output
    --pretty                        Pretty-print JSON
    --version, -V                   Print version

LOGGING:
    RUST_LOG=debug                  Log every provider call (stderr)
    BCH_BRIDGE_LOG_JSON=1           JSON log lines
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> ParsedArgs {
        ParsedArgs::parse(&line.split_whitespace().map(String::from).collect::<Vec<_>>())
    }

    #[test]
    fn parses_command_flags_and_arguments() {
        let opts = parse("sign bitcoincash:qq 0102 --fixture w.json --json");
        assert_eq!(opts.command.as_deref(), Some("sign"));
        assert_eq!(opts.args, vec!["bitcoincash:qq", "0102"]);
        assert_eq!(opts.fixture.as_deref(), Some("w.json"));
        assert!(opts.json);
    }

    #[test]
    fn numeric_flags_are_checked() {
        assert_eq!(parse("addresses --start 3 --size 2").start().unwrap(), Some(3));
        assert!(parse("addresses --start -1").start().unwrap_err().is_illegal_argument());
        assert!(parse("addresses --size 1.5").size().unwrap_err().is_illegal_argument());
        assert!(parse("address --change sideways").change().unwrap_err().is_illegal_argument());
        assert_eq!(parse("address --change 1").change().unwrap(), ChangeType::Change);
    }

    #[test]
    fn parses_outputs() {
        assert_eq!(parse_output("76a91488ac:50000").unwrap(), TransactionOutput::new("76a91488ac", 50000));
        assert!(parse_output("76a91488ac").unwrap_err().is_illegal_argument());
        assert!(parse_output("76a91488ac:-5").unwrap_err().is_illegal_argument());
    }
}
