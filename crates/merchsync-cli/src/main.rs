use clap::{Args, Parser, Subcommand};

use merchsync_core::AppConfig;
use merchsync_feed::{group_items, load_feed, parse_feed, GroupConfig, GroupStrategy, MappingTable};
use merchsync_shopify::{ClientOptions, ShopifyClient};
use merchsync_storegest::StoregestClient;
use merchsync_sync::{run_import, run_stock_sync, StockWindow};

#[derive(Debug, Parser)]
#[command(name = "merchsync")]
#[command(about = "Google Merchant feed import and StoreGest stock sync for Shopify")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Import a Merchant XML feed as products with SKU-matched variants.
    Import(ImportArgs),
    /// Push StoreGest stock quantities to Shopify inventory levels by SKU.
    Stock(StockArgs),
}

#[derive(Debug, Args)]
struct ImportArgs {
    /// Feed source: a local path or an http(s) URL.
    feed: String,

    /// Preview every decision without mutating the catalog.
    #[arg(long)]
    dry: bool,

    /// Log per-group decisions and variant diffs.
    #[arg(long)]
    verbose: bool,

    /// Variant grouping strategy.
    #[arg(long, default_value_t = GroupStrategy::Auto, value_parser = parse_strategy)]
    group: GroupStrategy,

    /// Identifier separator for idprefix grouping.
    #[arg(long = "idsep", default_value = "-")]
    id_separator: String,

    /// Leading identifier segments kept by idprefix grouping.
    #[arg(long = "idparts", default_value_t = 2)]
    id_parts: usize,

    /// Capture regex for regex grouping; capture group 1 is the parent key.
    #[arg(long = "idregex")]
    id_regex: Option<String>,

    /// Custom field-mapping JSON file.
    #[arg(long = "map")]
    map_file: Option<String>,
}

#[derive(Debug, Args)]
struct StockArgs {
    /// Pull quantity changes from the last N minutes (default 15).
    #[arg(long, conflicts_with = "full")]
    since: Option<i64>,

    /// Pull the full quantity snapshot instead of a time window.
    #[arg(long)]
    full: bool,

    /// Preview without writing inventory levels.
    #[arg(long)]
    dry: bool,

    /// Log per-row decisions.
    #[arg(long)]
    verbose: bool,
}

fn parse_strategy(s: &str) -> Result<GroupStrategy, String> {
    s.parse()
}

fn init_tracing(log_level: &str, verbose: bool) {
    let default_directive = if verbose { "debug" } else { log_level };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Commands::Import(args) => args.verbose,
        Commands::Stock(args) => args.verbose,
    };

    // Configuration problems abort here, before any remote call.
    let config = merchsync_core::load_app_config()?;
    init_tracing(&config.log_level, verbose);
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Import(args) => run_import_command(&config, &args).await,
        Commands::Stock(args) => run_stock_command(&config, &args).await,
    }
}

async fn run_import_command(config: &AppConfig, args: &ImportArgs) -> anyhow::Result<()> {
    let mapping = match &args.map_file {
        Some(path) => {
            let table = MappingTable::load(path)?;
            tracing::debug!(path = %path, "mapping file loaded");
            table
        }
        None => MappingTable::default(),
    };

    let mut group_cfg = GroupConfig {
        strategy: args.group,
        id_separator: args.id_separator.clone(),
        id_parts: args.id_parts,
        id_pattern: None,
    };
    if let Some(pattern) = &args.id_regex {
        group_cfg = group_cfg.with_pattern(pattern)?;
    }

    let xml = load_feed(&args.feed, config.request_timeout_secs, &config.user_agent).await?;
    let items = parse_feed(&xml)?;
    let item_count = items.len();
    let groups = group_items(items, &group_cfg, &mapping);
    println!(
        "Feed: {item_count} items → {} groups (group=\"{}\")",
        groups.len(),
        args.group
    );

    let shopify = build_shopify_client(config, args.dry)?;
    let summary = run_import(&shopify, &groups, &mapping).await;

    println!(
        "Done. Created: {}, Updated: {}, Skipped: {}, Errors: {}{}",
        summary.created,
        summary.updated,
        summary.skipped,
        summary.errors,
        dry_suffix(args.dry)
    );
    Ok(())
}

async fn run_stock_command(config: &AppConfig, args: &StockArgs) -> anyhow::Result<()> {
    let location_id = config
        .location_id
        .ok_or_else(|| anyhow::anyhow!("SHOPIFY_LOCATION_ID is required for stock sync"))?;
    let domain = config
        .storegest_domain
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("STOREGEST_DOMAIN is required for stock sync"))?;
    let apikey = config
        .storegest_apikey
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("STOREGEST_APIKEY is required for stock sync"))?;

    let window = if args.full {
        println!("Updating stock levels (full snapshot)...");
        StockWindow::Full
    } else {
        let minutes = args.since.unwrap_or(15);
        println!("Updating stock levels (last {minutes} minutes)...");
        StockWindow::SinceMinutes(minutes)
    };

    let shopify = build_shopify_client(config, args.dry)?;
    let storegest = StoregestClient::new(
        &config.storegest_base_url,
        domain,
        apikey,
        config.storegest_timeout_secs,
        &config.user_agent,
    )?;

    let summary = run_stock_sync(&shopify, &storegest, location_id, window).await?;
    println!(
        "Rows: {} — OK: {}, Missing: {}, Errors: {}{}",
        summary.rows,
        summary.ok,
        summary.miss,
        summary.err,
        dry_suffix(args.dry)
    );
    Ok(())
}

fn build_shopify_client(
    config: &AppConfig,
    dry_run: bool,
) -> Result<ShopifyClient, merchsync_shopify::ShopifyError> {
    let options = ClientOptions {
        timeout_secs: config.request_timeout_secs,
        user_agent: config.user_agent.clone(),
        max_retries: config.max_retries,
        backoff_base_ms: config.retry_backoff_base_ms,
        inter_request_delay_ms: config.inter_request_delay_ms,
        dry_run,
    };
    ShopifyClient::new(
        &config.shop_domain,
        &config.admin_token,
        &config.api_version,
        &options,
    )
}

fn dry_suffix(dry: bool) -> &'static str {
    if dry {
        " (DRY RUN)"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_args_parse_with_grouping_flags() {
        let cli = Cli::try_parse_from([
            "merchsync", "import", "feed.xml", "--group", "idprefix", "--idsep", "_",
            "--idparts", "3", "--dry",
        ])
        .unwrap();
        match cli.command {
            Commands::Import(args) => {
                assert_eq!(args.feed, "feed.xml");
                assert_eq!(args.group, GroupStrategy::IdPrefix);
                assert_eq!(args.id_separator, "_");
                assert_eq!(args.id_parts, 3);
                assert!(args.dry);
                assert!(!args.verbose);
            }
            Commands::Stock(_) => panic!("expected import command"),
        }
    }

    #[test]
    fn import_group_defaults_to_auto() {
        let cli = Cli::try_parse_from(["merchsync", "import", "feed.xml"]).unwrap();
        match cli.command {
            Commands::Import(args) => assert_eq!(args.group, GroupStrategy::Auto),
            Commands::Stock(_) => panic!("expected import command"),
        }
    }

    #[test]
    fn unknown_group_strategy_is_rejected() {
        let result = Cli::try_parse_from(["merchsync", "import", "feed.xml", "--group", "sku"]);
        assert!(result.is_err());
    }

    #[test]
    fn stock_since_and_full_conflict() {
        let result = Cli::try_parse_from(["merchsync", "stock", "--since", "30", "--full"]);
        assert!(result.is_err());
    }

    #[test]
    fn stock_parses_window() {
        let cli = Cli::try_parse_from(["merchsync", "stock", "--since", "1440", "--verbose"]).unwrap();
        match cli.command {
            Commands::Stock(args) => {
                assert_eq!(args.since, Some(1440));
                assert!(!args.full);
                assert!(args.verbose);
            }
            Commands::Import(_) => panic!("expected stock command"),
        }
    }
}
