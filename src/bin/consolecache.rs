use clap::{Parser, Subcommand};
use consolecache::{
    CacheConfig, CacheError, IndexedStore, QueryRequest, Resource, build_orderer_with, create_object_cache,
    execute_with, logger, parse_filter_expression_with,
};
use serde::Serialize;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "consolecache", version, about = "Query console resources held in an in-memory cache", long_about = None)]
struct Cli {
    /// Path to a config file (TOML)
    #[arg(long, help = "Path to a config file (TOML). Falls back to CONSOLECACHE_CONFIG, then ./consolecache.toml.")]
    config: Option<PathBuf>,
    #[arg(long, help = "Log level (error|warn|info|debug|trace). Overrides CONSOLECACHE_LOG_LEVEL.")]
    log_level: Option<String>,
    #[arg(long, help = "Directory for app.log and audit.log. Overrides CONSOLECACHE_LOG_DIR.")]
    log_dir: Option<PathBuf>,
    #[arg(long, help = "Maximum number of order-by keys. Overrides config and environment.")]
    max_order_keys: Option<usize>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Load resources from an NDJSON file and run one query")]
    Query {
        #[arg(long, help = "NDJSON file, one resource per line, tagged by 'kind'")]
        input: PathBuf,
        #[arg(long, help = "Index to scan. Defaults to the primary index.")]
        index: Option<String>,
        #[arg(long, default_value = "", help = "Key prefix to scan, e.g. 'Address/' or 'Link/ns/space/'")]
        key: String,
        #[arg(long = "key-path", help = "Paths whose equality constraints extend the key prefix, in key order")]
        key_paths: Vec<String>,
        #[arg(long, help = "Filter expression, e.g. \"`$.spec.type` = 'queue'\"")]
        filter: Option<String>,
        #[arg(long = "order-by", help = "Order-by spec, e.g. \"`$.metadata.name` DESC\"")]
        order_by: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        offset: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        first: Option<i64>,
        #[arg(long, help = "Pretty-print the JSON result")]
        pretty: bool,
    },
    #[command(name = "check-filter", about = "Compile a filter expression and report errors")]
    CheckFilter { text: String },
    #[command(name = "check-order", about = "Compile an order-by spec and report errors")]
    CheckOrder { text: String },
    #[command(about = "Load resources from an NDJSON file and print per-index statistics")]
    Stats {
        #[arg(long)]
        input: PathBuf,
    },
}

// Precedence: CLI > env > config file > defaults
fn load_config(cli: &Cli) -> Result<CacheConfig, CacheError> {
    let path = cli
        .config
        .clone()
        .or_else(|| std::env::var("CONSOLECACHE_CONFIG").ok().map(PathBuf::from))
        .or_else(|| std::env::current_dir().ok().map(|d| d.join("consolecache.toml")).filter(|p| p.exists()));
    let mut cfg = match path {
        Some(p) => CacheConfig::from_toml_str(&std::fs::read_to_string(&p)?)?,
        None => CacheConfig::default(),
    };
    cfg.limits.apply_env();
    if let Some(n) = cli.max_order_keys {
        cfg.limits.max_order_keys = n;
    }
    Ok(cfg)
}

fn load_store(path: &Path, cfg: &CacheConfig) -> Result<IndexedStore<Resource>, CacheError> {
    let store = create_object_cache(&cfg.indexes)?;
    let reader = BufReader::new(std::fs::File::open(path)?);
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let obj = Resource::from_json(&line).map_err(|e| CacheError::Registration(format!("line {}: {e}", n + 1)))?;
        store.add(obj)?;
    }
    log::info!("loaded {} resources from {}", store.len(), path.display());
    Ok(store)
}

#[derive(Serialize)]
struct PageOut<'a> {
    total: usize,
    items: Vec<&'a Resource>,
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = load_config(&cli)?;
    let dir = cli.log_dir.clone().or_else(|| std::env::var("CONSOLECACHE_LOG_DIR").ok().map(PathBuf::from));
    let level = cli.log_level.clone().or_else(|| std::env::var("CONSOLECACHE_LOG_LEVEL").ok());
    if dir.is_some() || level.is_some() {
        let retention = std::env::var("CONSOLECACHE_LOG_RETENTION").ok().and_then(|s| s.parse().ok());
        logger::configure_logging(dir.as_deref(), level.as_deref(), retention)?;
    }
    let mut out = std::io::stdout().lock();
    match cli.command {
        Commands::Query { input, index, key, key_paths, filter, order_by, offset, first, pretty } => {
            let store = load_store(&input, &cfg)?;
            let request = QueryRequest {
                index: index.unwrap_or_else(|| cfg.indexes.primary.clone()),
                prefix: key,
                filter,
                key_paths,
                order_by,
                offset,
                first,
            };
            let page = execute_with(&store, &request, None, &cfg.limits)?;
            let body = PageOut { total: page.total, items: page.items.iter().map(|a| &**a).collect() };
            if pretty {
                serde_json::to_writer_pretty(&mut out, &body)?;
            } else {
                serde_json::to_writer(&mut out, &body)?;
            }
            writeln!(out)?;
        }
        Commands::CheckFilter { text } => {
            let expr = parse_filter_expression_with(&text, &cfg.limits)?;
            writeln!(out, "ok: {:?}", expr.root())?;
        }
        Commands::CheckOrder { text } => {
            let orderer = build_orderer_with(Some(&text), &cfg.limits)?;
            for key in orderer.keys() {
                writeln!(out, "{} {:?}", key.path, key.direction)?;
            }
        }
        Commands::Stats { input } => {
            let store = load_store(&input, &cfg)?;
            writeln!(out, "objects: {}", store.len())?;
            for s in store.stats() {
                writeln!(out, "{}: keys={} entries={}", s.name, s.keys, s.entries)?;
            }
        }
    }
    Ok(())
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
