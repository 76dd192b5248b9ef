use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use clap::Parser;
use kestrel::log::log_info;
use kestrel::{install_log_binding, LoggerManager, Registry};

#[derive(Parser)]
#[command(name = "kestrel", about = "Load a config document into the registry and print it")]
struct Cli {
    /// Config document to load (`.yaml`, `.yml`, `.toml` or `.json`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log pattern for the root logger, e.g. `%d{%H:%M:%S}%T[%p]%T%m%n`.
    #[arg(long)]
    pattern: Option<String>,

    /// Write debug diagnostics to stderr.
    #[arg(long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(if cli.debug { "debug" } else { "info" })
            }),
        )
        .init();

    let registry = Registry::global();
    let manager = LoggerManager::global();

    registry.lookup_or_create("system.port", 8080i32, "system port")?;
    registry.lookup_or_create("system.value", 10.2f32, "system value")?;
    registry.lookup_or_create("system.int_vec", vec![1i32, 2], "system int vec")?;
    registry.lookup_or_create("system.str_set", BTreeSet::<String>::new(), "system str set")?;
    registry.lookup_or_create(
        "system.str_int_map",
        BTreeMap::from([("k".to_string(), 2i32)]),
        "system str int map",
    )?;
    install_log_binding(registry, manager)?;

    if let Some(path) = &cli.config {
        registry.load_from_file(path)?;
    }
    if let Some(pattern) = &cli.pattern {
        if !manager.root().set_pattern(pattern) {
            anyhow::bail!("malformed log pattern: {pattern}");
        }
    }

    registry.visit(|var| {
        println!("{} = {}  # {}", var.name(), var.to_string(), var.description());
    });

    let root = manager.root();
    log_info!(root, "loaded {} config variables", registry.len());
    Ok(())
}
