use std::{path::Path, sync::Arc, time::Duration};

use clap::Parser;
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use estuary::{
    adapters::{provider_server, startup_probe},
    config::{AggregatorConfigValidator, loader::load_config, models::AggregatorConfig},
    core::Aggregator,
    ports::fetcher::RoutingFetcher,
    tracing_setup,
    utils::GracefulShutdown,
};

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    #[clap(subcommand)]
    command: Option<Commands>,

    #[clap(short, long, default_value = "config.yaml")]
    config: String,

    /// Human-readable console logs instead of JSON (development)
    #[clap(long, global = true)]
    pretty_logs: bool,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Validate configuration file
    Validate {
        /// Configuration file to validate
        #[clap(short, long, default_value = "config.yaml")]
        config: String,
    },
    /// Initialize a new configuration file
    Init {
        /// Output path for the new config file
        #[clap(short, long, default_value = "config.yaml")]
        config: String,
    },
    /// Poll endpoints and serve the merged configuration (default)
    Serve {
        /// Configuration file to use
        #[clap(short, long, default_value = "config.yaml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    let (command, config_path) = match args.command {
        Some(Commands::Validate { config }) => ("validate", config),
        Some(Commands::Init { config }) => ("init", config),
        Some(Commands::Serve { config }) => ("serve", config),
        None => ("serve", args.config), // Default to serve with config from args
    };

    match command {
        "validate" => {
            return validate_config_command(&config_path).await;
        }
        "init" => {
            return init_config_command(&config_path).await;
        }
        "serve" => {
            // Continue with normal startup
        }
        _ => unreachable!(),
    }

    if args.pretty_logs {
        tracing_setup::init_console_tracing()
    } else {
        tracing_setup::init_tracing()
    }
    .map_err(|e| eyre!("Failed to initialize tracing: {}", e))?;

    tracing::info!("Loading configuration from {config_path}");
    let config: AggregatorConfig = load_config(&config_path)
        .await
        .with_context(|| format!("Failed to load config from {config_path}"))?;

    AggregatorConfigValidator::validate(&config).wrap_err("configuration rejected")?;

    // All-or-nothing connectivity gate before steady-state polling begins.
    tracing::info!(
        endpoints = config.endpoints.len(),
        timeout_secs = config.conn_timeout_secs,
        "running connectivity pre-check"
    );
    let clients = startup_probe::prepare_clients(&config)
        .await
        .wrap_err("connectivity pre-check failed")?;
    tracing::info!(
        endpoints = clients.len(),
        "all endpoints reachable; entering steady-state polling"
    );

    let fetchers: Vec<Arc<dyn RoutingFetcher>> = clients
        .into_iter()
        .map(|client| Arc::new(client) as Arc<dyn RoutingFetcher>)
        .collect();
    let aggregator = Aggregator::new(fetchers);

    let graceful_shutdown = Arc::new(GracefulShutdown::new());
    let signal_handler_shutdown = graceful_shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = signal_handler_shutdown.run_signal_handler().await {
            tracing::error!("Signal handler error: {}", e);
        }
    });

    let listen_addr = config.provider.listen_addr.clone();
    let merged = aggregator.merged();
    let provider_shutdown = graceful_shutdown.shutdown_token();
    let provider_handle = tokio::spawn(async move {
        if let Err(e) = provider_server::serve(&listen_addr, merged, provider_shutdown).await {
            tracing::error!("Provider endpoint error: {e}");
        }
    });

    // The interval's first tick fires immediately, so the provider has data
    // right after startup.
    aggregator
        .run(
            Duration::from_secs(config.poll_interval_secs),
            graceful_shutdown.shutdown_token(),
        )
        .await;

    let _ = provider_handle.await;
    tracing::info!("Graceful shutdown completed");
    Ok(())
}

/// Validate configuration file and exit
async fn validate_config_command(config_path: &str) -> Result<()> {
    println!("🔍 Validating configuration file: {config_path}");

    if !Path::new(config_path).exists() {
        eprintln!("❌ Error: Configuration file '{config_path}' not found");
        std::process::exit(1);
    }

    let config = match load_config(config_path).await {
        Ok(config) => {
            println!("✅ Configuration parsing: OK");
            config
        }
        Err(e) => {
            eprintln!("❌ Configuration parsing failed:");
            eprintln!("   {e}");
            std::process::exit(1);
        }
    };

    match AggregatorConfigValidator::validate(&config) {
        Ok(()) => {
            println!("✅ Configuration validation: OK");
            println!();
            println!("📋 Configuration Summary:");
            println!("   • Endpoints: {}", config.endpoints.len());
            for endpoint in &config.endpoints {
                println!(
                    "     - {} (api: {}, web: {}, tls: {})",
                    endpoint.host,
                    endpoint.api_port,
                    endpoint.web_port,
                    endpoint.tls.is_some()
                );
            }
            println!("   • Poll Interval: {}s", config.poll_interval_secs);
            println!("   • Connection Timeout: {}s", config.conn_timeout_secs);
            println!(
                "   • TLS Resolver: {}",
                config.tls_resolver.as_deref().unwrap_or("none")
            );
            println!("   • Provider Address: {}", config.provider.listen_addr);
            println!();
            println!("🎉 Configuration is valid and ready to use!");
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Configuration validation failed:");
            eprintln!("{e}");
            println!();
            println!("💡 Common fixes:");
            println!("   • Ensure every endpoint has a non-empty, unique host");
            println!("   • Check that api_port and web_port are > 0");
            println!("   • conn_timeout_secs and poll_interval_secs must be > 0");
            println!("   • Verify the provider listen address format (e.g., '127.0.0.1:9000')");
            std::process::exit(1);
        }
    }
}

/// Initialize a new configuration file
async fn init_config_command(config_path: &str) -> Result<()> {
    let path = Path::new(config_path);
    if path.exists() {
        eprintln!("❌ Error: Configuration file '{config_path}' already exists");
        std::process::exit(1);
    }

    let default_config = r#"# Estuary Configuration

# Shared deadline (seconds) for the startup connectivity pre-check and for
# every HTTP call in a poll cycle.
conn_timeout_secs: 5

# Interval (seconds) between poll cycles.
poll_interval_secs: 30

# Optional: name of the TLS certificate resolver on the consuming proxy.
# When set, every merged router gains an HTTPS twin plus a permanent
# HTTP-to-HTTPS redirect.
# tls_resolver: "myresolver"

# The Traefik instances to poll. Hosts must be unique.
endpoints:
  - host: "a.example"
    api_port: 8080
    web_port: 8081
  # - host: "b.example"
  #   api_port: 8080
  #   web_port: 8081
  #   tls:
  #     ignore_insecure: true

# Where the merged configuration is republished
# (point the consuming proxy's HTTP provider at /api/dynamic).
provider:
  listen_addr: "127.0.0.1:9000"
"#;

    tokio::fs::write(path, default_config)
        .await
        .context("Failed to write config file")?;
    println!("✅ Created default configuration at: {config_path}");
    println!("   Run 'estuary serve --config {config_path}' to start polling");
    Ok(())
}
