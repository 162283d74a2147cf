//! flow-router demo
//!
//! Runs the headless demo application against a config file and routes
//! through the given destinations in order.
//!
//! # Architecture Overview
//!
//! ```text
//!   ROUTE args ──▶ RoutingTable ──▶ Navigator queue ──▶ worker
//!                  (names, keys)                          │
//!                                                         ▼
//!                                               RoutingStrategy plan
//!                                                         │
//!                        ┌────────────────────────────────┤
//!                        ▼                                ▼
//!                 leave (innermost first)       enter (outermost first)
//!                        │                                │
//!                        └──────▶ FlowController ◀────────┘
//!                                   │        │
//!                                   ▼        ▼
//!                           RoutingTree   ConsolePresenter
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use flow_router::config::{self, ConfigWatcher, NavigatorConfig};
use flow_router::demo::{ConsolePresenter, DemoApp};
use flow_router::observability;

#[derive(Parser)]
#[command(name = "flow-router")]
#[command(about = "Drive the demo navigation hierarchy from the command line", long_about = None)]
struct Cli {
    /// TOML config file; built-in demo defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload the routing table when the config file changes
    #[arg(short, long, requires = "config")]
    watch: bool,

    /// Disable transition animations
    #[arg(long)]
    no_animation: bool,

    /// Named paths or table keys to route to, in order
    #[arg(value_name = "ROUTE")]
    routes: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => NavigatorConfig::default(),
    };
    if cli.no_animation {
        config.navigation.animated = false;
    }

    observability::init_logging(&config.observability);
    tracing::info!("flow-router v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            observability::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let presenter = Arc::new(ConsolePresenter::new(&config.presentation));
    let app = DemoApp::start(&config, presenter).await?;

    // Keep the watcher alive until the routes are done.
    let _watcher = match (&cli.config, cli.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            let guard = watcher.run()?;
            tokio::spawn(config::apply_table_updates(app.navigator.table().clone(), updates));
            Some(guard)
        }
        _ => None,
    };

    for route in &cli.routes {
        match app.run_route(route).await {
            Ok(outcome) if outcome.is_complete() => {
                tracing::info!(route = %route, left = ?outcome.left, entered = ?outcome.entered, "Route completed");
            }
            Ok(outcome) => {
                tracing::warn!(route = %route, unresolved = ?outcome.unresolved, "Route not reachable from the active flow");
            }
            Err(e) => {
                tracing::error!(route = %route, error = %e, "Route failed");
            }
        }
    }

    let active: Vec<_> = app.active_path().iter().map(|id| id.to_string()).collect();
    println!("{}", active.join(" / "));

    app.shutdown().await;
    Ok(())
}
