//! randstr-gateway
//!
//! Serves the random string application either as an AWS Lambda custom
//! runtime or as a plain HTTP server.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────────┐
//!                        │                     GATEWAY                          │
//!   Runtime API event    │  ┌──────────┐   ┌────────────┐   ┌───────────────┐   │
//!   ─────────────────────┼─▶│  lambda  │──▶│  routing   │──▶│   envelope    │   │
//!                        │  │ runtime  │   │ classifier │   │ → canonical   │   │
//!                        │  └──────────┘   │   chain    │   └───────┬───────┘   │
//!                        │        ▲        └─────┬──────┘           │           │
//!                        │        │              │ no match          ▼           │
//!                        │        │         ┌────▼─────┐    ┌───────────────┐   │
//!                        │        │         │ fallback │───▶│ handler (app  │   │
//!                        │        │         └──────────┘    │   router)     │   │
//!   Response envelope    │  ┌─────┴──────┐                  └───────┬───────┘   │
//!   ◀────────────────────┼──│  sanitize  │◀─────────────────────────┘           │
//!                        │  └────────────┘                                      │
//!                        │                                                      │
//!   Local HTTP request   │  ┌──────────┐   ┌────────────────────────────────┐   │
//!   ─────────────────────┼─▶│   http   │──▶│ app router (same as above)     │   │
//!                        │  │  server  │   └────────────────────────────────┘   │
//!                        │  └──────────┘                                        │
//!                        └──────────────────────────────────────────────────────┘
//! ```

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

use randstr_gateway::app;
use randstr_gateway::config::{load_or_default, GatewayConfig};
use randstr_gateway::generator::Generator;
use randstr_gateway::lambda::{ErrorReport, LambdaRuntime, RuntimeClient};
use randstr_gateway::observability::{logging, metrics};
use randstr_gateway::{Dispatcher, HttpServer, InvocationContext, RouterHandler, Shutdown};

#[derive(Parser)]
#[command(name = "randstr-gateway")]
#[command(about = "Random string service for AWS Lambda and local HTTP", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Run the HTTP server locally
    Serve,
    /// Run as a Lambda custom runtime
    Lambda,
    /// Dispatch one event payload and print the response envelope
    Invoke {
        /// Payload file; stdin when omitted
        #[arg(short, long)]
        payload: Option<PathBuf>,
    },
}

impl Command {
    fn detect() -> Self {
        if std::env::var_os("AWS_LAMBDA_FUNCTION_NAME").is_some() {
            Command::Lambda
        } else {
            Command::Serve
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let command = cli.command.clone().unwrap_or_else(Command::detect);

    let config = match load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            if matches!(command, Command::Lambda) {
                report_init_error(&e.to_string()).await;
            }
            return Err(e.into());
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), mode = ?command, "randstr-gateway starting");

    match command {
        Command::Serve => serve(config).await?,
        Command::Lambda => run_lambda(config).await?,
        Command::Invoke { payload } => invoke(config, payload).await?,
    }

    Ok(())
}

fn build_dispatcher(config: &GatewayConfig) -> Dispatcher<RouterHandler> {
    let router = app::router(Generator::new(&config.generator));
    let handler = RouterHandler::new(router, config.gateway.max_response_body);
    Dispatcher::new(handler, config.gateway.clone())
}

async fn serve(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    HttpServer::new(config).run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn run_lambda(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client = RuntimeClient::from_env()?;
    let runtime = LambdaRuntime::new(client, build_dispatcher(&config));

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    runtime.run(shutdown.subscribe()).await;
    Ok(())
}

async fn invoke(config: GatewayConfig, payload: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let payload = match payload {
        Some(path) => tokio::fs::read(&path).await?,
        None => {
            let mut buf = Vec::new();
            tokio::io::stdin().read_to_end(&mut buf).await?;
            buf
        }
    };

    let dispatcher = build_dispatcher(&config);
    let ctx = InvocationContext::generate();
    let outcome = dispatcher.dispatch_envelope(&payload, &ctx).await?;
    tracing::info!(route = %outcome.route, "Invocation complete");

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&outcome.to_vec()?)?;
    stdout.write_all(b"\n")?;
    Ok(())
}

/// Best effort: tell the Runtime API why the function never started.
async fn report_init_error(message: &str) {
    let Ok(client) = RuntimeClient::from_env() else {
        return;
    };
    let report = ErrorReport::new("Runtime.ConfigError", message);
    if let Err(e) = client.send_init_error(&report).await {
        eprintln!("could not report init error: {e}");
    }
}
