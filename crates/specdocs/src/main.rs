//! specdocs CLI.
//!
//! `serve` runs the documentation server; `check` runs the same normalization
//! and type policy over a local file.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use bytes::Bytes;
use clap::{Parser, Subcommand};

use specdocs::{process, SpecLocation};
use specdocs_spec::{Rejection, SpecType};
use specdocs_telemetry::{log_startup, LogFormat, Telemetry, TelemetryConfig};

#[derive(Parser, Debug)]
#[command(
    name = "specdocs",
    about = "Documentation pages for remote OpenAPI and AsyncAPI specifications",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the documentation HTTP server.
    Serve {
        /// Listen address.
        #[arg(long, env = "SPECDOCS_LISTEN", default_value = "0.0.0.0:8080")]
        listen: SocketAddr,

        /// Log level filter (RUST_LOG takes precedence).
        #[arg(long, env = "SPECDOCS_LOG_LEVEL", default_value = "info")]
        log_level: String,

        /// Log output format: json or pretty.
        #[arg(long, env = "SPECDOCS_LOG_FORMAT", default_value = "json", value_parser = parse_log_format)]
        log_format: LogFormat,
    },

    /// Normalize a local spec file and report how it would render.
    Check {
        /// Specification type: openapi or asyncapi.
        #[arg(long = "type", value_parser = parse_spec_type)]
        spec_type: SpecType,

        /// Spec file. A .yaml or .yml name selects YAML.
        file: PathBuf,
    },
}

fn parse_log_format(s: &str) -> Result<LogFormat, String> {
    LogFormat::parse(s).ok_or_else(|| format!("unknown log format '{}' (expected json or pretty)", s))
}

fn parse_spec_type(s: &str) -> Result<SpecType, String> {
    s.parse::<SpecType>().map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            listen,
            log_level,
            log_format,
        } => {
            let config = TelemetryConfig::new()
                .with_log_level(log_level)
                .with_log_format(log_format);
            let telemetry = match Telemetry::init(config) {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("error: {}", e);
                    return ExitCode::from(1);
                }
            };
            log_startup!(
                service = %telemetry.config().service_name,
                version = env!("CARGO_PKG_VERSION"),
                listen = %listen,
                "starting documentation service"
            );

            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    eprintln!("error: failed to create runtime: {}", e);
                    return ExitCode::from(1);
                }
            };
            rt.block_on(async {
                let config = specdocs::server::ServerConfig {
                    listen_addr: listen,
                    metrics: telemetry.metrics_clone(),
                };
                match specdocs::server::run(config).await {
                    Ok(()) => ExitCode::SUCCESS,
                    Err(e) => {
                        tracing::error!(error = %e, "server failed");
                        eprintln!("error: {:#}", e);
                        ExitCode::from(1)
                    }
                }
            })
        }

        Command::Check { spec_type, file } => check(spec_type, &file),
    }
}

/// Exit codes: 0 renders normally, 1 rejection page, 2 pipeline failure, 3 I/O.
fn check(spec_type: SpecType, file: &std::path::Path) -> ExitCode {
    let raw = match std::fs::read(file) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("error: cannot read {}: {}", file.display(), e);
            return ExitCode::from(3);
        }
    };

    let location = SpecLocation::new(file.to_string_lossy(), None);
    match process(spec_type, &location, Bytes::from(raw)) {
        Ok(plan) => match &plan.rejection {
            None => {
                println!("{}: renders with {}", file.display(), plan.template);
                ExitCode::SUCCESS
            }
            Some(rejection) => {
                if let Rejection::InvalidSchema(issues) = rejection {
                    for issue in issues {
                        eprintln!("error[{}]: {} ({})", issue.code, issue.message, issue.location);
                    }
                }
                println!(
                    "{}: rejected ({}), renders with {}",
                    file.display(),
                    rejection,
                    plan.template
                );
                ExitCode::from(1)
            }
        },
        Err(e) => {
            eprintln!("error: {} stage failed: {}", e.stage(), e);
            ExitCode::from(2)
        }
    }
}
