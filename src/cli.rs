use anyhow::{anyhow, Context as _};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use crate::config_loader::load_config;
use crate::context::Context;
use crate::error_format::ErrorFormat;
use crate::facade::Log;
use crate::log_event::Level;
use crate::router::Router;

/// Top-level CLI interface for logroute
#[derive(Parser)]
#[command(
    name = "logroute",
    version = "0.1.0",
    about = "Route leveled log events to per-module sinks"
)]
pub struct Cli {
    /// Config file (defaults to logroute.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Emit one event through the default sink
    Emit {
        #[arg(short, long, default_value = "info")]
        level: String,
        #[arg(short = 'M', long)]
        module: Option<String>,
        #[arg(short, long)]
        message: String,
        /// Context entries as key=value, repeatable
        #[arg(short, long = "context")]
        context: Vec<String>,
    },

    /// Capture an error and log it with the error formatter
    ErrorDemo,
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref()).context("loading configuration")?;
    let router = Arc::new(Router::from_config(&config));
    router.append_extension(ErrorFormat::new());
    let _flush = router.flush_guard();
    let log = Log::new(Arc::clone(&router));

    match cli.command {
        Commands::Emit {
            level,
            module,
            message,
            context,
        } => {
            let level: Level = level.parse()?;
            let mut ctx = Context::map();
            for pair in &context {
                let (key, value) = parse_context_pair(pair)?;
                ctx = ctx.with(key, value);
            }
            log.add(level, message, ctx, module.as_deref());
        }
        Commands::ErrorDemo => {
            let err = match std::fs::read("/nonexistent/logroute-demo") {
                Ok(_) => return Err(anyhow!("demo file unexpectedly exists")),
                Err(e) => e,
            };
            log.error_with("error", Context::error(&err), None);
            log.error_with(
                "error",
                Context::map()
                    .with("place", "error_demo")
                    .with("exception", Context::error(&err)),
                None,
            );
        }
    }
    Ok(())
}

/// Parse `key=value`, typing the value as int, float, bool or string.
pub fn parse_context_pair(pair: &str) -> anyhow::Result<(String, Context)> {
    let (key, raw) = pair
        .split_once('=')
        .ok_or_else(|| anyhow!("context entry '{pair}' is not key=value"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow!("context entry '{pair}' has an empty key"));
    }
    let value = if let Ok(i) = raw.parse::<i64>() {
        Context::Int(i)
    } else if let Ok(f) = raw.parse::<f64>() {
        Context::Float(f)
    } else if let Ok(b) = raw.parse::<bool>() {
        Context::Bool(b)
    } else {
        Context::Str(raw.to_string())
    };
    Ok((key.to_string(), value))
}
