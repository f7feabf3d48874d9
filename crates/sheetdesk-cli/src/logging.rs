// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{APP_NAME, Config};

/// Sends log records to a daily-rolling file, since the terminal belongs to
/// the grid. Hold the guard until exit so buffered records are flushed.
pub fn init(config: &Config) -> Result<WorkerGuard> {
    let dir = config.log_dir()?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(&dir, format!("{APP_NAME}.log"));
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_filter(filter(config.log_level()));

    tracing_subscriber::registry()
        .with(file_layer)
        .try_init()
        .context("install log subscriber")?;
    Ok(guard)
}

/// `SHEETDESK_LOG` wins over the configured level.
fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env("SHEETDESK_LOG").unwrap_or_else(|_| EnvFilter::new(default_level))
}
