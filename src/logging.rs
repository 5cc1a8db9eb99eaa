// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use tracing::Subscriber;
use tracing_subscriber::{fmt::MakeWriter, util::SubscriberInitExt, EnvFilter};

/// Used when `RUST_LOG` is unset or invalid
const DEFAULT_FILTER: &str = "warn";

pub fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub fn subscriber<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .without_time()
        .finish()
}

/// Installs the stderr subscriber, which also receives `log` records
pub fn setup() -> anyhow::Result<()> {
    subscriber(filter(), std::io::stderr).try_init()?;
    Ok(())
}
