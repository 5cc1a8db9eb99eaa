// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

mod commands;
mod logging;

use commands::Command;
use structopt::StructOpt;

fn main() -> anyhow::Result<()> {
    logging::setup()?;
    commands::Main::from_args().execute()
}
