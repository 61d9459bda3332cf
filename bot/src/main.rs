mod clock;
mod scheduler;
mod sentry;
mod whitelist;

use anyhow::{bail, Result};
use common::Credentials;
use log::info;
use scheduler::Scheduler;
use sentry::Sentry;
use std::env;
use whitelist::Whitelist;

const DEFAULT_WHITELIST_PATH: &str = "whitelist.txt";

#[tokio::main]
async fn main() -> Result<()> {
    common::setup_env();

    let credentials = Credentials::from_env()?;
    let whitelist_path =
        env::var("WHITELIST_PATH").unwrap_or_else(|_| DEFAULT_WHITELIST_PATH.to_owned());
    let sentry = Sentry::new(credentials, Whitelist::new(whitelist_path))?;

    let args: Vec<String> = env::args().skip(1).collect();
    match args.as_slice() {
        [] => run(sentry).await,
        [command, user_id] if command == "allow" => sentry.allow(user_id).await,
        _ => bail!("Usage: bot [allow <userid>]"),
    }
}

async fn run(sentry: Sentry) -> Result<()> {
    // First pass right away so a restart acts on anything that accumulated.
    sentry.block_and_cancel().await?;

    let scheduler = Scheduler::new(sentry).await?;
    scheduler.start().await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    Ok(())
}
