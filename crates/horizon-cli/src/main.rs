//! Horizon CLI Application
//!
//! Command-line interface for the Horizon goal tracking tool.

mod args;
mod cli;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands, TodayArgs};
use clap::Parser;
use cli::Cli;
use horizon_core::TrackerBuilder;
use log::info;
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        no_color,
        command,
    } = Args::parse();

    let tracker = TrackerBuilder::new()
        .with_database_path(database_file)
        .build()
        .await
        .context("Failed to initialize tracker")?;

    let renderer = TerminalRenderer::new(!no_color);

    info!("Horizon started");

    let cli = Cli::new(tracker, renderer);
    match command {
        Some(Goal { command }) => cli.handle_goal_command(command).await,
        Some(Item { command }) => cli.handle_item_command(command).await,
        Some(Today(args)) => cli.today(args).await,
        Some(Week(args)) => cli.week(args).await,
        None => cli.today(TodayArgs { date: None }).await,
    }
}
