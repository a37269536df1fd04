//! formseal CLI - sign descriptors and verify sealed submissions.
//!
//! ```text
//! formseal sign [--html] <descriptor.json | ->
//! formseal verify <params.json | ->
//! formseal inspect <params.json | ->
//! ```
//!
//! The secret comes from `~/.formseal/config.toml` or `FORMSEAL_SECRET`.
//! Rejected submissions print the error kind tag and exit with status 2.

mod commands;

use std::fs;
use std::io::{Read, stderr, stdin};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use formseal_core::FormSeal;

use crate::commands::{Commands, Outcome};

#[derive(Parser)]
#[command(name = "formseal")]
#[command(about = "Sign form descriptors and verify sealed submissions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    // stdout carries command output; logs go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(stderr))
        .with(env_filter)
        .init();
}

fn read_input(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(source).with_context(|| format!("failed to read {source}"))
}

fn load_seal() -> Result<FormSeal> {
    let settings = formseal_config::load_settings()
        .context("failed to load settings (~/.formseal/config.toml, FORMSEAL_SECRET)")?;
    Ok(FormSeal::new(settings))
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let seal = load_seal()?;
    let input = read_input(cli.command.input())?;
    tracing::debug!(
        command = cli.command.name(),
        source = cli.command.input(),
        "running command"
    );

    match commands::run(&seal, &cli.command, &input)? {
        Outcome::Printed(text) => {
            println!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Rejected(err) => {
            eprintln!("rejected: {}: {err}", err.kind());
            Ok(ExitCode::from(2))
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
