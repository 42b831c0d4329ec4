use std::io::{self, Read, Write};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use metrics::counter;
use tracing::{error, info};
use whitebox_controllers::Controller;
use whitebox_core::Outcome;

mod hook;

use hook::Hook;

#[derive(Parser, Debug)]
#[command(name = "whitebox-hook", version, about = "Whitebox controller hooks")]
struct Cli {
    /// Controller whose hooks to run, e.g. "containerset"
    #[arg(long = "controller", env = "WHITEBOX_CONTROLLER", global = true)]
    controller: Option<String>,

    /// Log filter (EnvFilter directives); logs go to stderr
    #[arg(long = "log", env = "WHITEBOX_LOG", global = true, default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Admission validation: {object} on stdin, {allowed, status} on stdout
    Validate,
    /// Admission mutation: {object} on stdin, {allowed, patchType?, patch?} on stdout
    Mutate,
    /// Reconcile: {object, dependents, events?} in, desired state out
    Reconcile,
    /// Reconcile, then print the dependents a runtime would create, update and delete
    Plan,
    /// Print the controller registration manifest as YAML
    Manifest {
        /// Command the runtime execs for each hook
        #[arg(long = "command", default_value = "whitebox-hook")]
        command: String,
    },
}

fn init_tracing(directives: &str) {
    let filter = tracing_subscriber::EnvFilter::from_str(directives).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(io::stderr).init();
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let hook = match &cli.command {
        Commands::Validate => Hook::Validate,
        Commands::Mutate => Hook::Mutate,
        Commands::Reconcile => Hook::Reconcile,
        Commands::Plan => Hook::Plan,
        Commands::Manifest { command } => {
            let manifest = whitebox_controllers::manifest(command);
            print!("{}", serde_yaml::to_string(&manifest).context("render manifest")?);
            return Ok(ExitCode::SUCCESS);
        }
    };

    let name = cli.controller.as_deref().context("--controller (or WHITEBOX_CONTROLLER) is required")?;
    let controller = whitebox_controllers::lookup(name).with_context(|| format!("unknown controller `{}`", name))?;

    let mut input = Vec::new();
    io::stdin().lock().read_to_end(&mut input).context("read request from stdin")?;
    respond(hook, controller, &input, &mut io::stdout().lock()).map(ExitCode::from)
}

/// Run `hook` and write its response to `out`; returns the exit status. A fault writes nothing.
fn respond<W: Write>(hook: Hook, controller: &Controller, input: &[u8], out: &mut W) -> Result<u8> {
    let outcome = Outcome::from(hook::invoke(hook, controller, input));
    let code = outcome.exit_code();
    match outcome {
        Outcome::Completed(response) => {
            out.write_all(&response).context("write response to stdout")?;
            out.flush().context("flush stdout")?;
            info!(controller = controller.name, ?hook, "hook completed");
        }
        Outcome::Faulted(fault) => {
            counter!("hook_faults_total", 1u64);
            error!(controller = controller.name, ?hook, error = %fault, "hook faulted; no response written");
        }
    }
    Ok(code)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log);
    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!(error = ?e, "whitebox-hook failed");
            ExitCode::FAILURE
        }
    }
}
