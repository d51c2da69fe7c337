#[path = "mailprobe-cli/args.rs"]
mod args;
#[path = "mailprobe-cli/mx.rs"]
mod mx;
#[path = "mailprobe-cli/output.rs"]
mod output;

use anyhow::{Context, Result};
use std::io::{self, BufRead};

use args::{Cli, Commands};
use mailprobe_lib::Prober;
use output::OutputRow;

#[cfg(feature = "with-tracing")]
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;
    let default = if verbose { "mailprobe_lib=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(not(feature = "with-tracing"))]
fn init_tracing(_verbose: bool) {}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let emails: Vec<String> = if cli.stdin {
        let mut emails = Vec::new();
        for line in io::stdin().lock().lines() {
            let line = line.context("read stdin")?;
            let email = line.trim();
            if !email.is_empty() {
                emails.push(email.to_string());
            }
        }
        emails
    } else {
        match &cli.cmd {
            Some(Commands::Check { email }) => vec![email.clone()],
            Some(Commands::Mx { domain }) => return mx::run(domain),
            None => {
                Cli::clap_command().print_help()?;
                println!();
                return Ok(());
            }
        }
    };

    let prober = Prober::system(cli.probe_options()?).context("init DNS resolver")?;
    let rows: Vec<OutputRow> = emails
        .iter()
        .map(|email| OutputRow::new(prober.probe(email)))
        .collect();

    output::write_reports(&rows, &cli)?;

    // codes de sortie : 0 OK, 2 adresse(s) inexistante(s), 1 fatal
    if output::any_missing(&rows) {
        std::process::exit(2);
    }
    Ok(())
}
