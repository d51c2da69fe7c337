use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mailprobe_lib::{ProbeOptions, SenderIdentity, TimeoutBudget, ValidationMode};

#[derive(Parser)]
#[command(name = "mailprobe-cli", version)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    /// lit des adresses depuis stdin (une par ligne)
    #[arg(long)]
    pub stdin: bool,

    /// write report to file (human/JSON/NDJSON/CSV selon --format)
    #[arg(long)]
    pub out: Option<String>,

    /// format: human|json|ndjson|csv
    #[arg(long, default_value = "human")]
    pub format: String,

    /// mode de validation syntaxique: strict|relaxed
    #[arg(long, default_value = "strict")]
    pub mode: String,

    /// expéditeur utilisé pour HELO / MAIL FROM
    #[arg(long = "from", default_value = "noreply@localhost")]
    pub from: String,

    /// port SMTP
    #[arg(long, default_value_t = 25)]
    pub port: u16,

    /// budget total de connexion (secondes), partagé entre les MX
    #[arg(long = "connect-budget", default_value_t = 30)]
    pub connect_budget: u64,

    /// timeout de lecture par réponse (secondes)
    #[arg(long = "read-timeout", default_value_t = 5)]
    pub read_timeout: u64,

    /// affiche le transcript SMTP
    #[arg(long)]
    pub transcript: bool,

    /// logs détaillés (feature `with-tracing`)
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// teste l'existence d'une adresse
    Check { email: String },
    /// liste les hôtes candidats d'un domaine
    Mx { domain: String },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn clap_command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }

    pub fn probe_options(&self) -> Result<ProbeOptions> {
        let sender = SenderIdentity::from_address(&self.from)
            .with_context(|| format!("invalid --from '{}'", self.from))?;
        Ok(ProbeOptions {
            sender,
            port: self.port,
            timeouts: TimeoutBudget {
                connection_budget_secs: self.connect_budget,
                per_read_timeout_secs: self.read_timeout,
            },
            validation_mode: mode_from_str(&self.mode)?,
        })
    }
}

pub fn mode_from_str(s: &str) -> Result<ValidationMode> {
    match s {
        "strict" => Ok(ValidationMode::Strict),
        "relaxed" => Ok(ValidationMode::Relaxed),
        other => bail!("unknown --mode '{other}', use: strict|relaxed"),
    }
}
