use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::cmd::{self, form::FormArgs, validate::ValidateArgs, wizard::WizardArgs};
use crate::telemetry::{self, LogFormat};

#[derive(Parser, Debug)]
#[command(
    name = "concierge",
    about = "Register interest with the medical travel concierge",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Log line format on stderr
    #[arg(long = "log-format", value_enum, default_value = "compact", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fill in and submit the interest form
    Wizard(WizardArgs),
    /// Check an answers file without submitting it
    Validate(ValidateArgs),
    /// Print the interest form definition or its answers schema
    Form(FormArgs),
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_format);
    match cli.command {
        Commands::Wizard(args) => cmd::wizard::run(args),
        Commands::Validate(args) => cmd::validate::run(args),
        Commands::Form(args) => cmd::form::run(args),
    }
}
