pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "neuralbites",
    about = "NeuralBites operator CLI",
    long_about = "Check runtime readiness, apply session-store migrations, and run one-off food searches.",
    after_help = "Examples:\n  neuralbites doctor --json\n  neuralbites migrate\n  neuralbites ask spicy food in Paris"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Validate config, session store and upstream settings")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Apply pending session-store migrations and return structured status output")]
    Migrate,
    #[command(about = "Run one chat turn against the live geocoding and place-search services")]
    Ask {
        #[arg(long, help = "Continue an existing session id (useful with the sqlite backend)")]
        session: Option<String>,
        #[arg(required = true, trailing_var_arg = true, help = "Message text, e.g. `pizza in Lyon`")]
        message: Vec<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Migrate => commands::migrate::run(),
        Command::Ask { session, message } => commands::ask::run(&message.join(" "), session),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
