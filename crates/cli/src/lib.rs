pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "aseobi",
    about = "Aseobi operator CLI",
    long_about = "Inspect configuration and catalog readiness, and preview how the WhatsApp assistant answers a message.",
    after_help = "Examples:\n  aseobi doctor --json\n  aseobi catalog\n  aseobi preview text casual\n  aseobi preview select view_formal"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, catalog loading, and message gateway readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "List catalog categories and products")]
    Catalog {
        #[arg(long, help = "Read the catalog from this TOML file instead of the configured one")]
        path: Option<PathBuf>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Print the outbound messages produced for a simulated inbound message")]
    Preview {
        #[command(subcommand)]
        input: PreviewInput,
        #[arg(long, global = true, default_value = "preview", help = "Recipient shown in the plan")]
        to: String,
        #[arg(long, global = true, help = "Read the catalog from this TOML file")]
        path: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
enum PreviewInput {
    #[command(about = "Simulate a free-text message")]
    Text { body: String },
    #[command(about = "Simulate tapping a reply button (or a list row with --list)")]
    Select {
        choice_id: String,
        #[arg(long, help = "Treat the choice as a list row selection")]
        list: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Catalog { path, json } => commands::catalog::run(path.as_deref(), json),
        Command::Preview { input, to, path } => {
            let intent = match input {
                PreviewInput::Text { body } => commands::preview::PreviewIntent::Text(body),
                PreviewInput::Select { choice_id, list } => {
                    commands::preview::PreviewIntent::Select { choice_id, list }
                }
            };
            commands::preview::run(intent, &to, path.as_deref())
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
