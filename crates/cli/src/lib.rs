pub mod commands;
pub mod render;

use clap::{Parser, Subcommand};
use ecopay_core::config::ConfigError;
use ecopay_core::errors::ApplicationError;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "ecopay",
    about = "Ecopay recycling rewards assistant",
    long_about = "Chat with the Ecopay assistant, inspect credits and history, and operate local storage.",
    after_help = "Examples:\n  ecopay chat\n  ecopay ask I want to submit 150 plastics\n  ecopay credits"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start an interactive chat session")]
    Chat {
        #[arg(long, help = "Reply immediately without the typing indicator")]
        instant: bool,
    },
    #[command(about = "Send one message through the stored session and print the exchange as JSON")]
    Ask {
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    #[command(about = "Classify a message without touching the stored session")]
    Classify {
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    #[command(about = "Show the credit balance, cash value and goal progress")]
    Credits,
    #[command(about = "Print the stored conversation log")]
    History,
    #[command(about = "Reset the stored conversation and credits")]
    Clear,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Apply pending database migrations")]
    Migrate,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Chat { instant } => return run_chat(instant),
        Command::Ask { text } => commands::ask::run(&text.join(" ")),
        Command::Classify { text } => commands::classify::run(&text.join(" ")),
        Command::Credits => commands::credits::run(),
        Command::History => commands::history::run(),
        Command::Clear => commands::clear::run(),
        Command::Config => commands::config::run(),
        Command::Migrate => commands::migrate::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn run_chat(instant: bool) -> ExitCode {
    match commands::chat::run(instant) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(chat_exit_code(&error))
        }
    }
}

fn chat_exit_code(error: &anyhow::Error) -> u8 {
    if let Some(application) = error.downcast_ref::<ApplicationError>() {
        return application.exit_code();
    }
    if error.downcast_ref::<ConfigError>().is_some() {
        return 2;
    }
    1
}
