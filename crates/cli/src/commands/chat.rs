use std::time::Duration;

use anyhow::Result;
use console::{style, Term};
use ecopay_agent::ChatSession;
use ecopay_core::config::{AppConfig, LoadOptions};
use ecopay_core::domain::credits::CreditProgress;
use ecopay_core::domain::message::{ChatMessage, Role};
use rand::Rng;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::open_session;
use crate::render::{credit_bar, render_reply};

const SUBMIT_PHRASE: &str = "I want to submit plastics";
const CREDITS_PHRASE: &str = "Check my credit balance";
const REDEEM_PHRASE: &str = "I want to redeem my credits";

const TYPING_BASE_MS: u64 = 1_200;
const TYPING_JITTER_MS: u64 = 800;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatInput {
    Message(String),
    Clear,
    Help,
    Quit,
    Unknown(String),
}

impl ChatInput {
    /// Slash commands map to quick-action phrases; anything else is sent as typed.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix('/') else {
            return Self::Message(trimmed.to_string());
        };

        match command.to_ascii_lowercase().as_str() {
            "submit" => Self::Message(SUBMIT_PHRASE.to_string()),
            "credits" => Self::Message(CREDITS_PHRASE.to_string()),
            "redeem" => Self::Message(REDEEM_PHRASE.to_string()),
            "clear" => Self::Clear,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => Self::Unknown(trimmed.to_string()),
        }
    }
}

pub fn run(instant: bool) -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(chat_loop(config, instant))
}

async fn chat_loop(config: AppConfig, instant: bool) -> Result<()> {
    let term = Term::stdout();
    let mut session = open_session(&config).await?;

    term.write_line(&format!(
        "{} {}",
        style(format!("{} Assistant", config.program.name)).green().bold(),
        style(format!("· {}", config.program.location)).dim()
    ))?;
    write_credit_bar(&term, &session, &config)?;
    term.write_line(&style("/submit  /credits  /redeem  /clear  /help  /quit").dim().to_string())?;
    for message in session.messages() {
        write_message(&term, &config, message)?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        term.write_str(&format!("{} ", style("you ›").bold()))?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match ChatInput::parse(&line) {
            ChatInput::Quit => break,
            ChatInput::Help => write_help(&term)?,
            ChatInput::Unknown(command) => {
                term.write_line(
                    &style(format!("unknown command `{command}`, try /help")).yellow().to_string(),
                )?;
            }
            ChatInput::Clear => match session.clear().await {
                Ok(()) => {
                    term.write_line(&style("chat cleared").dim().to_string())?;
                    for message in session.messages() {
                        write_message(&term, &config, message)?;
                    }
                    write_credit_bar(&term, &session, &config)?;
                }
                Err(error) => {
                    term.write_line(&style(error.user_message()).red().to_string())?;
                }
            },
            ChatInput::Message(text) => {
                if text.is_empty() {
                    continue;
                }
                if !instant {
                    show_typing(&term, &config.program.name).await?;
                }
                match session.send(&text).await {
                    Ok(Some(exchange)) => {
                        write_message(&term, &config, &exchange.reply)?;
                        if exchange.credit_delta.is_some() {
                            write_credit_bar(&term, &session, &config)?;
                        }
                    }
                    Ok(None) => {}
                    Err(error) => {
                        term.write_line(&style(error.user_message()).red().to_string())?;
                    }
                }
            }
        }
    }

    Ok(())
}

async fn show_typing(term: &Term, program_name: &str) -> Result<()> {
    let jitter = rand::thread_rng().gen_range(0..TYPING_JITTER_MS);
    term.write_str(&style(format!("{program_name} is typing…")).dim().italic().to_string())?;
    tokio::time::sleep(Duration::from_millis(TYPING_BASE_MS + jitter)).await;
    term.clear_line()?;
    Ok(())
}

fn write_message(term: &Term, config: &AppConfig, message: &ChatMessage) -> Result<()> {
    match message.role {
        Role::Ai => {
            term.write_line(&style(format!("{} ›", config.program.name)).cyan().bold().to_string())?;
            term.write_line(&render_reply(&message.content))?;
            term.write_line("")?;
        }
        Role::User => {
            term.write_line(&format!("{} {}", style("you ›").bold(), message.content))?;
        }
    }
    Ok(())
}

fn write_credit_bar(term: &Term, session: &ChatSession, config: &AppConfig) -> Result<()> {
    let credits = session.credits();
    let progress = CreditProgress::toward(&credits, config.session.credit_goal);
    let cash = session.policy().format_cash(session.policy().cash_value(credits.total));
    term.write_line(&style(credit_bar(&credits, &progress, &cash)).green().to_string())?;
    Ok(())
}

fn write_help(term: &Term) -> Result<()> {
    term.write_line(&format!("/submit   send \"{SUBMIT_PHRASE}\""))?;
    term.write_line(&format!("/credits  send \"{CREDITS_PHRASE}\""))?;
    term.write_line(&format!("/redeem   send \"{REDEEM_PHRASE}\""))?;
    term.write_line("/clear    reset the conversation and credits")?;
    term.write_line("/quit     leave the chat")?;
    Ok(())
}
