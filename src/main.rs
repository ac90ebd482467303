use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use ragask::logging;
use ragask::{Config, QueryForm, QueryMode, RagClient, RequestState};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "ragask")]
#[command(about = "Ask questions of a retrieval-augmented query service")]
#[command(version)]
struct Cli {
    /// Base URL of the query service
    #[arg(short, long, global = true)]
    endpoint: Option<String>,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level for ragask (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask one question and print the answer
    Ask {
        /// Your question
        question: String,
        /// Retrieval mode: naive, local, global or hybrid (defaults to the configured mode)
        #[arg(short, long)]
        mode: Option<QueryMode>,
        /// File to send along with the question
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Index a piece of text on the server
    Insert {
        /// Text to index
        text: String,
    },
    /// Index a file that already exists on the server host
    InsertFile {
        /// Path on the server host
        path: String,
    },
    /// Check whether the server is up
    Health,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_file = match cli.command {
        None => Some(logging::setup_tui_logging(cli.log_level.as_deref())?),
        Some(_) => {
            logging::setup_cli_logging(cli.log_level.as_deref());
            None
        }
    };

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!("ignoring unreadable config, using defaults: {}", e);
            Config::new()
        }),
    };
    config.resolve_endpoint(cli.endpoint.as_deref());

    match cli.command {
        None => {
            if let Some(log_file) = log_file {
                tracing::info!(endpoint = %config.endpoint, log = %log_file.display(), "starting ui");
            }
            run_tui(&config, cli.config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(command) => run_command(&config, command).await,
    }
}

async fn run_tui(config: &Config, config_path: Option<PathBuf>) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let mut app = App::new(config);
    app.config_path = config_path;
    app.check_health();

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            if let Some(event) = events.next().await {
                handler::handle_event(&mut app, event).await?;
            }
        }
        anyhow::Ok(())
    }
    .await;

    tui::restore()?;
    result
}

async fn run_command(config: &Config, command: Commands) -> Result<ExitCode> {
    let client = RagClient::new(&config.endpoint).with_attachments(config.attachments);

    match command {
        Commands::Ask { question, mode, file } => {
            let mut form = QueryForm::new(mode.unwrap_or(config.default_mode));
            form.input = question;
            form.attachment_path = file;

            match form.submit(&client).await {
                RequestState::Succeeded => {
                    println!("{}", form.display_text().unwrap_or_default());
                    Ok(ExitCode::SUCCESS)
                }
                RequestState::Failed => {
                    eprintln!("{}", form.display_text().unwrap_or_default());
                    Ok(ExitCode::FAILURE)
                }
                RequestState::Idle | RequestState::Pending => {
                    eprintln!("Nothing to ask: the question is blank.");
                    Ok(ExitCode::from(2))
                }
            }
        }
        Commands::Insert { text } => report(client.insert_text(&text).await),
        Commands::InsertFile { path } => report(client.insert_file(&path).await),
        Commands::Health => report(client.health().await),
    }
}

fn report(result: Result<String, ragask::QueryError>) -> Result<ExitCode> {
    match result {
        Ok(message) => {
            println!("{}", message);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!(code = e.code(), "{}", e);
            eprintln!("{}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_flag_is_case_insensitive() {
        let cli = Cli::try_parse_from(["ragask", "ask", "--mode", "GLOBAL", "q"]).unwrap();
        match cli.command {
            Some(Commands::Ask { question, mode, .. }) => {
                assert_eq!(question, "q");
                assert_eq!(mode, Some(QueryMode::Global));
            }
            _ => panic!("expected ask command"),
        }
    }

    #[test]
    fn test_unknown_mode_flag_is_rejected() {
        assert!(Cli::try_parse_from(["ragask", "ask", "--mode", "mix", "q"]).is_err());
    }

    #[test]
    fn test_no_subcommand_starts_ui() {
        let cli = Cli::try_parse_from(["ragask", "--endpoint", "http://10.0.0.5:8020"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.endpoint.as_deref(), Some("http://10.0.0.5:8020"));
    }
}
