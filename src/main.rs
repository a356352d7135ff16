use anyhow::Result;
use ask_relay::{
    Config,
    config::DEFAULT_LOG_FILTER,
    http::start_http_server,
    ui::{AskController, HttpRelayTransport, TerminalView, Trigger, transport::DEFAULT_RELAY_URL},
};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ask-relay", version, about = "Question relay for the Gemini API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the relay service (default)
    Serve,
    /// Ask a running relay from the terminal; reads questions from stdin when none is given
    Ask {
        /// Relay endpoint
        #[arg(long, default_value = DEFAULT_RELAY_URL)]
        url: String,
        #[arg(trailing_var_arg = true)]
        question: Vec<String>,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    ask_relay::load_env();
    init_tracing();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Ask { url, question } => ask(url, question).await,
    }
}

async fn serve() -> Result<()> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            tracing::error!("Refusing to start without a complete configuration");
            std::process::exit(1);
        }
    };
    tracing::debug!("Loaded configuration: {:?}", config);
    start_http_server(config).await
}

async fn ask(url: String, question: Vec<String>) -> Result<()> {
    let transport = HttpRelayTransport::new(url)?;
    let mut ui = AskController::new(transport, TerminalView::stdio());

    if !question.is_empty() {
        let rendered = ui.dispatch(Trigger::Click, &question.join(" ")).await;
        if rendered.is_some_and(|r| r.is_error()) {
            std::process::exit(1);
        }
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stderr = tokio::io::stderr();
    loop {
        stderr.write_all(b"> ").await?;
        stderr.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        ui.dispatch(Trigger::Key("Enter"), &line).await;
    }
    Ok(())
}
