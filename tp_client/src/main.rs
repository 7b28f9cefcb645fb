//! A terminal client for the TaskPilot backend.
//!
//! Each invocation runs one command. Credentials persist in the data
//! directory, so a login carries over to later invocations.

use anyhow::{Context, Result};
use pico_args::Arguments;
use taskpilot::{ClientConfig, TaskPilotClient};

use tp_client::{commands::parse_command, logging, session};

const HELP: &str = "\
Talk to a TaskPilot server from the terminal

USAGE:
  tp_client [OPTIONS] <COMMAND> [ARGS...]

OPTIONS:
  --server URL          Server URL  [default: $TASKPILOT_API_URL or http://localhost:8000]

FLAGS:
  -h, --help            Print help information

";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();
    logging::init();

    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}{}", tp_client::commands::USAGE);
        std::process::exit(0);
    }

    let server: Option<String> = pargs.opt_value_from_str("--server")?;
    let input = pargs
        .finish()
        .into_iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");

    let command = parse_command(&input)?;
    let config = ClientConfig::from_env(server).context("Invalid configuration")?;
    tracing::debug!(api_url = %config.api_url, "Configuration loaded");

    let client = TaskPilotClient::new(&config);
    session::execute(&client, command).await
}
