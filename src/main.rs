mod api;
mod config;
mod prompt;
mod wipe;

use clap::Parser;
use std::{num::NonZeroU32, process::ExitCode};
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::{
    api::{ApiClient, ApiError},
    config::{ClientConfig, WipeConfig, DEFAULT_API_URL},
    wipe::{PassSummary, RetryPolicy, TokioSleeper, WipeError, Wiper},
};

#[derive(Parser, Debug)]
#[command(
    name = "goodbyectl",
    version,
    about = "Removes every relationship, private channel and guild from a Discord account"
)]
struct Cli {
    /// Base URL of the Discord API.
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: Url,
    /// Don't check the token before starting.
    #[arg(long)]
    skip_verify: bool,
    /// Give up on a request after this many attempts. Retries forever by default.
    #[arg(long)]
    max_attempts: Option<NonZeroU32>,
    /// Log filter, e.g. `info` or `goodbyectl=debug`.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Wipe(#[from] WipeError),
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    // Both prompts happen before any request is made.
    let Some(token) = prompt::read_token() else {
        println!("No token was given. Quitting...");
        return ExitCode::SUCCESS;
    };
    if !prompt::confirm_wipe() {
        println!("\nNot verified. Assuming you're unsure. Quitting...");
        return ExitCode::SUCCESS;
    }

    tokio::select! {
        result = run(&cli, token) => match result {
            Ok(summaries) => {
                for summary in &summaries {
                    println!(
                        "{}: {} removed, {} rejected",
                        summary.pass, summary.removed, summary.rejected
                    );
                }
                println!("Successfully deleted everything.");
                ExitCode::SUCCESS
            }
            Err(err) => {
                println!("Error: {err}");
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, stopping");
            ExitCode::from(130)
        }
    }
}

async fn run(cli: &Cli, token: String) -> Result<Vec<PassSummary>, Error> {
    let client_config = ClientConfig {
        verify_token: !cli.skip_verify,
        ..ClientConfig::new(cli.api_url.clone())
    };
    let client = ApiClient::connect(token, &client_config).await?;
    if let Some(user) = client.user() {
        info!(
            id = %user.id,
            username = user.username.as_deref().unwrap_or("unknown"),
            "authenticated"
        );
    }

    let mut wipe_config = WipeConfig::default();
    if let Some(max_attempts) = cli.max_attempts {
        wipe_config.retry = RetryPolicy::bounded(wipe_config.retry.interval, max_attempts);
    }

    println!("\nInitializing wipe...");
    let summaries = Wiper::new(&client, wipe_config, TokioSleeper)
        .run()
        .await?;
    Ok(summaries)
}
