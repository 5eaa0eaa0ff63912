use clap::Parser;
use job_match::cli::{handle_command, JobMatchCli};
use job_match::{Alert, ClientError};
use std::process::ExitCode;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "warn,job_match=info";

fn init_logging(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let layer = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(false)
            .with_span_list(false)
            .boxed()
    } else {
        fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    };

    tracing_subscriber::registry().with(layer).with(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = JobMatchCli::parse();
    init_logging(cli.log_json);

    match handle_command(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ClientError>() {
                Some(client_err) => {
                    let alert = Alert::from(client_err);
                    eprintln!("❌ {}: {}", alert.title, alert.message);
                }
                None => eprintln!("❌ Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}
